//! Evaluation of generalized bin packing heuristics against an exact reference solver.
//!
//! A run fans out over input paths ([`multi_path_runner`]), then over the instance
//! files of each path ([`path_runner`]), then over the executors of each file
//! ([`executor`]). Objectives are cached per directory ([`cache`]) and replayed as long
//! as the content hash of a file is unchanged. A single [`CancellationToken`] reaches
//! every layer.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

use std::sync::LazyLock;
use std::time::Instant;

pub mod cache;
pub mod channel;
pub mod config;
pub mod directory_view;
pub mod error;
pub mod evaluation;
pub mod executor;
pub mod file_runner;
pub mod io;
pub mod multi_path_runner;
pub mod path_runner;
pub mod suite;

pub static EPOCH: LazyLock<Instant> = LazyLock::new(Instant::now);
