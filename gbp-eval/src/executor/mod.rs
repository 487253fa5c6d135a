//! Executors produce the objective of one solver on one instance file.
//!
//! Three kinds exist: the external reference solver ([`ReferenceExecutor`]), in-process
//! heuristics ([`HeuristicExecutor`]) and [`Dummy`], which replays a cached objective
//! through the same channels as a live execution.

use std::fmt::Debug;
use std::sync::Arc;

use futures::future::BoxFuture;
use gbp::Objective;
use tokio_util::sync::CancellationToken;

use crate::error::EvalResult;

mod dummy;
mod group;
mod heuristic;
pub mod oplrun_output;
mod reference;

pub use dummy::Dummy;
pub use group::GroupExecutor;
pub use heuristic::HeuristicExecutor;
pub use reference::{ReferenceExecutor, ReferenceSpec};

/// Common surface of every executor.
pub trait Executor: Send + Sync + Debug {
    /// Stable identifier under which the objective is cached and reported
    fn identifier(&self) -> &str;

    /// Whether a successful objective may be written back into the cache
    fn cache_eligible(&self) -> bool;

    /// True for executors replaying an objective that is already cached.
    /// Their results never count as cache changes.
    fn is_replay(&self) -> bool {
        false
    }

    /// Computes the objective. On cancellation of `cancel` the future resolves to
    /// [`EvalError::Cancelled`](crate::error::EvalError::Cancelled).
    fn run(&self, cancel: CancellationToken) -> BoxFuture<'_, EvalResult<Objective>>;
}

/// The single message every executor emits.
#[derive(Debug)]
pub struct ExecutorResult {
    pub executor: Arc<dyn Executor>,
    pub outcome: EvalResult<Objective>,
}
