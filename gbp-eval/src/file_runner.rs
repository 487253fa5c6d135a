use std::fmt::Debug;
use std::sync::Arc;

use log::debug;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::EvalError;
use crate::executor::{Executor, ExecutorResult, GroupExecutor};

/// A result of one file, tagged with its basename.
#[derive(Debug)]
pub struct FileResult {
    pub filename: String,
    pub outcome: FileOutcome,
}

#[derive(Debug)]
pub enum FileOutcome {
    /// One executor finished, successfully or not
    Executed(ExecutorResult),
    /// The file could not be prepared, no executor ran
    Failed(EvalError),
}

/// Runs a set of executors for one file.
/// The returned channel closes after the last result.
pub trait FileRunner: Send + Sync + Debug {
    fn run(
        &self,
        filename: String,
        executors: Vec<Arc<dyn Executor>>,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<FileResult>;
}

/// Runs the executors of a file as a [`GroupExecutor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupFileRunner;

impl FileRunner for GroupFileRunner {
    fn run(
        &self,
        filename: String,
        executors: Vec<Arc<dyn Executor>>,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<FileResult> {
        let (tx, rx) = mpsc::channel(1);
        let mut group_rx = GroupExecutor::new(executors).run(cancel);

        tokio::spawn(async move {
            while let Some(result) = group_rx.recv().await {
                let tagged = FileResult {
                    filename: filename.clone(),
                    outcome: FileOutcome::Executed(result),
                };
                if tx.send(tagged).await.is_err() {
                    debug!("[EVAL] receiver of {filename} dropped");
                    break;
                }
            }
        });
        rx
    }
}
