use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::channel;
use crate::error::{EvalError, EvalResult};
use crate::path_runner::{FilesToResults, PathResult, PathRunner};

/// Objectives of every file of every input path
pub type EvalResults = BTreeMap<PathBuf, FilesToResults>;

/// Runs a [`PathRunner`] per input path, all concurrently.
///
/// A failing path does not cancel the others. The first error received is returned,
/// the results of the remaining paths are then discarded.
#[derive(Debug, Clone)]
pub struct MultiPathRunner {
    path_runner: PathRunner,
}

impl MultiPathRunner {
    pub fn new(path_runner: PathRunner) -> Self {
        Self { path_runner }
    }

    pub async fn run(&self, paths: Vec<PathBuf>, cancel: CancellationToken) -> EvalResult<EvalResults> {
        let mut seen = HashSet::new();
        let paths = paths
            .into_iter()
            .filter(|p| {
                let new = seen.insert(p.clone());
                if !new {
                    warn!("[EVAL] {} given more than once, evaluating it once", p.display());
                }
                new
            })
            .collect::<Vec<_>>();
        let n_paths = paths.len();

        let receivers = paths
            .into_iter()
            .map(|path| self.path_runner.run(path, cancel.clone()))
            .collect();
        let mut merged = channel::merge(receivers);

        let mut first_error = None;
        let mut n_received = 0;
        let mut results = EvalResults::new();
        while let Some(PathResult { path, outcome }) = merged.recv().await {
            n_received += 1;
            match outcome {
                Ok(files) => {
                    info!("[EVAL] {} done ({} files)", path.display(), files.len());
                    results.insert(path, files);
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        if n_received < n_paths && first_error.is_none() {
            first_error = Some(EvalError::TaskFailed(format!(
                "{} of {n_paths} paths terminated without a result",
                n_paths - n_received
            )));
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(results),
        }
    }
}
