use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gbp_heur::Heuristic;
use gbp_heur::config::HeuristicConfig;
use itertools::Itertools;
use log::warn;
use tokio::sync::Semaphore;

use crate::config::EvalConfig;
use crate::error::EvalResult;
use crate::executor::{Executor, HeuristicExecutor, ReferenceExecutor, ReferenceSpec};

/// Builds the full set of executors to run on one data file.
pub trait ExecutorProvider: Send + Sync + Debug {
    fn executors(&self, data_file: &Path) -> Vec<Arc<dyn Executor>>;
}

/// The reference solver plus a list of heuristics.
#[derive(Debug, Clone)]
pub struct EvalSuite {
    reference: Arc<ReferenceSpec>,
    heuristics: Vec<Arc<dyn Heuristic>>,
}

impl EvalSuite {
    pub fn new(reference: ReferenceSpec, heuristics: Vec<Arc<dyn Heuristic>>) -> Self {
        let duplicates = heuristics
            .iter()
            .map(|h| h.identifier())
            .duplicates()
            .collect_vec();
        if !duplicates.is_empty() {
            warn!("[EVAL] heuristics evaluated more than once: {duplicates:?}");
        }
        Self {
            reference: Arc::new(reference),
            heuristics,
        }
    }

    /// Validates every heuristic configuration and sets up the reference invocation.
    pub fn from_config(
        config: &EvalConfig,
        model_file: PathBuf,
        heuristics: &[HeuristicConfig],
    ) -> EvalResult<Self> {
        let heuristics = heuristics
            .iter()
            .map(|h| h.build().map(Arc::from))
            .collect::<Result<Vec<Arc<dyn Heuristic>>, _>>()?;
        let reference = ReferenceSpec {
            binary: config.reference_binary.clone(),
            model_file,
            identifier: config.reference_id.clone(),
            threads: config.threads,
            thread_env_var: config.thread_env_var.clone(),
            limiter: config
                .max_reference_procs
                .map(|n| Arc::new(Semaphore::new(n.max(1)))),
        };
        Ok(Self::new(reference, heuristics))
    }

    pub fn reference_id(&self) -> &str {
        &self.reference.identifier
    }

    pub fn heuristics(&self) -> &[Arc<dyn Heuristic>] {
        &self.heuristics
    }
}

impl ExecutorProvider for EvalSuite {
    fn executors(&self, data_file: &Path) -> Vec<Arc<dyn Executor>> {
        let reference: Arc<dyn Executor> =
            Arc::new(ReferenceExecutor::new(self.reference.clone(), data_file));
        let heuristics = self.heuristics.iter().map(|h| {
            Arc::new(HeuristicExecutor::new(h.clone(), data_file)) as Arc<dyn Executor>
        });
        std::iter::once(reference).chain(heuristics).collect()
    }
}
