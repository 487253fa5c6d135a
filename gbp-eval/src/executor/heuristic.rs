use std::path::PathBuf;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use gbp::Objective;
use gbp::entities::Instance;
use gbp::io::cplex;
use gbp_heur::{Heuristic, HeuristicError};
use log::debug;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use crate::error::{EvalError, EvalResult};
use crate::executor::Executor;

/// Decodes an OPL data file and runs an in-process heuristic on it.
///
/// The heuristic runs on the blocking pool and polls the cancellation token between
/// its outer iterations.
#[derive(Debug)]
pub struct HeuristicExecutor {
    heuristic: Arc<dyn Heuristic>,
    data_file: PathBuf,
}

impl HeuristicExecutor {
    pub fn new(heuristic: Arc<dyn Heuristic>, data_file: impl Into<PathBuf>) -> Self {
        Self {
            heuristic,
            data_file: data_file.into(),
        }
    }

    async fn read_instance(&self) -> EvalResult<Instance> {
        let mut file = tokio::fs::File::open(&self.data_file)
            .await
            .map_err(|source| EvalError::FileOpen {
                path: self.data_file.clone(),
                source,
            })?;
        let mut raw = vec![];
        file.read_to_end(&mut raw)
            .await
            .map_err(|source| EvalError::FileRead {
                path: self.data_file.clone(),
                source,
            })?;
        let text = String::from_utf8(raw).map_err(|err| EvalError::Decode {
            path: self.data_file.clone(),
            reason: err.to_string(),
        })?;
        cplex::decode(&text).map_err(|err| EvalError::Decode {
            path: self.data_file.clone(),
            reason: format!("{err:#}"),
        })
    }

    async fn execute(&self, cancel: CancellationToken) -> EvalResult<Objective> {
        let instance = self.read_instance().await?;

        let heuristic = self.heuristic.clone();
        let token = cancel.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            heuristic.optimize(&instance, &|| token.is_cancelled())
        })
        .await
        .map_err(|err| {
            EvalError::TaskFailed(format!(
                "heuristic {} panicked: {err}",
                self.heuristic.identifier()
            ))
        })?;

        match outcome {
            Ok(result) => {
                debug!(
                    "[HEUR] {} used {} bins on {}",
                    self.heuristic.identifier(),
                    result.bins_used,
                    self.data_file.display()
                );
                Ok(result.bins_used)
            }
            Err(HeuristicError::Cancelled) => Err(EvalError::Cancelled),
            Err(source) => Err(EvalError::Heuristic {
                identifier: self.heuristic.identifier().to_string(),
                path: self.data_file.clone(),
                source,
            }),
        }
    }
}

impl Executor for HeuristicExecutor {
    fn identifier(&self) -> &str {
        self.heuristic.identifier()
    }

    fn cache_eligible(&self) -> bool {
        self.heuristic.cache_eligible()
    }

    fn run(&self, cancel: CancellationToken) -> BoxFuture<'_, EvalResult<Objective>> {
        self.execute(cancel).boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use gbp_heur::config::HeuristicConfig;
    use gbp_heur::opt::first_fit::FirstFit;

    use super::*;

    const EXAMPLE: &str = "N = 4;\nV = 2;\ncapacity = [14 15 8 10];\nsize = [[6 3 2 1] [7 8 5 3]];\n";

    #[tokio::test]
    async fn returns_bins_used() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("a.dat");
        fs::write(&data, EXAMPLE).unwrap();

        let executor = HeuristicExecutor::new(Arc::new(FirstFit::new()), &data);
        assert_eq!(executor.identifier(), "FirstFit");
        assert!(executor.cache_eligible());
        assert_eq!(executor.run(CancellationToken::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let executor = HeuristicExecutor::new(Arc::new(FirstFit::new()), dir.path().join("x.dat"));
        let result = executor.run(CancellationToken::new()).await;
        assert!(matches!(result, Err(EvalError::FileOpen { .. })));
    }

    #[tokio::test]
    async fn garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("a.dat");
        fs::write(&data, "capacity = [1 2;").unwrap();
        let executor = HeuristicExecutor::new(Arc::new(FirstFit::new()), &data);
        let result = executor.run(CancellationToken::new()).await;
        assert!(matches!(result, Err(EvalError::Decode { .. })));
    }

    #[tokio::test]
    async fn infeasible_item_is_a_heuristic_error() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("a.dat");
        fs::write(&data, "N = 2;\nV = 1;\ncapacity = [3 3];\nsize = [[5 4]];\n").unwrap();
        let executor = HeuristicExecutor::new(Arc::new(FirstFit::new()), &data);
        match executor.run(CancellationToken::new()).await {
            Err(EvalError::Heuristic { identifier, source, .. }) => {
                assert_eq!(identifier, "FirstFit");
                assert_eq!(source, HeuristicError::NoFeasibleBin { item: 0 });
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancelled_token_cancels_heuristic() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("a.dat");
        fs::write(&data, EXAMPLE).unwrap();
        let heuristic: Arc<dyn Heuristic> = HeuristicConfig::BinElimination {
            fitness_func_id: 0,
            max_iter: 10,
        }
        .build()
        .unwrap()
        .into();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = HeuristicExecutor::new(heuristic, &data).run(cancel).await;
        assert!(matches!(result, Err(EvalError::Cancelled)));
    }
}
