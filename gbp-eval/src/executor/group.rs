use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use log::debug;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::error::EvalError;
use crate::executor::{Executor, ExecutorResult};

/// Runs a set of executors concurrently and merges their results into one channel.
///
/// Every executor runs on its own task and hands its single result over a oneshot
/// channel to the merge task, which forwards it to the output channel. The output
/// closes once every executor has reported, also when the set is empty.
/// A failing executor does not cancel its siblings, only `cancel` does.
#[derive(Debug, Default)]
pub struct GroupExecutor {
    executors: Vec<Arc<dyn Executor>>,
}

impl GroupExecutor {
    pub fn new(executors: Vec<Arc<dyn Executor>>) -> Self {
        Self { executors }
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }

    pub fn run(self, cancel: CancellationToken) -> mpsc::Receiver<ExecutorResult> {
        let (tx, rx) = mpsc::channel(1);

        let hand_offs = self
            .executors
            .into_iter()
            .map(|executor| {
                let (hand_off_tx, hand_off_rx) = oneshot::channel();
                let task_executor = executor.clone();
                let task_cancel = cancel.clone();
                tokio::spawn(async move {
                    let outcome = task_executor.run(task_cancel).await;
                    let result = ExecutorResult {
                        executor: task_executor,
                        outcome,
                    };
                    if hand_off_tx.send(result).is_err() {
                        debug!("[GROUP] merge task gone, dropping result");
                    }
                });
                (executor, hand_off_rx)
            })
            .collect::<Vec<_>>();

        tokio::spawn(async move {
            let mut pending = hand_offs
                .into_iter()
                .map(|(executor, hand_off_rx)| async move {
                    match hand_off_rx.await {
                        Ok(result) => result,
                        //the executor task panicked or was aborted
                        Err(_) => {
                            let reason = format!(
                                "executor {} terminated without a result",
                                executor.identifier()
                            );
                            ExecutorResult {
                                executor,
                                outcome: Err(EvalError::TaskFailed(reason)),
                            }
                        }
                    }
                })
                .collect::<FuturesUnordered<_>>();

            while let Some(result) = pending.next().await {
                if tx.send(result).await.is_err() {
                    debug!("[GROUP] receiver dropped, stop forwarding");
                    break;
                }
            }
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use futures::FutureExt;
    use futures::future::BoxFuture;
    use gbp::Objective;

    use super::*;
    use crate::error::EvalResult;
    use crate::executor::Dummy;

    #[derive(Debug)]
    struct Failing;

    impl Executor for Failing {
        fn identifier(&self) -> &str {
            "failing"
        }

        fn cache_eligible(&self) -> bool {
            true
        }

        fn run(&self, _cancel: CancellationToken) -> BoxFuture<'_, EvalResult<Objective>> {
            async { Err(EvalError::TaskFailed("boom".into())) }.boxed()
        }
    }

    #[derive(Debug)]
    struct Sleeper;

    impl Executor for Sleeper {
        fn identifier(&self) -> &str {
            "sleeper"
        }

        fn cache_eligible(&self) -> bool {
            true
        }

        fn run(&self, cancel: CancellationToken) -> BoxFuture<'_, EvalResult<Objective>> {
            async move {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(30)) => Ok(1),
                    _ = cancel.cancelled() => Err(EvalError::Cancelled),
                }
            }
            .boxed()
        }
    }

    #[derive(Debug)]
    struct Panicking;

    impl Executor for Panicking {
        fn identifier(&self) -> &str {
            "panicking"
        }

        fn cache_eligible(&self) -> bool {
            false
        }

        fn run(&self, _cancel: CancellationToken) -> BoxFuture<'_, EvalResult<Objective>> {
            async { panic!("executor bug") }.boxed()
        }
    }

    async fn drain(mut rx: mpsc::Receiver<ExecutorResult>) -> Vec<ExecutorResult> {
        let mut results = vec![];
        while let Some(r) = rx.recv().await {
            results.push(r);
        }
        results
    }

    #[tokio::test]
    async fn empty_group_closes_channel() {
        let results = drain(GroupExecutor::new(vec![]).run(CancellationToken::new())).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn one_message_per_executor() {
        let executors: Vec<Arc<dyn Executor>> = vec![
            Arc::new(Dummy::new("a", 1)),
            Arc::new(Failing),
            Arc::new(Dummy::new("b", 2)),
        ];
        let results = drain(GroupExecutor::new(executors).run(CancellationToken::new())).await;
        let ids = results
            .iter()
            .map(|r| r.executor.identifier().to_string())
            .collect::<BTreeSet<_>>();
        assert_eq!(results.len(), 3);
        assert_eq!(ids, BTreeSet::from(["a".into(), "b".into(), "failing".into()]));
        let failures = results.iter().filter(|r| r.outcome.is_err()).count();
        assert_eq!(failures, 1);
    }

    #[tokio::test]
    async fn failure_does_not_cancel_siblings_but_token_does() {
        let cancel = CancellationToken::new();
        let executors: Vec<Arc<dyn Executor>> = vec![Arc::new(Failing), Arc::new(Sleeper)];
        let mut rx = GroupExecutor::new(executors).run(cancel.clone());

        let first = rx.recv().await.unwrap();
        assert_eq!(first.executor.identifier(), "failing");
        // the sleeper is still running
        assert!(
            tokio::time::timeout(Duration::from_millis(50), rx.recv())
                .await
                .is_err()
        );
        cancel.cancel();
        let second = rx.recv().await.unwrap();
        assert!(matches!(second.outcome, Err(EvalError::Cancelled)));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn panicking_executor_still_reports() {
        let executors: Vec<Arc<dyn Executor>> = vec![Arc::new(Panicking), Arc::new(Dummy::new("a", 1))];
        let results = drain(GroupExecutor::new(executors).run(CancellationToken::new())).await;
        assert_eq!(results.len(), 2);
        let panicked = results
            .iter()
            .find(|r| r.executor.identifier() == "panicking")
            .unwrap();
        assert!(matches!(panicked.outcome, Err(EvalError::TaskFailed(_))));
    }
}
