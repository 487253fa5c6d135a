use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use gbp::Objective;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cache::{CACHE_FILE_NAME, Cache, FileInfo};
use crate::channel;
use crate::directory_view::DirectoryView;
use crate::error::{EvalError, EvalResult};
use crate::executor::{Dummy, Executor, ExecutorResult};
use crate::file_runner::{FileOutcome, FileResult, FileRunner, GroupFileRunner};
use crate::suite::ExecutorProvider;

/// Objective per file, then per executor identifier
pub type FilesToResults = BTreeMap<String, BTreeMap<String, Objective>>;

/// Maximum number of files hashed at the same time
const HASH_CONCURRENCY: usize = 16;

/// The single message a path run emits.
#[derive(Debug)]
pub struct PathResult {
    pub path: PathBuf,
    pub outcome: EvalResult<FilesToResults>,
}

/// What needs to run for a file, decided from the cache.
#[derive(Debug)]
enum FilePlan {
    /// Not in the cache yet
    New,
    /// Contents changed since the cached hash
    Changed(FileInfo),
    /// Cached hash still matches
    Unchanged,
}

/// Evaluates every instance at one path (a directory or a single file) and keeps the
/// directory's cache up to date.
#[derive(Debug, Clone)]
pub struct PathRunner {
    provider: Arc<dyn ExecutorProvider>,
    file_runner: Arc<dyn FileRunner>,
}

impl PathRunner {
    pub fn new(provider: Arc<dyn ExecutorProvider>) -> Self {
        Self::with_file_runner(provider, Arc::new(GroupFileRunner))
    }

    pub fn with_file_runner(
        provider: Arc<dyn ExecutorProvider>,
        file_runner: Arc<dyn FileRunner>,
    ) -> Self {
        Self {
            provider,
            file_runner,
        }
    }

    /// Starts the run of `path` on its own task. The channel yields exactly one [`PathResult`].
    pub fn run(&self, path: PathBuf, cancel: CancellationToken) -> mpsc::Receiver<PathResult> {
        let (tx, rx) = mpsc::channel(1);
        let runner = self.clone();
        tokio::spawn(async move {
            let outcome = runner.evaluate(&path, cancel).await;
            if let Err(err) = &outcome {
                warn!("[EVAL] {} failed: {err}", path.display());
            }
            let _ = tx.send(PathResult { path, outcome }).await;
        });
        rx
    }

    pub async fn evaluate(
        &self,
        path: &Path,
        cancel: CancellationToken,
    ) -> EvalResult<FilesToResults> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(EvalError::PathDoesNotExist(path.to_path_buf()));
            }
            Err(source) => {
                return Err(EvalError::FileOpen {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let view = match metadata.is_dir() {
            true => DirectoryView::from_dir(path, |name| name == CACHE_FILE_NAME).await?,
            false => DirectoryView::from_file(path)?,
        };
        let mut cache = Cache::load(view.dir()).await?;

        //a single file view says nothing about its siblings
        let mut n_changes = match metadata.is_dir() {
            true => cache.retain_files(view.files()),
            false => 0,
        };

        //verifying only reads the cache, entries are updated once all plans are known
        let plan_futures = view
            .files()
            .iter()
            .map(|filename| plan_file(&cache, filename, &cancel))
            .collect::<Vec<_>>();
        let plans = stream::iter(plan_futures)
            .buffered(HASH_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;

        let mut n_replayed = 0;
        let mut receivers = Vec::with_capacity(plans.len());
        for (filename, plan) in plans {
            let plan = match plan {
                Ok(FilePlan::New) => cache.add_file(&filename).await.map(|()| FilePlan::New),
                plan => plan,
            };
            let executors = match plan {
                Err(err) => {
                    let failed = FileResult {
                        filename,
                        outcome: FileOutcome::Failed(err),
                    };
                    receivers.push(channel::once(failed));
                    continue;
                }
                Ok(FilePlan::New) => self.provider.executors(&view.path_of(&filename)),
                Ok(FilePlan::Changed(info)) => {
                    cache.put(filename.as_str(), info);
                    self.provider.executors(&view.path_of(&filename))
                }
                Ok(FilePlan::Unchanged) => {
                    let executors = self.provider.executors(&view.path_of(&filename));
                    match cache.get(&filename) {
                        Some(info) => {
                            let executors = replay_cached(executors, info);
                            n_replayed += executors.iter().filter(|e| e.is_replay()).count();
                            executors
                        }
                        None => executors,
                    }
                }
            };
            receivers.push(self.file_runner.run(filename, executors, cancel.clone()));
        }
        info!(
            "[EVAL] {}: {} files, {} cached results replayed",
            path.display(),
            view.files().len(),
            n_replayed
        );

        let mut merged = channel::merge(receivers);
        let mut first_error = None;
        let mut results = FilesToResults::new();

        while let Some(FileResult { filename, outcome }) = merged.recv().await {
            let executed = match outcome {
                FileOutcome::Failed(err) => Err(err),
                FileOutcome::Executed(ExecutorResult { executor, outcome }) => {
                    outcome.map(|objective| (executor, objective))
                }
            };
            match executed {
                Err(err) => {
                    debug!("[EVAL] {filename}: {err}");
                    first_error.get_or_insert(err);
                }
                Ok((executor, objective)) => {
                    let identifier = executor.identifier();
                    debug!("[EVAL] {filename}: {identifier} = {objective}");
                    results
                        .entry(filename.clone())
                        .or_default()
                        .insert(identifier.to_string(), objective);
                    if executor.cache_eligible()
                        && !executor.is_replay()
                        && cache.record(&filename, identifier, objective)
                    {
                        n_changes += 1;
                    }
                }
            }
        }

        if n_changes > 0 {
            if let Err(err) = cache.save().await {
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(results),
        }
    }
}

/// New files are hashed later, when their entry is added.
async fn plan_file(
    cache: &Cache,
    filename: &str,
    cancel: &CancellationToken,
) -> (String, EvalResult<FilePlan>) {
    let plan = match (cancel.is_cancelled(), cache.has(filename)) {
        (true, _) => Err(EvalError::Cancelled),
        (false, false) => Ok(FilePlan::New),
        (false, true) => cache.verify(filename).await.map(|fresh| match fresh {
            Some(info) => FilePlan::Changed(info),
            None => FilePlan::Unchanged,
        }),
    };
    (filename.to_string(), plan)
}

/// Replaces every cache eligible executor whose objective is cached by a [`Dummy`].
fn replay_cached(executors: Vec<Arc<dyn Executor>>, info: &FileInfo) -> Vec<Arc<dyn Executor>> {
    executors
        .into_iter()
        .map(|executor| {
            let cached = match executor.cache_eligible() {
                true => info.results.get(executor.identifier()),
                false => None,
            };
            match cached {
                Some(&objective) => {
                    Arc::new(Dummy::new(executor.identifier(), objective)) as Arc<dyn Executor>
                }
                None => executor,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::FutureExt;
    use futures::future::BoxFuture;

    use super::*;

    #[derive(Debug)]
    struct Live {
        identifier: &'static str,
        eligible: bool,
    }

    impl Executor for Live {
        fn identifier(&self) -> &str {
            self.identifier
        }

        fn cache_eligible(&self) -> bool {
            self.eligible
        }

        fn run(&self, _cancel: CancellationToken) -> BoxFuture<'_, EvalResult<Objective>> {
            async { Ok(5) }.boxed()
        }
    }

    fn live(identifier: &'static str, eligible: bool) -> Arc<dyn Executor> {
        Arc::new(Live {
            identifier,
            eligible,
        })
    }

    #[tokio::test]
    async fn replays_only_cached_and_eligible() {
        let mut info = FileInfo::new("00");
        info.results.insert("cplex".into(), 2);
        info.results.insert("RandomFit".into(), 4);

        let executors = vec![
            live("cplex", true),
            live("RandomFit", false),
            live("FirstFit", true),
        ];
        let replayed = replay_cached(executors, &info);
        let flags = replayed.iter().map(|e| e.is_replay()).collect::<Vec<_>>();
        assert_eq!(flags, [true, false, false]);
        assert_eq!(replayed[0].identifier(), "cplex");
        assert_eq!(replayed[0].run(CancellationToken::new()).await.unwrap(), 2);
        assert_eq!(replayed[1].run(CancellationToken::new()).await.unwrap(), 5);
    }

    /// Hands out one live `cplex` executor per file and counts the requests
    #[derive(Debug, Default)]
    struct Provider {
        requests: AtomicUsize,
    }

    impl ExecutorProvider for Provider {
        fn executors(&self, _data_file: &Path) -> Vec<Arc<dyn Executor>> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            vec![live("cplex", true)]
        }
    }

    /// Occupies the cache file path with a directory before running the executors
    #[derive(Debug)]
    struct BlockCacheFile {
        dir: PathBuf,
    }

    impl FileRunner for BlockCacheFile {
        fn run(
            &self,
            filename: String,
            executors: Vec<Arc<dyn Executor>>,
            cancel: CancellationToken,
        ) -> mpsc::Receiver<FileResult> {
            fs::create_dir(self.dir.join(CACHE_FILE_NAME)).unwrap();
            GroupFileRunner.run(filename, executors, cancel)
        }
    }

    #[tokio::test]
    async fn save_failure_after_clean_drain_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.dat"), "abc").unwrap();
        let file_runner = Arc::new(BlockCacheFile {
            dir: dir.path().to_path_buf(),
        });
        let runner = PathRunner::with_file_runner(Arc::new(Provider::default()), file_runner);

        let result = runner.evaluate(dir.path(), CancellationToken::new()).await;
        match result {
            Err(EvalError::FileWrite { path, .. }) => {
                assert_eq!(path, dir.path().join(CACHE_FILE_NAME))
            }
            other => panic!("expected a write error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancelled_run_plans_no_executors() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.dat", "b.dat"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        let provider = Arc::new(Provider::default());
        let runner = PathRunner::new(provider.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = runner.evaluate(dir.path(), cancel).await;
        assert!(matches!(result, Err(EvalError::Cancelled)));
        assert_eq!(provider.requests.load(Ordering::SeqCst), 0);
        assert!(!dir.path().join(CACHE_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn removed_files_are_dropped_from_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.dat"), "abc").unwrap();
        fs::write(dir.path().join("b.dat"), "def").unwrap();
        let runner = PathRunner::new(Arc::new(Provider::default()));
        runner.evaluate(dir.path(), CancellationToken::new()).await.unwrap();
        assert_eq!(Cache::load(dir.path()).await.unwrap().len(), 2);

        fs::remove_file(dir.path().join("b.dat")).unwrap();
        let results = runner.evaluate(dir.path(), CancellationToken::new()).await.unwrap();
        assert_eq!(results.keys().collect::<Vec<_>>(), ["a.dat"]);
        let cache = Cache::load(dir.path()).await.unwrap();
        assert!(cache.has("a.dat"));
        assert!(!cache.has("b.dat"));
    }

    #[tokio::test]
    async fn single_file_keeps_sibling_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.dat"), "abc").unwrap();
        fs::write(dir.path().join("b.dat"), "def").unwrap();
        let runner = PathRunner::new(Arc::new(Provider::default()));
        runner.evaluate(dir.path(), CancellationToken::new()).await.unwrap();

        fs::write(dir.path().join("a.dat"), "changed").unwrap();
        runner
            .evaluate(&dir.path().join("a.dat"), CancellationToken::new())
            .await
            .unwrap();
        let cache = Cache::load(dir.path()).await.unwrap();
        assert_eq!(cache.get("a.dat").unwrap().hash, crate::cache::content_hash(b"changed"));
        assert!(cache.has("b.dat"));
    }
}
