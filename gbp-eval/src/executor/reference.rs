use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use gbp::Objective;
use log::{debug, warn};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::error::{EvalError, EvalResult};
use crate::executor::Executor;
use crate::executor::oplrun_output::OplrunOutput;

/// Everything needed to invoke the reference solver, shared by all files of a run.
#[derive(Debug, Clone)]
pub struct ReferenceSpec {
    /// Solver binary, resolved through `PATH` when not absolute
    pub binary: PathBuf,
    pub model_file: PathBuf,
    pub identifier: String,
    /// Thread limit handed to the solver, 0 leaves the solver default
    pub threads: u32,
    pub thread_env_var: String,
    /// Caps the number of solver processes alive at the same time
    pub limiter: Option<Arc<Semaphore>>,
}

impl ReferenceSpec {
    pub fn new(binary: impl Into<PathBuf>, model_file: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            model_file: model_file.into(),
            identifier: "cplex".to_string(),
            threads: 0,
            thread_env_var: "CPLEX_THREADS".to_string(),
            limiter: None,
        }
    }
}

/// Runs `<binary> <model_file> <data_file>` and reads `RRH_COUNT` from its standard output.
#[derive(Debug)]
pub struct ReferenceExecutor {
    spec: Arc<ReferenceSpec>,
    data_file: PathBuf,
}

impl ReferenceExecutor {
    pub fn new(spec: Arc<ReferenceSpec>, data_file: impl Into<PathBuf>) -> Self {
        Self {
            spec,
            data_file: data_file.into(),
        }
    }

    async fn execute(&self, cancel: CancellationToken) -> EvalResult<Objective> {
        if cancel.is_cancelled() {
            return Err(EvalError::Cancelled);
        }

        let _permit = match &self.spec.limiter {
            Some(limiter) => {
                let permit = tokio::select! {
                    permit = limiter.clone().acquire_owned() => Some(permit),
                    _ = cancel.cancelled() => None,
                };
                match permit {
                    Some(Ok(permit)) => Some(permit),
                    Some(Err(_)) => {
                        return Err(EvalError::TaskFailed(
                            "reference process limiter closed".to_string(),
                        ));
                    }
                    None => return Err(EvalError::Cancelled),
                }
            }
            None => None,
        };

        let mut command = Command::new(&self.spec.binary);
        command
            .arg(&self.spec.model_file)
            .arg(&self.data_file)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        if self.spec.threads > 0 {
            command.env(&self.spec.thread_env_var, self.spec.threads.to_string());
        }

        let mut child = command.spawn().map_err(|source| EvalError::ReferenceSpawn {
            binary: self.spec.binary.clone(),
            source,
        })?;
        debug!(
            "[REF] started {} (pid {:?}) on {}",
            self.spec.binary.display(),
            child.id(),
            self.data_file.display()
        );

        let Some(mut stdout) = child.stdout.take() else {
            terminate(&mut child);
            return Err(EvalError::TaskFailed(
                "reference process stdout was not captured".to_string(),
            ));
        };

        let mut raw = vec![];
        let read = tokio::select! {
            read = stdout.read_to_end(&mut raw) => Some(read),
            _ = cancel.cancelled() => None,
        };
        match read {
            Some(Ok(_)) => {}
            Some(Err(source)) => {
                terminate(&mut child);
                return Err(EvalError::ReferenceOutput {
                    data_file: self.data_file.clone(),
                    reason: format!("could not read stdout: {source}"),
                });
            }
            None => {
                terminate(&mut child);
                return Err(EvalError::Cancelled);
            }
        }

        let status = tokio::select! {
            status = child.wait() => Some(status),
            _ = cancel.cancelled() => None,
        };
        let status = match status {
            Some(Ok(status)) => status,
            Some(Err(source)) => {
                return Err(EvalError::ReferenceExit {
                    data_file: self.data_file.clone(),
                    status: "unknown".to_string(),
                    reason: source.to_string(),
                });
            }
            None => {
                terminate(&mut child);
                return Err(EvalError::Cancelled);
            }
        };

        self.interpret(&String::from_utf8_lossy(&raw), status)
    }

    fn interpret(&self, stdout: &str, status: ExitStatus) -> EvalResult<Objective> {
        let objective = OplrunOutput::parse(stdout).and_then(|out| out.objective());
        match objective {
            Ok(objective) => {
                if !status.success() {
                    warn!(
                        "[REF] solver exited with {status} on {} but reported a solution",
                        self.data_file.display()
                    );
                }
                Ok(objective)
            }
            Err(reason) if status.success() => Err(EvalError::ReferenceOutput {
                data_file: self.data_file.clone(),
                reason,
            }),
            Err(reason) => Err(EvalError::ReferenceExit {
                data_file: self.data_file.clone(),
                status: status.to_string(),
                reason,
            }),
        }
    }
}

impl Executor for ReferenceExecutor {
    fn identifier(&self) -> &str {
        &self.spec.identifier
    }

    fn cache_eligible(&self) -> bool {
        true
    }

    fn run(&self, cancel: CancellationToken) -> BoxFuture<'_, EvalResult<Objective>> {
        self.execute(cancel).boxed()
    }
}

/// Sends SIGTERM to the child. Does not wait for it to exit.
#[cfg(unix)]
fn terminate(child: &mut Child) {
    //no pid means the child was already reaped
    let Some(pid) = child.id() else {
        return;
    };
    let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if rc != 0 {
        warn!(
            "[REF] could not signal pid {pid}: {}",
            io::Error::last_os_error()
        );
    } else {
        debug!("[REF] sent SIGTERM to pid {pid}");
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    if let Err(err) = child.start_kill() {
        warn!("[REF] could not kill reference process: {err}");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::time::{Duration, Instant};

    use super::*;

    fn script(dir: &std::path::Path, body: &str) -> PathBuf {
        let path = dir.join("model.sh");
        fs::write(&path, body).unwrap();
        path
    }

    fn executor(model: PathBuf, data: PathBuf) -> ReferenceExecutor {
        ReferenceExecutor::new(Arc::new(ReferenceSpec::new("/bin/sh", model)), data)
    }

    #[tokio::test]
    async fn reads_count_from_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let model = script(dir.path(), "echo 'N = 4;'\necho 'RRH_COUNT = 3;'\n");
        let result = executor(model, dir.path().join("a.dat"))
            .run(CancellationToken::new())
            .await;
        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn passes_thread_limit_through_env() {
        let dir = tempfile::tempdir().unwrap();
        let model = script(dir.path(), "echo \"RRH_COUNT = $CPLEX_THREADS;\"\n");
        let mut spec = ReferenceSpec::new("/bin/sh", model);
        spec.threads = 7;
        let result = ReferenceExecutor::new(Arc::new(spec), dir.path().join("a.dat"))
            .run(CancellationToken::new())
            .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn failing_exit_without_count_is_an_exit_error() {
        let dir = tempfile::tempdir().unwrap();
        let model = script(dir.path(), "echo 'license error'\nexit 3\n");
        let result = executor(model, dir.path().join("a.dat"))
            .run(CancellationToken::new())
            .await;
        assert!(matches!(result, Err(EvalError::ReferenceExit { .. })));
    }

    #[tokio::test]
    async fn clean_exit_without_count_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let model = script(dir.path(), "echo 'no solution'\n");
        let result = executor(model, dir.path().join("a.dat"))
            .run(CancellationToken::new())
            .await;
        assert!(matches!(result, Err(EvalError::ReferenceOutput { .. })));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let spec = ReferenceSpec::new("/nonexistent/oplrun", "model.mod");
        let result = ReferenceExecutor::new(Arc::new(spec), "a.dat")
            .run(CancellationToken::new())
            .await;
        assert!(matches!(result, Err(EvalError::ReferenceSpawn { .. })));
    }

    #[tokio::test]
    async fn cancellation_signals_the_child() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("terminated");
        let model = script(
            dir.path(),
            &format!(
                "trap 'touch {}; exit 143' TERM\nsleep 10 &\nwait $!\necho 'RRH_COUNT = 1;'\n",
                marker.display()
            ),
        );
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        let result = executor(model, dir.path().join("a.dat")).run(cancel).await;
        assert!(matches!(result, Err(EvalError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(5));

        let deadline = Instant::now() + Duration::from_secs(5);
        while !marker.exists() && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(marker.exists());
    }

    #[tokio::test]
    async fn already_cancelled_does_not_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("spawned");
        let model = script(dir.path(), &format!("touch {}\n", marker.display()));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = executor(model, dir.path().join("a.dat")).run(cancel).await;
        assert!(matches!(result, Err(EvalError::Cancelled)));
        assert!(!marker.exists());
    }
}
