use std::io;
use std::path::PathBuf;

use gbp_heur::{HeuristicError, ParameterError};

/// Every failure of the evaluation pipeline.
/// Errors travel as values on the result channels and the first one wins.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("path does not exist: {}", .0.display())]
    PathDoesNotExist(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("could not open {}: {source}", path.display())]
    FileOpen { path: PathBuf, source: io::Error },

    #[error("could not read {}: {source}", path.display())]
    FileRead { path: PathBuf, source: io::Error },

    #[error("could not write {}: {source}", path.display())]
    FileWrite { path: PathBuf, source: io::Error },

    #[error("corrupt cache file {}: {source}", path.display())]
    CacheFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("could not decode instance {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("heuristic {identifier} failed on {}: {source}", path.display())]
    Heuristic {
        identifier: String,
        path: PathBuf,
        source: HeuristicError,
    },

    #[error("could not start reference solver {}: {source}", binary.display())]
    ReferenceSpawn { binary: PathBuf, source: io::Error },

    #[error("reference solver failed on {} ({status}): {reason}", data_file.display())]
    ReferenceExit {
        data_file: PathBuf,
        status: String,
        reason: String,
    },

    #[error("unreadable reference solver output for {}: {reason}", data_file.display())]
    ReferenceOutput { data_file: PathBuf, reason: String },

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error("evaluation cancelled")]
    Cancelled,

    #[error("task failed: {0}")]
    TaskFailed(String),
}

impl EvalError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EvalError::Cancelled)
    }
}

pub type EvalResult<T> = Result<T, EvalError>;
