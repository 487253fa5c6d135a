use std::path::PathBuf;

use gbp_heur::config::HeuristicConfig;
use serde::{Deserialize, Serialize};

/// Configuration of an evaluation run
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EvalConfig {
    /// Reference solver binary, looked up on `PATH` unless absolute
    pub reference_binary: PathBuf,
    /// Identifier under which the reference objective is cached and compared against
    pub reference_id: String,
    /// Thread limit passed to the reference solver, 0 keeps the solver default
    pub threads: u32,
    /// Environment variable through which the thread limit is passed
    pub thread_env_var: String,
    /// Maximum number of reference processes alive at once. If undefined, one per file.
    pub max_reference_procs: Option<usize>,
    /// Heuristics evaluated when the command does not name any
    pub heuristics: Vec<HeuristicConfig>,
    /// Print per-file errors next to the averages
    pub verbose: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            reference_binary: PathBuf::from("oplrun"),
            reference_id: "cplex".to_string(),
            threads: 0,
            thread_env_var: "CPLEX_THREADS".to_string(),
            max_reference_procs: None,
            heuristics: HeuristicConfig::all(),
            verbose: false,
        }
    }
}
