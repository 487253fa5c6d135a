use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use gbp::io::Format;
use gbp_heur::config::HeuristicConfig;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Also write the errors as CSV to this file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,
    /// Print per-file errors next to the averages
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// Thread limit of the reference solver, 0 keeps the solver default
    #[arg(short, long, value_name = "THREADS", global = true)]
    pub threads: Option<u32>,
    /// Reference solver binary
    #[arg(long, value_name = "BIN", global = true)]
    pub oplrun: Option<PathBuf>,
    /// Maximum number of reference solver processes running at once
    #[arg(short = 'j', long, value_name = "PROCS", global = true)]
    pub max_procs: Option<usize>,
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "[off, error, warn, info, debug, trace]",
        default_value = "info",
        global = true
    )]
    pub log_level: LevelFilter,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate every heuristic (or those of the config file)
    All(Target),
    FirstFit(Target),
    BestFit {
        #[arg(long, default_value_t = 0)]
        fitness_func_id: u8,
        #[command(flatten)]
        target: Target,
    },
    BinElimination {
        #[arg(long, default_value_t = 0)]
        fitness_func_id: u8,
        #[arg(long, default_value_t = 100)]
        max_iter: u32,
        #[command(flatten)]
        target: Target,
    },
    RandomFit {
        /// Without seed the results are never cached
        #[arg(long)]
        seed: Option<u64>,
        #[command(flatten)]
        target: Target,
    },
    /// Run a single heuristic on one instance file (JSON, plain or OPL data)
    Solve(SolveArgs),
    /// Generate random instances
    Generate(GenerateArgs),
}

/// The model of the reference solver and the data files or directories to evaluate
#[derive(Args, Debug, Clone)]
pub struct Target {
    #[arg(value_name = "MODEL_FILE")]
    pub model_file: PathBuf,
    #[arg(value_name = "DATA_PATH", required = true)]
    pub data_paths: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    #[arg(value_name = "INSTANCE")]
    pub instance: PathBuf,
    /// Heuristic as JSON, e.g. '{"type": "BestFit", "fitness_func_id": 1}'
    #[arg(long, value_name = "JSON", default_value = r#"{"type": "FirstFit"}"#, value_parser = parse_heuristic)]
    pub heuristic: HeuristicConfig,
    /// Write the solution here instead of to stdout
    #[arg(long, value_name = "FILE")]
    pub solution_file: Option<PathBuf>,
}

fn parse_heuristic(json: &str) -> Result<HeuristicConfig, String> {
    serde_json::from_str(json).map_err(|err| format!("invalid heuristic configuration: {err}"))
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(long, value_name = "FOLDER")]
    pub out_dir: PathBuf,
    #[arg(long, default_value_t = 10)]
    pub count: usize,
    #[arg(long, default_value_t = 10)]
    pub bins: usize,
    #[arg(long, default_value_t = 20)]
    pub items: usize,
    #[arg(long, default_value_t = 10)]
    pub min_capacity: u64,
    #[arg(long, default_value_t = 20)]
    pub max_capacity: u64,
    #[arg(long, default_value_t = 1)]
    pub min_size: u64,
    #[arg(long, default_value_t = 10)]
    pub max_size: u64,
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    #[arg(long, value_enum, default_value_t = FormatArg::Cplex)]
    pub format: FormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Json,
    Plain,
    Cplex,
}

impl From<FormatArg> for Format {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => Format::Json,
            FormatArg::Plain => Format::Plain,
            FormatArg::Cplex => Format::Cplex,
        }
    }
}

impl Command {
    /// The heuristics named by the command, `None` when it defers to the configuration
    pub fn heuristics(&self) -> Option<Vec<HeuristicConfig>> {
        match *self {
            Command::All(_) | Command::Solve(_) | Command::Generate(_) => None,
            Command::FirstFit(_) => Some(vec![HeuristicConfig::FirstFit]),
            Command::BestFit {
                fitness_func_id, ..
            } => Some(vec![HeuristicConfig::BestFit { fitness_func_id }]),
            Command::BinElimination {
                fitness_func_id,
                max_iter,
                ..
            } => Some(vec![HeuristicConfig::BinElimination {
                fitness_func_id,
                max_iter,
            }]),
            Command::RandomFit { seed, .. } => Some(vec![HeuristicConfig::RandomFit { seed }]),
        }
    }

    pub fn target(&self) -> Option<&Target> {
        match self {
            Command::All(target) | Command::FirstFit(target) => Some(target),
            Command::BestFit { target, .. }
            | Command::BinElimination { target, .. }
            | Command::RandomFit { target, .. } => Some(target),
            Command::Solve(_) | Command::Generate(_) => None,
        }
    }
}
