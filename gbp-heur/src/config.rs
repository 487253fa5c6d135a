use serde::{Deserialize, Serialize};

use crate::error::ParameterError;
use crate::opt::Heuristic;
use crate::opt::best_fit::BestFit;
use crate::opt::bin_elimination::BinElimination;
use crate::opt::first_fit::FirstFit;
use crate::opt::random_fit::RandomFit;

/// Serializable description of a heuristic and its parameters
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum HeuristicConfig {
    FirstFit,
    BestFit {
        fitness_func_id: u8,
    },
    BinElimination {
        fitness_func_id: u8,
        #[serde(default = "default_max_iter")]
        max_iter: u32,
    },
    RandomFit {
        #[serde(default)]
        seed: Option<u64>,
    },
}

fn default_max_iter() -> u32 {
    100
}

impl HeuristicConfig {
    /// Validates the parameters and constructs the heuristic
    pub fn build(&self) -> Result<Box<dyn Heuristic>, ParameterError> {
        let heuristic: Box<dyn Heuristic> = match *self {
            HeuristicConfig::FirstFit => Box::new(FirstFit::new()),
            HeuristicConfig::BestFit { fitness_func_id } => Box::new(BestFit::new(fitness_func_id)?),
            HeuristicConfig::BinElimination {
                fitness_func_id,
                max_iter,
            } => Box::new(BinElimination::new(fitness_func_id, max_iter)?),
            HeuristicConfig::RandomFit { seed } => Box::new(RandomFit::new(seed)),
        };
        Ok(heuristic)
    }

    /// The set evaluated by the `all` command: every heuristic with every fitness function
    pub fn all() -> Vec<HeuristicConfig> {
        let mut configs = vec![HeuristicConfig::FirstFit];
        for fitness_func_id in 0..=2 {
            configs.push(HeuristicConfig::BestFit { fitness_func_id });
        }
        for fitness_func_id in 0..=2 {
            configs.push(HeuristicConfig::BinElimination {
                fitness_func_id,
                max_iter: default_max_iter(),
            });
        }
        configs.push(HeuristicConfig::RandomFit { seed: Some(0) });
        configs
    }
}
