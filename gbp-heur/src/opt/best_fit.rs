use gbp::entities::{BPResult, Instance};
use gbp::util::assertions::result_is_feasible;
use log::debug;

use crate::error::{HeuristicError, ParameterError};
use crate::ident::Identifier;
use crate::opt::fitness::Fitness;
use crate::opt::{Heuristic, PackingState, check_cancelled};

/// Places every item in the open bin with the best fitness.
/// If no open bin has room, the empty bin with the best fitness is opened.
#[derive(Debug, Clone)]
pub struct BestFit {
    fitness: Fitness,
    identifier: String,
}

impl BestFit {
    pub const NAME: &'static str = "BestFit";

    pub fn new(fitness_func_id: u8) -> Result<Self, ParameterError> {
        let fitness = Fitness::from_id(Self::NAME, fitness_func_id)?;
        let identifier = Identifier::new(Self::NAME)
            .param("FitnessFuncID", &fitness.id())
            .build();
        Ok(Self {
            fitness,
            identifier,
        })
    }

    pub fn fitness(&self) -> Fitness {
        self.fitness
    }
}

impl Heuristic for BestFit {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn optimize(
        &self,
        instance: &Instance,
        cancelled: &dyn Fn() -> bool,
    ) -> Result<BPResult, HeuristicError> {
        let state = best_fit(instance, self.fitness, cancelled)?;
        let result = state.into_result();
        debug_assert!(result_is_feasible(instance, &result));
        Ok(result)
    }
}

/// Constructs a complete packing with the best fit rule
pub(crate) fn best_fit<'a>(
    instance: &'a Instance,
    fitness: Fitness,
    cancelled: &dyn Fn() -> bool,
) -> Result<PackingState<'a>, HeuristicError> {
    let mut state = PackingState::new(instance);
    for item in 0..instance.n_items() {
        check_cancelled(cancelled)?;
        let bin = fitness
            .best_bin(&state, item, state.open_bins())
            .or_else(|| fitness.best_bin(&state, item, state.closed_bins()))
            .ok_or(HeuristicError::NoFeasibleBin { item })?;
        debug!("[BF] item {item} -> bin {bin}");
        state.place(item, bin);
    }
    Ok(state)
}
