use gbp::entities::{BPResult, Instance};
use gbp::util::assertions::result_is_feasible;
use log::debug;

use crate::error::{HeuristicError, ParameterError};
use crate::ident::Identifier;
use crate::opt::best_fit::best_fit;
use crate::opt::fitness::Fitness;
use crate::opt::{Heuristic, PackingState, check_cancelled};

/// Improves a best fit packing by emptying bins.
///
/// Every round picks the open bin holding the fewest items (lowest load on ties) that
/// was not tried yet, and moves all of its items to the other open bins using the
/// best fit rule. If every item finds a new bin, the bin is closed.
#[derive(Debug, Clone)]
pub struct BinElimination {
    fitness: Fitness,
    max_iter: u32,
    identifier: String,
}

impl BinElimination {
    pub const NAME: &'static str = "BinElimination";

    pub fn new(fitness_func_id: u8, max_iter: u32) -> Result<Self, ParameterError> {
        let fitness = Fitness::from_id(Self::NAME, fitness_func_id)?;
        if max_iter == 0 {
            return Err(ParameterError {
                heuristic: Self::NAME,
                parameter: "MaxIter",
                value: max_iter.to_string(),
                expected: ">= 1",
            });
        }
        let identifier = Identifier::new(Self::NAME)
            .param("FitnessFuncID", &fitness.id())
            .param("MaxIter", &max_iter)
            .build();
        Ok(Self {
            fitness,
            max_iter,
            identifier,
        })
    }
}

impl Heuristic for BinElimination {
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
        let mut state = best_fit(instance, self.fitness, cancelled)?;
        let initial_bins = state.n_open_bins();
        let mut tried = vec![false; instance.n_bins()];

        for iter in 0..self.max_iter {
            check_cancelled(cancelled)?;
            let target = state
                .open_bins()
                .filter(|&j| !tried[j])
                .min_by_key(|&j| (state.n_items_in(j), state.load(j), j));
            let Some(target) = target else {
                break;
            };
            tried[target] = true;

            if let Some(emptied) = self.empty_bin(&state, target) {
                debug!("[BE] iteration {iter}: emptied bin {target}");
                state = emptied;
                //other bins may have become eligible again
                tried.iter_mut().for_each(|t| *t = false);
            }
        }

        debug!(
            "[BE] {} bins after elimination (started with {initial_bins})",
            state.n_open_bins()
        );
        let result = state.into_result();
        debug_assert!(result_is_feasible(instance, &result));
        Ok(result)
    }
}

impl BinElimination {
    /// Tries to move every item of `target` into the other open bins.
    fn empty_bin<'a>(&self, state: &PackingState<'a>, target: usize) -> Option<PackingState<'a>> {
        let mut trial = state.clone();
        let items = trial.items_in(target);
        items.iter().for_each(|&item| trial.remove(item));
        for item in items {
            let candidates = trial.open_bins().filter(|&j| j != target);
            let bin = self.fitness.best_bin(&trial, item, candidates)?;
            trial.place(item, bin);
        }
        Some(trial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opt::never_cancelled;

    #[test]
    fn rejects_zero_iterations() {
        assert!(BinElimination::new(0, 0).is_err());
    }

    #[test]
    fn never_worse_than_best_fit() {
        // best fit (residual) sends item 0 to bin 1 (tight), then item 1 opens bin 0,
        // after which item 0 can move over to bin 0 and bin 1 closes
        let instance = Instance::new(vec![10, 4], vec![vec![4, 4], vec![5, 5]]).unwrap();
        let bf = crate::opt::best_fit::BestFit::new(0).unwrap();
        let be = BinElimination::new(0, 10).unwrap();
        let bf_res = bf.optimize(&instance, &never_cancelled).unwrap();
        let be_res = be.optimize(&instance, &never_cancelled).unwrap();
        assert_eq!(bf_res.bins_used, 2);
        assert_eq!(be_res.bins_used, 1);
        assert!(result_is_feasible(&instance, &be_res));
    }
}
