use gbp::entities::{BPResult, Instance};
use gbp::util::assertions::result_is_feasible;
use log::debug;

use crate::error::HeuristicError;
use crate::ident::Identifier;
use crate::opt::{Heuristic, PackingState, check_cancelled};

/// Places every item in the first open bin with room left,
/// opening the lowest-index empty bin that can hold it otherwise.
#[derive(Debug, Clone)]
pub struct FirstFit {
    identifier: String,
}

impl FirstFit {
    pub const NAME: &'static str = "FirstFit";

    pub fn new() -> Self {
        Self {
            identifier: Identifier::new(Self::NAME).build(),
        }
    }
}

impl Default for FirstFit {
    fn default() -> Self {
        Self::new()
    }
}

impl Heuristic for FirstFit {
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
        first_fit(instance, 0..instance.n_items(), cancelled)
    }
}

/// First fit over an arbitrary item order.
pub fn first_fit(
    instance: &Instance,
    order: impl Iterator<Item = usize>,
    cancelled: &dyn Fn() -> bool,
) -> Result<BPResult, HeuristicError> {
    let mut state = PackingState::new(instance);
    for item in order {
        check_cancelled(cancelled)?;
        let bin = state
            .open_bins()
            .find(|&j| state.fits(item, j))
            .or_else(|| state.closed_bins().find(|&j| state.fits(item, j)))
            .ok_or(HeuristicError::NoFeasibleBin { item })?;
        debug!("[FF] item {item} -> bin {bin}");
        state.place(item, bin);
    }
    let result = state.into_result();
    debug_assert!(result_is_feasible(instance, &result));
    Ok(result)
}
