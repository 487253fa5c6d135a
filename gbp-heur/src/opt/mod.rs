use std::fmt::Debug;

use gbp::entities::{BPResult, Instance};

use crate::error::HeuristicError;

pub mod best_fit;
pub mod bin_elimination;
pub mod first_fit;
pub mod fitness;
pub mod random_fit;
mod state;

pub use state::PackingState;

/// An approximate optimizer for the generalized bin packing problem.
///
/// Implementations are immutable once constructed: all parameters are validated in
/// the constructor, which also synthesizes the identifier (see [`crate::ident`]).
pub trait Heuristic: Send + Sync + Debug {
    /// Class-like name of the heuristic, the leading part of its identifier
    fn name(&self) -> &'static str;

    /// Stable identifier, sensitive to every tunable parameter
    fn identifier(&self) -> &str;

    /// Whether objectives of this heuristic may be replayed from a cache.
    /// Only deterministic heuristics are eligible.
    fn cache_eligible(&self) -> bool {
        true
    }

    /// Solves the instance.
    /// `cancelled` is polled between outer iterations, a running iteration is never interrupted.
    fn optimize(
        &self,
        instance: &Instance,
        cancelled: &dyn Fn() -> bool,
    ) -> Result<BPResult, HeuristicError>;
}

/// Checks the cancellation closure, returning early with [`HeuristicError::Cancelled`]
pub(crate) fn check_cancelled(cancelled: &dyn Fn() -> bool) -> Result<(), HeuristicError> {
    match cancelled() {
        true => Err(HeuristicError::Cancelled),
        false => Ok(()),
    }
}

/// A cancellation check which never fires
pub fn never_cancelled() -> bool {
    false
}
