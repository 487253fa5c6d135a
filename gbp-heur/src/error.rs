/// Errors reported by a heuristic while optimizing an instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeuristicError {
    /// No bin, open or closed, has room left for the item.
    #[error("no feasible bin for item {item}")]
    NoFeasibleBin {
        /// Index of the item that could not be placed
        item: usize,
    },
    /// The cancellation check fired between two iterations.
    #[error("optimization cancelled")]
    Cancelled,
}

/// A heuristic parameter outside of its supported range, rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{heuristic}: parameter {parameter} = {value} is out of range ({expected})")]
pub struct ParameterError {
    pub heuristic: &'static str,
    pub parameter: &'static str,
    pub value: String,
    pub expected: &'static str,
}
