use serde::{Deserialize, Serialize};

/// External representation of an [`Instance`](crate::entities::Instance)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ExtInstance {
    /// Capacity of every bin
    pub capacities: Vec<u64>,
    /// Size of every item in every bin, one row per item
    pub sizes: Vec<Vec<u64>>,
}

/// External representation of a [`BPResult`](crate::entities::BPResult)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ExtResult {
    pub bins_used: u64,
    pub bin_enabled: Vec<bool>,
    pub item_assignment: Vec<usize>,
}
