use itertools::Itertools;

use crate::Objective;

/// Result of a heuristic: which bins are in use and where every item went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BPResult {
    /// Number of bins in use, equal to the number of enabled bins
    pub bins_used: Objective,
    /// `bin_enabled[j]` is true if at least one item is assigned to bin `j`
    pub bin_enabled: Vec<bool>,
    /// `item_assignment[i]` is the bin item `i` is placed in
    pub item_assignment: Vec<usize>,
}

impl BPResult {
    /// Builds a result from an item assignment, deriving the enabled bins and their count.
    pub fn from_assignment(n_bins: usize, item_assignment: Vec<usize>) -> Self {
        let mut bin_enabled = vec![false; n_bins];
        for &bin in &item_assignment {
            assert!(bin < n_bins, "item assigned to non-existing bin {bin}");
            bin_enabled[bin] = true;
        }
        let bins_used = bin_enabled.iter().filter(|&&e| e).count() as Objective;
        let result = Self {
            bins_used,
            bin_enabled,
            item_assignment,
        };
        debug_assert!(result.is_consistent());
        result
    }

    /// `bins_used == popcount(bin_enabled) == |unique(item_assignment)|`
    pub fn is_consistent(&self) -> bool {
        let popcount = self.bin_enabled.iter().filter(|&&e| e).count() as Objective;
        let unique = self.item_assignment.iter().unique().count() as Objective;
        self.bins_used == popcount && popcount == unique
    }

    pub fn items_in_bin(&self, bin: usize) -> impl Iterator<Item = usize> + '_ {
        self.item_assignment
            .iter()
            .enumerate()
            .filter(move |(_, b)| **b == bin)
            .map(|(i, _)| i)
    }
}
