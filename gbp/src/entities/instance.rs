use anyhow::{Result, ensure};

use crate::util::assertions::instance_shape_correct;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Instance of the generalized bin packing problem.
/// `n` heterogeneous bins, `v` items whose size depends on the bin they are placed in.
pub struct Instance {
    /// Capacity of every bin, `capacities[j]` for bin `j`
    capacities: Vec<u64>,
    /// `sizes[i][j]` is the size item `i` occupies when placed in bin `j`
    sizes: Vec<Vec<u64>>,
}

impl Instance {
    pub fn new(capacities: Vec<u64>, sizes: Vec<Vec<u64>>) -> Result<Self> {
        ensure!(
            capacities.iter().all(|&c| c > 0),
            "all bin capacities should be positive: {capacities:?}"
        );
        for (i, row) in sizes.iter().enumerate() {
            ensure!(
                row.len() == capacities.len(),
                "item {i} has {} sizes, expected one per bin ({})",
                row.len(),
                capacities.len()
            );
            ensure!(
                row.iter().all(|&s| s > 0),
                "all sizes of item {i} should be positive: {row:?}"
            );
        }
        let instance = Self { capacities, sizes };
        debug_assert!(instance_shape_correct(&instance));

        Ok(instance)
    }

    pub fn n_bins(&self) -> usize {
        self.capacities.len()
    }

    pub fn n_items(&self) -> usize {
        self.sizes.len()
    }

    pub fn capacity(&self, bin: usize) -> u64 {
        self.capacities[bin]
    }

    pub fn size(&self, item: usize, bin: usize) -> u64 {
        self.sizes[item][bin]
    }

    pub fn capacities(&self) -> &[u64] {
        &self.capacities
    }

    pub fn sizes(&self) -> &[Vec<u64>] {
        &self.sizes
    }

    /// Bins in which `item` fits when they are still empty
    pub fn candidate_bins(&self, item: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_bins()).filter(move |&j| self.sizes[item][j] <= self.capacities[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ragged_sizes() {
        let res = Instance::new(vec![10, 10], vec![vec![1, 2], vec![3]]);
        assert!(res.is_err());
    }

    #[test]
    fn rejects_non_positive_values() {
        assert!(Instance::new(vec![0, 10], vec![vec![1, 2]]).is_err());
        assert!(Instance::new(vec![5, 10], vec![vec![1, 0]]).is_err());
    }

    #[test]
    fn accepts_instance_without_items() {
        let instance = Instance::new(vec![3, 4], vec![]).unwrap();
        assert_eq!(instance.n_bins(), 2);
        assert_eq!(instance.n_items(), 0);
    }

    #[test]
    fn candidate_bins_respect_capacity() {
        let instance = Instance::new(vec![14, 15, 8, 10], vec![vec![16, 3, 9, 1]]).unwrap();
        assert_eq!(instance.candidate_bins(0).collect::<Vec<_>>(), vec![1, 3]);
    }
}
