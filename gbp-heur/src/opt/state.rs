use gbp::entities::{BPResult, Instance};

/// Partial assignment of items to bins, tracking the load of every bin.
#[derive(Debug, Clone)]
pub struct PackingState<'a> {
    instance: &'a Instance,
    loads: Vec<u64>,
    n_items_in_bin: Vec<usize>,
    assignment: Vec<Option<usize>>,
}

impl<'a> PackingState<'a> {
    pub fn new(instance: &'a Instance) -> Self {
        Self {
            instance,
            loads: vec![0; instance.n_bins()],
            n_items_in_bin: vec![0; instance.n_bins()],
            assignment: vec![None; instance.n_items()],
        }
    }

    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    pub fn fits(&self, item: usize, bin: usize) -> bool {
        //an overflowing load never fits
        self.loads[bin]
            .checked_add(self.instance.size(item, bin))
            .is_some_and(|load| load <= self.instance.capacity(bin))
    }

    pub fn residual(&self, bin: usize) -> u64 {
        self.instance.capacity(bin) - self.loads[bin]
    }

    pub fn load(&self, bin: usize) -> u64 {
        self.loads[bin]
    }

    pub fn n_items_in(&self, bin: usize) -> usize {
        self.n_items_in_bin[bin]
    }

    pub fn is_open(&self, bin: usize) -> bool {
        self.n_items_in_bin[bin] > 0
    }

    /// Bins holding at least one item, in index order
    pub fn open_bins(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.instance.n_bins()).filter(move |&j| self.is_open(j))
    }

    /// Empty bins, in index order
    pub fn closed_bins(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.instance.n_bins()).filter(move |&j| !self.is_open(j))
    }

    pub fn items_in(&self, bin: usize) -> Vec<usize> {
        self.assignment
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == Some(bin))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn place(&mut self, item: usize, bin: usize) {
        assert!(self.assignment[item].is_none(), "item {item} is already placed");
        debug_assert!(self.fits(item, bin));
        self.loads[bin] += self.instance.size(item, bin);
        self.n_items_in_bin[bin] += 1;
        self.assignment[item] = Some(bin);
    }

    pub fn remove(&mut self, item: usize) {
        let bin = self.assignment[item]
            .take()
            .unwrap_or_else(|| panic!("item {item} is not placed"));
        self.loads[bin] -= self.instance.size(item, bin);
        self.n_items_in_bin[bin] -= 1;
    }

    pub fn n_open_bins(&self) -> usize {
        self.open_bins().count()
    }

    /// Converts a complete assignment into a result.
    pub fn into_result(self) -> BPResult {
        let assignment = self
            .assignment
            .iter()
            .enumerate()
            .map(|(i, b)| b.unwrap_or_else(|| panic!("item {i} was never placed")))
            .collect();
        BPResult::from_assignment(self.instance.n_bins(), assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_and_remove_track_loads() {
        let instance = Instance::new(vec![10, 5], vec![vec![4, 2], vec![5, 3]]).unwrap();
        let mut state = PackingState::new(&instance);
        state.place(0, 0);
        state.place(1, 0);
        assert_eq!(state.load(0), 9);
        assert_eq!(state.residual(1), 5);
        assert_eq!(state.open_bins().collect::<Vec<_>>(), vec![0]);
        state.remove(0);
        assert_eq!(state.load(0), 5);
        assert_eq!(state.items_in(0), vec![1]);
        assert_eq!(state.closed_bins().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn load_near_u64_max_does_not_fit() {
        let instance =
            Instance::new(vec![u64::MAX, u64::MAX], vec![vec![u64::MAX - 1, 1], vec![2, 1]]).unwrap();
        let mut state = PackingState::new(&instance);
        state.place(0, 0);
        assert!(!state.fits(1, 0));
        assert!(state.fits(1, 1));
        assert_eq!(state.residual(0), 1);
    }
}
