use std::ops::RangeInclusive;

use anyhow::{Result, ensure};
use log::debug;
use rand::prelude::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::entities::Instance;

/// Configuration of the random instance generator
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InstanceGenerator {
    /// Number of bins (`N`)
    pub n_bins: usize,
    /// Number of items (`V`)
    pub n_items: usize,
    /// Inclusive range from which bin capacities are drawn
    pub capacity_range: RangeInclusive<u64>,
    /// Inclusive range from which item sizes are drawn
    pub size_range: RangeInclusive<u64>,
}

impl Default for InstanceGenerator {
    fn default() -> Self {
        Self {
            n_bins: 10,
            n_items: 20,
            capacity_range: 10..=20,
            size_range: 1..=10,
        }
    }
}

impl InstanceGenerator {
    /// Generates an instance deterministically from `seed`.
    /// Every item fits in at least one empty bin.
    pub fn generate(&self, seed: u64) -> Result<Instance> {
        ensure!(
            *self.capacity_range.start() > 0 && *self.size_range.start() > 0,
            "capacity and size ranges should only contain positive values"
        );
        ensure!(
            !self.capacity_range.is_empty() && !self.size_range.is_empty(),
            "capacity and size ranges should not be empty"
        );
        ensure!(
            self.n_items == 0 || self.n_bins > 0,
            "cannot place {} items without bins",
            self.n_items
        );

        let mut rng = SmallRng::seed_from_u64(seed);
        let capacities = (0..self.n_bins)
            .map(|_| rng.random_range(self.capacity_range.clone()))
            .collect::<Vec<_>>();

        let sizes = (0..self.n_items)
            .map(|item| {
                let mut row = (0..self.n_bins)
                    .map(|_| rng.random_range(self.size_range.clone()))
                    .collect::<Vec<_>>();
                if row.iter().zip(&capacities).all(|(s, c)| s > c) {
                    //shrink the item in one random bin so it fits somewhere
                    let bin = rng.random_range(0..self.n_bins);
                    row[bin] = rng.random_range(1..=capacities[bin]);
                    debug!("[GEN] item {item} did not fit anywhere, resized in bin {bin}");
                }
                row
            })
            .collect::<Vec<_>>();

        Instance::new(capacities, sizes)
    }
}
