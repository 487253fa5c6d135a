use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::error::ParameterError;
use crate::opt::PackingState;

/// Scores a candidate bin for an item, lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fitness {
    /// Capacity left in the bin after placing the item
    Residual,
    /// Capacity left after placing the item, relative to the bin's capacity
    RelativeResidual,
    /// Size of the item relative to the bin's capacity
    RelativeSize,
}

impl Fitness {
    pub const VALID_IDS: &'static str = "0, 1 or 2";

    pub fn from_id(heuristic: &'static str, id: u8) -> Result<Self, ParameterError> {
        match id {
            0 => Ok(Fitness::Residual),
            1 => Ok(Fitness::RelativeResidual),
            2 => Ok(Fitness::RelativeSize),
            _ => Err(ParameterError {
                heuristic,
                parameter: "FitnessFuncID",
                value: id.to_string(),
                expected: Self::VALID_IDS,
            }),
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            Fitness::Residual => 0,
            Fitness::RelativeResidual => 1,
            Fitness::RelativeSize => 2,
        }
    }

    /// Fitness of placing `item` in `bin`, the item is assumed to fit.
    pub fn eval(&self, state: &PackingState<'_>, item: usize, bin: usize) -> NotNan<f64> {
        let instance = state.instance();
        let size = instance.size(item, bin) as f64;
        let capacity = instance.capacity(bin) as f64;
        let residual_after = state.residual(bin) as f64 - size;
        let value = match self {
            Fitness::Residual => residual_after,
            Fitness::RelativeResidual => residual_after / capacity,
            Fitness::RelativeSize => size / capacity,
        };
        NotNan::new(value).expect("fitness is NaN")
    }

    /// Best bin among `candidates` which can still hold `item`, ties broken by lowest index.
    pub fn best_bin(
        &self,
        state: &PackingState<'_>,
        item: usize,
        candidates: impl Iterator<Item = usize>,
    ) -> Option<usize> {
        candidates
            .filter(|&j| state.fits(item, j))
            .min_by_key(|&j| (self.eval(state, item, j), j))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbp::entities::Instance;
    use test_case::test_case;

    #[test_case(0, Fitness::Residual)]
    #[test_case(1, Fitness::RelativeResidual)]
    #[test_case(2, Fitness::RelativeSize)]
    fn ids_round_trip(id: u8, fitness: Fitness) {
        assert_eq!(Fitness::from_id("BestFit", id).unwrap(), fitness);
        assert_eq!(fitness.id(), id);
    }

    #[test]
    fn unknown_id_is_rejected() {
        let err = Fitness::from_id("BestFit", 3).unwrap_err();
        assert_eq!(err.parameter, "FitnessFuncID");
    }

    // bin 0: residual 40 (0.4 relative), relative size 0.6
    // bin 1: residual 1 (0.1 relative), relative size 0.9
    #[test_case(Fitness::Residual, 1; "tightest absolute fit")]
    #[test_case(Fitness::RelativeResidual, 1; "tightest relative fit")]
    #[test_case(Fitness::RelativeSize, 0; "smallest relative size")]
    fn picks_best_bin(fitness: Fitness, expected: usize) {
        let instance = Instance::new(vec![100, 10], vec![vec![60, 9]]).unwrap();
        let state = PackingState::new(&instance);
        assert_eq!(fitness.best_bin(&state, 0, 0..2), Some(expected));
    }
}
