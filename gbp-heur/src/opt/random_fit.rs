use gbp::entities::{BPResult, Instance};
use rand::SeedableRng;
use rand::prelude::SmallRng;
use rand::seq::SliceRandom;

use crate::error::HeuristicError;
use crate::ident::Identifier;
use crate::opt::Heuristic;
use crate::opt::first_fit::first_fit;

/// First fit over a randomly shuffled item order.
/// Without a seed the order differs on every run, so its results are never cached.
#[derive(Debug, Clone)]
pub struct RandomFit {
    seed: Option<u64>,
    identifier: String,
}

impl RandomFit {
    pub const NAME: &'static str = "RandomFit";

    pub fn new(seed: Option<u64>) -> Self {
        let identifier = Identifier::new(Self::NAME)
            .opt_param("Seed", seed.as_ref())
            .build();
        Self { seed, identifier }
    }
}

impl Heuristic for RandomFit {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn cache_eligible(&self) -> bool {
        self.seed.is_some()
    }

    fn optimize(
        &self,
        instance: &Instance,
        cancelled: &dyn Fn() -> bool,
    ) -> Result<BPResult, HeuristicError> {
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let mut order = (0..instance.n_items()).collect::<Vec<_>>();
        order.shuffle(&mut rng);
        first_fit(instance, order.into_iter(), cancelled)
    }
}
