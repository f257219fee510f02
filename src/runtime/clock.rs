//! Task sleeps and random sources.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

use super::RealRuntime;

impl RealRuntime {
    pub(crate) async fn sleep_impl(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }

    pub(crate) fn rng_impl(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
