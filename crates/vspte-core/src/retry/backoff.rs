//! Jittered exponential backoff on top of [`RetryPolicy`].

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::policy::RetryPolicy;

/// Computes the wait before each attempt.
///
/// The random source is a type parameter so tests can pass a seeded RNG and
/// get reproducible delays.
#[derive(Debug, Clone)]
pub struct Backoff<R = StdRng> {
    policy: RetryPolicy,
    rng: R,
}

impl Backoff<StdRng> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_rng(policy, StdRng::from_os_rng())
    }

    pub fn seeded(policy: RetryPolicy, seed: u64) -> Self {
        Self::with_rng(policy, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Backoff<R> {
    pub fn with_rng(policy: RetryPolicy, rng: R) -> Self {
        Self { policy, rng }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Delay before `attempt` (1-based). Zero for the first attempt.
    pub fn next_delay(&mut self, attempt: u32) -> Duration {
        let nominal = self.policy.nominal_delay(attempt);
        if nominal.is_zero() {
            return nominal;
        }
        let (lo, hi) = self.policy.jitter();
        let factor = if lo < hi {
            self.rng.random_range(lo..=hi)
        } else {
            lo
        };
        // Saturate: a huge cap times the jitter bound may not fit in a Duration.
        Duration::try_from_secs_f64(nominal.as_secs_f64() * factor).unwrap_or(Duration::MAX)
    }
}
