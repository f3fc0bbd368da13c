use std::time::Duration;

use super::error::PolicyError;

/// Multiplicative jitter applied to every non-zero backoff delay.
pub const DEFAULT_JITTER: (f64, f64) = (0.8, 1.2);

/// Upper bound on a single backoff delay before jitter.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

/// Smallest base interval accepted from configuration; tinier values are raised to this.
pub const MIN_BASE_INTERVAL: Duration = Duration::from_millis(50);

/// Exponential backoff policy with a cap and jitter.
///
/// Immutable once built: all validation happens in the constructors, so a
/// policy that exists is always usable by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_interval: Duration,
    max_delay: Duration,
    jitter: (f64, f64),
}

impl RetryPolicy {
    /// Policy with `max_attempts` (including the first) and the default cap and jitter.
    pub fn new(max_attempts: u32, base_interval: Duration) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::MaxAttempts(max_attempts));
        }
        if base_interval.is_zero() {
            return Err(PolicyError::NonPositiveBase);
        }
        Ok(Self {
            max_attempts,
            base_interval,
            max_delay: DEFAULT_MAX_DELAY,
            jitter: DEFAULT_JITTER,
        })
    }

    /// Derive the attempt count from an approximate total retry budget.
    ///
    /// `attempts = ceil(log2(total / base + 1) + 1)`, never below `min_attempts`.
    pub fn from_budget(
        base_interval: Duration,
        approx_total: Duration,
        min_attempts: u32,
    ) -> Result<Self, PolicyError> {
        let attempts = attempts_for_budget(base_interval, approx_total, min_attempts)?;
        Self::new(attempts, base_interval)
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_jitter(mut self, lo: f64, hi: f64) -> Result<Self, PolicyError> {
        if !lo.is_finite() || !hi.is_finite() || lo < 0.0 || lo > hi {
            return Err(PolicyError::JitterRange { lo, hi });
        }
        self.jitter = (lo, hi);
        Ok(self)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_interval(&self) -> Duration {
        self.base_interval
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn jitter(&self) -> (f64, f64) {
        self.jitter
    }

    /// Delay before `attempt` (1-based) without jitter.
    ///
    /// Attempt 1 runs immediately; attempt n >= 2 waits `base * 2^(n-2)`, capped.
    pub fn nominal_delay(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let factor = 1u32 << (attempt - 2).min(30);
        self.base_interval
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Number of attempts that roughly fills `approx_total` with doubling delays from `base_interval`.
pub fn attempts_for_budget(
    base_interval: Duration,
    approx_total: Duration,
    min_attempts: u32,
) -> Result<u32, PolicyError> {
    if base_interval.is_zero() {
        return Err(PolicyError::NonPositiveBase);
    }
    if approx_total.is_zero() {
        return Err(PolicyError::NonPositiveBudget);
    }
    let ratio = approx_total.as_secs_f64() / base_interval.as_secs_f64();
    let attempts = ((ratio + 1.0).log2() + 1.0).ceil();
    let attempts = if attempts >= u32::MAX as f64 {
        u32::MAX
    } else {
        attempts as u32
    };
    Ok(attempts.max(min_attempts))
}
