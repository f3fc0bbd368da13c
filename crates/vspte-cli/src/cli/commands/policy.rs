//! `vspte policy` – show the retry policy derived from config.

use anyhow::Result;
use std::fmt::Write;
use std::time::Duration;
use vspte_core::config::VspteConfig;
use vspte_core::retry::RetryPolicy;

pub fn run_policy(cfg: &VspteConfig) -> Result<()> {
    let policy = cfg.retry.to_policy()?;
    print!("{}", describe_policy(&policy));
    Ok(())
}

fn ms(d: Duration) -> u128 {
    d.as_millis()
}

fn scaled_ms(d: Duration, factor: f64) -> u128 {
    (d.as_millis() as f64 * factor).round() as u128
}

/// One header line plus the nominal wait (and jitter bounds) before each attempt.
pub(crate) fn describe_policy(policy: &RetryPolicy) -> String {
    let (lo, hi) = policy.jitter();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "attempts: {}  base: {}ms  cap: {}ms  jitter: {:.2}-{:.2}",
        policy.max_attempts(),
        ms(policy.base_interval()),
        ms(policy.max_delay()),
        lo,
        hi
    );
    let mut total = Duration::ZERO;
    for attempt in 1..=policy.max_attempts() {
        let d = policy.nominal_delay(attempt);
        total += d;
        if d.is_zero() {
            let _ = writeln!(out, "attempt {:>2}: immediate", attempt);
        } else {
            let _ = writeln!(
                out,
                "attempt {:>2}: wait {}ms ({}-{}ms)",
                attempt,
                ms(d),
                scaled_ms(d, lo),
                scaled_ms(d, hi)
            );
        }
    }
    let _ = writeln!(out, "nominal total wait: {}ms", ms(total));
    out
}
