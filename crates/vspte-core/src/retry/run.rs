//! Retry loop: run an operation until success, a fatal error, or the attempt budget runs out.

use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;

use crate::control::AbortToken;

use super::backoff::Backoff;
use super::classify::{Classify, FailureClass};
use super::error::RetryError;
use super::policy::RetryPolicy;

/// Waits between attempts.
pub trait Pause {
    fn pause(&mut self, delay: Duration);
}

/// Blocks the current thread for the delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPause;

impl Pause for ThreadPause {
    fn pause(&mut self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// What a single attempt produced, after classification.
#[derive(Debug)]
pub enum AttemptOutcome<T, E> {
    Success(T),
    TransientFailure(E),
    FatalFailure(E),
}

impl<T, E: Classify> AttemptOutcome<T, E> {
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => AttemptOutcome::Success(v),
            Err(e) if e.classify().is_retryable() => AttemptOutcome::TransientFailure(e),
            Err(e) => AttemptOutcome::FatalFailure(e),
        }
    }
}

/// Drives an operation through the attempts allowed by a [`RetryPolicy`].
pub struct Retrier<R = StdRng, P = ThreadPause> {
    backoff: Backoff<R>,
    pause: P,
    abort: Option<AbortToken>,
    label: String,
}

impl Retrier<StdRng, ThreadPause> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            backoff: Backoff::new(policy),
            pause: ThreadPause,
            abort: None,
            label: "operation".to_string(),
        }
    }
}

impl<R: Rng, P: Pause> Retrier<R, P> {
    /// Replace the jitter source, e.g. with a seeded RNG.
    pub fn with_rng<R2: Rng>(self, rng: R2) -> Retrier<R2, P> {
        Retrier {
            backoff: Backoff::with_rng(*self.backoff.policy(), rng),
            pause: self.pause,
            abort: self.abort,
            label: self.label,
        }
    }

    pub fn with_pause<P2: Pause>(self, pause: P2) -> Retrier<R, P2> {
        Retrier {
            backoff: self.backoff,
            pause,
            abort: self.abort,
            label: self.label,
        }
    }

    pub fn with_abort(mut self, abort: AbortToken) -> Self {
        self.abort = Some(abort);
        self
    }

    /// Name used in log lines (e.g. the project path).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        self.backoff.policy()
    }

    pub fn pause_ref(&self) -> &P {
        &self.pause
    }

    fn aborted(&self) -> bool {
        self.abort.as_ref().is_some_and(AbortToken::is_aborted)
    }

    /// Run `op` (called with the 1-based attempt number) until it succeeds.
    ///
    /// Never invokes `op` more than `max_attempts` times. A fatal failure stops
    /// the loop without another pause. On exhaustion every cause is returned.
    pub fn run<T, E, F>(&mut self, mut op: F) -> Result<T, RetryError<E>>
    where
        E: Classify + fmt::Display,
        F: FnMut(u32) -> Result<T, E>,
    {
        let max = self.policy().max_attempts();
        let mut causes: Vec<E> = Vec::new();

        for attempt in 1..=max {
            if attempt > 1 {
                if self.aborted() {
                    return Err(RetryError::Cancelled {
                        attempts: attempt - 1,
                        causes,
                    });
                }
                let delay = self.backoff.next_delay(attempt);
                tracing::debug!(
                    op = %self.label,
                    attempt,
                    max,
                    delay_ms = delay.as_millis() as u64,
                    "waiting before next attempt"
                );
                self.pause.pause(delay);
                if self.aborted() {
                    return Err(RetryError::Cancelled {
                        attempts: attempt - 1,
                        causes,
                    });
                }
            }

            match AttemptOutcome::from_result(op(attempt)) {
                AttemptOutcome::Success(v) => {
                    if let Some(last) = causes.last() {
                        tracing::info!(
                            op = %self.label,
                            last_class = %last.classify(),
                            "recovered after {} attempts (last failure: {})",
                            attempt,
                            last
                        );
                    }
                    return Ok(v);
                }
                AttemptOutcome::TransientFailure(e) => {
                    match e.classify() {
                        FailureClass::Transient => tracing::debug!(
                            op = %self.label,
                            attempt,
                            max,
                            "host busy: {}",
                            e
                        ),
                        class => tracing::warn!(
                            op = %self.label,
                            attempt,
                            max,
                            class = %class,
                            "attempt {}/{} failed: {}",
                            attempt,
                            max,
                            e
                        ),
                    }
                    causes.push(e);
                }
                AttemptOutcome::FatalFailure(e) => {
                    tracing::debug!(
                        op = %self.label,
                        attempt,
                        class = %e.classify(),
                        "non-retryable failure, giving up: {}",
                        e
                    );
                    causes.push(e);
                    return Err(RetryError::Fatal { attempt, causes });
                }
            }
        }

        Err(RetryError::Exhausted {
            attempts: max,
            causes,
        })
    }
}
