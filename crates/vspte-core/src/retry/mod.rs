//! Retry and backoff policy for host calls.
//!
//! This module encapsulates failure classification (host busy, object not yet
//! usable, fatal) and jittered exponential backoff so that the extractor and
//! any other caller of the host share one consistent policy.

mod backoff;
mod classify;
mod error;
mod policy;
mod run;

pub use backoff::Backoff;
pub use classify::{classify, CallPhase, Classify, FailureClass};
pub use error::{HostError, PolicyError, RetryError};
pub use policy::{
    attempts_for_budget, RetryPolicy, DEFAULT_JITTER, DEFAULT_MAX_DELAY, MIN_BASE_INTERVAL,
};
pub use run::{AttemptOutcome, Pause, Retrier, ThreadPause};
