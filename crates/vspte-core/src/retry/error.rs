//! Error types for host calls and the retry loop.

use std::fmt;
use std::path::PathBuf;

use crate::host::HResult;

/// Error raised by a single host interaction.
/// Kept separate from anyhow so we can classify and decide retries first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The host call returned a failure status code.
    #[error("host call failed with {0}")]
    Call(HResult),
    /// The host handed back no project, or one whose properties have not settled yet.
    #[error("project '{}' not yet usable: {reason}", .path.display())]
    NotYetUsable { path: PathBuf, reason: String },
    /// The automation session could not be created or is gone.
    #[error("host session: {0}")]
    Session(String),
    /// The host worker thread stopped before answering.
    #[error("host thread is no longer running")]
    Disconnected,
}

impl HostError {
    pub fn not_yet_usable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        HostError::NotYetUsable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Status code when the error came straight from a host call.
    pub fn hresult(&self) -> Option<HResult> {
        match self {
            HostError::Call(hr) => Some(*hr),
            _ => None,
        }
    }
}

impl From<HResult> for HostError {
    fn from(hr: HResult) -> Self {
        HostError::Call(hr)
    }
}

/// Invalid retry policy parameters. Raised at construction, never mid-retry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("max_attempts must be at least 1 (got {0})")]
    MaxAttempts(u32),
    #[error("base retry interval must be positive")]
    NonPositiveBase,
    #[error("estimated total retry duration must be positive")]
    NonPositiveBudget,
    #[error("invalid jitter range [{lo}, {hi}]")]
    JitterRange { lo: f64, hi: f64 },
    #[error("{field} = {secs} seconds is too large")]
    DurationTooLarge { field: &'static str, secs: f64 },
}

/// Terminal outcome of a retried operation that never succeeded.
///
/// Every variant carries the causes of all attempts made, oldest first.
#[derive(Debug)]
pub enum RetryError<E> {
    /// A non-retryable failure stopped the loop early.
    Fatal { attempt: u32, causes: Vec<E> },
    /// Every allowed attempt failed with a retryable error.
    Exhausted { attempts: u32, causes: Vec<E> },
    /// The abort token was set while waiting between attempts.
    Cancelled { attempts: u32, causes: Vec<E> },
}

impl<E> RetryError<E> {
    pub fn causes(&self) -> &[E] {
        match self {
            RetryError::Fatal { causes, .. }
            | RetryError::Exhausted { causes, .. }
            | RetryError::Cancelled { causes, .. } => causes,
        }
    }

    pub fn last_cause(&self) -> Option<&E> {
        self.causes().last()
    }

    /// Number of operation invocations made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Fatal { attempt, .. } => *attempt,
            RetryError::Exhausted { attempts, .. } | RetryError::Cancelled { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn into_causes(self) -> Vec<E> {
        match self {
            RetryError::Fatal { causes, .. }
            | RetryError::Exhausted { causes, .. }
            | RetryError::Cancelled { causes, .. } => causes,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Fatal { attempt, .. } => {
                write!(f, "non-retryable failure on attempt {}", attempt)?
            }
            RetryError::Exhausted { attempts, .. } => {
                write!(f, "gave up after {} attempts", attempts)?
            }
            RetryError::Cancelled { attempts, .. } => {
                write!(f, "cancelled after {} attempts", attempts)?
            }
        }
        if let Some(last) = self.last_cause() {
            write!(f, ": {}", last)?;
        }
        Ok(())
    }
}

impl<E> std::error::Error for RetryError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.last_cause().map(|e| e as &(dyn std::error::Error + 'static))
    }
}
