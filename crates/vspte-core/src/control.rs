//! Cancellation for in-flight extractions.
//!
//! A caller that wants to stop a long retry sequence (e.g. on Ctrl-C) keeps a
//! clone of the token and calls [`AbortToken::request_abort`]; the retry loop
//! checks it around every pause and stops with `RetryError::Cancelled`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared abort flag. Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct AbortToken(Arc<AtomicBool>);

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
