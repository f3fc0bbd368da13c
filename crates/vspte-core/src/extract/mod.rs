//! Project load and extraction.
//!
//! [`ProjectExtractor`] owns a host transport, creates the automation session
//! lazily, and runs each project load through the retry loop: add the project,
//! fall back to the solution's last project on a generic add failure, wait for
//! the readiness gate, then read the type GUID and configuration pairs
//! best-effort. Whatever happens, callers get an [`ExtractedProjectData`].

mod data;
mod load;
mod session;

use std::path::Path;
use std::time::Duration;

use crate::control::AbortToken;
use crate::host::{HostTransport, SessionSettings};
use crate::retry::{PolicyError, RetryPolicy, MIN_BASE_INTERVAL};

pub use data::{ConfigPlatform, ExtractedProjectData, GUID_MAX_LEN, UNKNOWN_TYPE_GUID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    NotStarted,
    Open,
    ShutDown,
}

/// Loads projects into one automation session and reads their metadata.
///
/// One load at a time: the extractor is meant to live on a `HostThread`.
pub struct ProjectExtractor<T: HostTransport> {
    host: T,
    settings: SessionSettings,
    policy: RetryPolicy,
    state: SessionState,
    abort: Option<AbortToken>,
    seed: Option<u64>,
}

impl<T: HostTransport> ProjectExtractor<T> {
    pub fn new(host: T, settings: SessionSettings, policy: RetryPolicy) -> Self {
        Self {
            host,
            settings,
            policy,
            state: SessionState::NotStarted,
            abort: None,
            seed: None,
        }
    }

    /// Stop retrying when `abort` is set.
    pub fn with_abort(mut self, abort: AbortToken) -> Self {
        self.abort = Some(abort);
        self
    }

    /// Seed the backoff jitter for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn host(&self) -> &T {
        &self.host
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn session_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Ensure the session exists, load `path` with the configured policy and
    /// return what could be read. Failures are logged; the result is then the
    /// sentinel value.
    pub fn extract(&mut self, path: &Path) -> ExtractedProjectData {
        if let Err(e) = self.ensure_session() {
            tracing::error!(
                path = %path.display(),
                major_version = self.settings.major_version,
                "cannot start automation host: {}",
                e
            );
            return ExtractedProjectData::default();
        }

        let policy = self.policy;
        let data = self.load_and_extract(path, &policy);
        tracing::debug!(
            "Loaded project '{}' -> TypeGuid={}, Configs={}",
            path.display(),
            data.type_guid,
            data.configs_platforms.len()
        );
        data
    }

    /// Like [`load_and_extract`](Self::load_and_extract) with a policy built
    /// from an attempt count and an initial delay. An invalid policy is
    /// rejected before any host call.
    pub fn load_and_extract_with(
        &mut self,
        path: &Path,
        max_attempts: u32,
        initial_delay: Duration,
    ) -> Result<ExtractedProjectData, PolicyError> {
        let policy = RetryPolicy::new(max_attempts, initial_delay.max(MIN_BASE_INTERVAL))?
            .with_max_delay(self.policy.max_delay());
        Ok(self.load_and_extract(path, &policy))
    }
}

impl<T: HostTransport> Drop for ProjectExtractor<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests;
