//! Automation session lifecycle: lazy start, idempotent shutdown.

use crate::host::HostTransport;
use crate::retry::{HostError, Pause, ThreadPause};

use super::{ProjectExtractor, SessionState};

impl<T: HostTransport> ProjectExtractor<T> {
    /// Start the host session and anchor solution once. Later calls are no-ops.
    ///
    /// A failed start leaves the extractor unstarted so the next call tries again.
    pub fn ensure_session(&mut self) -> Result<(), HostError> {
        match self.state {
            SessionState::Open => return Ok(()),
            SessionState::ShutDown => {
                return Err(HostError::Session("extractor has been shut down".to_string()))
            }
            SessionState::NotStarted => {}
        }

        tracing::info!(
            prog_id = %self.settings.prog_id(),
            solution = %self.settings.solution_path().display(),
            "starting automation host"
        );
        self.host.register_message_filter()?;
        if let Err(e) = self.host.create_session(&self.settings) {
            self.host.revoke_message_filter();
            return Err(e);
        }
        self.state = SessionState::Open;

        // Freshly created solutions keep the host busy for a while.
        let settle = self.settings.settle_after_create;
        if !settle.is_zero() {
            tracing::debug!(settle_ms = settle.as_millis() as u64, "letting host settle");
            self.host.pump_messages();
            ThreadPause.pause(settle);
        }
        Ok(())
    }

    /// Close the anchor solution, quit the host and revoke the message filter.
    ///
    /// Safe to call repeatedly and when the host has already gone away.
    pub fn shutdown(&mut self) {
        let was_open = self.state == SessionState::Open;
        self.state = SessionState::ShutDown;
        if !was_open {
            return;
        }

        match self.host.close_session(self.settings.save_on_close) {
            Ok(()) => tracing::debug!(
                solution = %self.settings.solution_path().display(),
                "closed anchor solution"
            ),
            Err(e) => tracing::debug!("closing anchor solution failed: {}", e),
        }
        if let Err(e) = self.host.quit() {
            tracing::debug!("quitting host failed: {}", e);
        }
        self.host.revoke_message_filter();
    }
}
