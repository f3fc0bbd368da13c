//! One project load attempt and the retry wrapper around it.

use std::path::Path;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::host::{HostTransport, ProjectProperty};
use crate::readiness;
use crate::retry::{
    classify, CallPhase, Classify, FailureClass, HostError, Pause, Retrier, RetryPolicy,
    ThreadPause,
};

use super::{ExtractedProjectData, ProjectExtractor, UNKNOWN_TYPE_GUID};

/// Services pending host messages before sleeping, so the host can call back
/// into this thread while we wait.
struct PumpThenSleep<'a, T> {
    host: &'a T,
}

impl<T: HostTransport> Pause for PumpThenSleep<'_, T> {
    fn pause(&mut self, delay: Duration) {
        self.host.pump_messages();
        ThreadPause.pause(delay);
    }
}

impl<T: HostTransport> ProjectExtractor<T> {
    /// Load `path` and read its metadata, retrying per `policy`.
    ///
    /// Never fails: when every attempt fails (or one fails fatally) the cause is
    /// logged as a warning and the sentinel result is returned.
    pub fn load_and_extract(&mut self, path: &Path, policy: &RetryPolicy) -> ExtractedProjectData {
        let host = &self.host;
        let mut retrier = Retrier::new(*policy)
            .with_pause(PumpThenSleep { host })
            .with_label(path.display().to_string());
        if let Some(seed) = self.seed {
            retrier = retrier.with_rng(StdRng::seed_from_u64(seed));
        }
        if let Some(abort) = &self.abort {
            retrier = retrier.with_abort(abort.clone());
        }

        match retrier.run(|_| load_attempt(host, path)) {
            Ok(data) => data,
            Err(err) => {
                match err.last_cause() {
                    Some(cause) => tracing::warn!(
                        path = %path.display(),
                        attempts = err.attempts(),
                        class = %cause.classify(),
                        "giving up on project: {} (last failure: {})",
                        err,
                        cause
                    ),
                    None => tracing::warn!(path = %path.display(), "giving up on project: {}", err),
                }
                ExtractedProjectData::default()
            }
        }
    }
}

/// Add the project, check it is usable, and read what we can from it.
fn load_attempt<T: HostTransport>(host: &T, path: &Path) -> Result<ExtractedProjectData, HostError> {
    let project = match host.add_from_file(path) {
        Ok(project) => Some(project),
        Err(e) if classify(&e, CallPhase::Add) == FailureClass::Fallback => {
            tracing::warn!(
                path = %path.display(),
                "{} while adding project, looking for it in the solution",
                e
            );
            fallback_project(host)
        }
        Err(e) => return Err(e),
    };

    let project = project
        .ok_or_else(|| HostError::not_yet_usable(path, "no project object after add fallback"))?;

    if !readiness::validate(host, &project, path) {
        return Err(HostError::not_yet_usable(path, "Kind missing"));
    }

    let mut data = ExtractedProjectData {
        type_guid: read_type_guid(host, &project),
        ..ExtractedProjectData::default()
    };
    collect_config_platforms(host, &project, path, &mut data);
    Ok(data)
}

/// The add may have gone through even though it reported failure: take the
/// last project in the solution, if any.
///
/// If the solution already held other projects this may pick the wrong one.
fn fallback_project<T: HostTransport>(host: &T) -> Option<T::Project> {
    match host.projects() {
        Ok(mut projects) => {
            let last = projects.pop();
            if last.is_none() {
                tracing::debug!("fallback lookup found an empty solution");
            }
            last
        }
        Err(e) => {
            tracing::debug!("fallback project lookup failed: {}", e);
            None
        }
    }
}

fn read_type_guid<T: HostTransport>(host: &T, project: &T::Project) -> String {
    match host.read_property(project, ProjectProperty::Kind) {
        Ok(Some(kind)) if !kind.is_empty() => kind,
        _ => UNKNOWN_TYPE_GUID.to_string(),
    }
}

/// Append every readable (configuration, platform) pair. Row and entry
/// failures are logged and skipped.
fn collect_config_platforms<T: HostTransport>(
    host: &T,
    project: &T::Project,
    path: &Path,
    data: &mut ExtractedProjectData,
) {
    let rows = match host.configuration_rows(project) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::debug!(
                path = %path.display(),
                "configuration manager access failed (non-fatal): {}",
                e
            );
            return;
        }
    };
    if rows.is_empty() {
        tracing::debug!(path = %path.display(), "project has no configuration rows (non-fatal)");
    }

    for row in &rows {
        let entries = match host.configuration_entries(project, row) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(path = %path.display(), row = %row, "configuration row access failed: {}", e);
                continue;
            }
        };
        for entry in entries {
            match entry {
                Ok(pair) => data.push(pair),
                Err(e) => tracing::debug!(
                    path = %path.display(),
                    row = %row,
                    "configuration entry unreadable, skipped: {}",
                    e
                ),
            }
        }
    }
}
