//! Readiness gate: is a freshly returned project object usable yet?
//!
//! The host may return a project reference before its properties have
//! settled. Only the type GUID (`Kind`) decides readiness; the name and the
//! owning collection are read for diagnostics and may lag behind.

use std::path::Path;

use crate::host::{HostTransport, ProjectProperty};

/// All-zero GUID some hosts report while a project is still initialising.
pub const NULL_GUID: &str = "{00000000-0000-0000-0000-000000000000}";

/// Returns true if `project` exposes a usable type GUID.
///
/// Never fails: a failed property read counts as "not ready" and is logged at
/// debug level. Reads only, so repeated calls on an unchanged project agree.
pub fn validate<T: HostTransport>(host: &T, project: &T::Project, path: &Path) -> bool {
    let kind = match host.read_property(project, ProjectProperty::Kind) {
        Ok(kind) => kind,
        Err(e) => {
            tracing::debug!(path = %path.display(), "project Kind access failed: {}", e);
            return false;
        }
    };

    match kind.as_deref() {
        Some(k) if is_usable_kind(k) => {}
        other => {
            tracing::debug!(
                path = %path.display(),
                "project has invalid Kind='{}', waiting for it to settle",
                other.unwrap_or("null")
            );
            return false;
        }
    }

    match host.read_property(project, ProjectProperty::Collection) {
        Ok(Some(_)) => {}
        Ok(None) => tracing::debug!(path = %path.display(), "project Collection is null (non-blocking)"),
        Err(e) => tracing::debug!(
            path = %path.display(),
            "project Collection access failed (non-blocking): {}",
            e
        ),
    }

    match host.read_property(project, ProjectProperty::Name) {
        Ok(Some(name)) if !name.trim().is_empty() => {}
        Ok(_) => tracing::debug!(path = %path.display(), "project Name empty (non-blocking)"),
        Err(e) => tracing::debug!(
            path = %path.display(),
            "project Name access failed (non-blocking): {}",
            e
        ),
    }

    true
}

/// Non-empty and not an all-zero GUID.
pub fn is_usable_kind(kind: &str) -> bool {
    let kind = kind.trim();
    !kind.is_empty() && !is_null_guid(kind)
}

/// True for `{00000000-0000-0000-0000-000000000000}` with or without braces.
pub fn is_null_guid(s: &str) -> bool {
    let inner = s.trim().trim_start_matches('{').trim_end_matches('}');
    inner.contains('0') && inner.chars().all(|c| c == '0' || c == '-')
}
