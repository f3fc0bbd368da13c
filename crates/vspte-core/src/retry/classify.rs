//! Classify host failures into retry classes.

use super::error::HostError;

/// Retry class of a failed host interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// Host busy or call rejected; retry without surfacing anything.
    Transient,
    /// The returned object has not settled yet; retry.
    NotYetUsable,
    /// Generic host failure while adding a project: the add may have half
    /// succeeded, so the caller should inspect the host's collection first.
    Fallback,
    /// Anything else; stop immediately.
    Fatal,
}

impl FailureClass {
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureClass::Transient | FailureClass::NotYetUsable)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureClass::Transient => "transient",
            FailureClass::NotYetUsable => "not-yet-usable",
            FailureClass::Fallback => "fallback",
            FailureClass::Fatal => "fatal",
        }
    }
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which host interaction produced the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    /// Adding the project file to the anchor solution.
    Add,
    /// A whole attempt as seen by the retry loop.
    Attempt,
}

/// Classify a host error. Total and deterministic: same input, same class.
pub fn classify(err: &HostError, phase: CallPhase) -> FailureClass {
    match err {
        HostError::Call(hr) if hr.is_busy() => FailureClass::Transient,
        HostError::NotYetUsable { .. } => FailureClass::NotYetUsable,
        HostError::Call(hr) if hr.is_generic_failure() && phase == CallPhase::Add => {
            FailureClass::Fallback
        }
        _ => FailureClass::Fatal,
    }
}

/// Errors the retry loop knows how to classify.
pub trait Classify {
    fn classify(&self) -> FailureClass;
}

impl Classify for HostError {
    fn classify(&self) -> FailureClass {
        classify(self, CallPhase::Attempt)
    }
}
