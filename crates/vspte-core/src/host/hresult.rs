//! 32-bit status codes returned by the automation host.

use std::fmt;

/// A host status code (COM-style HRESULT).
///
/// Only the handful of codes the retry engine distinguishes get names; every
/// other value is carried through as-is so logs still show the exact code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HResult(pub u32);

impl HResult {
    /// The host is busy and asks the caller to retry later.
    pub const RPC_E_SERVERCALL_RETRYLATER: HResult = HResult(0x8001_010A);
    /// The host rejected the incoming call.
    pub const RPC_E_CALL_REJECTED: HResult = HResult(0x8001_0001);
    /// Unspecified failure.
    pub const E_FAIL: HResult = HResult(0x8000_4005);

    pub fn code(self) -> u32 {
        self.0
    }

    /// Host-busy or call-rejected; the call itself was never processed.
    pub fn is_busy(self) -> bool {
        self == Self::RPC_E_SERVERCALL_RETRYLATER || self == Self::RPC_E_CALL_REJECTED
    }

    pub fn is_generic_failure(self) -> bool {
        self == Self::E_FAIL
    }

    fn name(self) -> Option<&'static str> {
        match self {
            Self::RPC_E_SERVERCALL_RETRYLATER => Some("RPC_E_SERVERCALL_RETRYLATER"),
            Self::RPC_E_CALL_REJECTED => Some("RPC_E_CALL_REJECTED"),
            Self::E_FAIL => Some("E_FAIL"),
            _ => None,
        }
    }
}

impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "0x{:08X} ({})", self.0, name),
            None => write!(f, "0x{:08X}", self.0),
        }
    }
}

impl From<u32> for HResult {
    fn from(code: u32) -> Self {
        HResult(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_codes() {
        assert!(HResult::RPC_E_SERVERCALL_RETRYLATER.is_busy());
        assert!(HResult::RPC_E_CALL_REJECTED.is_busy());
        assert!(!HResult::E_FAIL.is_busy());
        assert!(!HResult(0x8007_0002).is_busy());
    }

    #[test]
    fn display_includes_hex_and_known_name() {
        assert_eq!(HResult::E_FAIL.to_string(), "0x80004005 (E_FAIL)");
        assert_eq!(HResult(0x8007_0002).to_string(), "0x80070002");
    }
}
