//! Result types handed back to callers.

use serde::{Deserialize, Serialize};

/// Type GUID value meaning "extraction did not succeed".
pub const UNKNOWN_TYPE_GUID: &str = "UNKNOWN";

/// Size of the fixed buffer a GUID is copied into at the native boundary,
/// including the terminating NUL: `{8-4-4-4-12}` is 38 characters.
pub const GUID_MAX_LEN: usize = 39;

/// One configuration/platform pair, e.g. ("Debug", "x64").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigPlatform {
    pub configuration: String,
    pub platform: String,
}

impl ConfigPlatform {
    pub fn new(configuration: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            configuration: configuration.into(),
            platform: platform.into(),
        }
    }
}

/// Data read back from one project load.
///
/// Always present: failure paths return the default value, whose GUID is
/// [`UNKNOWN_TYPE_GUID`] and whose pair list is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedProjectData {
    pub type_guid: String,
    pub configs_platforms: Vec<ConfigPlatform>,
}

impl Default for ExtractedProjectData {
    fn default() -> Self {
        Self {
            type_guid: UNKNOWN_TYPE_GUID.to_string(),
            configs_platforms: Vec::new(),
        }
    }
}

impl ExtractedProjectData {
    pub fn is_known(&self) -> bool {
        self.type_guid != UNKNOWN_TYPE_GUID
    }

    pub fn push(&mut self, pair: ConfigPlatform) {
        self.configs_platforms.push(pair);
    }

    /// The GUID if it looks complete and fits a buffer of `max_len` bytes.
    pub fn checked_type_guid(&self, max_len: usize) -> Option<&str> {
        let len = self.type_guid.len();
        if self.is_known() && len >= GUID_MAX_LEN - 1 && len <= max_len {
            Some(&self.type_guid)
        } else {
            None
        }
    }
}
