pub mod config;
pub mod control;
pub mod extract;
pub mod host;
pub mod logging;
pub mod readiness;
pub mod retry;

#[cfg(test)]
pub(crate) mod test_support;

pub use extract::{ConfigPlatform, ExtractedProjectData, ProjectExtractor, UNKNOWN_TYPE_GUID};
