//! CLI command handlers, one per file.

mod config_path;
mod extract;
mod policy;

pub use config_path::run_config_path;
pub use extract::run_extract;
pub use policy::run_policy;

#[cfg(test)]
pub(crate) use extract::render;
#[cfg(test)]
pub(crate) use policy::describe_policy;
