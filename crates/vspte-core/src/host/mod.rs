//! The automation host seen through a narrow transport trait.
//!
//! The extractor never talks to an IDE directly: it drives a [`HostTransport`]
//! that a binding (a COM/DTE bridge, or the [`scripted`] host used in tests)
//! implements. Host objects are usually bound to the thread that created them,
//! so bindings run inside a [`HostThread`].

mod hresult;
pub mod scripted;
mod thread;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::extract::ConfigPlatform;
use crate::retry::HostError;

pub use hresult::HResult;
pub use thread::HostThread;

/// Project properties the extractor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectProperty {
    /// Project type GUID; the identifying property.
    Kind,
    /// Display name.
    Name,
    /// Owning collection. Only its presence matters.
    Collection,
}

impl ProjectProperty {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectProperty::Kind => "Kind",
            ProjectProperty::Name => "Name",
            ProjectProperty::Collection => "Collection",
        }
    }
}

/// Parameters for creating the automation session and its anchor solution.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Major version of the host to launch (e.g. 16 for VS2019).
    pub major_version: u32,
    /// Show the host window and hand it to the user.
    pub show_ui: bool,
    /// Directory and file name of the volatile anchor solution.
    pub solution_dir: PathBuf,
    pub solution_name: String,
    /// Save the anchor solution when the session is closed.
    pub save_on_close: bool,
    /// How long to let the host settle after the anchor solution is created.
    pub settle_after_create: Duration,
}

impl SessionSettings {
    /// Registered automation class name for the configured major version.
    pub fn prog_id(&self) -> String {
        format!("VisualStudio.DTE.{}.0", self.major_version)
    }

    pub fn solution_path(&self) -> PathBuf {
        self.solution_dir.join(&self.solution_name)
    }
}

/// Per-entry result of enumerating one configuration row.
pub type EntryResult = Result<ConfigPlatform, HostError>;

/// Synchronous calls into the automation host.
///
/// All methods take `&self`: bindings wrap thread-affine host objects and are
/// only ever used from their own host thread.
pub trait HostTransport {
    /// Host-side project object. Owned by the host; the extractor only borrows it.
    type Project;

    /// Install the busy/reentrancy filter for this thread. Optional.
    fn register_message_filter(&self) -> Result<(), HostError> {
        Ok(())
    }

    fn revoke_message_filter(&self) {}

    /// Launch (or attach to) the host and create the anchor solution.
    fn create_session(&self, settings: &SessionSettings) -> Result<(), HostError>;

    /// Add a project file to the anchor solution.
    fn add_from_file(&self, path: &Path) -> Result<Self::Project, HostError>;

    /// Projects currently in the anchor solution, in host order.
    fn projects(&self) -> Result<Vec<Self::Project>, HostError>;

    /// Read a property. `Ok(None)` means the host returned null.
    fn read_property(
        &self,
        project: &Self::Project,
        property: ProjectProperty,
    ) -> Result<Option<String>, HostError>;

    /// Configuration row names (e.g. "Debug", "Release").
    fn configuration_rows(&self, project: &Self::Project) -> Result<Vec<String>, HostError>;

    /// Configuration/platform entries of one row.
    fn configuration_entries(
        &self,
        project: &Self::Project,
        row: &str,
    ) -> Result<Vec<EntryResult>, HostError>;

    /// Service pending messages so the host can call back into this thread.
    fn pump_messages(&self) {}

    fn close_session(&self, save: bool) -> Result<(), HostError>;

    fn quit(&self) -> Result<(), HostError>;
}
