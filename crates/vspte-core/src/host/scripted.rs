//! Scripted host: a deterministic stand-in for the automation host.
//!
//! Each `add_from_file` call consumes the next [`AddStep`] (the last one
//! repeats), so a script can reproduce busy responses, half-finished adds and
//! projects whose properties settle late. Scripts deserialize from TOML, which
//! lets the CLI rehearse a host's failure behaviour without launching an IDE.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{EntryResult, HResult, HostTransport, ProjectProperty, SessionSettings};
use crate::extract::ConfigPlatform;
use crate::retry::HostError;

/// Whole host behaviour for one run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostScript {
    /// Outcomes of successive `add_from_file` calls; the last one repeats.
    #[serde(default)]
    pub add: Vec<AddStep>,
    /// Projects already in the anchor solution before the first add.
    #[serde(default)]
    pub preloaded: Vec<ScriptedProject>,
    /// Status code returned by `create_session`, if it should fail.
    #[serde(default)]
    pub session_error: Option<u32>,
    /// Status code returned by the project collection lookup, if it should fail.
    #[serde(default)]
    pub projects_error: Option<u32>,
}

impl HostScript {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading host script {}", path.display()))?;
        Self::from_toml_str(&data).with_context(|| format!("parsing host script {}", path.display()))
    }
}

/// Outcome of one `add_from_file` call.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AddStep {
    /// The project is added and returned.
    Added { project: ScriptedProject },
    /// The call fails; nothing is added.
    Error { hresult: u32 },
    /// The project lands in the solution but the call still reports failure.
    ErrorAfterAdd {
        hresult: u32,
        project: ScriptedProject,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptedProject {
    /// Type GUID; `None` reads back as null.
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub has_collection: bool,
    /// Number of `Kind` reads answered with a busy code before the value appears.
    #[serde(default)]
    pub kind_busy_reads: u32,
    #[serde(default)]
    pub rows: Vec<ScriptedRow>,
    /// Status code returned when enumerating rows, if it should fail.
    #[serde(default)]
    pub rows_error: Option<u32>,
}

fn default_true() -> bool {
    true
}

impl ScriptedProject {
    pub fn new(kind: &str, name: &str) -> Self {
        Self {
            kind: Some(kind.to_string()),
            name: Some(name.to_string()),
            has_collection: true,
            ..Self::default()
        }
    }

    pub fn with_row(mut self, row: ScriptedRow) -> Self {
        self.rows.push(row);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptedRow {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<ScriptedEntry>,
    /// Status code returned when opening this row, if it should fail.
    #[serde(default)]
    pub error: Option<u32>,
}

impl ScriptedRow {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn entry(mut self, configuration: &str, platform: &str) -> Self {
        self.entries.push(ScriptedEntry {
            configuration: configuration.to_string(),
            platform: platform.to_string(),
            error: None,
        });
        self
    }

    pub fn broken_entry(mut self, hresult: u32) -> Self {
        self.entries.push(ScriptedEntry {
            error: Some(hresult),
            ..ScriptedEntry::default()
        });
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptedEntry {
    #[serde(default)]
    pub configuration: String,
    #[serde(default)]
    pub platform: String,
    /// Status code returned when reading this entry, if it should fail.
    #[serde(default)]
    pub error: Option<u32>,
}

/// Handle to a project inside a [`ScriptedHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectId(usize);

#[derive(Debug, Default)]
struct State {
    projects: Vec<ScriptedProject>,
    kind_reads: Vec<u32>,
    solution: Vec<usize>,
    add_calls: usize,
    added_paths: Vec<PathBuf>,
    session_creates: usize,
    session_open: bool,
    quit: bool,
    filter_registered: bool,
    pumps: usize,
}

/// [`HostTransport`] driven by a [`HostScript`].
#[derive(Debug)]
pub struct ScriptedHost {
    script: HostScript,
    state: RefCell<State>,
}

impl ScriptedHost {
    pub fn new(script: HostScript) -> Self {
        let mut state = State::default();
        for project in &script.preloaded {
            let id = state.projects.len();
            state.projects.push(project.clone());
            state.kind_reads.push(0);
            state.solution.push(id);
        }
        Self {
            script,
            state: RefCell::new(state),
        }
    }

    pub fn add_calls(&self) -> usize {
        self.state.borrow().add_calls
    }

    pub fn added_paths(&self) -> Vec<PathBuf> {
        self.state.borrow().added_paths.clone()
    }

    pub fn session_creates(&self) -> usize {
        self.state.borrow().session_creates
    }

    pub fn session_open(&self) -> bool {
        self.state.borrow().session_open
    }

    pub fn has_quit(&self) -> bool {
        self.state.borrow().quit
    }

    pub fn filter_registered(&self) -> bool {
        self.state.borrow().filter_registered
    }

    pub fn pump_count(&self) -> usize {
        self.state.borrow().pumps
    }

    fn ensure_alive(&self) -> Result<(), HostError> {
        let state = self.state.borrow();
        if state.quit {
            return Err(HostError::Session("host has quit".to_string()));
        }
        Ok(())
    }

    fn insert(&self, project: &ScriptedProject) -> usize {
        let mut state = self.state.borrow_mut();
        let id = state.projects.len();
        state.projects.push(project.clone());
        state.kind_reads.push(0);
        state.solution.push(id);
        id
    }

    fn project(&self, id: ProjectId) -> Result<ScriptedProject, HostError> {
        self.state
            .borrow()
            .projects
            .get(id.0)
            .cloned()
            .ok_or(HostError::Call(HResult::E_FAIL))
    }
}

impl HostTransport for ScriptedHost {
    type Project = ProjectId;

    fn register_message_filter(&self) -> Result<(), HostError> {
        self.state.borrow_mut().filter_registered = true;
        Ok(())
    }

    fn revoke_message_filter(&self) {
        self.state.borrow_mut().filter_registered = false;
    }

    fn create_session(&self, _settings: &SessionSettings) -> Result<(), HostError> {
        self.ensure_alive()?;
        let mut state = self.state.borrow_mut();
        state.session_creates += 1;
        if let Some(code) = self.script.session_error {
            return Err(HostError::Call(HResult(code)));
        }
        state.session_open = true;
        Ok(())
    }

    fn add_from_file(&self, path: &Path) -> Result<ProjectId, HostError> {
        self.ensure_alive()?;
        let step = {
            let mut state = self.state.borrow_mut();
            let index = state.add_calls.min(self.script.add.len().saturating_sub(1));
            state.add_calls += 1;
            state.added_paths.push(path.to_path_buf());
            self.script.add.get(index).cloned()
        };
        match step {
            None => Err(HostError::Call(HResult::E_FAIL)),
            Some(AddStep::Added { project }) => Ok(ProjectId(self.insert(&project))),
            Some(AddStep::Error { hresult }) => Err(HostError::Call(HResult(hresult))),
            Some(AddStep::ErrorAfterAdd { hresult, project }) => {
                self.insert(&project);
                Err(HostError::Call(HResult(hresult)))
            }
        }
    }

    fn projects(&self) -> Result<Vec<ProjectId>, HostError> {
        self.ensure_alive()?;
        if let Some(code) = self.script.projects_error {
            return Err(HostError::Call(HResult(code)));
        }
        Ok(self
            .state
            .borrow()
            .solution
            .iter()
            .map(|&id| ProjectId(id))
            .collect())
    }

    fn read_property(
        &self,
        project: &ProjectId,
        property: ProjectProperty,
    ) -> Result<Option<String>, HostError> {
        let p = self.project(*project)?;
        match property {
            ProjectProperty::Kind => {
                let mut state = self.state.borrow_mut();
                let reads = &mut state.kind_reads[project.0];
                if *reads < p.kind_busy_reads {
                    *reads += 1;
                    return Err(HostError::Call(HResult::RPC_E_SERVERCALL_RETRYLATER));
                }
                Ok(p.kind)
            }
            ProjectProperty::Name => Ok(p.name),
            ProjectProperty::Collection => {
                Ok(p.has_collection.then(|| "Projects".to_string()))
            }
        }
    }

    fn configuration_rows(&self, project: &ProjectId) -> Result<Vec<String>, HostError> {
        let p = self.project(*project)?;
        if let Some(code) = p.rows_error {
            return Err(HostError::Call(HResult(code)));
        }
        Ok(p.rows.iter().map(|r| r.name.clone()).collect())
    }

    fn configuration_entries(
        &self,
        project: &ProjectId,
        row: &str,
    ) -> Result<Vec<EntryResult>, HostError> {
        let p = self.project(*project)?;
        let row = p
            .rows
            .iter()
            .find(|r| r.name == row)
            .ok_or(HostError::Call(HResult::E_FAIL))?;
        if let Some(code) = row.error {
            return Err(HostError::Call(HResult(code)));
        }
        Ok(row
            .entries
            .iter()
            .map(|e| match e.error {
                Some(code) => Err(HostError::Call(HResult(code))),
                None => Ok(ConfigPlatform::new(&e.configuration, &e.platform)),
            })
            .collect())
    }

    fn pump_messages(&self) {
        self.state.borrow_mut().pumps += 1;
    }

    fn close_session(&self, _save: bool) -> Result<(), HostError> {
        self.ensure_alive()?;
        self.state.borrow_mut().session_open = false;
        Ok(())
    }

    fn quit(&self) -> Result<(), HostError> {
        self.ensure_alive()?;
        self.state.borrow_mut().quit = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
        [[add]]
        outcome = "error"
        hresult = 0x8001010A

        [[add]]
        outcome = "added"
        [add.project]
        kind = "{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}"
        name = "Native"

        [[add.project.rows]]
        name = "Debug"
        entries = [
            { configuration = "Debug", platform = "Win32" },
            { configuration = "Debug", platform = "x64" },
        ]
    "#;

    #[test]
    fn script_parses_from_toml() {
        let script = HostScript::from_toml_str(SCRIPT).unwrap();
        assert_eq!(script.add.len(), 2);
        match &script.add[1] {
            AddStep::Added { project } => {
                assert_eq!(project.rows[0].entries.len(), 2);
                assert!(project.has_collection);
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn add_steps_advance_and_last_repeats() {
        let host = ScriptedHost::new(HostScript::from_toml_str(SCRIPT).unwrap());
        let path = Path::new("native.vcxproj");
        assert_eq!(
            host.add_from_file(path).unwrap_err(),
            HostError::Call(HResult::RPC_E_SERVERCALL_RETRYLATER)
        );
        let first = host.add_from_file(path).unwrap();
        let second = host.add_from_file(path).unwrap();
        assert_ne!(first, second);
        assert_eq!(host.add_calls(), 3);
        assert_eq!(host.projects().unwrap().len(), 2);
    }

    #[test]
    fn error_after_add_leaves_project_in_solution() {
        let host = ScriptedHost::new(HostScript {
            add: vec![AddStep::ErrorAfterAdd {
                hresult: HResult::E_FAIL.code(),
                project: ScriptedProject::new("{A}", "Half"),
            }],
            ..HostScript::default()
        });
        assert!(host.add_from_file(Path::new("half.csproj")).is_err());
        let projects = host.projects().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(
            host.read_property(&projects[0], ProjectProperty::Name).unwrap(),
            Some("Half".to_string())
        );
    }

    #[test]
    fn calls_fail_after_quit() {
        let host = ScriptedHost::new(HostScript::default());
        host.quit().unwrap();
        assert!(host.quit().is_err());
        assert!(host.close_session(false).is_err());
    }
}
