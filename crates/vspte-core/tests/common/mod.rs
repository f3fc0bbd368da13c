//! Shared fixtures for integration tests.

use std::path::PathBuf;
use std::time::Duration;

use vspte_core::host::SessionSettings;
use vspte_core::retry::RetryPolicy;

pub const CSHARP_GUID: &str = "{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}";

/// Host that is busy twice, then returns a C# project with two configurations.
pub const BUSY_THEN_READY: &str = r#"
[[add]]
outcome = "error"
hresult = 0x8001010A

[[add]]
outcome = "error"
hresult = 0x80010001

[[add]]
outcome = "added"
[add.project]
kind = "{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}"
name = "ExternalDummyProject"

[[add.project.rows]]
name = "Debug"
entries = [{ configuration = "Debug", platform = "Any CPU" }]

[[add.project.rows]]
name = "Release"
entries = [{ configuration = "Release", platform = "Any CPU" }]
"#;

/// Host that reports E_FAIL although the project did land in the solution.
pub const HALF_ADDED: &str = r#"
[[add]]
outcome = "error_after_add"
hresult = 0x80004005
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

pub fn settings() -> SessionSettings {
    SessionSettings {
        major_version: 16,
        show_ui: false,
        solution_dir: std::env::temp_dir(),
        solution_name: "itest_vspte.sln".to_string(),
        save_on_close: false,
        settle_after_create: Duration::from_millis(1),
    }
}

pub fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::from_millis(2)).unwrap()
}

pub fn project_path(name: &str) -> PathBuf {
    PathBuf::from("C:/work/VSProjTypeExtractorTest/data").join(name)
}
