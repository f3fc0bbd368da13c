//! Tests for project load and extraction against the scripted host.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{ConfigPlatform, ProjectExtractor};
use crate::control::AbortToken;
use crate::host::scripted::{AddStep, HostScript, ScriptedHost, ScriptedProject, ScriptedRow};
use crate::host::{HResult, SessionSettings};
use crate::retry::{PolicyError, RetryPolicy};
use crate::test_support::capture_logs;

const CSHARP: &str = "{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}";
const VCXPROJ: &str = "{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}";
const BUSY: u32 = 0x8001_010A;
const E_FAIL: u32 = 0x8000_4005;

fn settings() -> SessionSettings {
    SessionSettings {
        major_version: 16,
        show_ui: false,
        solution_dir: PathBuf::from("/tmp"),
        solution_name: "test_vspte.sln".to_string(),
        save_on_close: false,
        settle_after_create: Duration::ZERO,
    }
}

fn extractor(script: HostScript, max_attempts: u32) -> ProjectExtractor<ScriptedHost> {
    let policy = RetryPolicy::new(max_attempts, Duration::from_millis(1)).unwrap();
    ProjectExtractor::new(ScriptedHost::new(script), settings(), policy).with_seed(11)
}

fn two_row_project(kind: &str) -> ScriptedProject {
    ScriptedProject::new(kind, "App")
        .with_row(ScriptedRow::new("Debug").entry("Debug", "x64"))
        .with_row(ScriptedRow::new("Release").entry("Release", "x64"))
}

fn path() -> &'static Path {
    Path::new("C:/src/app/app.csproj")
}

#[test]
fn first_attempt_success_reads_guid_and_pairs_in_order() {
    let mut ex = extractor(
        HostScript {
            add: vec![AddStep::Added {
                project: two_row_project(CSHARP),
            }],
            ..HostScript::default()
        },
        3,
    );
    let (data, logs) = capture_logs(|| ex.extract(path()));
    assert_eq!(data.type_guid, CSHARP);
    assert_eq!(
        data.configs_platforms,
        vec![
            ConfigPlatform::new("Debug", "x64"),
            ConfigPlatform::new("Release", "x64"),
        ]
    );
    assert_eq!(ex.host().add_calls(), 1);
    assert_eq!(ex.host().pump_count(), 0);
    assert!(!logs.contains("recovered after"));
    assert!(!logs.contains("WARN"));
}

#[test]
fn busy_host_is_retried_with_pumping_between_attempts() {
    let mut ex = extractor(
        HostScript {
            add: vec![
                AddStep::Error { hresult: BUSY },
                AddStep::Error { hresult: BUSY },
                AddStep::Added {
                    project: two_row_project(VCXPROJ),
                },
            ],
            ..HostScript::default()
        },
        3,
    );
    let (data, logs) = capture_logs(|| ex.extract(path()));
    assert_eq!(data.type_guid, VCXPROJ);
    assert_eq!(ex.host().add_calls(), 3);
    assert_eq!(ex.host().pump_count(), 2);
    assert_eq!(logs.matches("recovered after 3 attempts").count(), 1);
}

#[test]
fn e_fail_falls_back_to_last_project_in_solution() {
    let mut ex = extractor(
        HostScript {
            add: vec![AddStep::ErrorAfterAdd {
                hresult: E_FAIL,
                project: two_row_project(VCXPROJ),
            }],
            ..HostScript::default()
        },
        3,
    );
    let data = ex.extract(path());
    assert_eq!(data.type_guid, VCXPROJ);
    assert_eq!(data.configs_platforms.len(), 2);
    assert_eq!(ex.host().add_calls(), 1);
}

#[test]
fn e_fail_with_empty_solution_retries_as_not_yet_usable() {
    let mut ex = extractor(
        HostScript {
            add: vec![
                AddStep::Error { hresult: E_FAIL },
                AddStep::Added {
                    project: two_row_project(CSHARP),
                },
            ],
            ..HostScript::default()
        },
        3,
    );
    let data = ex.extract(path());
    assert_eq!(data.type_guid, CSHARP);
    assert_eq!(ex.host().add_calls(), 2);
}

#[test]
fn failing_fallback_lookup_counts_as_no_project() {
    let mut ex = extractor(
        HostScript {
            add: vec![AddStep::Error { hresult: E_FAIL }],
            projects_error: Some(BUSY),
            ..HostScript::default()
        },
        2,
    );
    let data = ex.extract(path());
    assert!(!data.is_known());
    assert_eq!(ex.host().add_calls(), 2);
}

#[test]
fn fatal_error_stops_after_first_attempt() {
    let mut ex = extractor(
        HostScript {
            add: vec![AddStep::Error {
                hresult: 0x8007_0002,
            }],
            ..HostScript::default()
        },
        5,
    );
    let (data, logs) = capture_logs(|| ex.extract(path()));
    assert_eq!(data.type_guid, "UNKNOWN");
    assert!(data.configs_platforms.is_empty());
    assert_eq!(ex.host().add_calls(), 1);
    assert_eq!(ex.host().pump_count(), 0);
    assert!(logs.contains("class=fatal"));
}

#[test]
fn exhaustion_returns_sentinel() {
    let mut ex = extractor(
        HostScript {
            add: vec![AddStep::Error { hresult: BUSY }],
            ..HostScript::default()
        },
        4,
    );
    let (data, logs) = capture_logs(|| ex.extract(path()));
    assert_eq!(data.type_guid, "UNKNOWN");
    assert!(data.configs_platforms.is_empty());
    assert_eq!(ex.host().add_calls(), 4);
    assert!(logs.contains("gave up after 4 attempts"));
}

#[test]
fn unsettled_project_is_retried_until_kind_appears() {
    let mut ex = extractor(
        HostScript {
            add: vec![
                AddStep::Added {
                    project: ScriptedProject {
                        kind: Some("{00000000-0000-0000-0000-000000000000}".to_string()),
                        ..ScriptedProject::new(CSHARP, "App")
                    },
                },
                AddStep::Added {
                    project: two_row_project(CSHARP),
                },
            ],
            ..HostScript::default()
        },
        3,
    );
    let data = ex.extract(path());
    assert_eq!(data.type_guid, CSHARP);
    assert_eq!(ex.host().add_calls(), 2);
}

#[test]
fn broken_rows_and_entries_are_skipped() {
    let project = ScriptedProject::new(CSHARP, "App")
        .with_row(ScriptedRow {
            error: Some(E_FAIL),
            ..ScriptedRow::new("Broken")
        })
        .with_row(
            ScriptedRow::new("Debug")
                .entry("Debug", "Any CPU")
                .broken_entry(E_FAIL)
                .entry("Debug", "x86"),
        );
    let mut ex = extractor(
        HostScript {
            add: vec![AddStep::Added { project }],
            ..HostScript::default()
        },
        1,
    );
    let data = ex.extract(path());
    assert_eq!(data.type_guid, CSHARP);
    assert_eq!(
        data.configs_platforms,
        vec![
            ConfigPlatform::new("Debug", "Any CPU"),
            ConfigPlatform::new("Debug", "x86"),
        ]
    );
}

#[test]
fn failing_row_enumeration_still_succeeds() {
    let project = ScriptedProject {
        rows_error: Some(E_FAIL),
        ..ScriptedProject::new(CSHARP, "App")
    };
    let mut ex = extractor(
        HostScript {
            add: vec![AddStep::Added { project }],
            ..HostScript::default()
        },
        1,
    );
    let data = ex.extract(path());
    assert_eq!(data.type_guid, CSHARP);
    assert!(data.configs_platforms.is_empty());
}

#[test]
fn zero_attempts_rejected_before_any_host_call() {
    let mut ex = extractor(HostScript::default(), 3);
    let err = ex
        .load_and_extract_with(path(), 0, Duration::from_millis(300))
        .unwrap_err();
    assert_eq!(err, PolicyError::MaxAttempts(0));
    assert_eq!(ex.host().add_calls(), 0);
    assert_eq!(ex.host().session_creates(), 0);
}

#[test]
fn session_is_created_once() {
    let mut ex = extractor(
        HostScript {
            add: vec![AddStep::Added {
                project: two_row_project(CSHARP),
            }],
            ..HostScript::default()
        },
        1,
    );
    ex.extract(path());
    ex.extract(Path::new("C:/src/other/other.csproj"));
    assert_eq!(ex.host().session_creates(), 1);
    assert!(ex.host().filter_registered());
    assert_eq!(ex.host().added_paths().len(), 2);
}

#[test]
fn failed_session_start_returns_sentinel_and_is_retried_next_time() {
    let mut ex = extractor(
        HostScript {
            session_error: Some(HResult::E_FAIL.code()),
            ..HostScript::default()
        },
        1,
    );
    assert!(!ex.extract(path()).is_known());
    assert!(!ex.extract(path()).is_known());
    assert_eq!(ex.host().session_creates(), 2);
    assert_eq!(ex.host().add_calls(), 0);
    assert!(!ex.host().filter_registered());
}

#[test]
fn shutdown_is_idempotent() {
    let mut ex = extractor(
        HostScript {
            add: vec![AddStep::Added {
                project: two_row_project(CSHARP),
            }],
            ..HostScript::default()
        },
        1,
    );
    ex.extract(path());
    assert!(ex.session_open());
    ex.shutdown();
    ex.shutdown();
    assert!(ex.host().has_quit());
    assert!(!ex.host().filter_registered());
    assert!(!ex.extract(path()).is_known());
}

#[test]
fn shutdown_tolerates_host_already_gone() {
    let mut ex = extractor(HostScript::default(), 1);
    ex.ensure_session().unwrap();
    crate::host::HostTransport::quit(ex.host()).unwrap();
    ex.shutdown();
    assert!(!ex.session_open());
}

#[test]
fn abort_token_stops_retrying() {
    let token = AbortToken::new();
    token.request_abort();
    let mut ex = extractor(
        HostScript {
            add: vec![AddStep::Error { hresult: BUSY }],
            ..HostScript::default()
        },
        10,
    )
    .with_abort(token);
    let data = ex.extract(path());
    assert!(!data.is_known());
    assert_eq!(ex.host().add_calls(), 1);
}

#[test]
fn e_fail_fallback_may_pick_a_project_already_in_the_solution() {
    // Nothing is added, yet the lookup returns the older project.
    let mut ex = extractor(
        HostScript {
            preloaded: vec![ScriptedProject::new(CSHARP, "Existing")],
            add: vec![AddStep::Error { hresult: E_FAIL }],
            ..HostScript::default()
        },
        3,
    );
    let data = ex.extract(path());
    assert_eq!(data.type_guid, CSHARP);
    assert!(data.configs_platforms.is_empty());
    assert_eq!(ex.host().add_calls(), 1);
}

#[test]
fn unready_fallback_project_is_retried() {
    let mut ex = extractor(
        HostScript {
            add: vec![
                AddStep::ErrorAfterAdd {
                    hresult: E_FAIL,
                    project: ScriptedProject::new(crate::readiness::NULL_GUID, "Half"),
                },
                AddStep::Added {
                    project: two_row_project(VCXPROJ),
                },
            ],
            ..HostScript::default()
        },
        3,
    );
    let (data, logs) = capture_logs(|| ex.extract(path()));
    assert_eq!(data.type_guid, VCXPROJ);
    assert_eq!(data.configs_platforms.len(), 2);
    assert_eq!(ex.host().add_calls(), 2);
    assert!(logs.contains("class=not-yet-usable"));
    assert!(logs.contains("Kind missing"));
    assert_eq!(logs.matches("recovered after 2 attempts").count(), 1);
}
