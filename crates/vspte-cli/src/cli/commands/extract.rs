//! `vspte extract` – load one project and print what the host reports.

use anyhow::{anyhow, bail, Result};
use std::path::Path;
use vspte_core::config::VspteConfig;
use vspte_core::extract::{ExtractedProjectData, ProjectExtractor};
use vspte_core::host::scripted::{HostScript, ScriptedHost};
use vspte_core::host::HostThread;

pub fn run_extract(
    cfg: &VspteConfig,
    path: &Path,
    script: Option<&Path>,
    json: bool,
) -> Result<()> {
    let script_path = script.ok_or_else(|| {
        anyhow!("this build has no live IDE binding; pass --script <FILE> to drive a scripted host")
    })?;
    let script = HostScript::load(script_path)?;
    let policy = cfg.retry.to_policy()?;
    let settings = cfg.session_settings();
    tracing::info!(
        attempts = policy.max_attempts(),
        prog_id = %settings.prog_id(),
        "extracting {}",
        path.display()
    );

    let mut host = HostThread::spawn("vspte-host", move || {
        ProjectExtractor::new(ScriptedHost::new(script), settings, policy)
    })?;
    let target = path.to_path_buf();
    let data = host.run(move |ex| {
        let data = ex.extract(&target);
        ex.shutdown();
        data
    })?;
    host.shutdown();

    println!("{}", render(&data, json)?);
    if !data.is_known() {
        bail!(
            "no project type GUID extracted for '{}' (see log for details)",
            path.display()
        );
    }
    Ok(())
}

pub(crate) fn render(data: &ExtractedProjectData, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(data)?);
    }
    let mut lines = vec![format!("type GUID: {}", data.type_guid)];
    if data.configs_platforms.is_empty() {
        lines.push("configurations: none".to_string());
    } else {
        lines.push("configurations:".to_string());
        for pair in &data.configs_platforms {
            lines.push(format!("  {}|{}", pair.configuration, pair.platform));
        }
    }
    Ok(lines.join("\n"))
}
