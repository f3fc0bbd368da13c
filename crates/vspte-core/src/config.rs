use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::host::SessionSettings;
use crate::retry::{PolicyError, RetryPolicy, MIN_BASE_INTERVAL};

/// Environment variable that overrides `host.major_version` when set to a positive integer.
pub const VS_VERSION_ENV: &str = "PROJTYPEXTRACT_VSVERSION";

/// Logging section of config.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level (overridden by RUST_LOG).
    pub level: String,
    /// Also write a log file per run.
    pub enable_logfile: bool,
    /// Directory for log files; XDG state dir when missing.
    #[serde(default)]
    pub logfile_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            enable_logfile: false,
            logfile_dir: None,
        }
    }
}

/// Automation host section of config.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Host major version (16 = VS2019, 17 = VS2022).
    pub major_version: u32,
    /// Keep the volatile anchor solution on disk when the session closes.
    pub save_volatile_solution: bool,
    /// Show the host window instead of running it hidden.
    pub show_ui: bool,
    /// Seconds to let the host settle after creating the anchor solution.
    pub settle_after_create_secs: f64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            major_version: 16,
            save_volatile_solution: false,
            show_ui: false,
            settle_after_create_secs: 5.0,
        }
    }
}

/// Project load retry section of config.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Delay before the second attempt, in seconds; later delays double.
    pub initial_sleep_secs: f64,
    /// Roughly how long retrying may take in total, in seconds.
    pub estimated_total_secs: f64,
    /// Attempt count never goes below this.
    pub min_attempts: u32,
    /// Cap for a single delay, in seconds.
    pub max_delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_sleep_secs: 0.3,
            estimated_total_secs: 10.0,
            min_attempts: 2,
            max_delay_secs: 5.0,
        }
    }
}

impl RetryConfig {
    /// Build the project load policy. The attempt count comes from the total
    /// budget; the base interval is raised to at least 50ms.
    pub fn to_policy(&self) -> Result<RetryPolicy, PolicyError> {
        let base = secs("initial_sleep_secs", self.initial_sleep_secs)?
            .ok_or(PolicyError::NonPositiveBase)?;
        let total = secs("estimated_total_secs", self.estimated_total_secs)?
            .ok_or(PolicyError::NonPositiveBudget)?;
        let attempts = crate::retry::attempts_for_budget(base, total, self.min_attempts)?;
        let max_delay = secs("max_delay_secs", self.max_delay_secs)?
            .unwrap_or(crate::retry::DEFAULT_MAX_DELAY);
        Ok(RetryPolicy::new(attempts, base.max(MIN_BASE_INTERVAL))?.with_max_delay(max_delay))
    }
}

/// `Ok(None)` for zero, negative or NaN; an error when `Duration` cannot hold it.
fn secs(field: &'static str, value: f64) -> Result<Option<Duration>, PolicyError> {
    if value.is_nan() || value <= 0.0 {
        return Ok(None);
    }
    Duration::try_from_secs_f64(value)
        .map(Some)
        .map_err(|_| PolicyError::DurationTooLarge { field, secs: value })
}

/// Global configuration loaded from `~/.config/vspte/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VspteConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl VspteConfig {
    /// Apply `PROJTYPEXTRACT_VSVERSION` if it holds a positive integer.
    pub fn apply_env_override(&mut self, value: Option<&str>) {
        let Some(version) = value.and_then(|v| v.trim().parse::<u32>().ok()) else {
            return;
        };
        if version > 0 {
            tracing::info!(
                from = self.host.major_version,
                to = version,
                "host major version overridden by {}",
                VS_VERSION_ENV
            );
            self.host.major_version = version;
        }
    }

    /// Settle time after creating the anchor solution; zero when unusable.
    fn settle_after_create(&self) -> Duration {
        match secs("settle_after_create_secs", self.host.settle_after_create_secs) {
            Ok(settle) => settle.unwrap_or(Duration::ZERO),
            Err(e) => {
                tracing::warn!("ignoring host settle time: {}", e);
                Duration::ZERO
            }
        }
    }

    /// Session settings with a timestamped anchor solution in the temp dir.
    pub fn session_settings(&self) -> SessionSettings {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        SessionSettings {
            major_version: self.host.major_version,
            show_ui: self.host.show_ui,
            solution_dir: std::env::temp_dir(),
            solution_name: format!("{}_vspte.sln", stamp),
            save_on_close: self.host.save_volatile_solution,
            settle_after_create: self.settle_after_create(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vspte")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
/// The environment override is applied to the returned value.
pub fn load_or_init() -> Result<VspteConfig> {
    let mut cfg = load_or_init_at(&config_path()?)?;
    cfg.apply_env_override(std::env::var(VS_VERSION_ENV).ok().as_deref());
    Ok(cfg)
}

/// Like [`load_or_init`] for an explicit path, without the environment override.
pub fn load_or_init_at(path: &Path) -> Result<VspteConfig> {
    if !path.exists() {
        let default_cfg = VspteConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: VspteConfig = toml::from_str(&data)?;
    Ok(cfg)
}
