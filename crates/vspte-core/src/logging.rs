//! Logging init: stderr always, plus a per-run file under the XDG state dir when enabled.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Writer that is either a file or stderr (used when file clone fails).
enum FileOrStderr {
    File(std::fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct FileMakeWriter(std::fs::File);

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileOrStderr;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(FileOrStderr::File)
            .unwrap_or(FileOrStderr::Stderr)
    }
}

/// RUST_LOG wins; otherwise the configured level for everything.
fn env_filter(cfg: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Path of this run's log file: `<dir>/<unix-millis>_vspte.log`.
pub fn log_file_path(dir: &Path) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    dir.join(format!("{}_vspte.log", stamp))
}

fn default_log_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vspte")?;
    Ok(xdg_dirs.get_state_home())
}

/// Stderr output with the same events mirrored into `file`.
fn stderr_and_file(cfg: &LoggingConfig, file: fs::File) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::registry()
        .with(env_filter(cfg))
        .with(fmt::layer().with_writer(io::stderr).with_ansi(false))
        .with(
            fmt::layer()
                .with_writer(FileMakeWriter(file))
                .with_ansi(false),
        )
}

/// Initialize logging from config: stderr always, plus a per-run file when
/// `enable_logfile` is set. Returns Err if the log file cannot be opened so
/// the caller can fall back to [`init_logging_stderr`].
pub fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    if !cfg.enable_logfile {
        init_logging_stderr(cfg);
        return Ok(());
    }

    let log_dir = match &cfg.logfile_dir {
        Some(dir) => dir.clone(),
        None => default_log_dir()?,
    };
    fs::create_dir_all(&log_dir)?;
    let path = log_file_path(&log_dir);

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    stderr_and_file(cfg, file)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install subscriber: {}", e))?;

    tracing::info!("vspte logging initialized at {}", path.display());

    Ok(())
}

/// Initialize logging to stderr only (no file). Use when init_logging() fails so the CLI doesn't crash.
pub fn init_logging_stderr(cfg: &LoggingConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(cfg))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
