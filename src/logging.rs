//! Tracing setup for the `wavescope` command line.
//!
//! Diagnostics go to stderr. A plain-text log file is added only on request,
//! either at a path the user names or as a per-run file under the
//! application's `logs` folder. `RUST_LOG` overrides the verbosity flags.

use std::path::{Path, PathBuf};

use time::format_description::{BorrowedFormatItem, FormatItem};
use time::{OffsetDateTime, UtcOffset, macros::format_description};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs::{AppDirError, AppDirs};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Cannot place run log: {0}")]
    AppDir(#[from] AppDirError),
    #[error("Log file path {path} does not name a file")]
    NotAFile { path: PathBuf },
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format run log name: {0}")]
    FormatTime(#[from] time::error::Format),
    #[error("Tracing is already initialized: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Where, if anywhere, to mirror diagnostics into a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogFile {
    /// Write to this exact path, creating parent folders.
    At(PathBuf),
    /// Write a timestamped file under the application's logs folder.
    RunLog,
}

#[derive(Clone, Debug, Default)]
pub struct LogOptions {
    /// Count of `-v` flags.
    pub verbosity: u8,
    pub file: Option<LogFile>,
}

/// Keeps the file writer flushing; drop it only when the program exits.
#[must_use]
pub struct LogHandle {
    _guard: Option<WorkerGuard>,
    file: Option<PathBuf>,
}

impl LogHandle {
    /// Path of the log file being written, if any.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

/// Install the global subscriber.
///
/// The file is prepared before anything is installed, so a failure here
/// leaves tracing uninitialized and the caller can retry without a file.
pub fn init(options: &LogOptions) -> Result<LogHandle, LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(options.verbosity)));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let Some(target) = &options.file else {
        tracing::subscriber::set_global_default(
            Registry::default().with(filter).with(stderr_layer),
        )?;
        return Ok(LogHandle {
            _guard: None,
            file: None,
        });
    };

    let path = resolve_log_path(target, now_local_or_utc())?;
    let (dir, name) = split_log_path(&path)?;
    std::fs::create_dir_all(&dir).map_err(|source| LoggingError::CreateDir {
        path: dir.clone(),
        source,
    })?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_timer(file_timer())
        .with_writer(writer);
    tracing::subscriber::set_global_default(
        Registry::default()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer),
    )?;
    tracing::debug!("Writing log to {}", path.display());
    Ok(LogHandle {
        _guard: Some(guard),
        file: Some(path),
    })
}

/// Filter used when `RUST_LOG` is unset.
fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn,wavescope=info",
        1 => "info,wavescope=debug",
        _ => "debug,wavescope=trace",
    }
}

fn resolve_log_path(target: &LogFile, now: OffsetDateTime) -> Result<PathBuf, LoggingError> {
    match target {
        LogFile::At(path) => Ok(path.clone()),
        LogFile::RunLog => {
            let dirs = AppDirs::locate()?;
            Ok(dirs.logs().join(run_log_name(now)?))
        }
    }
}

fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf), LoggingError> {
    let Some(name) = path.file_name() else {
        return Err(LoggingError::NotAFile {
            path: path.to_path_buf(),
        });
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, PathBuf::from(name)))
}

fn run_log_name(now: OffsetDateTime) -> Result<String, LoggingError> {
    const STAMP: &[FormatItem<'_>] =
        format_description!("[year][month][day]-[hour][minute][second]");
    Ok(format!("wavescope-{}.log", now.format(STAMP)?))
}

fn file_timer() -> fmt::time::OffsetTime<BorrowedFormatItem<'static>> {
    const LINE_STAMP: &[FormatItem<'static>] =
        format_description!("[hour]:[minute]:[second].[subsecond digits:3]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, LINE_STAMP.into())
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
