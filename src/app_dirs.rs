//! Where wavescope keeps its settings file and run logs.
//!
//! Everything lives under one `.wavescope` folder inside the OS config
//! directory, or inside `$WAVESCOPE_CONFIG_HOME` when that variable is set.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

/// Folder created under the config base.
pub const APP_DIR_NAME: &str = ".wavescope";
/// Environment variable that replaces the OS config directory as the base.
pub const CONFIG_HOME_ENV: &str = "WAVESCOPE_CONFIG_HOME";

const LOGS_DIR_NAME: &str = "logs";

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("No config directory available; set {CONFIG_HOME_ENV} to choose one")]
    NoBaseDir,
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The resolved `.wavescope` folder. Nothing is created until asked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppDirs {
    root: PathBuf,
}

impl AppDirs {
    /// Resolve the folder from the override variable or the OS config directory.
    pub fn locate() -> Result<Self, AppDirError> {
        base_dir().map(Self::under).ok_or(AppDirError::NoBaseDir)
    }

    /// Layout rooted at `base/.wavescope`.
    pub fn under(base: impl Into<PathBuf>) -> Self {
        Self {
            root: base.into().join(APP_DIR_NAME),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn logs(&self) -> PathBuf {
        self.root.join(LOGS_DIR_NAME)
    }

    /// Create the root folder if missing and return it.
    pub fn create_root(&self) -> Result<PathBuf, AppDirError> {
        create_dir(self.root.clone())
    }

    /// Create the logs folder if missing and return it.
    pub fn create_logs(&self) -> Result<PathBuf, AppDirError> {
        create_dir(self.logs())
    }
}

fn create_dir(path: PathBuf) -> Result<PathBuf, AppDirError> {
    match std::fs::create_dir_all(&path) {
        Ok(()) => Ok(path),
        Err(source) => Err(AppDirError::CreateDir { path, source }),
    }
}

fn base_dir() -> Option<PathBuf> {
    if let Some(path) = override_base() {
        return Some(path);
    }
    std::env::var_os(CONFIG_HOME_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()))
}

#[cfg(not(test))]
fn override_base() -> Option<PathBuf> {
    None
}

#[cfg(test)]
fn override_base() -> Option<PathBuf> {
    test_base::current()
}

#[cfg(test)]
pub(crate) use test_base::OverrideGuard;

/// Per-thread base directory for unit tests, so they never touch the
/// process environment.
#[cfg(test)]
mod test_base {
    use std::cell::RefCell;
    use std::path::PathBuf;

    thread_local! {
        static BASE: RefCell<Option<PathBuf>> = const { RefCell::new(None) };
    }

    pub(super) fn current() -> Option<PathBuf> {
        BASE.with(|base| base.borrow().clone())
    }

    /// Redirects the config base for the current thread until dropped.
    pub(crate) struct OverrideGuard {
        previous: Option<PathBuf>,
    }

    impl OverrideGuard {
        pub(crate) fn set(path: PathBuf) -> Self {
            let previous = BASE.with(|base| base.replace(Some(path)));
            Self { previous }
        }
    }

    impl Drop for OverrideGuard {
        fn drop(&mut self) {
            let previous = self.previous.take();
            BASE.with(|base| base.replace(previous));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn layout_is_nested_under_base() {
        let dirs = AppDirs::under("/srv/config");
        assert_eq!(dirs.root(), Path::new("/srv/config/.wavescope"));
        assert_eq!(dirs.logs(), PathBuf::from("/srv/config/.wavescope/logs"));
    }

    #[test]
    fn locate_follows_override_and_creates_lazily() {
        let base = tempdir().unwrap();
        let _guard = OverrideGuard::set(base.path().to_path_buf());
        let dirs = AppDirs::locate().unwrap();
        assert_eq!(dirs, AppDirs::under(base.path()));
        assert!(!dirs.root().exists());

        let logs = dirs.create_logs().unwrap();
        assert!(logs.is_dir());
        assert_eq!(dirs.create_root().unwrap(), base.path().join(APP_DIR_NAME));
    }

    #[test]
    fn guard_restores_previous_base() {
        let outer = tempdir().unwrap();
        let inner = tempdir().unwrap();
        let _outer = OverrideGuard::set(outer.path().to_path_buf());
        {
            let _inner = OverrideGuard::set(inner.path().to_path_buf());
            assert_eq!(AppDirs::locate().unwrap(), AppDirs::under(inner.path()));
        }
        assert_eq!(AppDirs::locate().unwrap(), AppDirs::under(outer.path()));
    }
}
