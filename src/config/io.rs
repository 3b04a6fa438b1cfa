use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_dirs::{AppDirError, AppDirs};

use super::{CONFIG_FILE_NAME, ConfigError, VisualizerSettings};

/// Resolve the settings file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let root = AppDirs::locate()
        .and_then(|dirs| dirs.create_root())
        .map_err(map_app_dir_error)?;
    Ok(root.join(CONFIG_FILE_NAME))
}

/// Load settings from the application directory, returning defaults if missing.
pub fn load_or_default() -> Result<VisualizerSettings, ConfigError> {
    load_from(&config_path()?)
}

/// Load settings from a specific file, returning defaults if it does not exist.
pub fn load_from(path: &Path) -> Result<VisualizerSettings, ConfigError> {
    if !path.exists() {
        tracing::debug!("No settings at {}; using defaults", path.display());
        return Ok(VisualizerSettings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: VisualizerSettings =
        toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(settings.normalized())
}

/// Persist settings to the application directory.
pub fn save(settings: &VisualizerSettings) -> Result<(), ConfigError> {
    save_to_path(settings, &config_path()?)
}

/// Write settings atomically, creating parent directories as needed.
pub fn save_to_path(settings: &VisualizerSettings, path: &Path) -> Result<(), ConfigError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let data = toml::to_string_pretty(settings).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    let write_err = |source: std::io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    temp.write_all(data.as_bytes()).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|err| write_err(err.error))?;
    Ok(())
}

fn map_app_dir_error(error: AppDirError) -> ConfigError {
    match error {
        AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_dirs::{APP_DIR_NAME, OverrideGuard};
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, VisualizerSettings::default());
    }

    #[test]
    fn save_then_load_preserves_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let mut settings = VisualizerSettings::default();
        settings.layout.margin_left = 72;
        settings.spectrum.max_bars = 64;
        settings.palette.playhead = [1, 2, 3];

        save_to_path(&settings, &path).unwrap();
        let loaded = load_from(&path).unwrap();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn invalid_toml_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "layout = [").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { path: p, .. } if p == path));
    }

    #[test]
    fn load_or_default_uses_app_directory() {
        let base = tempdir().unwrap();
        let _guard = OverrideGuard::set(base.path().to_path_buf());
        let expected = base.path().join(APP_DIR_NAME).join(CONFIG_FILE_NAME);
        assert_eq!(config_path().unwrap(), expected);

        let mut settings = VisualizerSettings::default();
        settings.axes.max_time_ticks = 6;
        save(&settings).unwrap();
        assert_eq!(load_or_default().unwrap().axes.max_time_ticks, 6);
    }
}
