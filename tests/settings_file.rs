mod support;

use support::config_env::ConfigHomeGuard;
use wavescope::config::{self, CONFIG_FILE_NAME, VisualizerSettings};

#[test]
fn saved_settings_round_trip_through_config_home() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let _guard = ConfigHomeGuard::set(temp.path().to_path_buf());

    let mut settings = VisualizerSettings::default();
    settings.spectrum.max_bars = 64;
    settings.live_tap.fft_size = 1024;
    settings.palette.playhead = [255, 0, 0];
    config::save(&settings).expect("save settings");

    let path = config::config_path().expect("config path");
    assert_eq!(path, temp.path().join(".wavescope").join(CONFIG_FILE_NAME));
    assert!(path.is_file());
    assert_eq!(config::load_or_default().expect("load settings"), settings);
}

#[test]
fn missing_file_yields_defaults() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let _guard = ConfigHomeGuard::set(temp.path().to_path_buf());
    assert_eq!(
        config::load_or_default().expect("load settings"),
        VisualizerSettings::default()
    );
}

#[test]
fn malformed_file_reports_parse_error() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let path = temp.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[layout\nmargin_left = ").expect("write settings");
    let err = config::load_from(&path).unwrap_err();
    assert!(err.to_string().contains(CONFIG_FILE_NAME));
}
