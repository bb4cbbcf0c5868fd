// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use quickshot::Config;
use quickshot::backends::camera::CameraFacing;
use quickshot::config::AppTheme;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.app_theme, AppTheme::System);
    assert_eq!(
        config.preferred_facing,
        CameraFacing::Back,
        "The capture view should wait for the back camera by default"
    );
    assert!(config.accept_external_cameras);
    assert!(!config.mirror_preview, "Photos are reviewed unmirrored");
}

#[test]
fn test_flash_settle_default() {
    // The flash is lit for one second before the frame is grabbed
    assert_eq!(Config::default().flash_settle_ms, 1000);
}

#[test]
fn test_config_serde_roundtrip() {
    let config = Config {
        preferred_facing: CameraFacing::Front,
        mirror_preview: true,
        ..Config::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}
