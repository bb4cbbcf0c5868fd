// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::CameraFacing;
use cosmic::cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use cosmic::{Theme, theme};
use serde::{Deserialize, Serialize};

/// Application theme preference
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum AppTheme {
    /// Follow system theme (dark or light based on system setting)
    #[default]
    System,
    /// Always use dark theme
    Dark,
    /// Always use light theme
    Light,
}

impl AppTheme {
    /// Get the COSMIC theme for this app theme preference
    pub fn theme(&self) -> Theme {
        match self {
            Self::Dark => {
                let mut theme = theme::system_dark();
                theme.theme_type.prefer_dark(Some(true));
                theme
            }
            Self::Light => {
                let mut theme = theme::system_light();
                theme.theme_type.prefer_dark(Some(false));
                theme
            }
            Self::System => theme::system_preference(),
        }
    }
}

#[derive(Debug, Clone, CosmicConfigEntry, Eq, PartialEq, Serialize, Deserialize)]
#[version = 1]
pub struct Config {
    /// Application theme preference (System, Dark, Light)
    pub app_theme: AppTheme,
    /// Which camera the capture view waits for
    pub preferred_facing: CameraFacing,
    /// Let cameras without a reported facing (USB webcams) satisfy the preference
    pub accept_external_cameras: bool,
    /// Mirror camera preview horizontally
    pub mirror_preview: bool,
    /// How long the flash is lit before the frame is grabbed
    pub flash_settle_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_theme: AppTheme::default(),
            preferred_facing: CameraFacing::Back,
            accept_external_cameras: true,
            mirror_preview: false,
            flash_settle_ms: 1000,
        }
    }
}
