// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// UI Constants
pub mod ui {
    /// Default action button diameter
    pub const ACTION_BUTTON_SIZE: f32 = 70.0;

    /// Flash toggle diameter
    pub const FLASH_BUTTON_SIZE: f32 = 50.0;

    /// Glyph size relative to the button diameter
    pub const GLYPH_SCALE: f32 = 0.6;

    /// Border width of the blank capture trigger
    pub const CAPTURE_TRIGGER_BORDER: f32 = 5.0;

    /// Fill of the blank capture trigger (#F7F7F7)
    pub const CAPTURE_TRIGGER_FILL: [f32; 3] = [0.969, 0.969, 0.969];

    /// Focus marker diameter
    pub const FOCUS_MARKER_SIZE: f32 = 60.0;

    /// Focus marker ring width
    pub const FOCUS_MARKER_BORDER: f32 = 2.0;

    /// Padding around the flash toggle row
    pub const TOP_BAR_PADDING: u16 = 20;

    /// Horizontal padding of the bottom button row
    pub const BOTTOM_BAR_PADDING_X: u16 = 40;

    /// Distance of the bottom button row from the window edge
    pub const BOTTOM_BAR_OFFSET: u16 = 40;

    /// Loading spinner size
    pub const SPINNER_SIZE: f32 = 50.0;
}

/// GStreamer pipeline constants
pub mod pipeline {
    /// Maximum buffer queue size (keep small for low latency)
    pub const MAX_BUFFERS: u32 = 2;

    /// Output pixel format for appsink
    pub const OUTPUT_FORMAT: &str = "RGBA";
}

/// Timing constants
pub mod timing {
    use super::Duration;

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;

    /// Pipeline state change timeout on stop
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// Pipeline playing state timeout on start
    pub const START_TIMEOUT_SECS: u64 = 5;

    /// Interval between camera list scans while the capture view is mounted
    pub const HOTPLUG_POLL_INTERVAL: Duration = Duration::from_secs(2);

    /// Delay before retrying a preview pipeline that failed to start
    pub const PIPELINE_RETRY_DELAY: Duration = Duration::from_secs(5);

    /// Poll interval while waiting for one-shot autofocus to settle
    pub const FOCUS_POLL_INTERVAL: Duration = Duration::from_millis(50);

    /// Number of autofocus status polls before giving up
    pub const FOCUS_POLL_ATTEMPTS: u32 = 60;

    /// Headless capture: time to let exposure settle before grabbing
    pub const CLI_WARMUP: Duration = Duration::from_millis(500);

    /// Headless capture: give up if no frame arrives
    pub const CLI_FRAME_TIMEOUT: Duration = Duration::from_secs(5);
}

/// Photo output constants
pub mod photo {
    /// JPEG quality for captured stills
    pub const JPEG_QUALITY: u8 = 92;

    /// Subdirectory of the cache directory holding transient captures
    pub const CAPTURE_SUBDIR: &str = "captures";
}

/// Application information utilities
pub mod app_info {
    use std::path::Path;

    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }

    /// Check if the application is running inside a Flatpak sandbox
    pub fn is_flatpak() -> bool {
        Path::new("/.flatpak-info").exists()
    }
}
