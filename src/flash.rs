// SPDX-License-Identifier: GPL-3.0-only

//! Flash mode and hardware flash LED control via Linux sysfs
//!
//! Discovers and controls flash LEDs exposed at `/sys/class/leds/*:flash`.
//! Uses torch mode (brightness file) which is group-writable by `feedbackd`,
//! avoiding the root-only `flash_strobe`/`flash_brightness` interface.

use serde::{Deserialize, Serialize};
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default sysfs directory holding LED class devices
const LEDS_DIR: &str = "/sys/class/leds";

/// Flash setting chosen in the live preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlashMode {
    /// Flash stays dark
    #[default]
    Off,
    /// Flash fires during photo capture
    On,
}

impl FlashMode {
    /// Flip between Off and On
    pub fn toggled(self) -> Self {
        match self {
            FlashMode::Off => FlashMode::On,
            FlashMode::On => FlashMode::Off,
        }
    }

    pub fn is_on(self) -> bool {
        self == FlashMode::On
    }
}

/// A flash LED device discovered via sysfs
#[derive(Debug, Clone)]
pub struct FlashDevice {
    /// Sysfs path, e.g. `/sys/class/leds/white:flash`
    path: PathBuf,
    /// Maximum brightness value (from `max_brightness` file)
    max_brightness: u32,
    /// Human-readable name (directory basename)
    name: String,
}

impl FlashDevice {
    /// Get the device name (e.g. "white:flash")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set raw brightness value (0 = off, max_brightness = full)
    pub fn set_brightness(&self, value: u32) -> io::Result<()> {
        let clamped = value.min(self.max_brightness);
        std::fs::write(self.path.join("brightness"), clamped.to_string())
    }

    /// Turn off the LED
    pub fn off(&self) -> io::Result<()> {
        self.set_brightness(0)
    }

    /// Turn on at a fraction of max brightness (0.0 = off, 1.0 = full)
    pub fn torch(&self, intensity: f32) -> io::Result<()> {
        let clamped = intensity.clamp(0.0, 1.0);
        let value = (clamped * self.max_brightness as f32).round() as u32;
        self.set_brightness(value)
    }
}

/// Result of hardware flash detection.
///
/// Separates "hardware exists" from "we can control it" so the UI can log
/// a helpful permission hint instead of silently falling back to screen flash.
#[derive(Debug, Clone, Default)]
pub struct FlashHardware {
    /// Devices we can actually control (writable)
    pub devices: Vec<FlashDevice>,
    /// User-facing error if hardware was found but not writable
    pub permission_error: Option<String>,
}

impl FlashHardware {
    /// Scan `/sys/class/leds/` for `*:flash` entries.
    pub fn detect() -> FlashHardware {
        Self::detect_in(Path::new(LEDS_DIR))
    }

    /// Scan an LED class directory for `*:flash` entries.
    pub fn detect_in(leds_dir: &Path) -> FlashHardware {
        let Ok(entries) = std::fs::read_dir(leds_dir) else {
            warn!(dir = %leds_dir.display(), "Cannot read LED directory, flash discovery skipped");
            return FlashHardware::default();
        };

        let mut devices = Vec::new();
        let mut permission_failures: Vec<PathBuf> = Vec::new();

        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name_str) = name.to_str() else {
                continue;
            };

            // Match entries like "white:flash", "yellow:flash"
            if !name_str.ends_with(":flash") {
                continue;
            }

            let led_path = entry.path();
            let brightness_path = led_path.join("brightness");
            let max_brightness_path = led_path.join("max_brightness");

            let max_brightness = match std::fs::read_to_string(&max_brightness_path) {
                Ok(s) => match s.trim().parse::<u32>() {
                    Ok(v) if v > 0 => v,
                    _ => {
                        warn!(path = %max_brightness_path.display(), "Invalid max_brightness value");
                        continue;
                    }
                },
                Err(e) => {
                    warn!(
                        path = %max_brightness_path.display(),
                        error = %e,
                        "Cannot read max_brightness"
                    );
                    continue;
                }
            };

            match std::fs::OpenOptions::new()
                .write(true)
                .open(&brightness_path)
            {
                Ok(_) => {
                    info!(name = name_str, max_brightness, "Discovered flash LED");
                    devices.push(FlashDevice {
                        path: led_path,
                        max_brightness,
                        name: name_str.to_string(),
                    });
                }
                Err(_) => {
                    warn!(path = %brightness_path.display(), "Flash LED found but not writable");
                    permission_failures.push(brightness_path);
                }
            }
        }

        // Deterministic ordering (white before yellow)
        devices.sort_by(|a, b| a.name.cmp(&b.name));

        let permission_error = if !permission_failures.is_empty() && devices.is_empty() {
            Some(Self::build_permission_error(&permission_failures))
        } else {
            None
        };

        FlashHardware {
            devices,
            permission_error,
        }
    }

    /// Whether any controllable flash devices were found
    pub fn has_devices(&self) -> bool {
        !self.devices.is_empty()
    }

    /// Turn on every LED at full brightness
    pub fn all_on(&self) {
        for dev in &self.devices {
            if let Err(e) = dev.torch(1.0) {
                warn!(device = %dev.name, error = %e, "Failed to turn on flash LED");
            }
        }
    }

    /// Turn off every LED
    pub fn all_off(&self) {
        for dev in &self.devices {
            if let Err(e) = dev.off() {
                warn!(device = %dev.name, error = %e, "Failed to turn off flash LED");
            }
        }
    }

    /// Build a permission hint naming the group that owns the brightness file.
    fn build_permission_error(failures: &[PathBuf]) -> String {
        let username = std::env::var("USER").unwrap_or_else(|_| "user".to_string());

        let escalation_tool = if Path::new("/usr/bin/doas").exists() {
            "doas"
        } else {
            "sudo"
        };

        let group = failures
            .first()
            .and_then(|path| {
                let gid = std::fs::metadata(path).ok()?.gid();
                let group_contents = std::fs::read_to_string("/etc/group").ok()?;
                group_contents.lines().find_map(|line| {
                    let parts: Vec<&str> = line.split(':').collect();
                    (parts.len() >= 3 && parts[2].parse::<u32>().ok() == Some(gid))
                        .then(|| parts[0].to_string())
                })
            })
            .unwrap_or_else(|| "feedbackd".to_string());

        format!(
            "Flash LEDs detected but cannot be controlled. \
             Run: {escalation_tool} adduser {username} {group}, then log out and back in."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_leds_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("quickshot-leds-{}", uuid::Uuid::new_v4()));
        let led = dir.join("white:flash");
        std::fs::create_dir_all(&led).unwrap();
        std::fs::write(led.join("max_brightness"), "255\n").unwrap();
        std::fs::write(led.join("brightness"), "0\n").unwrap();
        // Non-flash LEDs are ignored
        let other = dir.join("input0::capslock");
        std::fs::create_dir_all(&other).unwrap();
        std::fs::write(other.join("max_brightness"), "1\n").unwrap();
        dir
    }

    #[test]
    fn test_flash_mode_toggle() {
        assert_eq!(FlashMode::default(), FlashMode::Off);
        assert_eq!(FlashMode::Off.toggled(), FlashMode::On);
        assert_eq!(FlashMode::On.toggled(), FlashMode::Off);
        assert!(FlashMode::On.is_on());
    }

    #[test]
    fn test_detect_and_drive_fake_led() {
        let dir = fake_leds_dir();
        let hardware = FlashHardware::detect_in(&dir);
        assert_eq!(hardware.devices.len(), 1);
        assert_eq!(hardware.devices[0].name(), "white:flash");
        assert!(hardware.permission_error.is_none());

        hardware.all_on();
        let value = std::fs::read_to_string(dir.join("white:flash/brightness")).unwrap();
        assert_eq!(value, "255");

        hardware.devices[0].set_brightness(1000).unwrap();
        let value = std::fs::read_to_string(dir.join("white:flash/brightness")).unwrap();
        assert_eq!(value, "255", "brightness is clamped to max_brightness");

        hardware.all_off();
        let value = std::fs::read_to_string(dir.join("white:flash/brightness")).unwrap();
        assert_eq!(value, "0");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_leds_dir() {
        let hardware = FlashHardware::detect_in(Path::new("/nonexistent/quickshot/leds"));
        assert!(!hardware.has_devices());
        assert!(hardware.permission_error.is_none());
    }
}
