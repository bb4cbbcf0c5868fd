// SPDX-License-Identifier: GPL-3.0-only

//! Tap-to-focus
//!
//! V4L2 has no generic point-of-interest control, so a tap runs a one-shot
//! autofocus scan and waits for the driver to report the result. Drivers
//! that only expose continuous autofocus get it toggled off and on, which
//! restarts their search.

use super::types::CameraDevice;
use super::v4l2_controls::{
    self, AutoFocusStatus, V4L2_CID_AUTO_FOCUS_START, V4L2_CID_AUTO_FOCUS_STOP,
    V4L2_CID_FOCUS_AUTO,
};
use crate::constants::timing;
use crate::errors::CameraError;
use tracing::{debug, info, warn};

/// Tap position in preview widget coordinates (logical pixels)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FocusPoint {
    pub x: f32,
    pub y: f32,
}

impl FocusPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Probe whether a V4L2 node can be focused on request
pub fn probe_focus_support(v4l2_path: Option<&str>) -> bool {
    v4l2_path.is_some_and(v4l2_controls::supports_autofocus)
}

/// How a node can be asked to focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusMethod {
    /// `V4L2_CID_AUTO_FOCUS_START` scan with status polling
    OneShot,
    /// Continuous autofocus that restarts when toggled
    Continuous,
    Unsupported,
}

fn focus_method(path: &str) -> FocusMethod {
    if v4l2_controls::has_control(path, V4L2_CID_AUTO_FOCUS_START) {
        FocusMethod::OneShot
    } else if v4l2_controls::has_control(path, V4L2_CID_FOCUS_AUTO) {
        FocusMethod::Continuous
    } else {
        FocusMethod::Unsupported
    }
}

/// Run device ioctls off the async executor
async fn blocking<T, F>(work: F) -> Result<T, CameraError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CameraError::FocusFailed(format!("focus task failed: {}", e)))
}

/// Focus the camera for a tap at `point`.
///
/// Resolves once the driver reports the lens settled, or with an error when
/// the scan fails or does not settle in time.
pub async fn focus_at(device: CameraDevice, point: FocusPoint) -> Result<(), CameraError> {
    let Some(path) = device.v4l2_path().map(str::to_owned) else {
        return Err(CameraError::FocusUnsupported);
    };

    info!(device = %device.name, x = point.x, y = point.y, "Focus requested");

    let method = {
        let path = path.clone();
        blocking(move || focus_method(&path)).await?
    };

    match method {
        FocusMethod::OneShot => one_shot_scan(path).await,
        FocusMethod::Continuous => {
            let restart_path = path.clone();
            blocking(move || {
                v4l2_controls::set_control(&restart_path, V4L2_CID_FOCUS_AUTO, 0).and_then(|_| {
                    v4l2_controls::set_control(&restart_path, V4L2_CID_FOCUS_AUTO, 1)
                })
            })
            .await?
            .map_err(CameraError::FocusFailed)?;
            debug!(path = %path, "Restarted continuous autofocus");
            Ok(())
        }
        FocusMethod::Unsupported => Err(CameraError::FocusUnsupported),
    }
}

async fn one_shot_scan(path: String) -> Result<(), CameraError> {
    {
        let path = path.clone();
        blocking(move || v4l2_controls::set_control(&path, V4L2_CID_AUTO_FOCUS_START, 1))
            .await?
            .map_err(CameraError::FocusFailed)?;
    }

    for attempt in 0..timing::FOCUS_POLL_ATTEMPTS {
        tokio::time::sleep(timing::FOCUS_POLL_INTERVAL).await;

        let status = {
            let path = path.clone();
            blocking(move || v4l2_controls::autofocus_status(&path)).await?
        };
        match status {
            Some(AutoFocusStatus::Busy) => continue,
            Some(AutoFocusStatus::Reached) => {
                debug!(path = %path, attempt, "Autofocus reached");
                return Ok(());
            }
            Some(AutoFocusStatus::Failed) => {
                return Err(CameraError::FocusFailed(
                    "driver reported autofocus failure".to_string(),
                ));
            }
            // Driver does not report progress
            Some(AutoFocusStatus::Idle) | None => return Ok(()),
        }
    }

    let stop_path = path.clone();
    if let Err(e) =
        blocking(move || v4l2_controls::set_control(&stop_path, V4L2_CID_AUTO_FOCUS_STOP, 1))
            .await?
    {
        warn!(path = %path, error = %e, "Failed to abort autofocus scan");
    }
    Err(CameraError::FocusFailed(
        "autofocus did not settle".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::{CameraFacing, DeviceInfo, SensorRotation};

    #[tokio::test]
    async fn test_focus_without_v4l2_node_is_unsupported() {
        let device = CameraDevice {
            name: "Virtual".to_string(),
            path: "pipewire-serial-1".to_string(),
            node_id: None,
            device_info: None,
            rotation: SensorRotation::None,
            facing: CameraFacing::External,
            supports_focus: false,
        };

        let result = focus_at(device, FocusPoint::new(10.0, 10.0)).await;
        assert!(matches!(result, Err(CameraError::FocusUnsupported)));
    }

    #[test]
    fn test_probe_without_path() {
        assert!(!probe_focus_support(None));
    }

    #[test]
    fn test_missing_node_has_no_focus_method() {
        assert_eq!(
            focus_method("/nonexistent/quickshot-video99"),
            FocusMethod::Unsupported
        );
    }

    #[tokio::test]
    async fn test_focus_on_missing_node_is_unsupported() {
        let device = CameraDevice {
            name: "Unplugged".to_string(),
            path: "pipewire-serial-2".to_string(),
            node_id: None,
            device_info: Some(DeviceInfo {
                card: "Unplugged".to_string(),
                driver: "uvcvideo".to_string(),
                path: "/nonexistent/quickshot-video99".to_string(),
                real_path: "/nonexistent/quickshot-video99".to_string(),
            }),
            rotation: SensorRotation::None,
            facing: CameraFacing::External,
            supports_focus: true,
        };

        let result = focus_at(device, FocusPoint::new(5.0, 5.0)).await;
        assert!(matches!(result, Err(CameraError::FocusUnsupported)));
    }
}
