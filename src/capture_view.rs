// SPDX-License-Identifier: GPL-3.0-only

//! Capture view state machine
//!
//! Pure state: no I/O happens here. Methods that need the platform (capture,
//! focus) hand back a request for the caller to run, and the caller reports
//! the result through the matching `finish_*` method.
//!
//! ```text
//!                 device appears
//! AwaitingDevice ───────────────▶ LivePreview ◀──── discard ────┐
//!        ▲                          │   ▲                        │
//!        │ device lost              │   │ capture failed         │
//!        └──────────────────────────┤   └──────┐                 │
//!                                   │ capture  │                 │
//!                                   ▼ ok       │                 │
//!                                 ReviewPhoto ─┴─────────────────┘
//!                                   │
//!                                   │ accept → completion callback, close
//! ```

use crate::backends::camera::{CameraDevice, CameraFacing, FocusPoint};
use crate::constants::ui;
use crate::errors::{CameraError, PhotoError};
use crate::flash::FlashMode;
use crate::pipelines::photo::{CaptureOutcome, file_name_of};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// A captured photo as handed to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoDescriptor {
    /// `file://` URI of the image
    pub uri: String,
    pub file_name: String,
    pub height: u32,
    pub width: u32,
}

impl PhotoDescriptor {
    /// Describe a capture; `None` when the platform returned no path
    pub fn from_outcome(outcome: &CaptureOutcome) -> Option<Self> {
        if outcome.path.is_empty() {
            return None;
        }
        Some(Self {
            uri: format!("file://{}", outcome.path),
            file_name: file_name_of(Path::new(&outcome.path)),
            height: outcome.height,
            width: outcome.width,
        })
    }
}

/// Receives accepted photos
pub type CompletionCallback = Arc<dyn Fn(Vec<PhotoDescriptor>) + Send + Sync>;

/// Where the focus ring is drawn, in preview coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusMarker {
    /// Top-left corner of the marker
    pub left: f32,
    pub top: f32,
    pub size: f32,
}

impl FocusMarker {
    /// Center a marker on `point`, clamped so it never starts off-screen
    pub fn centered_on(point: FocusPoint) -> Self {
        let size = ui::FOCUS_MARKER_SIZE;
        Self {
            left: (point.x - size / 2.0).max(0.0),
            top: (point.y - size / 2.0).max(0.0),
            size,
        }
    }
}

/// Which camera the view waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevicePreference {
    pub facing: CameraFacing,
    /// Fall back to an external camera when none faces the preferred way
    pub accept_external: bool,
}

impl Default for DevicePreference {
    fn default() -> Self {
        Self {
            facing: CameraFacing::Back,
            accept_external: true,
        }
    }
}

impl DevicePreference {
    /// Pick the camera to use from `devices`
    pub fn select<'a>(&self, devices: &'a [CameraDevice]) -> Option<&'a CameraDevice> {
        devices
            .iter()
            .find(|device| device.facing == self.facing)
            .or_else(|| {
                self.accept_external
                    .then(|| {
                        devices
                            .iter()
                            .find(|device| device.facing == CameraFacing::External)
                    })
                    .flatten()
            })
    }
}

/// What the capture view is showing
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// Waiting for a usable camera
    AwaitingDevice,
    /// Live feed with capture, flash and tap-to-focus
    LivePreview {
        device: CameraDevice,
        flash: FlashMode,
        focus_marker: Option<FocusMarker>,
    },
    /// Showing a captured photo for accept or discard
    ReviewPhoto {
        device: CameraDevice,
        flash: FlashMode,
        photo: PhotoDescriptor,
    },
}

/// Identifies one capture request across every view the process mounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureId(u64);

impl CaptureId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        CaptureId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Capture the platform should perform
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    /// Hand back to `finish_capture` with the result
    pub id: CaptureId,
    pub device: CameraDevice,
    pub flash: FlashMode,
    pub skip_metadata: bool,
}

/// Focus operation the platform should perform
#[derive(Debug, Clone, PartialEq)]
pub struct FocusRequest {
    pub device: CameraDevice,
    pub point: FocusPoint,
}

/// The capture view
pub struct CaptureView {
    state: ViewState,
    preference: DevicePreference,
    view_focused: bool,
    foreground: bool,
    closed: bool,
    /// The only capture whose result may still enter review
    awaited_capture: Option<CaptureId>,
    on_complete: CompletionCallback,
}

impl std::fmt::Debug for CaptureView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureView")
            .field("state", &self.state)
            .field("preference", &self.preference)
            .field("view_focused", &self.view_focused)
            .field("foreground", &self.foreground)
            .field("closed", &self.closed)
            .field("awaited_capture", &self.awaited_capture)
            .finish()
    }
}

impl CaptureView {
    /// A freshly mounted view: no device yet, flash off
    pub fn new(preference: DevicePreference, on_complete: CompletionCallback) -> Self {
        Self {
            state: ViewState::AwaitingDevice,
            preference,
            view_focused: true,
            foreground: true,
            closed: false,
            awaited_capture: None,
            on_complete,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Camera in use, if any
    pub fn device(&self) -> Option<&CameraDevice> {
        match &self.state {
            ViewState::AwaitingDevice => None,
            ViewState::LivePreview { device, .. } | ViewState::ReviewPhoto { device, .. } => {
                Some(device)
            }
        }
    }

    /// Photo under review
    pub fn photo(&self) -> Option<&PhotoDescriptor> {
        match &self.state {
            ViewState::ReviewPhoto { photo, .. } => Some(photo),
            _ => None,
        }
    }

    /// Current flash setting, `None` while no device is resolved
    pub fn flash(&self) -> Option<FlashMode> {
        match &self.state {
            ViewState::AwaitingDevice => None,
            ViewState::LivePreview { flash, .. } | ViewState::ReviewPhoto { flash, .. } => {
                Some(*flash)
            }
        }
    }

    pub fn focus_marker(&self) -> Option<FocusMarker> {
        match &self.state {
            ViewState::LivePreview { focus_marker, .. } => *focus_marker,
            _ => None,
        }
    }

    /// The accepted photo was delivered; the host should unmount the view
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether the live feed should be running
    pub fn preview_active(&self) -> bool {
        !self.closed
            && self.view_focused
            && self.foreground
            && matches!(self.state, ViewState::LivePreview { .. })
    }

    pub fn set_preference(&mut self, preference: DevicePreference) {
        self.preference = preference;
    }

    /// The window gained or lost keyboard focus
    pub fn set_view_focused(&mut self, focused: bool) {
        self.view_focused = focused;
    }

    /// The application moved to or from the foreground
    pub fn set_foreground(&mut self, foreground: bool) {
        self.foreground = foreground;
    }

    /// Feed the current camera list
    pub fn devices_changed(&mut self, devices: &[CameraDevice]) {
        if self.closed {
            return;
        }

        if let Some(current) = self.device()
            && !devices.iter().any(|d| d.path == current.path)
        {
            info!(device = %current.name, "Active camera disappeared");
            self.state = ViewState::AwaitingDevice;
            self.awaited_capture = None;
        }

        if self.state == ViewState::AwaitingDevice
            && let Some(device) = self.preference.select(devices)
        {
            info!(device = %device.name, facing = %device.facing, "Camera resolved");
            self.state = ViewState::LivePreview {
                device: device.clone(),
                flash: FlashMode::Off,
                focus_marker: None,
            };
        }
    }

    /// Capture button pressed.
    ///
    /// A newer press supersedes an older one: only the latest request's
    /// result is taken.
    pub fn press_capture(&mut self) -> Option<CaptureRequest> {
        if self.closed {
            return None;
        }
        let ViewState::LivePreview { device, flash, .. } = &self.state else {
            return None;
        };

        let request = CaptureRequest {
            id: CaptureId::next(),
            device: device.clone(),
            flash: *flash,
            skip_metadata: true,
        };
        self.awaited_capture = Some(request.id);
        Some(request)
    }

    /// Report the result of the capture request `id`
    pub fn finish_capture(&mut self, id: CaptureId, result: Result<CaptureOutcome, PhotoError>) {
        if self.closed {
            return;
        }
        if self.awaited_capture != Some(id) {
            debug!(?id, "Result of a stale capture, ignoring");
            return;
        }
        self.awaited_capture = None;
        let ViewState::LivePreview { device, flash, .. } = &self.state else {
            debug!("Capture result arrived outside live preview, ignoring");
            return;
        };

        let photo = match result.as_ref().map(PhotoDescriptor::from_outcome) {
            Ok(Some(photo)) => photo,
            Ok(None) => {
                debug!("Capture returned no file");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Capture failed");
                return;
            }
        };

        info!(file = %photo.file_name, width = photo.width, height = photo.height, "Photo captured");
        self.state = ViewState::ReviewPhoto {
            device: device.clone(),
            flash: *flash,
            photo,
        };
    }

    /// Flash button pressed
    pub fn toggle_flash(&mut self) {
        if let ViewState::LivePreview { flash, .. } = &mut self.state {
            *flash = flash.toggled();
            debug!(?flash, "Flash toggled");
        }
    }

    /// Preview tapped at `point`
    pub fn tap_preview(&mut self, point: FocusPoint) -> Option<FocusRequest> {
        if self.closed {
            return None;
        }
        match &mut self.state {
            ViewState::LivePreview {
                device,
                focus_marker,
                ..
            } if device.supports_focus => {
                *focus_marker = Some(FocusMarker::centered_on(point));
                Some(FocusRequest {
                    device: device.clone(),
                    point,
                })
            }
            _ => None,
        }
    }

    /// Report the result of a focus request; the marker goes away either way
    pub fn finish_focus(&mut self, result: Result<(), CameraError>) {
        if let Err(e) = result {
            warn!(error = %e, "Focus failed");
        }
        if let ViewState::LivePreview { focus_marker, .. } = &mut self.state {
            *focus_marker = None;
        }
    }

    /// Keep the photo: deliver it once and close
    pub fn accept(&mut self) -> bool {
        if self.closed {
            return false;
        }
        let ViewState::ReviewPhoto { .. } = self.state else {
            return false;
        };

        if let ViewState::ReviewPhoto { photo, .. } =
            std::mem::replace(&mut self.state, ViewState::AwaitingDevice)
        {
            info!(file = %photo.file_name, "Photo accepted");
            self.closed = true;
            (self.on_complete)(vec![photo]);
        }
        true
    }

    /// Drop the photo and go back to the live preview
    pub fn discard(&mut self) {
        if let ViewState::ReviewPhoto { device, flash, photo } = &self.state {
            debug!(file = %photo.file_name, "Photo discarded");
            self.state = ViewState::LivePreview {
                device: device.clone(),
                flash: *flash,
                focus_marker: None,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::SensorRotation;

    fn camera(path: &str, facing: CameraFacing) -> CameraDevice {
        CameraDevice {
            name: path.to_string(),
            path: path.to_string(),
            node_id: None,
            device_info: None,
            rotation: SensorRotation::None,
            facing,
            supports_focus: true,
        }
    }

    #[test]
    fn test_marker_clamped_to_origin() {
        let marker = FocusMarker::centered_on(FocusPoint::new(10.0, 100.0));
        assert_eq!(marker.left, 0.0);
        assert_eq!(marker.top, 70.0);
        assert_eq!(marker.size, 60.0);
    }

    #[test]
    fn test_preference_selection() {
        let devices = vec![
            camera("front", CameraFacing::Front),
            camera("usb", CameraFacing::External),
        ];
        let back = DevicePreference::default();
        assert_eq!(back.select(&devices).map(|d| d.path.as_str()), Some("usb"));

        let strict = DevicePreference {
            facing: CameraFacing::Back,
            accept_external: false,
        };
        assert!(strict.select(&devices).is_none());

        let front = DevicePreference {
            facing: CameraFacing::Front,
            accept_external: false,
        };
        assert_eq!(front.select(&devices).map(|d| d.path.as_str()), Some("front"));
    }

    #[test]
    fn test_device_loss_returns_to_awaiting() {
        let mut view = CaptureView::new(DevicePreference::default(), Arc::new(|_| {}));
        view.devices_changed(&[camera("back", CameraFacing::Back)]);
        assert!(view.device().is_some());

        view.devices_changed(&[]);
        assert_eq!(view.state(), &ViewState::AwaitingDevice);
        assert!(!view.preview_active());
    }

    #[test]
    fn test_descriptor_from_empty_path() {
        let outcome = CaptureOutcome {
            path: String::new(),
            width: 1,
            height: 1,
            metadata: None,
        };
        assert!(PhotoDescriptor::from_outcome(&outcome).is_none());
    }
}
