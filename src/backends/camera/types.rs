// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use gstreamer::buffer::{MappedBuffer, Readable};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Frame data storage - either pre-copied bytes or zero-copy GStreamer buffer
///
/// The `Mapped` variant keeps the GStreamer buffer mapped and alive until all
/// references are dropped, so preview frames reach the UI without a copy.
#[derive(Clone)]
pub enum FrameData {
    /// Pre-copied bytes (used for photo capture and tests)
    Copied(Arc<[u8]>),
    /// Zero-copy mapped GStreamer buffer
    Mapped(Arc<MappedBuffer<Readable>>),
}

impl FrameData {
    /// Create FrameData from a mapped GStreamer buffer (zero-copy)
    pub fn from_mapped_buffer(buffer: MappedBuffer<Readable>) -> Self {
        FrameData::Mapped(Arc::new(buffer))
    }

    /// Get the length of the frame data in bytes
    pub fn len(&self) -> usize {
        match self {
            FrameData::Copied(data) => data.len(),
            FrameData::Mapped(buf) => buf.len(),
        }
    }

    /// Check if the frame data is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for FrameData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameData::Copied(data) => write!(f, "FrameData::Copied({} bytes)", data.len()),
            FrameData::Mapped(buf) => write!(f, "FrameData::Mapped({} bytes)", buf.len()),
        }
    }
}

impl AsRef<[u8]> for FrameData {
    fn as_ref(&self) -> &[u8] {
        match self {
            FrameData::Copied(data) => data.as_ref(),
            FrameData::Mapped(buf) => buf.as_slice(),
        }
    }
}

impl std::ops::Deref for FrameData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_ref()
    }
}

/// Which way a camera points
///
/// Comes from libcamera's `api.libcamera.location` property. Plain V4L2
/// webcams don't report one and are treated as `External`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CameraFacing {
    Front,
    #[default]
    Back,
    External,
}

impl CameraFacing {
    /// Parse a location string ("front", "back", "external")
    pub fn from_location(location: &str) -> Self {
        match location.trim().to_ascii_lowercase().as_str() {
            "front" => CameraFacing::Front,
            "back" => CameraFacing::Back,
            _ => CameraFacing::External,
        }
    }

    pub const ALL: [CameraFacing; 3] = [
        CameraFacing::Back,
        CameraFacing::Front,
        CameraFacing::External,
    ];
}

impl std::fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraFacing::Front => write!(f, "front"),
            CameraFacing::Back => write!(f, "back"),
            CameraFacing::External => write!(f, "external"),
        }
    }
}

/// Device information from V4L2 capability
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Name of the device (V4L2 card)
    pub card: String,
    /// Driver name (V4L2 driver)
    pub driver: String,
    /// Device path (e.g., /dev/video0)
    pub path: String,
    /// Real device path (resolved symlinks)
    pub real_path: String,
}

/// Sensor rotation in degrees (clockwise)
///
/// Phone sensors are often mounted at 90° or 270° relative to the display.
/// The value comes from libcamera's `api.libcamera.rotation` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorRotation {
    #[default]
    None,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl SensorRotation {
    /// Parse rotation from a string value (degrees)
    pub fn from_degrees(degrees: &str) -> Self {
        match degrees.trim().parse::<i32>().map(|d| d.rem_euclid(360)) {
            Ok(90) => SensorRotation::Rotate90,
            Ok(180) => SensorRotation::Rotate180,
            Ok(270) => SensorRotation::Rotate270,
            _ => SensorRotation::None,
        }
    }

    /// Get the rotation in degrees
    pub fn degrees(&self) -> u32 {
        match self {
            SensorRotation::None => 0,
            SensorRotation::Rotate90 => 90,
            SensorRotation::Rotate180 => 180,
            SensorRotation::Rotate270 => 270,
        }
    }

    /// Check if rotation swaps width and height
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, SensorRotation::Rotate90 | SensorRotation::Rotate270)
    }
}

impl std::fmt::Display for SensorRotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    pub path: String,                    // PipeWire target (serial or node ID)
    pub node_id: Option<String>,         // PipeWire node ID for pw-cli queries
    pub device_info: Option<DeviceInfo>, // V4L2 device information (card, driver, path, real_path)
    pub rotation: SensorRotation,        // Sensor rotation from libcamera/device tree
    pub facing: CameraFacing,
    pub supports_focus: bool, // V4L2 node exposes a one-shot autofocus trigger
}

impl CameraDevice {
    /// V4L2 node used for control ioctls, if the camera has one
    pub fn v4l2_path(&self) -> Option<&str> {
        self.device_info.as_ref().map(|info| info.path.as_str())
    }
}

/// A single RGBA frame from the camera
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, rows `stride` bytes apart
    pub data: FrameData,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// Timestamp when frame was captured (for latency diagnostics)
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Convert to a frame with copied data (safe for background processing)
    ///
    /// Mapped GStreamer buffers become invalid when the pipeline is destroyed.
    pub fn to_copied(&self) -> Self {
        let data = match &self.data {
            FrameData::Copied(data) => FrameData::Copied(Arc::clone(data)),
            FrameData::Mapped(buffer) => {
                let slice: &[u8] = buffer.as_ref();
                FrameData::Copied(Arc::from(slice))
            }
        };

        Self {
            width: self.width,
            height: self.height,
            data,
            stride: self.stride,
            captured_at: self.captured_at,
        }
    }

    /// Tightly packed RGBA pixels with row padding removed
    pub fn packed_rgba(&self) -> Vec<u8> {
        let row_bytes = self.width as usize * 4;
        let stride = self.stride as usize;
        if stride == row_bytes {
            return self.data.to_vec();
        }

        let mut packed = Vec::with_capacity(row_bytes * self.height as usize);
        for row in self.data.chunks(stride).take(self.height as usize) {
            packed.extend_from_slice(&row[..row_bytes.min(row.len())]);
        }
        packed
    }
}

/// Frame sender type for preview streams
pub type FrameSender = cosmic::iced::futures::channel::mpsc::Sender<CameraFrame>;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone)]
pub enum BackendError {
    /// Backend is not available on this system
    NotAvailable(String),
    /// Failed to initialize backend
    InitializationFailed(String),
    /// Camera device not found
    DeviceNotFound(String),
    /// General I/O error
    IoError(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::IoError(msg) => write!(f, "I/O error: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<BackendError> for crate::errors::CameraError {
    fn from(err: BackendError) -> Self {
        crate::errors::CameraError::BackendError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_from_location() {
        assert_eq!(CameraFacing::from_location("front"), CameraFacing::Front);
        assert_eq!(CameraFacing::from_location(" Back "), CameraFacing::Back);
        assert_eq!(CameraFacing::from_location("external"), CameraFacing::External);
        assert_eq!(CameraFacing::from_location(""), CameraFacing::External);
    }

    #[test]
    fn test_rotation_parsing() {
        assert_eq!(SensorRotation::from_degrees("90"), SensorRotation::Rotate90);
        assert_eq!(SensorRotation::from_degrees("-90"), SensorRotation::Rotate270);
        assert_eq!(SensorRotation::from_degrees("abc"), SensorRotation::None);
        assert!(SensorRotation::Rotate270.swaps_dimensions());
    }

    #[test]
    fn test_packed_rgba_strips_padding() {
        // 1x2 frame with 4 bytes of padding per row
        let data: Vec<u8> = vec![1, 2, 3, 4, 0, 0, 0, 0, 5, 6, 7, 8, 0, 0, 0, 0];
        let frame = CameraFrame {
            width: 1,
            height: 2,
            data: FrameData::Copied(Arc::from(data.as_slice())),
            stride: 8,
            captured_at: Instant::now(),
        };
        assert_eq!(frame.packed_rgba(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
