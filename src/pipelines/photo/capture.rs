// SPDX-License-Identifier: MPL-2.0

//! Still capture from the live preview
//!
//! The preview pipeline keeps the newest frame in a shared slot; a still is
//! that frame encoded to JPEG, so capture never interrupts the preview.

use super::encoding::{PhotoEncoder, default_capture_path};
use crate::backends::camera::CameraBackendManager;
use crate::backends::camera::types::{CameraDevice, CameraFrame};
use crate::errors::PhotoError;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Capture parameters
#[derive(Debug, Clone, Default)]
pub struct CaptureOptions {
    /// Don't collect device metadata for the outcome
    pub skip_metadata: bool,
    /// Write here instead of the cache directory
    pub output: Option<PathBuf>,
    /// Whether the flash was lit for this frame
    pub flash: bool,
}

/// Extra facts about a capture, collected unless `skip_metadata` is set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoMetadata {
    pub camera: String,
    pub driver: Option<String>,
    pub captured_at: String,
    pub flash: bool,
}

/// Result of a still capture: where the file went and its size
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureOutcome {
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub metadata: Option<PhotoMetadata>,
}

/// Photo capture handler
pub struct PhotoCapture;

impl PhotoCapture {
    /// Encode the newest preview frame of `backend` and save it
    pub async fn capture_from_backend(
        backend: &CameraBackendManager,
        device: &CameraDevice,
        options: CaptureOptions,
    ) -> Result<CaptureOutcome, PhotoError> {
        info!(device = %device.name, flash = options.flash, "Capturing photo");

        let frame = backend.latest_frame().ok_or(PhotoError::NoFrameAvailable)?;
        Self::capture_from_frame(frame, device, options).await
    }

    /// Encode `frame` and save it
    pub async fn capture_from_frame(
        frame: CameraFrame,
        device: &CameraDevice,
        options: CaptureOptions,
    ) -> Result<CaptureOutcome, PhotoError> {
        debug!(width = frame.width, height = frame.height, "Encoding captured frame");

        let encoder = PhotoEncoder::new();
        let encoded = encoder.encode(frame).await?;
        let (width, height) = (encoded.width, encoded.height);

        let target = options.output.clone().unwrap_or_else(default_capture_path);
        let path = encoder.save(encoded, target).await?;

        let metadata = (!options.skip_metadata).then(|| PhotoMetadata {
            camera: device.name.clone(),
            driver: device.device_info.as_ref().map(|info| info.driver.clone()),
            captured_at: chrono::Local::now().to_rfc3339(),
            flash: options.flash,
        });

        info!(path = %path.display(), width, height, "Photo saved");
        Ok(CaptureOutcome {
            path: path.to_string_lossy().into_owned(),
            width,
            height,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::{CameraFacing, FrameData, SensorRotation};
    use std::sync::Arc;
    use std::time::Instant;

    fn device() -> CameraDevice {
        CameraDevice {
            name: "Test Camera".to_string(),
            path: "pipewire-serial-1".to_string(),
            node_id: Some("1".to_string()),
            device_info: None,
            rotation: SensorRotation::None,
            facing: CameraFacing::Back,
            supports_focus: false,
        }
    }

    fn frame() -> CameraFrame {
        let data = vec![200u8; 200 * 100 * 4];
        CameraFrame {
            width: 200,
            height: 100,
            data: FrameData::Copied(Arc::from(data.as_slice())),
            stride: 800,
            captured_at: Instant::now(),
        }
    }

    fn temp_output() -> PathBuf {
        std::env::temp_dir()
            .join(format!("quickshot-test-{}", uuid::Uuid::new_v4()))
            .join("shot.jpg")
    }

    #[tokio::test]
    async fn test_capture_skipping_metadata() {
        let output = temp_output();
        let options = CaptureOptions {
            skip_metadata: true,
            output: Some(output.clone()),
            flash: false,
        };

        let outcome = PhotoCapture::capture_from_frame(frame(), &device(), options)
            .await
            .unwrap();

        assert_eq!(outcome.path, output.to_string_lossy());
        assert_eq!((outcome.width, outcome.height), (200, 100));
        assert!(outcome.metadata.is_none());
        assert!(output.exists());

        let _ = std::fs::remove_dir_all(output.parent().unwrap());
    }

    #[tokio::test]
    async fn test_capture_with_metadata() {
        let output = temp_output();
        let options = CaptureOptions {
            skip_metadata: false,
            output: Some(output.clone()),
            flash: true,
        };

        let outcome = PhotoCapture::capture_from_frame(frame(), &device(), options)
            .await
            .unwrap();
        let metadata = outcome.metadata.unwrap();
        assert_eq!(metadata.camera, "Test Camera");
        assert!(metadata.flash);

        let _ = std::fs::remove_dir_all(output.parent().unwrap());
    }

    #[tokio::test]
    async fn test_no_frame_available() {
        let manager = CameraBackendManager::with_backend(Arc::new(NullBackend));
        let result =
            PhotoCapture::capture_from_backend(&manager, &device(), CaptureOptions::default())
                .await;
        assert!(matches!(result, Err(PhotoError::NoFrameAvailable)));
    }

    struct NullBackend;

    impl crate::backends::camera::CameraBackend for NullBackend {
        fn enumerate_cameras(&self) -> Vec<CameraDevice> {
            Vec::new()
        }

        fn is_available(&self) -> bool {
            false
        }

        fn start_preview(
            &self,
            _device: &CameraDevice,
            _frame_sender: crate::backends::camera::FrameSender,
            _latest_frame: crate::backends::camera::FrameSlot,
        ) -> crate::backends::camera::BackendResult<Box<dyn crate::backends::camera::PreviewStream>>
        {
            Err(crate::backends::camera::BackendError::NotAvailable(
                "null".to_string(),
            ))
        }
    }
}
