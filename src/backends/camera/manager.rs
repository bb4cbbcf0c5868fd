// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend manager
//!
//! Cheap to clone; every clone shares the backend and the latest-frame slot,
//! so the preview subscription, capture tasks and hotplug polling all see
//! the same camera state.

use super::types::*;
use super::{CameraBackend, FrameSlot, PreviewStream, get_backend};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Camera backend manager
#[derive(Clone)]
pub struct CameraBackendManager {
    backend: Arc<dyn CameraBackend>,
    latest_frame: FrameSlot,
}

impl CameraBackendManager {
    /// Create a manager around the PipeWire backend
    pub fn new() -> Self {
        Self::with_backend(get_backend())
    }

    /// Create a manager around any backend
    pub fn with_backend(backend: Arc<dyn CameraBackend>) -> Self {
        info!("Creating camera backend manager");
        Self {
            backend,
            latest_frame: Arc::new(Mutex::new(None)),
        }
    }

    /// Check if the backend is available on this system
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Enumerate available cameras
    pub fn enumerate_cameras(&self) -> BackendResult<Vec<CameraDevice>> {
        // Only call enumerate once - it spawns pw-cli subprocesses
        let cameras = self.backend.enumerate_cameras();
        if cameras.is_empty() {
            Err(BackendError::DeviceNotFound("No cameras found".to_string()))
        } else {
            Ok(cameras)
        }
    }

    /// Start streaming `device`; frames also land in the latest-frame slot
    pub fn start_preview(
        &self,
        device: &CameraDevice,
        frame_sender: FrameSender,
    ) -> BackendResult<Box<dyn PreviewStream>> {
        info!(device = %device.name, "Starting preview");
        self.clear_latest_frame();
        self.backend
            .start_preview(device, frame_sender, Arc::clone(&self.latest_frame))
    }

    /// Copy of the most recent preview frame, if any arrived yet
    pub fn latest_frame(&self) -> Option<CameraFrame> {
        self.latest_frame
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(CameraFrame::to_copied))
    }

    /// Forget the last frame so stale pixels never end up in a capture
    pub fn clear_latest_frame(&self) {
        if let Ok(mut slot) = self.latest_frame.lock() {
            *slot = None;
        }
    }

    /// Wait until a frame captured after `since` shows up, or `timeout` passes
    pub async fn wait_for_frame(&self, since: Instant, timeout: Duration) -> Option<CameraFrame> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(frame) = self.latest_frame()
                && frame.captured_at >= since
            {
                return Some(frame);
            }
            if Instant::now() >= deadline {
                debug!("Timed out waiting for a preview frame");
                return None;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Store a frame as if the streaming thread had delivered it
    #[cfg(test)]
    pub(crate) fn push_frame(&self, frame: CameraFrame) {
        if let Ok(mut slot) = self.latest_frame.lock() {
            *slot = Some(frame);
        }
    }
}

impl Default for CameraBackendManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CameraBackendManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let has_frame = self
            .latest_frame
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        f.debug_struct("CameraBackendManager")
            .field("has_frame", &has_frame)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoCameras;

    impl CameraBackend for NoCameras {
        fn enumerate_cameras(&self) -> Vec<CameraDevice> {
            Vec::new()
        }

        fn is_available(&self) -> bool {
            true
        }

        fn start_preview(
            &self,
            _device: &CameraDevice,
            _frame_sender: FrameSender,
            _latest_frame: FrameSlot,
        ) -> BackendResult<Box<dyn PreviewStream>> {
            Err(BackendError::NotAvailable("test backend".to_string()))
        }
    }

    fn frame() -> CameraFrame {
        CameraFrame {
            width: 1,
            height: 1,
            data: FrameData::Copied(Arc::from(&[255u8, 0, 0, 255][..])),
            stride: 4,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn test_empty_enumeration_is_error() {
        let manager = CameraBackendManager::with_backend(Arc::new(NoCameras));
        assert!(matches!(
            manager.enumerate_cameras(),
            Err(BackendError::DeviceNotFound(_))
        ));
    }

    #[test]
    fn test_latest_frame_slot() {
        let manager = CameraBackendManager::with_backend(Arc::new(NoCameras));
        assert!(manager.latest_frame().is_none());

        manager.push_frame(frame());
        let shared = manager.clone();
        assert_eq!(shared.latest_frame().map(|f| f.width), Some(1));

        shared.clear_latest_frame();
        assert!(manager.latest_frame().is_none());
    }

    #[tokio::test]
    async fn test_wait_for_frame_times_out() {
        let manager = CameraBackendManager::with_backend(Arc::new(NoCameras));
        let got = manager
            .wait_for_frame(Instant::now(), Duration::from_millis(50))
            .await;
        assert!(got.is_none());
    }
}
