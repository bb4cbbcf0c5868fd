// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │   UI Layer (App)    │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraBackendManager│  ← Shared handle, latest-frame slot
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  CameraBackend Trait│  ← Enumeration, preview streams
//! └──────────┬──────────┘
//!            │
//!            ▼
//!       ┌────────┐
//!       │PipeWire│  ← Concrete implementation
//!       └────────┘
//! ```
//!
//! Focus goes straight to the V4L2 node (`focus`), independent of the backend.

pub mod focus;
pub mod manager;
pub mod pipewire;
pub mod types;
pub mod v4l2_controls;

pub use focus::{FocusPoint, focus_at};
pub use manager::CameraBackendManager;
pub use types::*;

use std::sync::{Arc, Mutex};

/// Most recent preview frame, written by the streaming thread and read by capture
pub type FrameSlot = Arc<Mutex<Option<CameraFrame>>>;

/// A running preview pipeline
pub trait PreviewStream: Send {
    /// Pause (`false`) or resume (`true`) the feed without tearing it down
    fn set_active(&self, active: bool) -> BackendResult<()>;

    /// Stop the pipeline and release the camera
    fn stop(self: Box<Self>) -> BackendResult<()>;
}

/// Camera backend trait
pub trait CameraBackend: Send + Sync {
    /// Enumerate available cameras on this backend
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    /// Check if this backend is available on the current system
    fn is_available(&self) -> bool;

    /// Start streaming `device`.
    ///
    /// Frames go to `frame_sender` and replace the content of `latest_frame`.
    fn start_preview(
        &self,
        device: &CameraDevice,
        frame_sender: FrameSender,
        latest_frame: FrameSlot,
    ) -> BackendResult<Box<dyn PreviewStream>>;
}

/// Get a concrete backend instance (PipeWire only)
pub fn get_backend() -> Arc<dyn CameraBackend> {
    Arc::new(pipewire::PipeWireBackend::new())
}
