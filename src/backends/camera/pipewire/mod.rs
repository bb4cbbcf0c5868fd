// SPDX-License-Identifier: MPL-2.0

//! PipeWire camera backend
//!
//! This backend uses PipeWire for camera enumeration and preview streaming.
//! It's the modern, recommended approach for Linux camera access.

mod enumeration;
mod pipeline;

pub use enumeration::{enumerate_pipewire_cameras, is_pipewire_available};
pub use pipeline::PipeWirePipeline;

use super::types::*;
use super::{CameraBackend, FrameSlot, PreviewStream};
use tracing::info;

/// PipeWire backend implementation
#[derive(Debug, Default)]
pub struct PipeWireBackend;

impl PipeWireBackend {
    /// Create a new PipeWire backend
    pub fn new() -> Self {
        Self
    }
}

impl CameraBackend for PipeWireBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        match enumerate_pipewire_cameras() {
            Some(cameras) => {
                info!(count = cameras.len(), "PipeWire cameras enumerated");
                cameras
            }
            None => {
                info!("PipeWire enumeration returned None");
                Vec::new()
            }
        }
    }

    fn is_available(&self) -> bool {
        is_pipewire_available()
    }

    fn start_preview(
        &self,
        device: &CameraDevice,
        frame_sender: FrameSender,
        latest_frame: FrameSlot,
    ) -> BackendResult<Box<dyn PreviewStream>> {
        let pipeline = PipeWirePipeline::new(device, frame_sender, latest_frame)?;
        Ok(Box::new(pipeline))
    }
}
