// SPDX-License-Identifier: MPL-2.0

//! PipeWire GStreamer pipeline for camera preview
//!
//! `pipewiresrc` feeds `videoconvert`, which hands RGBA frames to an appsink.
//! Every frame goes to the UI channel and replaces the latest-frame slot that
//! still capture reads from.

use super::super::types::*;
use super::super::{FrameSlot, PreviewStream};
use crate::constants::{pipeline, timing};
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// PipeWire camera pipeline
pub struct PipeWirePipeline {
    pipeline: gstreamer::Pipeline,
    appsink: AppSink,
}

impl PipeWirePipeline {
    /// Create and start a preview pipeline for `device`
    pub fn new(
        device: &CameraDevice,
        frame_sender: FrameSender,
        latest_frame: FrameSlot,
    ) -> BackendResult<Self> {
        info!(device = %device.name, path = %device.path, "Creating PipeWire pipeline");

        gstreamer::init().map_err(|e| BackendError::InitializationFailed(e.to_string()))?;

        let pipeline_str = build_pipeline_string(&device.path, device.rotation);
        info!(pipeline = %pipeline_str, "Launching pipeline");

        let pipeline = gstreamer::parse::launch(&pipeline_str)
            .map_err(|e| BackendError::InitializationFailed(e.to_string()))?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(|_| {
                BackendError::InitializationFailed("Failed to cast to pipeline".to_string())
            })?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| BackendError::InitializationFailed("Failed to get appsink".to_string()))?
            .dynamic_cast::<AppSink>()
            .map_err(|_| {
                BackendError::InitializationFailed("Failed to cast appsink".to_string())
            })?;

        appsink.set_property("sync", false);
        appsink.set_property("max-buffers", pipeline::MAX_BUFFERS);
        appsink.set_property("drop", true);
        appsink.set_property("enable-last-sample", false);

        appsink.set_callbacks(
            gstreamer_app::AppSinkCallbacks::builder()
                .new_sample(move |appsink| {
                    let frame_start = Instant::now();
                    let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);

                    let sample = appsink.pull_sample().map_err(|e| {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            error!(frame = frame_num, error = ?e, "Failed to pull sample");
                        }
                        gstreamer::FlowError::Eos
                    })?;

                    let caps = sample.caps().ok_or(gstreamer::FlowError::Error)?;
                    let video_info =
                        VideoInfo::from_caps(caps).map_err(|_| gstreamer::FlowError::Error)?;

                    let buffer = sample.buffer_owned().ok_or(gstreamer::FlowError::Error)?;
                    if buffer.flags().contains(gstreamer::BufferFlags::CORRUPTED) {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            warn!(frame = frame_num, "Buffer marked as corrupted, skipping frame");
                        }
                        return Ok(gstreamer::FlowSuccess::Ok);
                    }

                    let mapped = buffer
                        .into_mapped_buffer_readable()
                        .map_err(|_| gstreamer::FlowError::Error)?;

                    let frame = CameraFrame {
                        width: video_info.width(),
                        height: video_info.height(),
                        data: FrameData::from_mapped_buffer(mapped),
                        stride: video_info.stride()[0] as u32,
                        captured_at: frame_start,
                    };

                    if let Ok(mut slot) = latest_frame.lock() {
                        *slot = Some(frame.clone());
                    }

                    // Dropping frames is fine for live preview
                    let mut sender = frame_sender.clone();
                    if let Err(e) = sender.try_send(frame) {
                        if e.is_disconnected() {
                            return Err(gstreamer::FlowError::Flushing);
                        }
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            debug!(frame = frame_num, "Frame dropped (channel full)");
                        }
                    } else if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                        debug!(
                            frame = frame_num,
                            width = video_info.width(),
                            height = video_info.height(),
                            "Frame delivered"
                        );
                    }

                    Ok(gstreamer::FlowSuccess::Ok)
                })
                .build(),
        );

        pipeline.set_state(gstreamer::State::Playing).map_err(|e| {
            BackendError::InitializationFailed(format!("Failed to start pipeline: {}", e))
        })?;

        let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(result = ?result, state = ?state, pending = ?pending, "Pipeline state");
        if result.is_err() {
            let _ = pipeline.set_state(gstreamer::State::Null);
            return Err(BackendError::InitializationFailed(format!(
                "Pipeline failed to start (state: {:?})",
                state
            )));
        }
        if state != gstreamer::State::Playing {
            // Async transition; frames arrive once the device is ready
            warn!(?state, ?pending, "Pipeline is not in PLAYING state yet");
        }

        info!("PipeWire camera initialization complete");

        Ok(Self { pipeline, appsink })
    }
}

impl PreviewStream for PipeWirePipeline {
    fn set_active(&self, active: bool) -> BackendResult<()> {
        let target = if active {
            gstreamer::State::Playing
        } else {
            gstreamer::State::Paused
        };
        info!(?target, "Changing preview pipeline state");

        self.pipeline
            .set_state(target)
            .map(|_| ())
            .map_err(|e| BackendError::Other(format!("Failed to change pipeline state: {}", e)))
    }

    fn stop(self: Box<Self>) -> BackendResult<()> {
        info!("Stopping PipeWire pipeline");

        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());

        self.pipeline
            .set_state(gstreamer::State::Null)
            .map_err(|e| BackendError::Other(format!("Failed to stop pipeline: {}", e)))?;

        let (result, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::STOP_TIMEOUT_SECS,
        ));
        match result {
            Ok(_) => info!(state = ?state, "PipeWire pipeline stopped successfully"),
            Err(e) => debug!(error = ?e, state = ?state, "Pipeline state change had issues"),
        }

        Ok(())
    }
}

impl Drop for PipeWirePipeline {
    fn drop(&mut self) {
        debug!("Dropping PipeWire pipeline");
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        // Release the device immediately
        let _ = self.pipeline.set_state(gstreamer::State::Null);
    }
}

/// `pipewiresrc` properties selecting the camera
fn target_property(device_path: &str) -> String {
    if let Some(serial) = device_path.strip_prefix("pipewire-serial-") {
        format!("target-object={} ", serial)
    } else if let Some(node_id) = device_path.strip_prefix("pipewire-") {
        format!("target-object={} ", node_id)
    } else if device_path.is_empty() {
        // PipeWire auto-selects its default camera
        String::new()
    } else {
        format!("target-object={} ", device_path)
    }
}

/// `videoflip` method that undoes the sensor mounting angle
fn flip_method(rotation: SensorRotation) -> &'static str {
    match rotation {
        SensorRotation::None => "none",
        SensorRotation::Rotate90 => "clockwise",
        SensorRotation::Rotate180 => "rotate-180",
        SensorRotation::Rotate270 => "counterclockwise",
    }
}

/// Build the preview pipeline description for `gst_parse_launch`
pub(crate) fn build_pipeline_string(device_path: &str, rotation: SensorRotation) -> String {
    format!(
        "pipewiresrc {}do-timestamp=true ! \
         queue max-size-buffers={} leaky=downstream ! \
         videoconvert ! videoflip method={} ! \
         video/x-raw,format={} ! \
         appsink name=sink",
        target_property(device_path),
        pipeline::MAX_BUFFERS,
        flip_method(rotation),
        pipeline::OUTPUT_FORMAT
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_property() {
        assert_eq!(target_property("pipewire-serial-2146"), "target-object=2146 ");
        assert_eq!(target_property("pipewire-62"), "target-object=62 ");
        assert_eq!(target_property(""), "");
    }

    #[test]
    fn test_pipeline_string() {
        let desc = build_pipeline_string("pipewire-serial-7", SensorRotation::Rotate270);
        assert!(desc.starts_with("pipewiresrc target-object=7 do-timestamp=true"));
        assert!(desc.contains("videoflip method=counterclockwise"));
        assert!(desc.contains("video/x-raw,format=RGBA"));
        assert!(desc.ends_with("appsink name=sink"));
    }
}
