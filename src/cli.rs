// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! - Listing available cameras
//! - Running the permission gate once
//! - Taking a photo without the GUI

use cosmic::iced::futures::StreamExt;
use cosmic::iced::futures::channel::mpsc;
use quickshot::backends::camera::CameraBackendManager;
use quickshot::capture_view::PhotoDescriptor;
use quickshot::constants::timing;
use quickshot::errors::{AppError, CameraError, PhotoError};
use quickshot::flash::FlashHardware;
use quickshot::permission::{PlatformAccess, request_usability};
use quickshot::pipelines::photo::{CaptureOptions, PhotoCapture};
use std::path::PathBuf;
use std::time::Instant;

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let manager = CameraBackendManager::new();
    if !manager.is_available() {
        eprintln!("PipeWire camera support (pipewiresrc) is not available.");
    }
    let cameras = manager.enumerate_cameras().unwrap_or_default();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);
        println!("      Facing: {}", camera.facing);
        println!(
            "      Focus:  {}",
            if camera.supports_focus {
                "tap to focus"
            } else {
                "fixed"
            }
        );
        if let Some(info) = &camera.device_info {
            println!("      Device: {} ({})", info.path, info.driver);
        }
        println!();
    }

    Ok(())
}

/// Run the permission gate once and report the outcome
pub fn check_permission() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let usable = rt.block_on(request_usability(&PlatformAccess::detect()));
    println!("{}", if usable { "usable" } else { "not usable" });
    Ok(())
}

/// Take a photo using the specified camera and print its descriptor as JSON
pub fn take_photo(
    camera_index: usize,
    flash: bool,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let manager = CameraBackendManager::new();
    let cameras = manager
        .enumerate_cameras()
        .map_err(|_| AppError::Camera(CameraError::NoCameraFound))?;

    let camera = cameras
        .get(camera_index)
        .ok_or(AppError::Camera(CameraError::InvalidIndex {
            index: camera_index,
            count: cameras.len(),
        }))?
        .clone();
    eprintln!("Using camera: {}", camera.name);

    let rt = tokio::runtime::Runtime::new()?;
    let descriptor = rt.block_on(async {
        let (sender, mut receiver) = mpsc::channel(4);
        let preview = manager
            .start_preview(&camera, sender)
            .map_err(CameraError::from)?;

        // Keep the channel drained so the streaming thread never blocks
        let drain = tokio::spawn(async move { while receiver.next().await.is_some() {} });

        // Camera warm-up
        tokio::time::sleep(timing::CLI_WARMUP).await;

        let hardware = flash.then(FlashHardware::detect);
        if let Some(hardware) = &hardware {
            if let Some(hint) = &hardware.permission_error {
                eprintln!("{}", hint);
            }
            hardware.all_on();
            tokio::time::sleep(timing::CLI_WARMUP).await;
        }

        let since = Instant::now();
        let frame = manager
            .wait_for_frame(since, timing::CLI_FRAME_TIMEOUT)
            .await;

        if let Some(hardware) = &hardware {
            hardware.all_off();
        }
        if let Err(e) = preview.stop() {
            tracing::warn!(error = %e, "Failed to stop preview");
        }
        drain.abort();

        let frame = frame.ok_or(PhotoError::NoFrameAvailable)?;
        let options = CaptureOptions {
            skip_metadata: true,
            output,
            flash,
        };
        let outcome = PhotoCapture::capture_from_frame(frame, &camera, options).await?;

        let descriptor = PhotoDescriptor::from_outcome(&outcome)
            .ok_or_else(|| PhotoError::SaveFailed("empty path".to_string()))?;
        Ok::<_, AppError>(descriptor)
    })?;

    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(())
}
