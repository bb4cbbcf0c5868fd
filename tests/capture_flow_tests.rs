// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the capture view state machine

use quickshot::backends::camera::{CameraDevice, CameraFacing, FocusPoint, SensorRotation};
use quickshot::capture_view::{CompletionCallback, DevicePreference};
use quickshot::errors::{CameraError, PhotoError};
use quickshot::flash::FlashMode;
use quickshot::pipelines::photo::CaptureOutcome;
use quickshot::{CaptureView, PhotoDescriptor, ViewState};
use std::sync::{Arc, Mutex};

fn back_camera(supports_focus: bool) -> CameraDevice {
    CameraDevice {
        name: "Back Camera".to_string(),
        path: "back".to_string(),
        node_id: Some("42".to_string()),
        device_info: None,
        rotation: SensorRotation::None,
        facing: CameraFacing::Back,
        supports_focus,
    }
}

fn outcome(path: &str) -> CaptureOutcome {
    CaptureOutcome {
        path: path.to_string(),
        width: 200,
        height: 100,
        metadata: None,
    }
}

/// A view plus the log of everything its completion callback received
fn recording_view() -> (CaptureView, Arc<Mutex<Vec<Vec<PhotoDescriptor>>>>) {
    let delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&delivered);
    let on_complete: CompletionCallback = Arc::new(move |photos| {
        sink.lock().unwrap().push(photos);
    });
    let view = CaptureView::new(DevicePreference::default(), on_complete);
    (view, delivered)
}

fn live_view() -> (CaptureView, Arc<Mutex<Vec<Vec<PhotoDescriptor>>>>) {
    let (mut view, delivered) = recording_view();
    view.devices_changed(&[back_camera(true)]);
    (view, delivered)
}

#[test]
fn test_starts_awaiting_device() {
    let (mut view, _) = recording_view();
    assert_eq!(view.state(), &ViewState::AwaitingDevice);
    assert!(view.press_capture().is_none());
    assert!(!view.preview_active());
}

#[test]
fn test_device_resolves_to_live_preview() {
    let (view, _) = live_view();
    assert!(matches!(view.state(), ViewState::LivePreview { .. }));
    assert_eq!(view.flash(), Some(FlashMode::Off));
    assert!(view.focus_marker().is_none());
    assert!(view.preview_active());
}

#[test]
fn test_unpreferred_camera_is_ignored() {
    let (mut view, _) = recording_view();
    let front = CameraDevice {
        facing: CameraFacing::Front,
        path: "front".to_string(),
        ..back_camera(false)
    };
    view.devices_changed(&[front]);
    assert_eq!(view.state(), &ViewState::AwaitingDevice);
}

#[test]
fn test_capture_enters_review() {
    let (mut view, _) = live_view();
    let request = view.press_capture().expect("live preview accepts capture");
    assert_eq!(request.flash, FlashMode::Off);
    assert!(request.skip_metadata);

    view.finish_capture(request.id, Ok(outcome("/tmp/a.jpg")));

    let photo = view.photo().expect("photo under review");
    assert_eq!(photo.file_name, "a.jpg");
    assert_eq!(photo.uri, "file:///tmp/a.jpg");
    assert_eq!((photo.width, photo.height), (200, 100));
    assert!(!view.preview_active(), "Preview is paused during review");
}

#[test]
fn test_failed_capture_stays_live() {
    let (mut view, _) = live_view();
    let failed = view.press_capture().expect("capture allowed");
    view.finish_capture(failed.id, Err(PhotoError::NoFrameAvailable));
    assert!(matches!(view.state(), ViewState::LivePreview { .. }));

    let empty = view.press_capture().expect("capture allowed");
    view.finish_capture(empty.id, Ok(outcome("")));
    assert!(view.photo().is_none());
}

#[test]
fn test_flash_carried_through_capture() {
    let (mut view, _) = live_view();
    view.toggle_flash();
    let request = view.press_capture().expect("capture allowed");
    assert_eq!(request.flash, FlashMode::On);

    view.finish_capture(request.id, Ok(outcome("/tmp/b.jpg")));
    assert_eq!(view.flash(), Some(FlashMode::On));

    view.discard();
    assert!(matches!(view.state(), ViewState::LivePreview { .. }));
    assert_eq!(view.flash(), Some(FlashMode::On));
    assert!(view.photo().is_none());
}

#[test]
fn test_accept_delivers_once_and_closes() {
    let (mut view, delivered) = live_view();
    let request = view.press_capture().expect("capture allowed");
    view.finish_capture(request.id, Ok(outcome("/tmp/c.jpg")));

    assert!(view.accept());
    assert!(view.is_closed());
    assert!(!view.accept(), "A closed view delivers nothing more");

    let delivered = delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].len(), 1);
    assert_eq!(delivered[0][0].file_name, "c.jpg");
}

#[test]
fn test_accept_without_photo_is_ignored() {
    let (mut view, delivered) = live_view();
    assert!(!view.accept());
    assert!(!view.is_closed());
    assert!(delivered.lock().unwrap().is_empty());
}

#[test]
fn test_tap_shows_marker_until_focus_resolves() {
    let (mut view, _) = live_view();
    let request = view
        .tap_preview(FocusPoint::new(200.0, 300.0))
        .expect("camera supports focus");
    assert_eq!(request.device.path, "back");

    let marker = view.focus_marker().expect("marker shown");
    assert_eq!((marker.left, marker.top), (170.0, 270.0));

    view.finish_focus(Err(CameraError::FocusFailed("timeout".into())));
    assert!(view.focus_marker().is_none());
}

#[test]
fn test_no_marker_without_focus_support() {
    let (mut view, _) = recording_view();
    view.devices_changed(&[back_camera(false)]);
    assert!(view.tap_preview(FocusPoint::new(10.0, 10.0)).is_none());
    assert!(view.focus_marker().is_none());
}

#[test]
fn test_background_pauses_preview_only() {
    let (mut view, _) = live_view();
    let before = view.state().clone();

    view.set_foreground(false);
    assert!(!view.preview_active());
    assert_eq!(view.state(), &before);

    view.set_foreground(true);
    view.set_view_focused(false);
    assert!(!view.preview_active());

    view.set_view_focused(true);
    assert!(view.preview_active());
    assert_eq!(view.state(), &before);
}

#[test]
fn test_lost_device_drops_review() {
    let (mut view, _) = live_view();
    let request = view.press_capture().expect("capture allowed");
    view.finish_capture(request.id, Ok(outcome("/tmp/d.jpg")));
    view.devices_changed(&[]);
    assert_eq!(view.state(), &ViewState::AwaitingDevice);
    assert!(view.photo().is_none());
}

fn front_camera() -> CameraDevice {
    CameraDevice {
        name: "Front Camera".to_string(),
        path: "front".to_string(),
        facing: CameraFacing::Front,
        ..back_camera(true)
    }
}

#[test]
fn test_capture_from_lost_device_is_dropped() {
    let (mut view, _) = recording_view();
    view.set_preference(DevicePreference {
        facing: CameraFacing::Back,
        accept_external: true,
    });
    view.devices_changed(&[back_camera(true)]);
    let request = view.press_capture().expect("capture allowed");

    // Back camera unplugged, then the view settles on another one
    view.devices_changed(&[]);
    view.set_preference(DevicePreference {
        facing: CameraFacing::Front,
        accept_external: true,
    });
    view.devices_changed(&[front_camera()]);
    assert_eq!(view.device().map(|d| d.path.as_str()), Some("front"));

    view.finish_capture(request.id, Ok(outcome("/tmp/a.jpg")));
    assert!(matches!(view.state(), ViewState::LivePreview { .. }));
    assert!(view.photo().is_none());
}

#[test]
fn test_capture_from_previous_session_is_dropped() {
    let (mut old_view, _) = live_view();
    let request = old_view.press_capture().expect("capture allowed");
    drop(old_view);

    // Reopened before the old capture finished
    let (mut view, delivered) = live_view();
    view.finish_capture(request.id, Ok(outcome("/tmp/old.jpg")));
    assert!(matches!(view.state(), ViewState::LivePreview { .. }));
    assert!(!view.accept());
    assert!(delivered.lock().unwrap().is_empty());
}

#[test]
fn test_only_latest_capture_enters_review() {
    let (mut view, _) = live_view();
    let first = view.press_capture().expect("capture allowed");
    let second = view.press_capture().expect("capture allowed");
    assert_ne!(first.id, second.id);

    view.finish_capture(first.id, Ok(outcome("/tmp/first.jpg")));
    assert!(view.photo().is_none());

    view.finish_capture(second.id, Ok(outcome("/tmp/second.jpg")));
    assert_eq!(view.photo().map(|p| p.file_name.as_str()), Some("second.jpg"));

    // A duplicate report of the same capture changes nothing
    view.finish_capture(second.id, Ok(outcome("/tmp/again.jpg")));
    assert_eq!(view.photo().map(|p| p.file_name.as_str()), Some("second.jpg"));
}
