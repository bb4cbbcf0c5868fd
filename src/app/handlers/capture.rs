// SPDX-License-Identifier: GPL-3.0-only

//! Capture operations handlers
//!
//! Handles photo capture, flash, tap-to-focus, and the accept/discard review.

use crate::app::state::{AppModel, FlashPhase, Message};
use crate::backends::camera::{FocusPoint, focus_at};
use crate::capture_view::{CaptureId, CaptureRequest};
use crate::errors::{CameraError, PhotoError};
use crate::pipelines::photo::{CaptureOptions, CaptureOutcome, PhotoCapture};
use cosmic::Task;
use tracing::{debug, info};

impl AppModel {
    // =========================================================================
    // Capture Operations Handlers
    // =========================================================================

    /// Create a delayed task that sends a message after the specified milliseconds
    pub(crate) fn delay_task(millis: u64, message: Message) -> Task<cosmic::Action<Message>> {
        Task::perform(
            async move {
                tokio::time::sleep(tokio::time::Duration::from_millis(millis)).await;
                message
            },
            cosmic::Action::App,
        )
    }

    pub(crate) fn handle_capture(&mut self) -> Task<cosmic::Action<Message>> {
        // The frame for this flash is already scheduled
        if self.flash_phase != FlashPhase::Idle {
            debug!("Flash sequence running, ignoring capture");
            return Task::none();
        }

        let Some(request) = self.capture_view.as_mut().and_then(|v| v.press_capture()) else {
            return Task::none();
        };

        if request.flash.is_on() {
            self.flash_phase = if self.flash_hardware.has_devices() {
                info!("Flash enabled - lighting LEDs before capture");
                self.flash_hardware.all_on();
                FlashPhase::Hardware
            } else {
                info!("Flash enabled - showing screen flash before capture");
                FlashPhase::Screen
            };
            self.pending_capture = Some(request);
            return Self::delay_task(self.config.flash_settle_ms, Message::FlashComplete);
        }

        let manager = self.backend_manager.clone();
        let id = request.id;
        Task::perform(
            async move {
                let options = Self::capture_options(&request);
                PhotoCapture::capture_from_backend(&manager, &request.device, options).await
            },
            move |result| cosmic::Action::App(Message::PhotoCaptured(id, result)),
        )
    }

    /// Grab the frame lit by the flash, then switch the flash off
    pub(crate) fn handle_flash_complete(&mut self) -> Task<cosmic::Action<Message>> {
        let frame = self.backend_manager.latest_frame();

        if self.flash_phase == FlashPhase::Hardware {
            self.flash_hardware.all_off();
        }
        self.flash_phase = FlashPhase::Idle;

        let Some(request) = self.pending_capture.take() else {
            return Task::none();
        };
        info!("Flash complete - capturing photo");

        let id = request.id;
        Task::perform(
            async move {
                let frame = frame.ok_or(PhotoError::NoFrameAvailable)?;
                let options = Self::capture_options(&request);
                PhotoCapture::capture_from_frame(frame, &request.device, options).await
            },
            move |result| cosmic::Action::App(Message::PhotoCaptured(id, result)),
        )
    }

    fn capture_options(request: &CaptureRequest) -> CaptureOptions {
        CaptureOptions {
            skip_metadata: request.skip_metadata,
            output: None,
            flash: request.flash.is_on(),
        }
    }

    pub(crate) fn handle_photo_captured(
        &mut self,
        id: CaptureId,
        result: Result<CaptureOutcome, PhotoError>,
    ) -> Task<cosmic::Action<Message>> {
        if let Some(view) = self.capture_view.as_mut() {
            view.finish_capture(id, result);
        }
        Task::none()
    }

    pub(crate) fn handle_toggle_flash(&mut self) -> Task<cosmic::Action<Message>> {
        if let Some(view) = self.capture_view.as_mut() {
            view.toggle_flash();
        }
        Task::none()
    }

    // =========================================================================
    // Focus Handlers
    // =========================================================================

    pub(crate) fn handle_focus_at(&mut self, point: FocusPoint) -> Task<cosmic::Action<Message>> {
        let Some(request) = self.capture_view.as_mut().and_then(|v| v.tap_preview(point)) else {
            return Task::none();
        };

        Task::perform(focus_at(request.device, request.point), |result| {
            cosmic::Action::App(Message::FocusResolved(result))
        })
    }

    pub(crate) fn handle_focus_resolved(
        &mut self,
        result: Result<(), CameraError>,
    ) -> Task<cosmic::Action<Message>> {
        if let Some(view) = self.capture_view.as_mut() {
            view.finish_focus(result);
        }
        Task::none()
    }

    // =========================================================================
    // Review Handlers
    // =========================================================================

    pub(crate) fn handle_accept_photo(&mut self) -> Task<cosmic::Action<Message>> {
        let closed = self.capture_view.as_mut().is_some_and(|view| {
            view.accept();
            view.is_closed()
        });

        if closed {
            info!("Capture view done - unmounting");
            self.unmount_capture_view();
        }
        Task::none()
    }

    pub(crate) fn handle_discard_photo(&mut self) -> Task<cosmic::Action<Message>> {
        if let Some(view) = self.capture_view.as_mut() {
            view.discard();
        }
        Task::none()
    }
}
