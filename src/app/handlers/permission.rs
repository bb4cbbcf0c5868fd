// SPDX-License-Identifier: GPL-3.0-only

//! Permission gate handlers
//!
//! Handles the header Open/Close buttons, mounting and unmounting the capture
//! view, and the "permission required" dialog.

use crate::app::state::{AppModel, FlashPhase, Message, PermissionState};
use crate::capture_view::{CaptureView, DevicePreference};
use crate::permission::{PlatformAccess, open_privacy_settings, request_usability};
use cosmic::Task;
use tracing::{error, info};

impl AppModel {
    /// Preferred camera as configured
    pub(crate) fn device_preference(&self) -> DevicePreference {
        DevicePreference {
            facing: self.config.preferred_facing,
            accept_external: self.config.accept_external_cameras,
        }
    }

    /// Run the permission gate; the capture view is mounted only if it passes
    pub(crate) fn handle_open_camera(&mut self) -> Task<cosmic::Action<Message>> {
        if self.capture_view.is_some() || self.permission == PermissionState::Checking {
            return Task::none();
        }

        info!("Checking camera permission");
        self.permission = PermissionState::Checking;

        Task::perform(
            async {
                let access = PlatformAccess::detect();
                request_usability(&access).await
            },
            |usable| cosmic::Action::App(Message::PermissionResolved(usable)),
        )
    }

    pub(crate) fn handle_permission_resolved(&mut self, usable: bool) -> Task<cosmic::Action<Message>> {
        info!(usable, "Permission gate resolved");

        if usable {
            self.permission = PermissionState::Usable;
            self.mount_capture_view();
        } else {
            self.permission = PermissionState::NotUsable;
            self.permission_dialog = true;
        }
        Task::none()
    }

    pub(crate) fn handle_close_camera(&mut self) -> Task<cosmic::Action<Message>> {
        info!("Closing camera");
        self.unmount_capture_view();
        Task::none()
    }

    pub(crate) fn handle_dismiss_permission_dialog(&mut self) -> Task<cosmic::Action<Message>> {
        self.permission_dialog = false;
        Task::none()
    }

    pub(crate) fn handle_open_privacy_settings(&mut self) -> Task<cosmic::Action<Message>> {
        self.permission_dialog = false;
        if let Err(e) = open_privacy_settings() {
            error!(error = %e, "Failed to open privacy settings");
        }
        Task::none()
    }

    /// Mount a fresh capture view; the hotplug subscription feeds it devices
    fn mount_capture_view(&mut self) {
        let mut view = CaptureView::new(self.device_preference(), self.on_complete.clone());
        self.window_focused = true;
        self.window_foreground = true;
        view.devices_changed(&self.available_cameras);

        self.preview_handle = None;
        self.capture_view = Some(view);
    }

    /// Drop the capture view and everything tied to it
    pub(crate) fn unmount_capture_view(&mut self) {
        if self.flash_phase == FlashPhase::Hardware {
            self.flash_hardware.all_off();
        }
        self.flash_phase = FlashPhase::Idle;
        self.pending_capture = None;

        self.capture_view = None;
        self.preview_handle = None;
        self.backend_manager.clear_latest_frame();
    }
}
