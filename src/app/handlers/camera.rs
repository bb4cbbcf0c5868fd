// SPDX-License-Identifier: GPL-3.0-only

//! Camera handlers
//!
//! Handles the camera list, preview frames, and the window signals that decide
//! whether the live feed runs.

use crate::app::camera_preview::frame_handle;
use crate::app::state::{AppModel, Message};
use crate::backends::camera::types::{CameraDevice, CameraFrame};
use cosmic::Task;
use std::sync::Arc;
use tracing::{debug, info};

impl AppModel {
    pub(crate) fn handle_camera_list_changed(
        &mut self,
        cameras: Vec<CameraDevice>,
    ) -> Task<cosmic::Action<Message>> {
        info!(count = cameras.len(), "Camera list updated");

        if let Some(view) = self.capture_view.as_mut() {
            let before = view.device().map(|d| d.path.clone());
            view.devices_changed(&cameras);
            let after = view.device().map(|d| d.path.clone());

            if before != after {
                // Frames of the old camera must not show under the new one
                self.preview_handle = None;
                self.backend_manager.clear_latest_frame();
            }
        }

        self.available_cameras = cameras;
        Task::none()
    }

    pub(crate) fn handle_camera_frame(
        &mut self,
        frame: Arc<CameraFrame>,
    ) -> Task<cosmic::Action<Message>> {
        if self.capture_view.is_some() {
            self.preview_handle = Some(frame_handle(&frame, self.config.mirror_preview));
        }
        Task::none()
    }

    pub(crate) fn handle_window_focus_changed(
        &mut self,
        focused: bool,
    ) -> Task<cosmic::Action<Message>> {
        if self.window_focused == focused {
            return Task::none();
        }
        debug!(focused, "Window focus changed");
        self.window_focused = focused;
        if let Some(view) = self.capture_view.as_mut() {
            view.set_view_focused(focused);
        }
        Task::none()
    }

    pub(crate) fn handle_window_foreground_changed(
        &mut self,
        foreground: bool,
    ) -> Task<cosmic::Action<Message>> {
        if self.window_foreground == foreground {
            return Task::none();
        }
        debug!(foreground, "Window foreground changed");
        self.window_foreground = foreground;
        if let Some(view) = self.capture_view.as_mut() {
            view.set_foreground(foreground);
        }
        Task::none()
    }
}
