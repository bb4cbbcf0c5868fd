// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! This module handles all application messages by routing them to focused handler methods.
//! The main `update()` function acts as a dispatcher, while specific handlers are implemented
//! in the `handlers` submodules organized by functional domain.
//!
//! # Handler Modules
//!
//! - `handlers::permission`: Open/Close, permission gate, privacy settings
//! - `handlers::camera`: Camera list, frames, window focus and foreground
//! - `handlers::capture`: Capture, flash, focus, accept and discard
//! - `handlers::system`: Context pages, URLs, settings

use crate::app::state::{AppModel, Message};
use cosmic::Task;

impl AppModel {
    /// Main message handler - routes messages to appropriate handler methods.
    ///
    /// After every message the preview pipeline is told whether it should be
    /// running, so no handler has to remember to do it.
    pub fn update(&mut self, message: Message) -> Task<cosmic::Action<Message>> {
        let task = match message {
            // ===== UI Navigation =====
            Message::LaunchUrl(url) => self.handle_launch_url(url),
            Message::ToggleContextPage(page) => self.handle_toggle_context_page(page),

            // ===== Permission =====
            Message::OpenCamera => self.handle_open_camera(),
            Message::CloseCamera => self.handle_close_camera(),
            Message::PermissionResolved(usable) => self.handle_permission_resolved(usable),
            Message::DismissPermissionDialog => self.handle_dismiss_permission_dialog(),
            Message::OpenPrivacySettings => self.handle_open_privacy_settings(),

            // ===== Camera =====
            Message::CameraListChanged(cameras) => self.handle_camera_list_changed(cameras),
            Message::CameraFrame(frame) => self.handle_camera_frame(frame),
            Message::WindowFocusChanged(focused) => self.handle_window_focus_changed(focused),
            Message::WindowForegroundChanged(foreground) => {
                self.handle_window_foreground_changed(foreground)
            }

            // ===== Capture =====
            Message::Capture => self.handle_capture(),
            Message::FlashComplete => self.handle_flash_complete(),
            Message::PhotoCaptured(id, result) => self.handle_photo_captured(id, result),
            Message::ToggleFlash => self.handle_toggle_flash(),
            Message::FocusAt(point) => self.handle_focus_at(point),
            Message::FocusResolved(result) => self.handle_focus_resolved(result),
            Message::AcceptPhoto => self.handle_accept_photo(),
            Message::DiscardPhoto => self.handle_discard_photo(),

            // ===== Settings =====
            Message::UpdateConfig(config) => self.handle_update_config(config),
            Message::SetAppTheme(index) => self.handle_set_app_theme(index),
            Message::SetPreferredFacing(index) => self.handle_set_preferred_facing(index),
            Message::ToggleAcceptExternal => self.handle_toggle_accept_external(),
            Message::ToggleMirrorPreview => self.handle_toggle_mirror_preview(),

            Message::Noop => Task::none(),
        };

        self.sync_preview_activity();
        task
    }

    /// Push the capture view's "feed should run" flag to the preview pipeline
    fn sync_preview_activity(&self) {
        let active = self
            .capture_view
            .as_ref()
            .is_some_and(|view| view.preview_active());

        self.preview_active.send_if_modified(|current| {
            let changed = *current != active;
            *current = active;
            changed
        });
    }
}
