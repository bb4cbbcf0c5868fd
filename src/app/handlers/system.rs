// SPDX-License-Identifier: GPL-3.0-only

//! System handlers
//!
//! Handles context pages, external URLs, and settings.

use crate::app::state::{AppModel, ContextPage, Message};
use crate::backends::camera::CameraFacing;
use crate::config::AppTheme;
use cosmic::Task;
use cosmic::cosmic_config::CosmicConfigEntry;
use tracing::{error, info};

impl AppModel {
    pub(crate) fn handle_launch_url(&self, url: String) -> Task<cosmic::Action<Message>> {
        if let Err(err) = open::that_detached(&url) {
            error!(url = %url, error = %err, "Failed to open URL");
        }
        Task::none()
    }

    pub(crate) fn handle_toggle_context_page(
        &mut self,
        context_page: ContextPage,
    ) -> Task<cosmic::Action<Message>> {
        if self.context_page == context_page {
            self.core.window.show_context = !self.core.window.show_context;
        } else {
            self.context_page = context_page;
            self.core.window.show_context = true;
        }
        Task::none()
    }

    // =========================================================================
    // Settings Handlers
    // =========================================================================

    pub(crate) fn handle_update_config(
        &mut self,
        config: crate::config::Config,
    ) -> Task<cosmic::Action<Message>> {
        info!("UpdateConfig received");
        let theme_changed = self.config.app_theme != config.app_theme;
        self.config = config;
        self.apply_device_preference();

        if theme_changed {
            cosmic::command::set_theme(self.config.app_theme.theme())
        } else {
            Task::none()
        }
    }

    pub(crate) fn handle_set_app_theme(&mut self, index: usize) -> Task<cosmic::Action<Message>> {
        let app_theme = match index {
            0 => AppTheme::System,
            1 => AppTheme::Dark,
            2 => AppTheme::Light,
            _ => return Task::none(),
        };

        info!(?app_theme, "Setting application theme");
        self.config.app_theme = app_theme;
        self.save_config();

        cosmic::command::set_theme(app_theme.theme())
    }

    pub(crate) fn handle_set_preferred_facing(
        &mut self,
        index: usize,
    ) -> Task<cosmic::Action<Message>> {
        let Some(facing) = CameraFacing::ALL.get(index).copied() else {
            return Task::none();
        };

        info!(%facing, "Setting preferred camera");
        self.config.preferred_facing = facing;
        self.save_config();
        self.apply_device_preference();
        Task::none()
    }

    pub(crate) fn handle_toggle_accept_external(&mut self) -> Task<cosmic::Action<Message>> {
        self.config.accept_external_cameras = !self.config.accept_external_cameras;
        info!(
            accept_external = self.config.accept_external_cameras,
            "External cameras toggled"
        );
        self.save_config();
        self.apply_device_preference();
        Task::none()
    }

    pub(crate) fn handle_toggle_mirror_preview(&mut self) -> Task<cosmic::Action<Message>> {
        self.config.mirror_preview = !self.config.mirror_preview;
        info!(mirror_preview = self.config.mirror_preview, "Mirror preview toggled");
        self.save_config();
        Task::none()
    }

    /// A new preference only matters while waiting; a running preview keeps its camera
    fn apply_device_preference(&mut self) {
        let preference = self.device_preference();
        if let Some(view) = self.capture_view.as_mut() {
            view.set_preference(preference);
            view.devices_changed(&self.available_cameras);
        }
    }

    fn save_config(&self) {
        if let Some(handler) = self.config_handler.as_ref()
            && let Err(err) = self.config.write_entry(handler)
        {
            error!(?err, "Failed to save config");
        }
    }
}
