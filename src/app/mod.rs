// SPDX-License-Identifier: MPL-2.0

//! Main application module for Quickshot
//!
//! This module contains the application state, message handling, UI rendering,
//! and the glue between the capture view state machine and the platform.
//!
//! # Architecture
//!
//! - `state`: Application state types (AppModel, Message, Flags, etc.)
//! - `camera_preview`: Live preview with the focus marker overlay
//! - `controls`: Round action buttons (capture, flash, accept, discard)
//! - `settings`: Settings drawer UI
//! - `view`: Main view rendering
//! - `update`: Message handling
//! - `handlers`: Message handlers grouped by domain

mod camera_preview;
mod controls;
mod handlers;
pub mod settings;
mod state;
mod update;
mod view;

use crate::backends::camera::{CameraBackendManager, CameraFacing};
use crate::config::Config;
use crate::constants::timing;
use crate::flash::FlashHardware;
use crate::fl;
use cosmic::app::context_drawer;
use cosmic::cosmic_config::{self, CosmicConfigEntry};
use cosmic::iced::{Event, Subscription, event, window};
use cosmic::widget::{self, about::About};
use cosmic::{Element, Task};
pub use state::{AppModel, ContextPage, FlashPhase, Flags, Message, PermissionState};
use std::sync::Arc;
use tracing::{error, info, warn};

const REPOSITORY: &str = "https://github.com/cosmic-utils/quickshot";
const APP_ICON: &[u8] = include_bytes!(
    "../../resources/icons/hicolor/scalable/apps/io.github.cosmic_utils.quickshot.svg"
);

impl cosmic::Application for AppModel {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// Data that your application receives to its init method.
    type Flags = Flags;

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = "io.github.cosmic_utils.quickshot";

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(core: cosmic::Core, flags: Self::Flags) -> (Self, Task<cosmic::Action<Self::Message>>) {
        // Create the about widget
        let about = About::default()
            .name(fl!("app-title"))
            .icon(widget::icon::from_svg_bytes(APP_ICON))
            .version(env!("GIT_VERSION"))
            .links([(fl!("repository"), REPOSITORY)])
            .license(env!("CARGO_PKG_LICENSE"));

        // Load configuration
        let (config_handler, config) =
            match cosmic_config::Config::new(Self::APP_ID, Config::VERSION) {
                Ok(handler) => {
                    let config = match Config::get_entry(&handler) {
                        Ok(config) => config,
                        Err((errors, config)) => {
                            error!(?errors, "Errors loading config");
                            config
                        }
                    };
                    (Some(handler), config)
                }
                Err(err) => {
                    error!(%err, "Failed to create config handler");
                    (None, Config::default())
                }
            };

        // Initialize GStreamer early (required before any GStreamer calls)
        if let Err(e) = gstreamer::init() {
            error!(error = %e, "Failed to initialize GStreamer");
        }

        let flash_hardware = FlashHardware::detect();
        if let Some(hint) = &flash_hardware.permission_error {
            warn!("{}", hint);
        }
        info!(
            leds = flash_hardware.devices.len(),
            "Flash hardware detected"
        );

        let (preview_active, _) = tokio::sync::watch::channel(false);

        let app = AppModel {
            core,
            context_page: ContextPage::default(),
            about,
            config,
            config_handler,
            theme_dropdown_options: vec![fl!("match-desktop"), fl!("dark"), fl!("light")],
            facing_dropdown_options: CameraFacing::ALL
                .iter()
                .map(|facing| match facing {
                    CameraFacing::Back => fl!("facing-back"),
                    CameraFacing::Front => fl!("facing-front"),
                    CameraFacing::External => fl!("facing-external"),
                })
                .collect(),
            backend_manager: CameraBackendManager::new(),
            available_cameras: Vec::new(),
            preview_handle: None,
            preview_active,
            capture_view: None,
            on_complete: flags.on_complete,
            permission: PermissionState::default(),
            permission_dialog: false,
            flash_hardware: Arc::new(flash_hardware),
            flash_phase: FlashPhase::Idle,
            pending_capture: None,
            window_focused: true,
            window_foreground: true,
        };

        let theme_task = cosmic::command::set_theme(app.config.app_theme.theme());

        (app, theme_task)
    }

    /// Elements to pack at the start of the header bar.
    fn header_start(&self) -> Vec<Element<'_, Self::Message>> {
        let checking = self.permission == PermissionState::Checking;

        let open = widget::button::suggested(fl!("open-camera"))
            .on_press_maybe((!checking && self.capture_view.is_none()).then_some(Message::OpenCamera));
        let close = widget::button::standard(fl!("close-camera"))
            .on_press_maybe(self.capture_view.is_some().then_some(Message::CloseCamera));

        vec![
            widget::row()
                .push(open)
                .push(close)
                .spacing(cosmic::theme::spacing().space_xs)
                .into(),
        ]
    }

    /// Elements to pack at the end of the header bar.
    fn header_end(&self) -> Vec<Element<'_, Self::Message>> {
        let about = widget::tooltip(
            widget::button::icon(widget::icon::from_name("help-about-symbolic"))
                .on_press(Message::ToggleContextPage(ContextPage::About)),
            widget::text(fl!("about")),
            widget::tooltip::Position::Bottom,
        );
        let settings = widget::tooltip(
            widget::button::icon(widget::icon::from_name("preferences-system-symbolic"))
                .on_press(Message::ToggleContextPage(ContextPage::Settings)),
            widget::text(fl!("settings")),
            widget::tooltip::Position::Bottom,
        );

        vec![about.into(), settings.into()]
    }

    /// Display a context drawer if the context page is requested.
    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Self::Message>> {
        if !self.core.window.show_context {
            return None;
        }

        Some(match self.context_page {
            ContextPage::About => context_drawer::about(
                &self.about,
                |url| Message::LaunchUrl(url.to_string()),
                Message::ToggleContextPage(ContextPage::About),
            ),
            ContextPage::Settings => self.settings_view(),
        })
    }

    /// Modal shown when the permission gate says no
    fn dialog(&self) -> Option<Element<'_, Self::Message>> {
        if !self.permission_dialog {
            return None;
        }

        let dialog = widget::dialog()
            .title(fl!("permission-required"))
            .body(fl!("permission-body"))
            .primary_action(
                widget::button::suggested(fl!("permission-settings"))
                    .on_press(Message::OpenPrivacySettings),
            )
            .secondary_action(
                widget::button::standard(fl!("permission-cancel"))
                    .on_press(Message::DismissPermissionDialog),
            );

        Some(dialog.into())
    }

    /// Describes the interface based on the current state of the application model.
    fn view(&self) -> Element<'_, Self::Message> {
        self.view()
    }

    /// Register subscriptions for this application.
    fn subscription(&self) -> Subscription<Self::Message> {
        let config_sub = self
            .core()
            .watch_config::<Config>(Self::APP_ID)
            .map(|update| Message::UpdateConfig(update.config));

        // Everything below lives only while the capture view is mounted
        let Some(capture_view) = &self.capture_view else {
            return config_sub;
        };

        let window_sub = event::listen_with(window_event);
        let hotplug_sub = self.hotplug_subscription();

        let preview_sub = match capture_view.device() {
            Some(device) => self.preview_subscription(device.clone()),
            None => Subscription::none(),
        };

        Subscription::batch([config_sub, window_sub, hotplug_sub, preview_sub])
    }

    /// Handles messages emitted by the application and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        self.update(message)
    }
}

/// Map window events to focus and foreground changes
fn window_event(event: Event, _status: event::Status, _id: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::Focused) => Some(Message::WindowFocusChanged(true)),
        Event::Window(window::Event::Unfocused) => Some(Message::WindowFocusChanged(false)),
        // Hidden and minimized surfaces are reported with an empty size
        Event::Window(window::Event::Resized(size)) => Some(Message::WindowForegroundChanged(
            size.width > 0.0 && size.height > 0.0,
        )),
        _ => None,
    }
}

impl AppModel {
    /// Poll the camera list while the capture view is mounted
    fn hotplug_subscription(&self) -> Subscription<Message> {
        use cosmic::iced::futures::SinkExt;

        let backend_manager = self.backend_manager.clone();

        Subscription::run_with_id(
            "camera_hotplug",
            cosmic::iced::stream::channel(10, move |mut output| async move {
                info!("Camera hotplug monitoring started");

                let mut last_cameras: Option<Vec<String>> = None;

                loop {
                    // pw-cli spawns subprocesses, keep them off the executor threads
                    let manager = backend_manager.clone();
                    let cameras = tokio::task::spawn_blocking(move || {
                        manager.enumerate_cameras().unwrap_or_default()
                    })
                    .await
                    .unwrap_or_default();

                    let paths: Vec<String> = cameras.iter().map(|c| c.path.clone()).collect();
                    if last_cameras.as_ref() != Some(&paths) {
                        info!(count = cameras.len(), "Camera list changed");
                        last_cameras = Some(paths);

                        if output
                            .send(Message::CameraListChanged(cameras))
                            .await
                            .is_err()
                        {
                            warn!("Failed to send camera list changed message - channel closed");
                            break;
                        }
                    }

                    tokio::time::sleep(timing::HOTPLUG_POLL_INTERVAL).await;
                }

                info!("Camera hotplug monitoring stopped");
            }),
        )
    }

    /// Run the preview pipeline for `device`, forwarding frames to the UI.
    ///
    /// Keyed on the device path: switching devices or unmounting the view drops
    /// the stream and with it the pipeline.
    fn preview_subscription(
        &self,
        device: crate::backends::camera::CameraDevice,
    ) -> Subscription<Message> {
        use cosmic::iced::futures::StreamExt;

        let backend_manager = self.backend_manager.clone();
        let mut active = self.preview_active.subscribe();

        Subscription::run_with_id(
            ("preview", device.path.clone()),
            cosmic::iced::stream::channel(4, move |mut output| async move {
                info!(device = %device.name, "Preview subscription started");

                let mut frame_count = 0u64;
                loop {
                    let (sender, mut receiver) =
                        cosmic::iced::futures::channel::mpsc::channel(4);

                    let preview = match backend_manager.start_preview(&device, sender) {
                        Ok(preview) => preview,
                        Err(e) => {
                            error!(error = %e, "Failed to initialize pipeline");
                            tokio::time::sleep(timing::PIPELINE_RETRY_DELAY).await;
                            continue;
                        }
                    };

                    let initially_active = *active.borrow_and_update();
                    if let Err(e) = preview.set_active(initially_active) {
                        warn!(error = %e, "Failed to set initial preview state");
                    }

                    loop {
                        tokio::select! {
                            frame = receiver.next() => {
                                let Some(frame) = frame else {
                                    info!("Preview frame stream ended");
                                    break;
                                };
                                frame_count += 1;
                                if frame_count.is_multiple_of(timing::FRAME_LOG_INTERVAL) {
                                    tracing::debug!(
                                        frame = frame_count,
                                        width = frame.width,
                                        height = frame.height,
                                        "Received frame from pipeline"
                                    );
                                }

                                // Dropping frames is fine for live preview
                                if let Err(e) = output.try_send(Message::CameraFrame(Arc::new(frame)))
                                    && e.is_disconnected()
                                {
                                    info!("Output channel disconnected - preview subscription ending");
                                    let _ = preview.stop();
                                    return;
                                }
                            }
                            changed = active.changed() => {
                                if changed.is_err() {
                                    let _ = preview.stop();
                                    return;
                                }
                                let running = *active.borrow_and_update();
                                info!(running, "Preview activity changed");
                                if let Err(e) = preview.set_active(running) {
                                    warn!(error = %e, "Failed to change preview state");
                                }
                            }
                        }
                    }

                    info!("Cleaning up preview pipeline");
                    if let Err(e) = preview.stop() {
                        warn!(error = %e, "Failed to stop preview");
                    }
                    tokio::time::sleep(timing::PIPELINE_RETRY_DELAY).await;
                }
            }),
        )
    }
}
