// SPDX-License-Identifier: MPL-2.0

//! Settings drawer view

use crate::app::state::{AppModel, ContextPage, Message};
use crate::backends::camera::CameraFacing;
use crate::config::AppTheme;
use crate::constants::app_info;
use crate::fl;
use cosmic::Element;
use cosmic::app::context_drawer;
use cosmic::iced::{Alignment, Length};
use cosmic::widget;

impl AppModel {
    /// Create the settings view for the context drawer
    ///
    /// Shows the theme and which camera the capture view picks.
    pub fn settings_view(&self) -> context_drawer::ContextDrawer<'_, Message> {
        let spacing = cosmic::theme::spacing();

        let theme_index = match self.config.app_theme {
            AppTheme::System => 0,
            AppTheme::Dark => 1,
            AppTheme::Light => 2,
        };
        let theme_dropdown = widget::dropdown(
            &self.theme_dropdown_options,
            Some(theme_index),
            Message::SetAppTheme,
        );

        let facing_index = CameraFacing::ALL
            .iter()
            .position(|facing| *facing == self.config.preferred_facing);
        let facing_dropdown = widget::dropdown(
            &self.facing_dropdown_options,
            facing_index,
            Message::SetPreferredFacing,
        );

        let external_toggle = widget::toggler(self.config.accept_external_cameras)
            .on_toggle(|_| Message::ToggleAcceptExternal);
        let mirror_toggle =
            widget::toggler(self.config.mirror_preview).on_toggle(|_| Message::ToggleMirrorPreview);

        // Version info string
        let version_info = if app_info::is_flatpak() {
            format!("Version {} (Flatpak)", app_info::version())
        } else {
            format!("Version {}", app_info::version())
        };

        let settings_column: Element<'_, Message> = widget::column()
            .push(section_title(fl!("appearance")))
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(widget::text(fl!("theme")))
            .push(theme_dropdown)
            .push(widget::vertical_space().height(spacing.space_l))
            .push(widget::divider::horizontal::default())
            .push(widget::vertical_space().height(spacing.space_s))
            .push(section_title(fl!("camera-section")))
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(widget::text(fl!("preferred-camera")))
            .push(facing_dropdown)
            .push(widget::vertical_space().height(spacing.space_s))
            .push(toggle_row(fl!("accept-external"), external_toggle))
            .push(widget::vertical_space().height(spacing.space_s))
            .push(toggle_row(fl!("mirror-preview"), mirror_toggle))
            .push(widget::vertical_space().height(spacing.space_l))
            .push(widget::divider::horizontal::default())
            .push(widget::vertical_space().height(spacing.space_s))
            .push(
                widget::text(version_info)
                    .size(12)
                    .class(cosmic::theme::Text::Accent),
            )
            .spacing(0)
            .into();

        context_drawer::context_drawer(
            settings_column,
            Message::ToggleContextPage(ContextPage::Settings),
        )
        .title(fl!("settings"))
    }
}

fn section_title<'a>(label: String) -> Element<'a, Message> {
    widget::text(label)
        .size(16)
        .font(cosmic::font::bold())
        .into()
}

fn toggle_row<'a>(
    label: String,
    toggle: impl Into<Element<'a, Message>>,
) -> Element<'a, Message> {
    widget::row()
        .push(widget::text(label))
        .push(widget::horizontal_space().width(Length::Fill))
        .push(toggle)
        .align_y(Alignment::Center)
        .into()
}
