// SPDX-License-Identifier: GPL-3.0-only

//! Main application view
//!
//! Renders the capture view state:
//! - Closed: a hint to press Open
//! - AwaitingDevice: a neutral loading indicator
//! - LivePreview: preview, flash toggle, capture trigger
//! - ReviewPhoto: the captured photo with discard and accept

use crate::app::controls::action_button;
use crate::app::state::{AppModel, FlashPhase, Message, PermissionState};
use crate::capture_view::{PhotoDescriptor, ViewState};
use crate::constants::ui;
use crate::fl;
use crate::flash::FlashMode;
use cosmic::Element;
use cosmic::iced::{Alignment, Background, Color, ContentFit, Length, Padding};
use cosmic::widget;

/// Flash icon SVG (lightning bolt)
const FLASH_ICON: &[u8] = include_bytes!("../../resources/button_icons/flash.svg");
/// Flash off icon SVG (lightning bolt with strike-through)
const FLASH_OFF_ICON: &[u8] = include_bytes!("../../resources/button_icons/flash-off.svg");
const ACCEPT_ICON: &[u8] = include_bytes!("../../resources/button_icons/check.svg");
const DISCARD_ICON: &[u8] = include_bytes!("../../resources/button_icons/close.svg");

impl AppModel {
    /// Build the main application view
    pub fn view(&self) -> Element<'_, Message> {
        let Some(capture_view) = &self.capture_view else {
            return self.build_closed_view();
        };

        let content = match capture_view.state() {
            ViewState::AwaitingDevice => self.build_awaiting_device(),
            ViewState::LivePreview {
                flash,
                focus_marker,
                ..
            } => self.build_live_preview(*flash, *focus_marker),
            ViewState::ReviewPhoto { photo, .. } => self.build_review(photo),
        };

        // Screen flash: nothing but white while the frame is grabbed
        if self.flash_phase == FlashPhase::Screen {
            let flash_overlay = widget::container(widget::Space::new(Length::Fill, Length::Fill))
                .width(Length::Fill)
                .height(Length::Fill)
                .style(|_theme| widget::container::Style {
                    background: Some(Background::Color(Color::WHITE)),
                    ..Default::default()
                });

            return cosmic::iced::widget::stack![content, flash_overlay]
                .width(Length::Fill)
                .height(Length::Fill)
                .into();
        }

        content
    }

    fn build_closed_view(&self) -> Element<'_, Message> {
        if self.permission == PermissionState::Checking {
            return loading_indicator(None);
        }

        centered(widget::text(fl!("camera-closed")).size(16))
    }

    fn build_awaiting_device(&self) -> Element<'_, Message> {
        loading_indicator(Some(fl!("waiting-for-camera")))
    }

    fn build_live_preview(
        &self,
        flash: FlashMode,
        focus_marker: Option<crate::capture_view::FocusMarker>,
    ) -> Element<'_, Message> {
        let preview = self.build_camera_preview(focus_marker);

        let flash_icon = if flash.is_on() {
            FLASH_ICON
        } else {
            FLASH_OFF_ICON
        };
        let flash_button = action_button(Message::ToggleFlash)
            .glyph(flash_icon)
            .size(ui::FLASH_BUTTON_SIZE)
            .tooltip(fl!("toggle-flash"));

        let top_bar = widget::row()
            .push(flash_button)
            .push(widget::horizontal_space())
            .padding(ui::TOP_BAR_PADDING)
            .width(Length::Fill);

        let capture_button = action_button(Message::Capture).tooltip(fl!("capture-photo"));

        let bottom_bar = widget::row()
            .push(widget::horizontal_space())
            .push(capture_button)
            .push(widget::horizontal_space())
            .align_y(Alignment::Center)
            .width(Length::Fill)
            .padding(bottom_bar_padding());

        let controls = widget::column()
            .push(top_bar)
            .push(widget::vertical_space())
            .push(bottom_bar)
            .width(Length::Fill)
            .height(Length::Fill);

        cosmic::iced::widget::stack![preview, controls]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn build_review<'a>(&'a self, photo: &'a PhotoDescriptor) -> Element<'a, Message> {
        let path = photo.uri.trim_start_matches("file://");
        let image = widget::image(widget::image::Handle::from_path(path))
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill);

        let backdrop = widget::container(image)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| widget::container::Style {
                background: Some(Background::Color(Color::BLACK)),
                ..Default::default()
            });

        let discard = action_button(Message::DiscardPhoto)
            .glyph(DISCARD_ICON)
            .tooltip(fl!("discard-photo"));
        let accept = action_button(Message::AcceptPhoto)
            .glyph(ACCEPT_ICON)
            .tooltip(fl!("accept-photo"));

        let bottom_bar = widget::row()
            .push(discard)
            .push(widget::horizontal_space())
            .push(accept)
            .align_y(Alignment::Center)
            .width(Length::Fill)
            .padding(bottom_bar_padding());

        let controls = widget::column()
            .push(widget::vertical_space())
            .push(bottom_bar)
            .width(Length::Fill)
            .height(Length::Fill);

        cosmic::iced::widget::stack![backdrop, controls]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

/// Side padding plus the lift off the bottom edge
fn bottom_bar_padding() -> Padding {
    Padding {
        top: 0.0,
        right: f32::from(ui::BOTTOM_BAR_PADDING_X),
        bottom: f32::from(ui::BOTTOM_BAR_OFFSET),
        left: f32::from(ui::BOTTOM_BAR_PADDING_X),
    }
}

/// Themed full-size placeholder with a busy icon and an optional caption
fn loading_indicator<'a>(caption: Option<String>) -> Element<'a, Message> {
    let spacing = cosmic::theme::spacing();

    let mut column = widget::column()
        .push(
            widget::icon::from_name("process-working-symbolic")
                .size(ui::SPINNER_SIZE as u16)
                .icon(),
        )
        .spacing(spacing.space_s)
        .align_x(Alignment::Center);

    if let Some(caption) = caption {
        column = column.push(widget::text(caption).size(16));
    }

    centered(column)
}

fn centered<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    widget::container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(cosmic::iced::alignment::Horizontal::Center)
        .align_y(cosmic::iced::alignment::Vertical::Center)
        .style(|theme: &cosmic::Theme| widget::container::Style {
            background: Some(Background::Color(theme.cosmic().bg_color().into())),
            text_color: Some(theme.cosmic().on_bg_color().into()),
            ..Default::default()
        })
        .into()
}
