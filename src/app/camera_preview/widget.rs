// SPDX-License-Identifier: GPL-3.0-only

//! Camera preview widget implementation

use super::tap_area::tap_area;
use crate::app::state::{AppModel, Message};
use crate::backends::camera::types::CameraFrame;
use crate::capture_view::FocusMarker;
use crate::constants::ui;
use cosmic::Element;
use cosmic::iced::{Background, Border, Color, ContentFit, Length};
use cosmic::widget;

/// Build an image handle for `frame`, flipped horizontally when `mirror` is set
pub(crate) fn frame_handle(frame: &CameraFrame, mirror: bool) -> widget::image::Handle {
    let mut pixels = frame.packed_rgba();
    if mirror {
        mirror_rows(&mut pixels, frame.width as usize);
    }
    widget::image::Handle::from_rgba(frame.width, frame.height, pixels)
}

/// Reverse the pixel order of every RGBA row in place
fn mirror_rows(pixels: &mut [u8], width: usize) {
    let row_bytes = width * 4;
    if row_bytes == 0 {
        return;
    }
    for row in pixels.chunks_exact_mut(row_bytes) {
        for x in 0..width / 2 {
            let (left, right) = (x * 4, (width - 1 - x) * 4);
            for channel in 0..4 {
                row.swap(left + channel, right + channel);
            }
        }
    }
}

impl AppModel {
    /// Build the camera preview widget
    ///
    /// Shows the latest frame (or a themed placeholder before the first one
    /// arrives). Presses are reported where they land, and the focus marker
    /// is stacked on top while a focus operation runs.
    pub fn build_camera_preview(&self, marker: Option<FocusMarker>) -> Element<'_, Message> {
        let feed: Element<'_, Message> = match &self.preview_handle {
            Some(handle) => widget::image(handle.clone())
                .content_fit(ContentFit::Cover)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => widget::container(widget::Space::new(Length::Fill, Length::Fill))
                .width(Length::Fill)
                .height(Length::Fill)
                .style(|_theme| widget::container::Style {
                    background: Some(Background::Color(Color::BLACK)),
                    ..Default::default()
                })
                .into(),
        };

        let preview: Element<'_, Message> = match marker {
            Some(marker) => cosmic::iced::widget::stack![feed, focus_marker_overlay(marker)]
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => feed,
        };

        tap_area(preview, Message::FocusAt).into()
    }
}

/// Square outline placed at the marker's top-left corner
fn focus_marker_overlay<'a>(marker: FocusMarker) -> Element<'a, Message> {
    let ring = widget::container(widget::Space::new(
        Length::Fixed(marker.size),
        Length::Fixed(marker.size),
    ))
    .style(|_theme| widget::container::Style {
        border: Border {
            color: Color::WHITE,
            width: ui::FOCUS_MARKER_BORDER,
            radius: 0.0.into(),
        },
        ..Default::default()
    });

    widget::column()
        .push(widget::vertical_space().height(Length::Fixed(marker.top)))
        .push(
            widget::row()
                .push(widget::horizontal_space().width(Length::Fixed(marker.left)))
                .push(ring),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_rows_swaps_pixels() {
        // Two rows of three pixels: A B C / D E F
        let mut pixels = vec![
            1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, //
            4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6,
        ];
        mirror_rows(&mut pixels, 3);
        assert_eq!(
            pixels,
            vec![
                3, 3, 3, 3, 2, 2, 2, 2, 1, 1, 1, 1, //
                6, 6, 6, 6, 5, 5, 5, 5, 4, 4, 4, 4,
            ]
        );
    }

    #[test]
    fn test_mirror_rows_empty() {
        let mut pixels: Vec<u8> = Vec::new();
        mirror_rows(&mut pixels, 0);
        assert!(pixels.is_empty());
    }
}
