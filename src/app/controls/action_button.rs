// SPDX-License-Identifier: MPL-2.0

//! Round action button
//!
//! Stateless: every press emits exactly the message it was built with. With a
//! glyph it shows the icon at a fixed share of its size; without one it is the
//! blank capture trigger.

use crate::app::state::Message;
use crate::constants::ui;
use cosmic::Element;
use cosmic::iced::{Background, Border, Color, Length};
use cosmic::widget;

/// Default background behind a glyph
const GLYPH_BACKGROUND: Color = Color::from_rgba(0.0, 0.0, 0.0, 0.45);

/// Border around the blank capture trigger
const TRIGGER_BORDER_COLOR: Color = Color::from_rgb(0.6, 0.6, 0.6);

/// Builder for a round action button
pub struct ActionButton {
    on_press: Message,
    glyph: Option<&'static [u8]>,
    size: f32,
    background: Option<Color>,
    tooltip: Option<String>,
}

/// Start a button that emits `on_press` when pressed
pub fn action_button(on_press: Message) -> ActionButton {
    ActionButton {
        on_press,
        glyph: None,
        size: ui::ACTION_BUTTON_SIZE,
        background: None,
        tooltip: None,
    }
}

/// Icon edge length for a button of `size`
pub fn glyph_size(size: f32) -> f32 {
    size * ui::GLYPH_SCALE
}

impl ActionButton {
    /// SVG glyph drawn in the middle
    pub fn glyph(mut self, svg: &'static [u8]) -> Self {
        self.glyph = Some(svg);
        self
    }

    /// Diameter in logical pixels
    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn tooltip(mut self, text: impl Into<String>) -> Self {
        self.tooltip = Some(text.into());
        self
    }

    fn face<'a>(&self) -> Element<'a, Message> {
        let size = self.size;
        let radius = size / 2.0;

        match self.glyph {
            Some(svg) => {
                let background = self.background.unwrap_or(GLYPH_BACKGROUND);
                let icon = widget::icon(widget::icon::from_svg_bytes(svg).symbolic(true))
                    .size(glyph_size(size) as u16);

                widget::container(icon)
                    .width(Length::Fixed(size))
                    .height(Length::Fixed(size))
                    .center_x(Length::Fixed(size))
                    .center_y(Length::Fixed(size))
                    .style(move |_theme| widget::container::Style {
                        background: Some(Background::Color(background)),
                        text_color: Some(Color::WHITE),
                        border: Border {
                            radius: radius.into(),
                            ..Default::default()
                        },
                        ..Default::default()
                    })
                    .into()
            }
            None => {
                let [r, g, b] = ui::CAPTURE_TRIGGER_FILL;
                let fill = self.background.unwrap_or(Color::from_rgb(r, g, b));

                widget::container(widget::Space::new(
                    Length::Fixed(size),
                    Length::Fixed(size),
                ))
                .style(move |_theme| widget::container::Style {
                    background: Some(Background::Color(fill)),
                    border: Border {
                        color: TRIGGER_BORDER_COLOR,
                        width: ui::CAPTURE_TRIGGER_BORDER,
                        radius: radius.into(),
                    },
                    ..Default::default()
                })
                .into()
            }
        }
    }
}

impl<'a> From<ActionButton> for Element<'a, Message> {
    fn from(button: ActionButton) -> Self {
        let size = button.size;
        let face = button.face();
        let pressable = widget::button::custom(face)
            .on_press(button.on_press)
            .padding(0)
            .width(Length::Fixed(size))
            .height(Length::Fixed(size))
            .class(cosmic::theme::Button::Transparent);

        match button.tooltip {
            Some(text) => widget::tooltip(
                pressable,
                widget::text(text),
                widget::tooltip::Position::Top,
            )
            .into(),
            None => pressable.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_size() {
        let button = action_button(Message::Capture);
        assert_eq!(button.size, 70.0);
        assert!(button.glyph.is_none());
    }

    #[test]
    fn test_glyph_is_sixty_percent() {
        assert!((glyph_size(70.0) - 42.0).abs() < 1e-4);
        assert!((glyph_size(50.0) - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_builder_overrides() {
        let button = action_button(Message::ToggleFlash)
            .size(ui::FLASH_BUTTON_SIZE)
            .background(Color::BLACK);
        assert_eq!(button.size, 50.0);
        assert_eq!(button.background, Some(Color::BLACK));
        assert!(matches!(button.on_press, Message::ToggleFlash));
    }
}
