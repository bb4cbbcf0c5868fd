// SPDX-License-Identifier: GPL-3.0-only

//! Tap area for the live preview
//!
//! Wraps the preview and reports where a finger or the left mouse button
//! went down, relative to the preview's top-left corner. The position comes
//! from the press itself, so a touch tap with no prior motion still lands.

use crate::backends::camera::FocusPoint;
use cosmic::iced::advanced::widget::Tree;
use cosmic::iced::advanced::{Clipboard, Shell, Widget, layout};
use cosmic::iced::event::Status;
use cosmic::iced::{Element, Event, Length, Point, Rectangle, Size, mouse, touch};
use cosmic::{Renderer, Theme};

/// Preview wrapper that turns presses into focus points
pub struct TapArea<'a, Message> {
    content: Element<'a, Message, Theme, Renderer>,
    on_tap: Box<dyn Fn(FocusPoint) -> Message + 'a>,
}

impl<'a, Message> TapArea<'a, Message> {
    pub fn new(
        content: impl Into<Element<'a, Message, Theme, Renderer>>,
        on_tap: impl Fn(FocusPoint) -> Message + 'a,
    ) -> Self {
        Self {
            content: content.into(),
            on_tap: Box::new(on_tap),
        }
    }
}

/// Position of a press at `position` relative to `bounds`, if it hit them
pub(crate) fn tap_point(bounds: Rectangle, position: Point) -> Option<FocusPoint> {
    bounds
        .contains(position)
        .then(|| FocusPoint::new(position.x - bounds.x, position.y - bounds.y))
}

impl<'a, Message> Widget<Message, Theme, Renderer> for TapArea<'a, Message> {
    fn size(&self) -> Size<Length> {
        Size::new(Length::Fill, Length::Fill)
    }

    fn layout(
        &self,
        tree: &mut Tree,
        renderer: &Renderer,
        limits: &layout::Limits,
    ) -> layout::Node {
        let size = limits.max();
        let child_limits = layout::Limits::new(Size::ZERO, size);
        let child_node =
            self.content
                .as_widget()
                .layout(&mut tree.children[0], renderer, &child_limits);

        layout::Node::with_children(size, vec![child_node])
    }

    fn draw(
        &self,
        tree: &Tree,
        renderer: &mut Renderer,
        theme: &Theme,
        style: &cosmic::iced::advanced::renderer::Style,
        layout: layout::Layout<'_>,
        cursor: mouse::Cursor,
        viewport: &Rectangle,
    ) {
        if let Some(child) = layout.children().next() {
            self.content.as_widget().draw(
                &tree.children[0],
                renderer,
                theme,
                style,
                child,
                cursor,
                viewport,
            );
        }
    }

    fn children(&self) -> Vec<Tree> {
        vec![Tree::new(&self.content)]
    }

    fn diff(&mut self, tree: &mut Tree) {
        tree.diff_children(std::slice::from_mut(&mut self.content));
    }

    fn operate(
        &self,
        tree: &mut Tree,
        layout: layout::Layout<'_>,
        renderer: &Renderer,
        operation: &mut dyn cosmic::iced::advanced::widget::Operation,
    ) {
        if let Some(child) = layout.children().next() {
            self.content
                .as_widget()
                .operate(&mut tree.children[0], child, renderer, operation);
        }
    }

    fn on_event(
        &mut self,
        tree: &mut Tree,
        event: Event,
        layout: layout::Layout<'_>,
        cursor: mouse::Cursor,
        renderer: &Renderer,
        clipboard: &mut dyn Clipboard,
        shell: &mut Shell<'_, Message>,
        viewport: &Rectangle,
    ) -> Status {
        if let Some(child) = layout.children().next() {
            let status = self.content.as_widget_mut().on_event(
                &mut tree.children[0],
                event.clone(),
                child,
                cursor,
                renderer,
                clipboard,
                shell,
                viewport,
            );
            if status == Status::Captured {
                return status;
            }
        }

        let bounds = layout.bounds();
        let pressed_at = match event {
            Event::Touch(touch::Event::FingerPressed { position, .. }) => Some(position),
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => cursor.position(),
            _ => None,
        };

        match pressed_at.and_then(|position| tap_point(bounds, position)) {
            Some(point) => {
                shell.publish((self.on_tap)(point));
                Status::Captured
            }
            None => Status::Ignored,
        }
    }

    fn mouse_interaction(
        &self,
        tree: &Tree,
        layout: layout::Layout<'_>,
        cursor: mouse::Cursor,
        viewport: &Rectangle,
        renderer: &Renderer,
    ) -> mouse::Interaction {
        if cursor.is_over(layout.bounds()) {
            return mouse::Interaction::Crosshair;
        }
        layout
            .children()
            .next()
            .map(|child| {
                self.content.as_widget().mouse_interaction(
                    &tree.children[0],
                    child,
                    cursor,
                    viewport,
                    renderer,
                )
            })
            .unwrap_or(mouse::Interaction::Idle)
    }
}

impl<'a, Message: 'a> From<TapArea<'a, Message>> for Element<'a, Message, Theme, Renderer> {
    fn from(area: TapArea<'a, Message>) -> Self {
        Element::new(area)
    }
}

/// Report presses on `content` as focus points
pub fn tap_area<'a, Message>(
    content: impl Into<Element<'a, Message, Theme, Renderer>>,
    on_tap: impl Fn(FocusPoint) -> Message + 'a,
) -> TapArea<'a, Message> {
    TapArea::new(content, on_tap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview_bounds() -> Rectangle {
        Rectangle::new(Point::new(10.0, 40.0), Size::new(400.0, 600.0))
    }

    #[test]
    fn test_tap_is_relative_to_preview() {
        let point = tap_point(preview_bounds(), Point::new(210.0, 340.0));
        assert_eq!(point, Some(FocusPoint::new(200.0, 300.0)));
    }

    #[test]
    fn test_tap_outside_preview_is_ignored() {
        assert_eq!(tap_point(preview_bounds(), Point::new(5.0, 100.0)), None);
        assert_eq!(tap_point(preview_bounds(), Point::new(100.0, 700.0)), None);
    }

    #[test]
    fn test_every_tap_uses_its_own_position() {
        let bounds = preview_bounds();
        let first = tap_point(bounds, Point::new(210.0, 340.0));
        let second = tap_point(bounds, Point::new(60.0, 90.0));
        assert_eq!(first, Some(FocusPoint::new(200.0, 300.0)));
        assert_eq!(second, Some(FocusPoint::new(50.0, 50.0)));
    }
}
