//! Pointer gestures on the preview: moving and resizing text boxes, panning
//! and zooming the background art.
//!
//! A gesture is a plain value created on pointer-down and dropped on
//! pointer-up. It never touches the layout itself; callers write the returned
//! position back.

use serde::{Deserialize, Serialize};

use crate::geometry::{Axis, DisplayMapping, DisplayPixels, round_tenth};
use crate::{BackgroundTransform, TextPosition};

pub const MIN_BACKGROUND_SCALE: f64 = 0.1;
pub const MAX_BACKGROUND_SCALE: f64 = 10.0;
/// Smallest box edge, in percent, a resize can produce.
pub const MIN_BOX_SIZE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeHandle {
    pub const ALL: [Self; 8] = [
        Self::N,
        Self::Ne,
        Self::E,
        Self::Se,
        Self::S,
        Self::Sw,
        Self::W,
        Self::Nw,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::N => "n",
            Self::Ne => "ne",
            Self::E => "e",
            Self::Se => "se",
            Self::S => "s",
            Self::Sw => "sw",
            Self::W => "w",
            Self::Nw => "nw",
        }
    }

    /// CSS cursor shown over the handle.
    #[must_use]
    pub const fn cursor(self) -> &'static str {
        match self {
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::Nw | Self::Se => "nwse-resize",
        }
    }

    const fn moves_left(self) -> bool {
        matches!(self, Self::Nw | Self::Sw | Self::W)
    }

    const fn moves_top(self) -> bool {
        matches!(self, Self::Nw | Self::N | Self::Ne)
    }

    const fn moves_right(self) -> bool {
        matches!(self, Self::Ne | Self::E | Self::Se)
    }

    const fn moves_bottom(self) -> bool {
        matches!(self, Self::Se | Self::S | Self::Sw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "handle")]
pub enum GestureAction {
    Move,
    Resize(ResizeHandle),
}

/// A drag in progress on one text box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGesture {
    action: GestureAction,
    mapping: DisplayMapping,
    start_x: f64,
    start_y: f64,
    start: TextPosition,
}

impl BoxGesture {
    #[must_use]
    pub fn begin(
        action: GestureAction,
        mapping: DisplayMapping,
        pointer: (f64, f64),
        start: TextPosition,
    ) -> Self {
        Self {
            action,
            mapping,
            start_x: pointer.0,
            start_y: pointer.1,
            start,
        }
    }

    #[must_use]
    pub const fn action(&self) -> GestureAction {
        self.action
    }

    #[must_use]
    pub const fn start(&self) -> &TextPosition {
        &self.start
    }

    /// The position the box should have with the pointer at `pointer`.
    #[must_use]
    pub fn update(&self, pointer: (f64, f64)) -> TextPosition {
        let dx = round_tenth(
            self.mapping
                .display_delta_to_percent(DisplayPixels(pointer.0 - self.start_x), Axis::Horizontal),
        );
        let dy = round_tenth(
            self.mapping
                .display_delta_to_percent(DisplayPixels(pointer.1 - self.start_y), Axis::Vertical),
        );
        let s = &self.start;
        let mut next = s.clone();

        match self.action {
            GestureAction::Move => {
                next.x = round_tenth(s.x + dx).clamp(0.0, (100.0 - s.width).max(0.0));
                next.y = round_tenth(s.y + dy).clamp(0.0, (100.0 - s.height).max(0.0));
            }
            GestureAction::Resize(handle) => {
                if handle.moves_left() {
                    let right = s.x + s.width;
                    next.x = round_tenth(s.x + dx).clamp(0.0, (right - MIN_BOX_SIZE).max(0.0));
                    next.width = round_tenth(s.width - (next.x - s.x));
                }
                if handle.moves_top() {
                    let bottom = s.y + s.height;
                    next.y = round_tenth(s.y + dy).clamp(0.0, (bottom - MIN_BOX_SIZE).max(0.0));
                    next.height = round_tenth(s.height - (next.y - s.y));
                }
                if handle.moves_right() {
                    next.width = round_tenth(s.width + dx)
                        .clamp(MIN_BOX_SIZE, (100.0 - s.x).max(MIN_BOX_SIZE));
                }
                if handle.moves_bottom() {
                    next.height = round_tenth(s.height + dy)
                        .clamp(MIN_BOX_SIZE, (100.0 - s.y).max(MIN_BOX_SIZE));
                }
            }
        }

        next
    }
}

/// A drag of the background artwork.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanGesture {
    start_x: f64,
    start_y: f64,
    start: BackgroundTransform,
    rect_width: f64,
    rect_height: f64,
}

impl PanGesture {
    /// `rect` is the on-screen size of the preview the pointer moves over.
    #[must_use]
    pub const fn begin(pointer: (f64, f64), rect: (f64, f64), start: BackgroundTransform) -> Self {
        Self {
            start_x: pointer.0,
            start_y: pointer.1,
            start,
            rect_width: rect.0,
            rect_height: rect.1,
        }
    }

    #[must_use]
    pub fn update(&self, pointer: (f64, f64)) -> BackgroundTransform {
        let percent = |delta: f64, len: f64| if len == 0.0 { 0.0 } else { delta / len * 100.0 };
        BackgroundTransform {
            scale: self.start.scale,
            offset_x: self.start.offset_x + percent(pointer.0 - self.start_x, self.rect_width),
            offset_y: self.start.offset_y + percent(pointer.1 - self.start_y, self.rect_height),
        }
    }
}

/// Apply one wheel notch to the background scale.
#[must_use]
pub fn zoom_background(transform: BackgroundTransform, delta_y: f64) -> BackgroundTransform {
    let factor = if delta_y > 0.0 { 0.95 } else { 1.05 };
    BackgroundTransform {
        scale: (transform.scale * factor).clamp(MIN_BACKGROUND_SCALE, MAX_BACKGROUND_SCALE),
        ..transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Axis;

    fn mapping() -> DisplayMapping {
        DisplayMapping::new(250.0, 350.0)
    }

    /// Display pixels that correspond to `percent` of the full canvas.
    fn px(percent: f64, axis: Axis) -> f64 {
        let m = mapping();
        m.display_len(axis) * percent / 100.0 * axis.full_inches() / axis.card_inches()
    }

    fn start() -> TextPosition {
        TextPosition::new(10.0, 20.0, 30.0, 10.0, 8.0)
    }

    #[test]
    fn move_translates_and_clamps() {
        let gesture = BoxGesture::begin(GestureAction::Move, mapping(), (0.0, 0.0), start());
        let moved = gesture.update((px(5.0, Axis::Horizontal), px(-3.0, Axis::Vertical)));
        assert_eq!(moved.x, 15.0);
        assert_eq!(moved.y, 17.0);
        assert_eq!(moved.width, 30.0);

        let pinned = gesture.update((px(200.0, Axis::Horizontal), px(-200.0, Axis::Vertical)));
        assert_eq!(pinned.x, 70.0);
        assert_eq!(pinned.y, 0.0);
    }

    #[test]
    fn resize_east_keeps_minimum_width() {
        let gesture = BoxGesture::begin(
            GestureAction::Resize(ResizeHandle::E),
            mapping(),
            (0.0, 0.0),
            start(),
        );
        let narrowed = gesture.update((px(-100.0, Axis::Horizontal), 0.0));
        assert_eq!(narrowed.width, MIN_BOX_SIZE);
        assert_eq!(narrowed.x, 10.0);

        let widened = gesture.update((px(100.0, Axis::Horizontal), 0.0));
        assert_eq!(widened.width, 90.0);
    }

    #[test]
    fn resize_north_west_anchors_bottom_right() {
        let gesture = BoxGesture::begin(
            GestureAction::Resize(ResizeHandle::Nw),
            mapping(),
            (0.0, 0.0),
            start(),
        );
        let grown = gesture.update((px(-4.0, Axis::Horizontal), px(-5.0, Axis::Vertical)));
        assert_eq!(grown.x, 6.0);
        assert_eq!(grown.width, 34.0);
        assert_eq!(grown.y, 15.0);
        assert_eq!(grown.height, 15.0);
        assert_eq!(grown.x + grown.width, 40.0);

        let collapsed = gesture.update((px(100.0, Axis::Horizontal), px(100.0, Axis::Vertical)));
        assert_eq!(collapsed.x, 39.0);
        assert_eq!(collapsed.width, 1.0);
        assert_eq!(collapsed.height, 1.0);
    }

    #[test]
    fn resize_south_west_moves_left_edge_and_bottom() {
        let gesture = BoxGesture::begin(
            GestureAction::Resize(ResizeHandle::Sw),
            mapping(),
            (0.0, 0.0),
            start(),
        );
        let next = gesture.update((px(2.0, Axis::Horizontal), px(4.0, Axis::Vertical)));
        assert_eq!(next.x, 12.0);
        assert_eq!(next.width, 28.0);
        assert_eq!(next.y, 20.0);
        assert_eq!(next.height, 14.0);
    }

    #[test]
    fn gesture_preserves_font_settings() {
        let mut position = start();
        position.font_family = Some(String::from("Beleren"));
        let gesture = BoxGesture::begin(GestureAction::Move, mapping(), (0.0, 0.0), position);
        let moved = gesture.update((10.0, 10.0));
        assert_eq!(moved.font_family.as_deref(), Some("Beleren"));
        assert_eq!(moved.font_size, 8.0);
    }

    #[test]
    fn pan_adds_percent_of_rect() {
        let gesture = PanGesture::begin((100.0, 100.0), (200.0, 400.0), BackgroundTransform::IDENTITY);
        let next = gesture.update((150.0, 60.0));
        assert_eq!(next.offset_x, 25.0);
        assert_eq!(next.offset_y, -10.0);
        assert_eq!(next.scale, 1.0);
    }

    #[test]
    fn zoom_steps_and_clamps() {
        let out = zoom_background(BackgroundTransform::IDENTITY, 1.0);
        assert!((out.scale - 0.95).abs() < 1e-12);
        let zoomed_in = zoom_background(BackgroundTransform::IDENTITY, -1.0);
        assert!((zoomed_in.scale - 1.05).abs() < 1e-12);

        let mut transform = BackgroundTransform::IDENTITY;
        for _ in 0..200 {
            transform = zoom_background(transform, 1.0);
        }
        assert_eq!(transform.scale, MIN_BACKGROUND_SCALE);
    }
}
