//! # Draw Passes
//!
//! Read-only traversals that turn shapes into colored line segments. The
//! renderer consuming the [`DrawList`] lives outside this crate.

use steer_core::Scene;

use crate::components::{Color, Crosshair, Transform, Triangle};
use crate::math::Vec2;

/// One colored line segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    /// Start point.
    pub from: Vec2,
    /// End point.
    pub to: Vec2,
    /// Stroke color.
    pub color: Color,
}

/// Line segments for one frame, in draw order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    /// Color the frame is cleared to.
    pub background: Color,
    lines: Vec<Line>,
}

impl DrawList {
    /// Creates an empty list over `background`.
    #[must_use]
    pub const fn new(background: Color) -> Self {
        Self {
            background,
            lines: Vec::new(),
        }
    }

    /// Appends a segment.
    pub fn line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.lines.push(Line { from, to, color });
    }

    /// Segments recorded so far.
    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if nothing was drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drops all segments, keeping the allocation.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Draws every triangle as three edges.
///
/// The tip sits `radius × scale.y` ahead of the position along the heading;
/// the base corners sit `radius` behind it, spread `radius × scale.x` to
/// either side.
pub fn triangles(scene: &Scene, out: &mut DrawList) {
    for id in scene.view::<(Triangle, Transform, Color)>() {
        let (Ok(triangle), Ok(transform), Ok(&color)) = (
            scene.get_component::<Triangle>(id),
            scene.get_component::<Transform>(id),
            scene.get_component::<Color>(id),
        ) else {
            continue;
        };

        let radius = triangle.radius;
        let head = transform.rotation;
        let side = head.perp();
        let base = transform.position - head * radius;

        let tip = transform.position + head * (radius * transform.scale.y);
        let left = base + side * (radius * transform.scale.x);
        let right = base - side * (radius * transform.scale.x);

        out.line(tip, left, color);
        out.line(left, right, color);
        out.line(right, tip, color);
    }
}

/// Draws every crosshair as a horizontal and a vertical stroke.
pub fn crosshairs(scene: &Scene, out: &mut DrawList) {
    for id in scene.view::<(Crosshair, Transform, Color)>() {
        let (Ok(crosshair), Ok(transform), Ok(&color)) = (
            scene.get_component::<Crosshair>(id),
            scene.get_component::<Transform>(id),
            scene.get_component::<Color>(id),
        ) else {
            continue;
        };

        let Vec2 { x, y } = transform.position;
        let r = crosshair.radius;
        let scale = transform.scale;

        out.line(
            Vec2::new(x + r, y).mul_elements(scale),
            Vec2::new(x - r, y).mul_elements(scale),
            color,
        );
        out.line(
            Vec2::new(x, y + r).mul_elements(scale),
            Vec2::new(x, y - r).mul_elements(scale),
            color,
        );
    }
}
