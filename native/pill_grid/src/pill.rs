use skia_safe::Rect;

use crate::context::DrawContext;
use crate::geometry::Position;

/// Thickness of every pill, in pixels.
pub const PILL_THICKNESS: f32 = 2.0;

/// Draws one `size`-long bar at `position`, rotated clockwise by `rotation` degrees
/// around its own center, using the context's current fill color.
///
/// The context's transform and fill state are left as they were.
pub fn draw_pill<C: DrawContext + ?Sized>(
    ctx: &mut C,
    position: Position,
    size: f32,
    rotation: f32,
) {
    let half = size / 2.0;

    ctx.save();
    ctx.translate(position.x + half, position.y + half);
    ctx.rotate(rotation.to_radians());
    ctx.fill_rect(Rect::from_xywh(
        -half,
        -PILL_THICKNESS / 2.0,
        size,
        PILL_THICKNESS,
    ));
    ctx.restore();
}
