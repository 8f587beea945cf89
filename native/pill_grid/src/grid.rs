use skia_safe::{Color, Rect};

use crate::context::DrawContext;
use crate::geometry::{Position, SurfaceSize, angle_degrees, distance};
use crate::pill::draw_pill;

/// Margin around the lattice and spacing between lattice points.
pub const PADDING: u32 = 20;

/// Size of a pill sitting right under the pointer.
pub const MAX_PILL_SIZE: f32 = 10.0;

pub const PILL_COLOR: Color = Color::from_rgb(0x53, 0x5b, 0xf2);

/// One lattice point and the pill drawn there this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PillCell {
    pub position: Position,
    pub size: f32,
    pub rotation: f32,
}

/// Lattice points of `surface`, column by column.
///
/// Points start `PADDING` in from the top-left and stop no closer than
/// `PADDING` to the right and bottom edges.
pub fn lattice(surface: SurfaceSize) -> impl Iterator<Item = Position> {
    axis(surface.width).flat_map(move |x| {
        axis(surface.height).map(move |y| Position::new(x as f32, y as f32))
    })
}

fn axis(extent: u32) -> impl Iterator<Item = u32> {
    (PADDING..)
        .step_by(PADDING as usize)
        .take_while(move |v| v.saturating_add(PADDING) <= extent)
}

/// Exponential falloff from `MAX_PILL_SIZE` at distance zero to 1 at `max_distance`.
pub fn falloff_size(distance: f32, max_distance: f32) -> f32 {
    MAX_PILL_SIZE.powf(1.0 - distance / max_distance)
}

/// The pills of one frame. Empty when the surface has no area to normalise against.
pub fn cells(surface: SurfaceSize, pointer: Position) -> impl Iterator<Item = PillCell> {
    let max_distance = surface.diagonal();
    let points = if max_distance > 0.0 {
        Some(lattice(surface))
    } else {
        None
    };

    points.into_iter().flatten().map(move |position| PillCell {
        position,
        size: falloff_size(distance(position, pointer), max_distance),
        rotation: angle_degrees(position, pointer),
    })
}

/// Repaints the whole surface for one frame and returns how many pills were drawn.
pub fn draw_grid<C: DrawContext + ?Sized>(
    ctx: &mut C,
    surface: SurfaceSize,
    pointer: Position,
) -> usize {
    ctx.clear_rect(Rect::from_wh(surface.width as f32, surface.height as f32));
    ctx.set_fill_color(PILL_COLOR);

    let mut drawn = 0;
    for cell in cells(surface, pointer) {
        draw_pill(ctx, cell.position, cell.size, cell.rotation);
        drawn += 1;
    }
    drawn
}
