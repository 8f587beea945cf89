use skia_safe::{BlendMode, Canvas, Color, Matrix, Paint, Rect, Vector};

/// The 2D drawing operations the grid needs from a surface.
///
/// `save`/`restore` cover both the transform and the fill color, the way an
/// HTML canvas context does. A `restore` without a matching `save` is ignored.
pub trait DrawContext {
    fn clear_rect(&mut self, rect: Rect);
    fn set_fill_color(&mut self, color: Color);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn rotate(&mut self, radians: f32);
    fn fill_rect(&mut self, rect: Rect);
}

/// Draws straight onto a Skia canvas.
pub struct SkiaContext<'a> {
    canvas: &'a Canvas,
    background: Color,
    paint: Paint,
    stack: Vec<Color>,
}

impl<'a> SkiaContext<'a> {
    pub fn new(canvas: &'a Canvas, background: Color) -> Self {
        let mut paint = Paint::default();
        paint.set_anti_alias(true);
        paint.set_color(Color::BLACK);
        Self {
            canvas,
            background,
            paint,
            stack: Vec::new(),
        }
    }
}

impl DrawContext for SkiaContext<'_> {
    fn clear_rect(&mut self, rect: Rect) {
        let mut paint = Paint::default();
        paint.set_blend_mode(BlendMode::Src);
        paint.set_color(self.background);
        self.canvas.draw_rect(rect, &paint);
    }

    fn set_fill_color(&mut self, color: Color) {
        self.paint.set_color(color);
    }

    fn save(&mut self) {
        self.canvas.save();
        self.stack.push(self.paint.color());
    }

    fn restore(&mut self) {
        if let Some(color) = self.stack.pop() {
            self.canvas.restore();
            self.paint.set_color(color);
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.canvas.translate(Vector::new(dx, dy));
    }

    fn rotate(&mut self, radians: f32) {
        self.canvas.rotate(radians.to_degrees(), None);
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.canvas.draw_rect(rect, &self.paint);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    ClearRect(Rect),
    FillColor(Color),
    PushState,
    PopState,
    Translate(f32, f32),
    /// Radians.
    Rotate(f32),
    /// A filled rect together with the transform and color it was drawn with.
    FillRect {
        rect: Rect,
        matrix: Matrix,
        color: Color,
    },
}

#[derive(Clone, Copy, Debug)]
struct StateSnapshot {
    matrix: Matrix,
    fill_color: Color,
}

/// Records draw calls instead of rasterizing them, tracking the transform and
/// fill color a canvas would hold at each point.
#[derive(Clone, Debug)]
pub struct DisplayList {
    ops: Vec<DrawOp>,
    matrix: Matrix,
    fill_color: Color,
    stack: Vec<StateSnapshot>,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self {
            ops: Vec::new(),
            matrix: Matrix::default(),
            fill_color: Color::BLACK,
            stack: Vec::new(),
        }
    }
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Every filled rect in draw order, with its resolved transform and color.
    pub fn fills(&self) -> impl Iterator<Item = (&Rect, &Matrix, Color)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::FillRect {
                rect,
                matrix,
                color,
            } => Some((rect, matrix, *color)),
            _ => None,
        })
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn fill_color(&self) -> Color {
        self.fill_color
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl DrawContext for DisplayList {
    fn clear_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::ClearRect(rect));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
        self.ops.push(DrawOp::FillColor(color));
    }

    fn save(&mut self) {
        self.stack.push(StateSnapshot {
            matrix: self.matrix,
            fill_color: self.fill_color,
        });
        self.ops.push(DrawOp::PushState);
    }

    fn restore(&mut self) {
        if let Some(snapshot) = self.stack.pop() {
            self.matrix = snapshot.matrix;
            self.fill_color = snapshot.fill_color;
            self.ops.push(DrawOp::PopState);
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.matrix.pre_translate(Vector::new(dx, dy));
        self.ops.push(DrawOp::Translate(dx, dy));
    }

    fn rotate(&mut self, radians: f32) {
        self.matrix.pre_rotate(radians.to_degrees(), None);
        self.ops.push(DrawOp::Rotate(radians));
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::FillRect {
            rect,
            matrix: self.matrix,
            color: self.fill_color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skia_safe::Point;

    #[test]
    fn restore_brings_back_saved_state() {
        let mut list = DisplayList::new();
        list.set_fill_color(Color::RED);
        list.save();
        list.translate(10.0, 5.0);
        list.set_fill_color(Color::BLUE);
        assert_eq!(list.fill_color(), Color::BLUE);
        list.restore();

        assert_eq!(list.matrix(), &Matrix::default());
        assert_eq!(list.fill_color(), Color::RED);
        assert_eq!(list.depth(), 0);
    }

    #[test]
    fn unbalanced_restore_is_ignored() {
        let mut list = DisplayList::new();
        list.translate(3.0, 4.0);
        list.restore();

        assert_eq!(list.matrix(), &Matrix::translate((3.0, 4.0)));
        assert!(!list.ops().contains(&DrawOp::PopState));
    }

    #[test]
    fn fill_records_transform_in_effect() {
        let mut list = DisplayList::new();
        list.set_fill_color(Color::GREEN);
        list.translate(10.0, 20.0);
        list.fill_rect(Rect::from_xywh(0.0, 0.0, 4.0, 2.0));

        let fills: Vec<_> = list.fills().collect();
        assert_eq!(fills.len(), 1);
        let (rect, matrix, color) = fills[0];
        assert_eq!(*rect, Rect::from_xywh(0.0, 0.0, 4.0, 2.0));
        assert_eq!(color, Color::GREEN);
        assert_eq!(matrix.map_xy(0.0, 0.0), Point::new(10.0, 20.0));
    }
}
