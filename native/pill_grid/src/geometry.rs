/// A point in surface pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Position {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Physical pixel size of a drawing surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Length of the surface diagonal, the largest distance two points on it can have.
    pub fn diagonal(&self) -> f32 {
        distance(
            Position::ORIGIN,
            Position::new(self.width as f32, self.height as f32),
        )
    }
}

impl From<(u32, u32)> for SurfaceSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

pub fn distance(a: Position, b: Position) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Direction from `a` to `b` in degrees, within `(-180, 180]`.
///
/// Screen space: y grows downwards, so a positive angle turns clockwise.
pub fn angle_degrees(a: Position, b: Position) -> f32 {
    // `+ 0.0` folds a negative-zero dy into positive zero, keeping atan2 off -pi.
    let dy = (b.y - a.y) + 0.0;
    let dx = b.x - a.x;
    let degrees = dy.atan2(dx).to_degrees();
    if degrees <= -180.0 {
        180.0
    } else {
        degrees.min(180.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<Position> {
        vec![
            Position::new(0.0, 0.0),
            Position::new(20.0, 20.0),
            Position::new(-35.5, 12.0),
            Position::new(100.0, -0.0),
            Position::new(-0.0, -80.0),
            Position::new(640.0, 480.0),
            Position::new(13.25, -7.75),
        ]
    }

    #[test]
    fn distance_is_symmetric() {
        for &a in &sample_points() {
            for &b in &sample_points() {
                assert_eq!(distance(a, b), distance(b, a));
            }
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        for &a in &sample_points() {
            assert_eq!(distance(a, a), 0.0);
        }
    }

    #[test]
    fn distance_matches_pythagoras() {
        assert_eq!(distance(Position::new(0.0, 0.0), Position::new(3.0, 4.0)), 5.0);
        assert_eq!(SurfaceSize::new(30, 40).diagonal(), 50.0);
        assert_eq!(SurfaceSize::new(0, 0).diagonal(), 0.0);
    }

    #[test]
    fn angle_follows_screen_axes() {
        let origin = Position::ORIGIN;
        assert_eq!(angle_degrees(origin, Position::new(10.0, 0.0)), 0.0);
        assert!((angle_degrees(origin, Position::new(0.0, 10.0)) - 90.0).abs() < 1e-4);
        assert!((angle_degrees(origin, Position::new(0.0, -10.0)) + 90.0).abs() < 1e-4);
        assert_eq!(angle_degrees(origin, Position::new(-10.0, 0.0)), 180.0);
        let diagonal = angle_degrees(origin, Position::new(10.0, 10.0));
        assert!((diagonal - 45.0).abs() < 1e-4);
    }

    #[test]
    fn angle_stays_in_half_open_range() {
        for &a in &sample_points() {
            for &b in &sample_points() {
                if a == b {
                    continue;
                }
                let angle = angle_degrees(a, b);
                assert!(angle > -180.0 && angle <= 180.0, "{a:?} -> {b:?} gave {angle}");
            }
        }
    }

    #[test]
    fn negative_zero_dy_reports_positive_half_turn() {
        let a = Position::new(10.0, 0.0);
        let b = Position::new(0.0, -0.0);
        assert_eq!(angle_degrees(a, b), 180.0);
    }

    #[test]
    fn reversed_angle_differs_by_half_turn() {
        for &a in &sample_points() {
            for &b in &sample_points() {
                if a == b {
                    continue;
                }
                let forward = angle_degrees(a, b);
                let backward = angle_degrees(b, a);
                let diff = (forward - backward).rem_euclid(360.0);
                assert!((diff - 180.0).abs() < 1e-3, "{a:?} <-> {b:?}: {forward} vs {backward}");
            }
        }
    }
}
