use crate::geometry::Position;

/// Input the grid reacts to, already in surface pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    CursorPos { x: f32, y: f32 },
    /// Every touch point currently down, earliest first.
    Touch { touches: Vec<Position> },
    ViewportReshape { width: u32, height: u32 },
}

/// Most recent pointer position; starts at the origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub pos: Position,
}

impl PointerState {
    pub fn new() -> Self {
        Self {
            pos: Position::ORIGIN,
        }
    }

    /// Overwrites the tracked position with the pointer or first-touch
    /// coordinates carried by `event`. Returns whether the position was updated.
    pub fn apply(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::CursorPos { x, y } => {
                self.pos = Position::new(*x, *y);
                true
            }
            InputEvent::Touch { touches } => match touches.first() {
                Some(first) => {
                    self.pos = *first;
                    true
                }
                None => false,
            },
            InputEvent::ViewportReshape { .. } => false,
        }
    }
}
