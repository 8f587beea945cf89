use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::TouchPhase;

use crate::geometry::Position;
use crate::input::InputEvent;

pub fn cursor_event(position: PhysicalPosition<f64>) -> InputEvent {
    InputEvent::CursorPos {
        x: position.x as f32,
        y: position.y as f32,
    }
}

pub fn reshape_event(size: PhysicalSize<u32>) -> InputEvent {
    InputEvent::ViewportReshape {
        width: size.width,
        height: size.height,
    }
}

/// Rebuilds the list of active touches from winit's one-touch-at-a-time events.
#[derive(Debug, Default)]
pub struct TouchTracker {
    active: Vec<(u64, Position)>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only moves are reported to the grid; starts and ends just maintain the list.
    pub fn update(
        &mut self,
        id: u64,
        phase: TouchPhase,
        location: PhysicalPosition<f64>,
    ) -> Option<InputEvent> {
        let position = Position::new(location.x as f32, location.y as f32);
        match phase {
            TouchPhase::Started => {
                self.active.retain(|(active_id, _)| *active_id != id);
                self.active.push((id, position));
                None
            }
            TouchPhase::Moved => {
                match self.active.iter_mut().find(|(active_id, _)| *active_id == id) {
                    Some((_, pos)) => *pos = position,
                    None => self.active.push((id, position)),
                }
                Some(InputEvent::Touch {
                    touches: self.active.iter().map(|(_, pos)| *pos).collect(),
                })
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.active.retain(|(active_id, _)| *active_id != id);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64) -> PhysicalPosition<f64> {
        PhysicalPosition::new(x, y)
    }

    #[test]
    fn cursor_event_keeps_physical_pixels() {
        assert_eq!(
            cursor_event(at(12.5, 40.0)),
            InputEvent::CursorPos { x: 12.5, y: 40.0 }
        );
    }

    #[test]
    fn reshape_event_copies_size() {
        assert_eq!(
            reshape_event(PhysicalSize::new(1920, 1080)),
            InputEvent::ViewportReshape {
                width: 1920,
                height: 1080
            }
        );
    }

    #[test]
    fn move_reports_touches_in_start_order() {
        let mut tracker = TouchTracker::new();
        assert_eq!(tracker.update(1, TouchPhase::Started, at(10.0, 10.0)), None);
        assert_eq!(tracker.update(2, TouchPhase::Started, at(50.0, 50.0)), None);

        let event = tracker.update(2, TouchPhase::Moved, at(60.0, 55.0));
        assert_eq!(
            event,
            Some(InputEvent::Touch {
                touches: vec![Position::new(10.0, 10.0), Position::new(60.0, 55.0)],
            })
        );
    }

    #[test]
    fn ended_touch_hands_over_to_next() {
        let mut tracker = TouchTracker::new();
        tracker.update(1, TouchPhase::Started, at(10.0, 10.0));
        tracker.update(2, TouchPhase::Started, at(50.0, 50.0));
        tracker.update(1, TouchPhase::Ended, at(10.0, 10.0));

        let event = tracker.update(2, TouchPhase::Moved, at(51.0, 52.0));
        assert_eq!(
            event,
            Some(InputEvent::Touch {
                touches: vec![Position::new(51.0, 52.0)],
            })
        );
    }

    #[test]
    fn cancelled_touches_empty_the_list() {
        let mut tracker = TouchTracker::new();
        tracker.update(3, TouchPhase::Started, at(1.0, 1.0));
        tracker.update(3, TouchPhase::Cancelled, at(1.0, 1.0));
        assert!(tracker.is_empty());
    }

    #[test]
    fn move_without_start_is_tracked() {
        let mut tracker = TouchTracker::new();
        let event = tracker.update(9, TouchPhase::Moved, at(4.0, 2.0));
        assert_eq!(
            event,
            Some(InputEvent::Touch {
                touches: vec![Position::new(4.0, 2.0)],
            })
        );
        assert_eq!(tracker.len(), 1);
    }
}
