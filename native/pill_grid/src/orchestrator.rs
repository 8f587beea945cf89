use tracing::{debug, trace};

use crate::context::DrawContext;
use crate::geometry::{Position, SurfaceSize};
use crate::grid::draw_grid;
use crate::input::{InputEvent, PointerState};

/// Reports the current viewport size in physical pixels.
pub trait ViewportSource {
    fn viewport_size(&self) -> SurfaceSize;
}

impl ViewportSource for SurfaceSize {
    fn viewport_size(&self) -> SurfaceSize {
        *self
    }
}

/// State of one grid instance: where the pointer is and how big the surface is.
#[derive(Debug)]
pub struct Orchestrator {
    pointer: PointerState,
    surface: SurfaceSize,
    frames: u64,
}

impl Orchestrator {
    pub fn new(viewport: &impl ViewportSource) -> Self {
        let mut orchestrator = Self {
            pointer: PointerState::new(),
            surface: SurfaceSize::default(),
            frames: 0,
        };
        orchestrator.resize_to(viewport);
        orchestrator
    }

    pub fn pointer(&self) -> Position {
        self.pointer.pos
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn resize_to(&mut self, viewport: &impl ViewportSource) -> SurfaceSize {
        self.resize(viewport.viewport_size())
    }

    fn resize(&mut self, size: SurfaceSize) -> SurfaceSize {
        if size != self.surface {
            debug!(width = size.width, height = size.height, "surface resized");
            self.surface = size;
        }
        self.surface
    }

    /// Applies one input event. Returns the new surface size when the event
    /// was a reshape, so the host can resize its backing buffer to match.
    pub fn handle_input(&mut self, event: InputEvent) -> Option<SurfaceSize> {
        match event {
            InputEvent::ViewportReshape { width, height } => {
                Some(self.resize(SurfaceSize::new(width, height)))
            }
            event => {
                if !self.pointer.apply(&event) {
                    trace!(?event, "input ignored");
                }
                None
            }
        }
    }

    /// Draws one frame with the current pointer and surface size.
    pub fn render_frame<C: DrawContext + ?Sized>(&mut self, ctx: &mut C) -> usize {
        let drawn = draw_grid(ctx, self.surface, self.pointer.pos);
        self.frames += 1;
        trace!(frame = self.frames, pills = drawn, "frame rendered");
        drawn
    }
}
