use skia_safe::{
    AlphaType, Color, ColorType, EncodedImageFormat, ImageInfo, Surface,
    gpu::{self, SurfaceOrigin, backend_render_targets, gl::FramebufferInfo},
    image::CachingHint,
    surfaces,
};

use crate::RasterFrame;
use crate::context::SkiaContext;
use crate::error::GridError;
use crate::geometry::SurfaceSize;
use crate::orchestrator::Orchestrator;

/// What a cleared surface looks like behind the pills.
pub const BACKGROUND_COLOR: Color = Color::from_rgb(0x24, 0x24, 0x24);

// Skia cannot allocate an empty surface, so backing stores are at least 1x1.
fn backing_dimensions(size: SurfaceSize) -> (i32, i32) {
    (size.width.max(1) as i32, size.height.max(1) as i32)
}

fn create_gl_surface(
    size: SurfaceSize,
    fb_info: FramebufferInfo,
    gr_context: &mut gpu::DirectContext,
    num_samples: usize,
    stencil_size: usize,
) -> Result<Surface, GridError> {
    let backend_render_target = backend_render_targets::make_gl(
        backing_dimensions(size),
        num_samples,
        stencil_size,
        fb_info,
    );

    gpu::surfaces::wrap_backend_render_target(
        gr_context,
        &backend_render_target,
        SurfaceOrigin::BottomLeft,
        ColorType::RGBA8888,
        None,
        None,
    )
    .ok_or_else(|| GridError::Init("could not create Skia GL surface".to_string()))
}

fn create_raster_surface(size: SurfaceSize) -> Result<Surface, GridError> {
    let image_info = ImageInfo::new(
        backing_dimensions(size),
        ColorType::BGRA8888,
        AlphaType::Premul,
        None,
    );
    surfaces::raster(&image_info, None, None)
        .ok_or_else(|| GridError::Init("could not create Skia raster surface".to_string()))
}

#[derive(Clone, Copy)]
pub enum SurfaceSource {
    Gl {
        fb_info: FramebufferInfo,
        num_samples: usize,
        stencil_size: usize,
    },
    Raster,
}

/// Owns the Skia surface the grid is painted on.
pub struct Renderer {
    surface: Surface,
    gr_context: Option<gpu::DirectContext>,
    source: SurfaceSource,
    background: Color,
}

impl Renderer {
    pub fn new(
        size: SurfaceSize,
        fb_info: FramebufferInfo,
        gr_context: gpu::DirectContext,
        num_samples: usize,
        stencil_size: usize,
    ) -> Result<Self, GridError> {
        let mut gr_context = gr_context;
        let surface = create_gl_surface(
            size,
            fb_info,
            &mut gr_context,
            num_samples,
            stencil_size,
        )?;

        Ok(Self {
            surface,
            gr_context: Some(gr_context),
            source: SurfaceSource::Gl {
                fb_info,
                num_samples,
                stencil_size,
            },
            background: BACKGROUND_COLOR,
        })
    }

    pub fn raster(size: SurfaceSize) -> Result<Self, GridError> {
        Ok(Self {
            surface: create_raster_surface(size)?,
            gr_context: None,
            source: SurfaceSource::Raster,
            background: BACKGROUND_COLOR,
        })
    }

    /// Paints one frame of `orchestrator` and flushes it to the GPU if there is one.
    pub fn redraw(&mut self, orchestrator: &mut Orchestrator) -> usize {
        let drawn = {
            let mut ctx = SkiaContext::new(self.surface.canvas(), self.background);
            orchestrator.render_frame(&mut ctx)
        };

        if let Some(gr) = self.gr_context.as_mut() {
            gr.flush_and_submit();
        }
        drawn
    }

    pub fn resize(&mut self, size: SurfaceSize) -> Result<(), GridError> {
        self.surface = match self.source {
            SurfaceSource::Gl {
                fb_info,
                num_samples,
                stencil_size,
            } => {
                let context = self.gr_context.as_mut().ok_or_else(|| {
                    GridError::Init("GL surface without a direct context".to_string())
                })?;
                create_gl_surface(size, fb_info, context, num_samples, stencil_size)?
            }
            SurfaceSource::Raster => create_raster_surface(size)?,
        };
        Ok(())
    }

    /// Reads the current pixels back as packed RGB.
    pub fn snapshot(&mut self) -> Option<RasterFrame> {
        let (width, height) = (self.surface.width(), self.surface.height());
        let image = self.surface.image_snapshot();
        let image_info = ImageInfo::new((width, height), ColorType::RGB888x, AlphaType::Opaque, None);
        let row_bytes = image_info.min_row_bytes();
        let mut pixels = vec![0u8; row_bytes * height as usize];
        let ok = image.read_pixels(
            &image_info,
            pixels.as_mut_slice(),
            row_bytes,
            (0, 0),
            CachingHint::Disallow,
        );
        if !ok {
            return None;
        }

        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        for chunk in pixels.chunks_exact(4) {
            rgb.extend_from_slice(&chunk[..3]);
        }

        Some(RasterFrame {
            width: width as u32,
            height: height as u32,
            data: rgb,
        })
    }

    pub fn encode_png(&mut self) -> Result<Vec<u8>, GridError> {
        let image = self.surface.image_snapshot();
        image
            .encode(self.gr_context.as_mut(), EncodedImageFormat::PNG, None)
            .map(|data| data.as_bytes().to_vec())
            .ok_or(GridError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::PILL_COLOR;
    use crate::input::InputEvent;

    fn pixel(frame: &RasterFrame, x: u32, y: u32) -> [u8; 3] {
        let offset = ((y * frame.width + x) * 3) as usize;
        [frame.data[offset], frame.data[offset + 1], frame.data[offset + 2]]
    }

    #[test]
    fn pill_pixels_use_palette_color() {
        let size = SurfaceSize::new(100, 100);
        let mut renderer = Renderer::raster(size).expect("raster surface");
        let mut orchestrator = Orchestrator::new(&size);
        orchestrator.handle_input(InputEvent::CursorPos { x: 60.0, y: 40.0 });

        assert_eq!(renderer.redraw(&mut orchestrator), 16);
        let frame = renderer.snapshot().expect("snapshot");

        assert_eq!((frame.width, frame.height), (100, 100));
        // Inside the horizontal pill anchored at lattice point (40, 40).
        assert_eq!(pixel(&frame, 43, 43), [PILL_COLOR.r(), PILL_COLOR.g(), PILL_COLOR.b()]);
        assert_eq!(
            pixel(&frame, 5, 5),
            [BACKGROUND_COLOR.r(), BACKGROUND_COLOR.g(), BACKGROUND_COLOR.b()]
        );
    }

    #[test]
    fn resize_tracks_surface_size() {
        let mut renderer = Renderer::raster(SurfaceSize::new(100, 100)).expect("raster surface");
        renderer.resize(SurfaceSize::new(64, 32)).expect("resize");
        let frame = renderer.snapshot().expect("snapshot");
        assert_eq!((frame.width, frame.height), (64, 32));
        assert_eq!(frame.data.len(), 64 * 32 * 3);
    }

    #[test]
    fn empty_surface_still_renders() {
        let size = SurfaceSize::new(0, 0);
        let mut renderer = Renderer::raster(size).expect("raster surface");
        let mut orchestrator = Orchestrator::new(&size);
        assert_eq!(renderer.redraw(&mut orchestrator), 0);
    }

    #[test]
    fn png_output_has_signature() {
        let size = SurfaceSize::new(40, 40);
        let mut renderer = Renderer::raster(size).expect("raster surface");
        let mut orchestrator = Orchestrator::new(&size);
        renderer.redraw(&mut orchestrator);

        let png = renderer.encode_png().expect("png");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
