use std::{
    ffi::CString,
    num::NonZeroU32,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
    },
};

use glutin::{
    config::{ConfigTemplateBuilder, GlConfig},
    context::{ContextApi, ContextAttributesBuilder, NotCurrentGlContext, PossiblyCurrentContext},
    display::{GetGlDisplay, GlDisplay},
    prelude::GlSurface,
    surface::{Surface as GlutinSurface, SurfaceAttributesBuilder, WindowSurface},
};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasWindowHandle;
use skia_safe::gpu::gl::FramebufferInfo;
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    platform::wayland::EventLoopBuilderExtWayland,
    window::{Window, WindowAttributes},
};

use crate::error::GridError;
use crate::geometry::SurfaceSize;
use crate::input::InputEvent;
use crate::input_translate::{TouchTracker, cursor_event, reshape_event};
use crate::orchestrator::{Orchestrator, ViewportSource};
use crate::renderer::Renderer;

#[derive(Debug)]
pub enum UserEvent {
    Stop,
    Input(InputEvent),
}

#[derive(Clone, Debug)]
pub struct WindowConfig {
    pub requested_size: Option<SurfaceSize>,
    pub window_title: String,
    pub window_resizeable: bool,
}

impl ViewportSource for Window {
    fn viewport_size(&self) -> SurfaceSize {
        let size = self.inner_size();
        SurfaceSize::new(size.width, size.height)
    }
}

struct Env {
    gl_surface: GlutinSurface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: Window,
}

struct App {
    env: Option<Env>,
    renderer: Option<Renderer>,
    orchestrator: Orchestrator,
    touches: TouchTracker,
    running: bool,
    running_flag: Arc<AtomicBool>,
}

impl App {
    fn handle_input(&mut self, event: InputEvent) -> Result<(), GridError> {
        if let Some(size) = self.orchestrator.handle_input(event) {
            self.resize_surfaces(size)?;
        }
        Ok(())
    }

    fn resize_surfaces(&mut self, size: SurfaceSize) -> Result<(), GridError> {
        if let (Some(env), Some(renderer)) = (self.env.as_mut(), self.renderer.as_mut()) {
            env.gl_surface.resize(
                &env.gl_context,
                NonZeroU32::new(size.width.max(1)).unwrap_or(NonZeroU32::MIN),
                NonZeroU32::new(size.height.max(1)).unwrap_or(NonZeroU32::MIN),
            );
            renderer.resize(size)?;
            env.window.request_redraw();
        }
        Ok(())
    }

    /// Paints a frame, presents it and asks for the next one.
    fn redraw(&mut self) -> Result<(), GridError> {
        if let (Some(env), Some(renderer)) = (self.env.as_mut(), self.renderer.as_mut()) {
            renderer.redraw(&mut self.orchestrator);
            env.gl_surface
                .swap_buffers(&env.gl_context)
                .map_err(|err| GridError::Init(format!("swap_buffers failed: {err}")))?;
            env.window.request_redraw();
        }
        Ok(())
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        if self.running {
            info!(frames = self.orchestrator.frames(), "stopping window backend");
        }
        if let Some(env) = self.env.as_ref() {
            env.window.set_visible(false);
        }
        self.renderer = None;
        self.env = None;
        self.running = false;
        self.running_flag.store(false, Ordering::Release);
        event_loop.exit();
    }

    fn check(&mut self, event_loop: &ActiveEventLoop, result: Result<(), GridError>) {
        if let Err(err) = result {
            error!("window backend failed: {err}");
            self.stop(event_loop);
        }
    }
}

fn create_env_renderer(
    event_loop: &EventLoop<UserEvent>,
    config: WindowConfig,
) -> Result<(Env, Renderer), GridError> {
    let (width, height) = config
        .requested_size
        .map(|size| (size.width, size.height))
        .unwrap_or((800, 600));
    let window_attributes = WindowAttributes::default()
        .with_title(config.window_title)
        .with_resizable(config.window_resizeable)
        .with_inner_size(LogicalSize::new(width, height));

    let template = ConfigTemplateBuilder::new()
        .with_alpha_size(8)
        .with_transparency(true);

    let display_builder = DisplayBuilder::new().with_window_attributes(Some(window_attributes));
    let (window, gl_config) = display_builder
        .build(event_loop, template, |configs| {
            configs
                .reduce(|accum, cfg| {
                    if cfg.num_samples() < accum.num_samples() {
                        cfg
                    } else {
                        accum
                    }
                })
                .expect("glutin offered no GL configs")
        })
        .map_err(|err| GridError::Init(format!("failed to build display: {err}")))?;

    let window = window.ok_or_else(|| GridError::Init("could not create window".to_string()))?;
    let window_handle = window
        .window_handle()
        .map_err(|err| GridError::Init(format!("failed to get window handle: {err}")))?;
    let raw_window_handle = window_handle.as_raw();

    let context_attributes = ContextAttributesBuilder::new().build(Some(raw_window_handle));
    let fallback_context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::Gles(None))
        .build(Some(raw_window_handle));

    let not_current_gl_context = unsafe {
        gl_config
            .display()
            .create_context(&gl_config, &context_attributes)
            .or_else(|_| {
                gl_config
                    .display()
                    .create_context(&gl_config, &fallback_context_attributes)
            })
            .map_err(|err| GridError::Init(format!("failed to create GL/GLES context: {err}")))?
    };

    let (width, height): (u32, u32) = window.inner_size().into();
    let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        raw_window_handle,
        NonZeroU32::new(width.max(1)).unwrap_or(NonZeroU32::MIN),
        NonZeroU32::new(height.max(1)).unwrap_or(NonZeroU32::MIN),
    );

    let gl_surface = unsafe {
        gl_config
            .display()
            .create_window_surface(&gl_config, &attrs)
            .map_err(|err| GridError::Init(format!("could not create GL window surface: {err}")))?
    };

    let gl_context = not_current_gl_context
        .make_current(&gl_surface)
        .map_err(|err| GridError::Init(format!("could not make GL context current: {err}")))?;

    gl::load_with(|s| match CString::new(s) {
        Ok(name) => gl_config.display().get_proc_address(name.as_c_str()),
        Err(_) => std::ptr::null(),
    });

    let interface = skia_safe::gpu::gl::Interface::new_load_with(|name| {
        if name == "eglGetCurrentDisplay" {
            return std::ptr::null();
        }
        match CString::new(name) {
            Ok(name) => gl_config.display().get_proc_address(name.as_c_str()),
            Err(_) => std::ptr::null(),
        }
    })
    .ok_or_else(|| GridError::Init("could not create Skia GL interface".to_string()))?;

    let gr_context = skia_safe::gpu::direct_contexts::make_gl(interface, None).ok_or_else(|| {
        GridError::Init("make_gl failed: could not create Skia direct context".to_string())
    })?;

    let fb_info = {
        let mut fboid: i32 = 0;
        unsafe { gl::GetIntegerv(gl::FRAMEBUFFER_BINDING, &mut fboid) };

        FramebufferInfo {
            fboid: fboid as u32,
            format: skia_safe::gpu::gl::Format::RGBA8.into(),
            ..Default::default()
        }
    };

    let num_samples = gl_config.num_samples() as usize;
    let stencil_size = gl_config.stencil_size() as usize;

    let renderer = Renderer::new(
        window.viewport_size(),
        fb_info,
        gr_context,
        num_samples,
        stencil_size,
    )?;

    let env = Env {
        gl_surface,
        gl_context,
        window,
    };

    Ok((env, renderer))
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if !self.running {
            return;
        }

        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let result = self.handle_input(cursor_event(position));
                self.check(event_loop, result);
            }

            WindowEvent::Touch(touch) => {
                if let Some(event) = self.touches.update(touch.id, touch.phase, touch.location) {
                    let result = self.handle_input(event);
                    self.check(event_loop, result);
                }
            }

            WindowEvent::Resized(physical_size) => {
                debug!(
                    width = physical_size.width,
                    height = physical_size.height,
                    "window resized"
                );
                let result = self.handle_input(reshape_event(physical_size));
                self.check(event_loop, result);
            }

            WindowEvent::CloseRequested => self.stop(event_loop),

            WindowEvent::RedrawRequested => {
                let result = self.redraw();
                self.check(event_loop, result);
            }

            _ => {}
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::Stop => self.stop(event_loop),
            UserEvent::Input(input) => {
                if self.running {
                    let result = self.handle_input(input);
                    self.check(event_loop, result);
                }
            }
        }
    }
}

/// Opens the window and runs its event loop on the calling thread until stopped.
///
/// `proxy_ready` receives the loop's proxy once the window and GL context exist,
/// or the error that prevented them.
pub fn run(
    proxy_ready: Sender<Result<EventLoopProxy<UserEvent>, GridError>>,
    running_flag: Arc<AtomicBool>,
    config: WindowConfig,
) -> Result<(), GridError> {
    let mut el_builder = EventLoop::<UserEvent>::with_user_event();
    EventLoopBuilderExtWayland::with_any_thread(&mut el_builder, true);
    let el = match el_builder.build() {
        Ok(el) => el,
        Err(err) => {
            running_flag.store(false, Ordering::Release);
            let _ = proxy_ready.send(Err(GridError::Init(format!(
                "failed to create event loop: {err}"
            ))));
            return Ok(());
        }
    };

    let (env, renderer) = match create_env_renderer(&el, config) {
        Ok(values) => values,
        Err(err) => {
            running_flag.store(false, Ordering::Release);
            let _ = proxy_ready.send(Err(err));
            return Ok(());
        }
    };

    let orchestrator = Orchestrator::new(&env.window);
    let surface = orchestrator.surface();
    info!(
        width = surface.width,
        height = surface.height,
        "window backend started"
    );

    if proxy_ready.send(Ok(el.create_proxy())).is_err() {
        warn!("nobody is waiting for the window backend; shutting down");
        running_flag.store(false, Ordering::Release);
        return Ok(());
    }

    env.window.request_redraw();
    let mut app = App {
        env: Some(env),
        renderer: Some(renderer),
        orchestrator,
        touches: TouchTracker::new(),
        running: true,
        running_flag: Arc::clone(&running_flag),
    };

    let result = el
        .run_app(&mut app)
        .map_err(|err| GridError::Init(format!("event loop failed: {err}")));
    running_flag.store(false, Ordering::Release);
    result
}
