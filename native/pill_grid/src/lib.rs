//! Pointer-reactive grid of rotating pills, rendered with Skia.
//!
//! The drawing core ([`geometry`], [`pill`], [`grid`], [`orchestrator`]) is
//! independent of any window system and draws through [`context::DrawContext`].
//! [`start`] hosts it on a renderer thread, either in a Wayland window or on an
//! off-screen raster surface, and returns a [`GridHandle`] to control it.

mod backend;
pub mod context;
mod error;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod input_translate;
pub mod orchestrator;
pub mod pill;
mod raster_backend;
pub mod renderer;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
    mpsc,
};
use std::thread;
use std::time::Duration;

use backend::{UserEvent, WindowConfig};
use raster_backend::RasterConfig;
use tracing::{debug, info};

pub use error::GridError;
pub use geometry::{Position, SurfaceSize};
pub use input::InputEvent;

/// Packed RGB pixels of one rendered frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    Window,
    Raster,
}

impl Backend {
    fn name(self) -> &'static str {
        match self {
            Backend::Window => "window",
            Backend::Raster => "raster",
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "window" | "wayland" => Ok(Backend::Window),
            "raster" => Ok(Backend::Raster),
            other => Err(format!("unknown backend: {other}")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GridConfig {
    pub backend: Backend,
    /// Initial window size, or the fixed raster size. Defaults to 800x600.
    pub size: Option<SurfaceSize>,
    pub window_title: String,
    pub window_resizeable: bool,
    /// Raster backend only: where to write the last frame as PNG on stop.
    pub raster_output: Option<PathBuf>,
    /// Raster backend only: pause between frames.
    pub frame_interval: Duration,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Window,
            size: None,
            window_title: String::from("pill-grid"),
            window_resizeable: true,
            raster_output: None,
            frame_interval: Duration::from_millis(16),
        }
    }
}

const DEFAULT_SIZE: SurfaceSize = SurfaceSize::new(800, 600);

enum StopSignal {
    Window(winit::event_loop::EventLoopProxy<UserEvent>),
    Raster {
        stop: Arc<AtomicBool>,
        input: mpsc::Sender<InputEvent>,
    },
}

/// A running grid. Dropping the handle leaves the renderer running; call
/// [`GridHandle::stop`] to end it.
pub struct GridHandle {
    stop: StopSignal,
    running: Arc<AtomicBool>,
    raster_frame: Option<Arc<Mutex<Option<RasterFrame>>>>,
    thread: thread::JoinHandle<Result<(), GridError>>,
}

/// Starts a grid on its own renderer thread.
///
/// Returns once the backend has its surface, or with the error that kept it
/// from getting one.
pub fn start(config: GridConfig) -> Result<GridHandle, GridError> {
    let thread_name = format!("pill-grid-{}", config.backend.name());
    let running = Arc::new(AtomicBool::new(true));

    let handle = match config.backend {
        Backend::Window => {
            let (proxy_tx, proxy_rx) = mpsc::channel();
            let running_for_thread = Arc::clone(&running);
            let window_config = WindowConfig {
                requested_size: config.size,
                window_title: config.window_title,
                window_resizeable: config.window_resizeable,
            };
            let thread = thread::Builder::new()
                .name(thread_name)
                .spawn(move || backend::run(proxy_tx, running_for_thread, window_config))?;
            let proxy = proxy_rx
                .recv_timeout(Duration::from_secs(5))
                .map_err(|_| GridError::InitTimeout)??;
            GridHandle {
                stop: StopSignal::Window(proxy),
                running,
                raster_frame: None,
                thread,
            }
        }
        Backend::Raster => {
            let (ready_tx, ready_rx) = mpsc::channel();
            let (input_tx, input_rx) = mpsc::channel();
            let stop = Arc::new(AtomicBool::new(false));
            let frame_slot = Arc::new(Mutex::new(None));
            let stop_for_thread = Arc::clone(&stop);
            let running_for_thread = Arc::clone(&running);
            let slot_for_thread = Arc::clone(&frame_slot);
            let raster_config = RasterConfig {
                size: config.size.unwrap_or(DEFAULT_SIZE),
                frame_interval: config.frame_interval,
                output: config.raster_output,
            };
            let thread = thread::Builder::new().name(thread_name).spawn(move || {
                raster_backend::run(
                    ready_tx,
                    stop_for_thread,
                    running_for_thread,
                    input_rx,
                    slot_for_thread,
                    raster_config,
                )
            })?;
            ready_rx
                .recv_timeout(Duration::from_secs(5))
                .map_err(|_| GridError::InitTimeout)??;
            GridHandle {
                stop: StopSignal::Raster {
                    stop,
                    input: input_tx,
                },
                running,
                raster_frame: Some(frame_slot),
                thread,
            }
        }
    };

    info!(backend = config.backend.name(), "grid started");
    Ok(handle)
}

impl GridHandle {
    pub fn backend(&self) -> Backend {
        match self.stop {
            StopSignal::Window(_) => Backend::Window,
            StopSignal::Raster { .. } => Backend::Raster,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire) && !self.thread.is_finished()
    }

    /// Feeds an input event to the grid as if it came from the window system.
    pub fn push_input(&self, event: InputEvent) -> Result<(), GridError> {
        match &self.stop {
            StopSignal::Window(proxy) => proxy
                .send_event(UserEvent::Input(event))
                .map_err(|err| GridError::Signal(err.to_string())),
            StopSignal::Raster { input, .. } => input
                .send(event)
                .map_err(|err| GridError::Signal(err.to_string())),
        }
    }

    /// The most recent raster frame. Always `None` for the window backend.
    pub fn latest_frame(&self) -> Option<RasterFrame> {
        let slot = self.raster_frame.as_ref()?;
        slot.lock().ok()?.clone()
    }

    /// Stops the frame loop and waits for the renderer thread to finish.
    pub fn stop(self) -> Result<(), GridError> {
        match &self.stop {
            StopSignal::Window(proxy) => {
                if let Err(err) = proxy.send_event(UserEvent::Stop) {
                    debug!("window backend already closed: {err}");
                }
            }
            StopSignal::Raster { stop, .. } => stop.store(true, Ordering::Release),
        }
        self.wait()
    }

    /// Waits for the renderer to finish on its own, e.g. after its window is closed.
    pub fn wait(self) -> Result<(), GridError> {
        let result = self.thread.join().map_err(|_| GridError::Panicked)?;
        info!("grid stopped");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::PILL_COLOR;

    #[test]
    fn backend_names_parse() {
        assert_eq!("window".parse::<Backend>(), Ok(Backend::Window));
        assert_eq!("Wayland".parse::<Backend>(), Ok(Backend::Window));
        assert_eq!("RASTER".parse::<Backend>(), Ok(Backend::Raster));
        let err = "drm".parse::<Backend>().unwrap_err();
        assert!(err.contains("unknown backend"));
    }

    #[test]
    fn default_config_opens_a_window() {
        let config = GridConfig::default();
        assert_eq!(config.backend, Backend::Window);
        assert_eq!(config.size, None);
        assert!(config.raster_output.is_none());
    }

    #[test]
    fn raster_grid_follows_pushed_pointer_until_stopped() {
        let handle = start(GridConfig {
            backend: Backend::Raster,
            size: Some(SurfaceSize::new(100, 100)),
            frame_interval: Duration::from_millis(1),
            ..GridConfig::default()
        })
        .expect("raster backend starts");
        assert_eq!(handle.backend(), Backend::Raster);

        handle
            .push_input(InputEvent::CursorPos { x: 60.0, y: 40.0 })
            .expect("input accepted");

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        let frame = loop {
            if let Some(frame) = handle.latest_frame() {
                let offset = ((43 * frame.width + 43) * 3) as usize;
                if frame.data[offset..offset + 3] == [PILL_COLOR.r(), PILL_COLOR.g(), PILL_COLOR.b()] {
                    break frame;
                }
            }
            assert!(handle.is_running(), "renderer exited early");
            assert!(std::time::Instant::now() < deadline, "pointer never reached a frame");
            thread::sleep(Duration::from_millis(5));
        };
        assert_eq!((frame.width, frame.height), (100, 100));

        handle.stop().expect("clean stop");
    }

    #[test]
    fn stopped_raster_writes_png() {
        let path = std::env::temp_dir().join(format!("pill-grid-test-{}.png", std::process::id()));
        let handle = start(GridConfig {
            backend: Backend::Raster,
            size: Some(SurfaceSize::new(64, 48)),
            raster_output: Some(path.clone()),
            frame_interval: Duration::from_millis(1),
            ..GridConfig::default()
        })
        .expect("raster backend starts");
        handle.stop().expect("clean stop");

        let bytes = std::fs::read(&path).expect("png written");
        let _ = std::fs::remove_file(&path);
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
