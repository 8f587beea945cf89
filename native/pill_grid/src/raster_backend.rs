use std::path::PathBuf;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
    mpsc::{Receiver, Sender},
};
use std::time::Duration;

use tracing::{debug, info};

use crate::{
    RasterFrame,
    error::GridError,
    geometry::SurfaceSize,
    input::InputEvent,
    orchestrator::Orchestrator,
    renderer::Renderer,
};

#[derive(Clone, Debug)]
pub struct RasterConfig {
    pub size: SurfaceSize,
    pub frame_interval: Duration,
    pub output: Option<PathBuf>,
}

fn store_frame(renderer: &mut Renderer, frame_slot: &Arc<Mutex<Option<RasterFrame>>>) {
    let Some(frame) = renderer.snapshot() else {
        return;
    };
    if let Ok(mut slot) = frame_slot.lock() {
        *slot = Some(frame);
    }
}

fn write_output(renderer: &mut Renderer, path: PathBuf) -> Result<(), GridError> {
    let png = renderer.encode_png()?;
    std::fs::write(&path, png).map_err(|source| GridError::WriteFrame {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "wrote raster frame");
    Ok(())
}

/// Renders frames off-screen until `stop` is raised.
///
/// Input sent before `stop` is raised is applied to the final frame.
pub fn run(
    ready: Sender<Result<(), GridError>>,
    stop: Arc<AtomicBool>,
    running_flag: Arc<AtomicBool>,
    input: Receiver<InputEvent>,
    frame_slot: Arc<Mutex<Option<RasterFrame>>>,
    config: RasterConfig,
) -> Result<(), GridError> {
    let mut renderer = match Renderer::raster(config.size) {
        Ok(renderer) => renderer,
        Err(err) => {
            running_flag.store(false, Ordering::Release);
            let _ = ready.send(Err(err));
            return Ok(());
        }
    };
    let mut orchestrator = Orchestrator::new(&config.size);
    info!(
        width = config.size.width,
        height = config.size.height,
        "raster backend started"
    );
    let _ = ready.send(Ok(()));

    let result = render_loop(
        &mut renderer,
        &mut orchestrator,
        &stop,
        &input,
        &frame_slot,
        config.frame_interval,
    )
    .and_then(|()| match config.output {
        Some(path) => write_output(&mut renderer, path),
        None => Ok(()),
    });

    info!(frames = orchestrator.frames(), "raster backend stopped");
    running_flag.store(false, Ordering::Release);
    result
}

fn render_loop(
    renderer: &mut Renderer,
    orchestrator: &mut Orchestrator,
    stop: &AtomicBool,
    input: &Receiver<InputEvent>,
    frame_slot: &Arc<Mutex<Option<RasterFrame>>>,
    frame_interval: Duration,
) -> Result<(), GridError> {
    loop {
        let stopping = stop.load(Ordering::Acquire);

        while let Ok(event) = input.try_recv() {
            debug!(?event, "raster input");
            if let Some(size) = orchestrator.handle_input(event) {
                renderer.resize(size)?;
            }
        }

        renderer.redraw(orchestrator);
        store_frame(renderer, frame_slot);

        if stopping {
            return Ok(());
        }
        std::thread::sleep(frame_interval);
    }
}
