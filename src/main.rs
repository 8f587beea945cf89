//! pill-grid: a grid of pills that turn towards the pointer.
//!
//! Opens a Wayland window by default. `--backend raster` renders off-screen
//! for a fixed time instead and can save the last frame as a PNG.

mod logging;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use pill_grid::{Backend, GridConfig, InputEvent, Position, SurfaceSize};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pill-grid", version, about = "Pointer-reactive pill grid")]
struct Args {
    /// Where to render: `window` or `raster`
    #[arg(short, long, default_value = "window")]
    backend: Backend,

    /// Window width, or raster width
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Window height, or raster height
    #[arg(long, default_value_t = 600)]
    height: u32,

    #[arg(long, default_value = "pill-grid")]
    title: String,

    /// Raster: write the last frame to this PNG on exit
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Raster: how long to render before stopping
    #[arg(long, default_value_t = 1000)]
    duration_ms: u64,

    /// Raster: pointer position as `X,Y`
    #[arg(long, value_parser = parse_position)]
    pointer: Option<Position>,

    /// Raster: frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,
}

fn parse_position(s: &str) -> Result<Position, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
    let x = x.trim().parse::<f32>().map_err(|err| format!("bad x: {err}"))?;
    let y = y.trim().parse::<f32>().map_err(|err| format!("bad y: {err}"))?;
    if !x.is_finite() || !y.is_finite() {
        return Err(format!("pointer must be finite, got {s:?}"));
    }
    Ok(Position::new(x, y))
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    if args.fps == 0 {
        bail!("--fps must be at least 1");
    }
    if args.backend == Backend::Window && (args.output.is_some() || args.pointer.is_some()) {
        bail!("--output and --pointer only apply to the raster backend");
    }

    let config = GridConfig {
        backend: args.backend,
        size: Some(SurfaceSize::new(args.width, args.height)),
        window_title: args.title,
        window_resizeable: true,
        raster_output: args.output,
        frame_interval: Duration::from_secs(1) / args.fps,
    };

    let handle = pill_grid::start(config).context("failed to start grid")?;

    match args.backend {
        Backend::Window => {
            info!("close the window to exit");
            handle.wait().context("renderer failed")?;
        }
        Backend::Raster => {
            if let Some(pointer) = args.pointer {
                handle
                    .push_input(InputEvent::CursorPos {
                        x: pointer.x,
                        y: pointer.y,
                    })
                    .context("failed to place pointer")?;
            }
            std::thread::sleep(Duration::from_millis(args.duration_ms));
            handle.stop().context("renderer failed")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pointer_pairs() {
        assert_eq!(parse_position("12,40.5"), Ok(Position::new(12.0, 40.5)));
        assert_eq!(parse_position(" 3 , 4 "), Ok(Position::new(3.0, 4.0)));
        assert!(parse_position("12").is_err());
        assert!(parse_position("a,b").is_err());
        assert!(parse_position("inf,0").is_err());
    }

    #[test]
    fn raster_flags_parse() {
        let args = Args::try_parse_from([
            "pill-grid",
            "--backend",
            "raster",
            "--pointer",
            "50,50",
            "--output",
            "frame.png",
        ])
        .expect("valid args");
        assert_eq!(args.backend, Backend::Raster);
        assert_eq!(args.pointer, Some(Position::new(50.0, 50.0)));
        assert_eq!(args.width, 800);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(Args::try_parse_from(["pill-grid", "--backend", "drm"]).is_err());
    }
}
