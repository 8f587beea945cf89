use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("failed to initialize renderer: {0}")]
    Init(String),
    #[error("failed to spawn renderer thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("renderer did not initialize in time")]
    InitTimeout,
    #[error("failed to signal renderer: {0}")]
    Signal(String),
    #[error("renderer thread panicked")]
    Panicked,
    #[error("failed to encode raster frame")]
    Encode,
    #[error("failed to write raster frame to {path}: {source}")]
    WriteFrame {
        path: PathBuf,
        source: std::io::Error,
    },
}
