use std::path::PathBuf;
use thiserror::Error;

/// Recoverable failures: config files and frame exports
#[derive(Debug, Error)]
pub enum SandError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("gif encoding failed: {0}")]
    Gif(#[from] gif::EncodingError),
    #[error("{width}x{height} frame is too large for a gif")]
    FrameTooLarge { width: u32, height: u32 },
    #[error("could not determine a config directory")]
    NoConfigDir,
}

impl SandError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SandError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SandError>;
