use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::frame::{Frame, FrameError};

#[derive(Debug, Error)]
pub enum FrameSourceError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no images found in {0}")]
    Empty(PathBuf),
    #[error("{path} is {actual:?}, expected {expected:?} like the first frame")]
    DimensionMismatch {
        path: PathBuf,
        expected: (u32, u32),
        actual: (u32, u32),
    },
    #[error("frame rate must be positive, got {0}")]
    InvalidFps(f64),
    #[error("frame source is not open")]
    NotOpened,
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// What an opened source knows before decoding any further frames.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub source_path: PathBuf,
}

/// Yields camera frames in capture order.
///
/// Live camera acquisition lives outside this crate; implementations
/// here replay recorded input through the same interface.
pub trait FrameSource: Send {
    fn open(&mut self, path: &Path) -> Result<SequenceInfo, FrameSourceError>;

    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, FrameSourceError>> + '_>;

    fn close(&mut self);
}
