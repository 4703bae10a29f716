use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::{Frame, PixelFormat};
use crate::video::domain::frame_source::{FrameSource, FrameSourceError, SequenceInfo};

/// Replays a directory of still images as a camera stream.
///
/// Files with an image extension are read in lexical order. Frame `i`
/// gets index `i` and timestamp `i / fps`.
pub struct ImageSequenceReader {
    fps: f64,
    paths: Vec<PathBuf>,
    size: Option<(u32, u32)>,
}

impl ImageSequenceReader {
    pub fn new(fps: f64) -> Result<Self, FrameSourceError> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(FrameSourceError::InvalidFps(fps));
        }
        Ok(Self {
            fps,
            paths: Vec::new(),
            size: None,
        })
    }
}

fn timestamp(index: usize, fps: f64) -> Duration {
    Duration::from_secs_f64(index as f64 / fps)
}

/// Decodes one image file into an RGB frame.
pub fn load_frame(path: &Path, index: u64, timestamp: Duration) -> Result<Frame, FrameSourceError> {
    let image = image::open(path)
        .map_err(|source| FrameSourceError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();
    let (width, height) = image.dimensions();
    Ok(Frame::new(
        image.into_raw(),
        width,
        height,
        PixelFormat::Rgb8,
        timestamp,
        index,
    )?)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>, FrameSourceError> {
    let io_err = |source| FrameSourceError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && is_image(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

impl FrameSource for ImageSequenceReader {
    fn open(&mut self, path: &Path) -> Result<SequenceInfo, FrameSourceError> {
        let paths = list_images(path)?;
        let first = paths
            .first()
            .ok_or_else(|| FrameSourceError::Empty(path.to_path_buf()))?;
        let (width, height) = image::image_dimensions(first).map_err(|source| {
            FrameSourceError::Decode {
                path: first.clone(),
                source,
            }
        })?;
        log::info!(
            "Opened {} frames of {width}x{height} from {}",
            paths.len(),
            path.display()
        );

        self.size = Some((width, height));
        self.paths = paths;
        Ok(SequenceInfo {
            width,
            height,
            fps: self.fps,
            total_frames: self.paths.len(),
            source_path: path.to_path_buf(),
        })
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, FrameSourceError>> + '_> {
        let Some(expected) = self.size else {
            return Box::new(std::iter::once(Err(FrameSourceError::NotOpened)));
        };
        let fps = self.fps;
        Box::new(self.paths.iter().enumerate().map(move |(i, path)| {
            let frame = load_frame(path, i as u64, timestamp(i, fps))?;
            let actual = (frame.width(), frame.height());
            if actual != expected {
                return Err(FrameSourceError::DimensionMismatch {
                    path: path.clone(),
                    expected,
                    actual,
                });
            }
            Ok(frame)
        }))
    }

    fn close(&mut self) {
        self.paths.clear();
        self.size = None;
    }
}
