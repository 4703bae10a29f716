use std::time::Duration;

use ndarray::{Array2, ArrayView3};
use thiserror::Error;

use super::region::Region;

#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("frame has zero size ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("buffer holds {actual} bytes, expected {expected} for {width}x{height} {format:?}")]
    LengthMismatch {
        expected: usize,
        actual: usize,
        width: u32,
        height: u32,
        format: PixelFormat,
    },
}

/// Per-pixel channel layout of a frame buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
    Bgra8,
    Gray8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => 4,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// A single camera frame: immutable pixels in row-major order.
///
/// The pipeline never writes into a frame; stages derive their own
/// buffers (grayscale, masks, crops). Cloning is a deep copy, so a clone
/// stays valid after the camera reuses its capture buffer.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    timestamp: Duration,
    index: u64,
}

impl Frame {
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        timestamp: Duration,
        index: u64,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Empty { width, height });
        }
        let expected = (width as usize) * (height as usize) * format.bytes_per_pixel();
        if data.len() != expected {
            return Err(FrameError::LengthMismatch {
                expected,
                actual: data.len(),
                width,
                height,
                format,
            });
        }
        Ok(Self {
            data,
            width,
            height,
            format,
            timestamp,
            index,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn same_dimensions(&self, other: &Frame) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Borrows the pixel buffer for reading. Access ends when the view
    /// is dropped.
    pub fn pixels(&self) -> PixelView<'_> {
        PixelView { frame: self }
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        let shape = (
            self.height as usize,
            self.width as usize,
            self.format.bytes_per_pixel(),
        );
        ArrayView3::from_shape(shape, &self.data).expect("Frame data length must match dimensions")
    }

    /// BT.601 luma of every pixel, shaped `(height, width)`.
    pub fn to_gray(&self) -> Array2<u8> {
        let view = self.pixels();
        Array2::from_shape_fn((self.height as usize, self.width as usize), |(y, x)| {
            view.luma(x, y)
        })
    }

    /// Copies `region` (clipped to the frame) into a new frame with the
    /// same format, timestamp and index. Returns `None` when the clipped
    /// region is empty.
    pub fn crop(&self, region: &Region) -> Option<Frame> {
        let r = region.clip(self.width, self.height)?;
        let bpp = self.format.bytes_per_pixel();
        let row_len = r.width as usize * bpp;
        let mut data = Vec::with_capacity(row_len * r.height as usize);
        for row in r.y as usize..(r.y + r.height) as usize {
            let start = (row * self.width as usize + r.x as usize) * bpp;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }
        Some(Frame {
            data,
            width: r.width as u32,
            height: r.height as u32,
            format: self.format,
            timestamp: self.timestamp,
            index: self.index,
        })
    }
}

/// Scoped read access to a frame's pixels.
///
/// Holds a shared borrow of the frame, so the buffer cannot be replaced
/// while a stage is reading it and is released on every exit path.
#[derive(Clone, Copy)]
pub struct PixelView<'a> {
    frame: &'a Frame,
}

impl PixelView<'_> {
    pub fn width(&self) -> usize {
        self.frame.width as usize
    }

    pub fn height(&self) -> usize {
        self.frame.height as usize
    }

    /// RGB triple at `(x, y)`, regardless of the underlying layout.
    pub fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        let bpp = self.frame.format.bytes_per_pixel();
        let i = (y * self.width() + x) * bpp;
        let d = &self.frame.data;
        match self.frame.format {
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => [d[i], d[i + 1], d[i + 2]],
            PixelFormat::Bgra8 => [d[i + 2], d[i + 1], d[i]],
            PixelFormat::Gray8 => [d[i], d[i], d[i]],
        }
    }

    pub fn luma(&self, x: usize, y: usize) -> u8 {
        if self.frame.format == PixelFormat::Gray8 {
            return self.frame.data[y * self.width() + x];
        }
        let [r, g, b] = self.rgb(x, y);
        let l = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        l.round().clamp(0.0, 255.0) as u8
    }
}
