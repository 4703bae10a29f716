use serde::{Deserialize, Serialize};

use super::point::Point;

/// Axis-aligned region of interest in frame coordinates.
///
/// May extend past the frame while being built (e.g. after `expand`);
/// call `clip` before indexing pixels with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest region containing the inclusive pixel bounds.
    pub fn from_bounds(min_x: usize, min_y: usize, max_x: usize, max_y: usize) -> Self {
        Self::new(
            min_x as i32,
            min_y as i32,
            (max_x - min_x + 1) as i32,
            (max_y - min_y + 1) as i32,
        )
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Intersection with `[0, frame_width) x [0, frame_height)`, or `None`
    /// when nothing remains.
    pub fn clip(&self, frame_width: u32, frame_height: u32) -> Option<Region> {
        let x0 = self.left().max(0);
        let y0 = self.top().max(0);
        let x1 = self.right().min(frame_width as i32);
        let y1 = self.bottom().min(frame_height as i32);
        let clipped = Region::new(x0, y0, x1 - x0, y1 - y0);
        (!clipped.is_empty()).then_some(clipped)
    }

    /// Grows the region by `margin` pixels on every side.
    pub fn expand(&self, margin: i32) -> Region {
        Region::new(
            self.x - margin,
            self.y - margin,
            self.width + 2 * margin,
            self.height + 2 * margin,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() as f64
            && p.x < self.right() as f64
            && p.y >= self.top() as f64
            && p.y < self.bottom() as f64
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }
}
