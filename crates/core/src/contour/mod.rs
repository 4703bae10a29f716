//! Sharp-point extraction shared by the fingertip and shadow stages.
//!
//! Steps: edge map (images only) → boundary tracing → minimum-angle
//! selection → sub-pixel refinement → translation into frame space.

pub mod sharp_point;
pub mod tracer;

use ndarray::Array2;

use crate::imaging::edges::detect_edges;
use crate::imaging::Mask;
use crate::shared::config::{ContourConfig, EdgeConfig};
use crate::shared::point::Point;

use self::sharp_point::{refine, sharpest_point};
use self::tracer::{boundary, trace_contours};

/// Sharpest point of the primary contour, in frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tip {
    pub position: Point,
    /// Interior angle in radians at the unrefined contour point.
    pub angle: f64,
    pub contour_length: usize,
}

#[derive(Clone, Debug)]
pub struct ContourAnalyzer {
    edges: EdgeConfig,
    contour: ContourConfig,
}

impl ContourAnalyzer {
    pub fn new(edges: EdgeConfig, contour: ContourConfig) -> Self {
        Self { edges, contour }
    }

    /// Runs edge detection on a grayscale ROI, then finds its tip.
    /// `origin` is the ROI's top-left corner in the frame.
    pub fn tip_in_image(&self, gray: &Array2<u8>, origin: Point) -> Option<Tip> {
        let (height, width) = gray.dim();
        let min = self.contour.min_roi_size as usize;
        if width < min || height < min {
            log::debug!("ROI {width}x{height} below minimum size {min}, skipping trace");
            return None;
        }
        let edges = detect_edges(gray, &self.edges);
        self.tip_in_edges(&edges, origin)
    }

    /// Finds the tip of a filled region by tracing its outline.
    pub fn tip_in_region(&self, region: &Mask, origin: Point) -> Option<Tip> {
        self.tip_in_edges(&boundary(region), origin)
    }

    fn tip_in_edges(&self, edges: &Mask, origin: Point) -> Option<Tip> {
        let contours = trace_contours(edges, &self.contour);
        let Some(primary) = contours.first() else {
            log::debug!("no contour of at least {} points", self.contour.min_length);
            return None;
        };

        let (index, angle) = sharpest_point(&primary.points, self.contour.neighbor_offset)?;
        if angle > self.contour.max_tip_angle {
            log::debug!(
                "sharpest angle {angle:.3} rad exceeds {:.3}, no tip",
                self.contour.max_tip_angle
            );
            return None;
        }

        let local = refine(&primary.points, index, self.contour.refine_radius);
        Some(Tip {
            position: local + origin,
            angle,
            contour_length: primary.len(),
        })
    }
}
