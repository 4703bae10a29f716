use crate::shared::constants::CENTROID_FALLBACK_CONFIDENCE_CAP;
use crate::shared::point::Point;
use crate::shared::region::Region;

/// Bounding region that likely contains a hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandObservation {
    pub region: Region,
    /// In `[0, 1]`.
    pub confidence: f64,
}

/// A located point in frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointObservation {
    pub position: Point,
    pub valid: bool,
}

impl PointObservation {
    pub fn valid(position: Point) -> Self {
        Self {
            position,
            valid: true,
        }
    }
}

/// How the shadow tip was obtained. Each variant carries its own
/// confidence ceiling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShadowTip {
    /// Sharpest point of the shadow outline.
    Precise(Point),
    /// No sharp point was found; centroid of the shadow region instead.
    CentroidFallback(Point),
}

impl ShadowTip {
    pub fn position(&self) -> Point {
        match *self {
            ShadowTip::Precise(p) | ShadowTip::CentroidFallback(p) => p,
        }
    }

    pub fn confidence_cap(&self) -> f64 {
        match self {
            ShadowTip::Precise(_) => 1.0,
            ShadowTip::CentroidFallback(_) => CENTROID_FALLBACK_CONFIDENCE_CAP,
        }
    }

    pub fn is_precise(&self) -> bool {
        matches!(self, ShadowTip::Precise(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowObservation {
    pub tip: ShadowTip,
    /// Bounding box of the shadow region in frame coordinates.
    pub region: Region,
    /// In `[0, 1]`, never above `tip.confidence_cap()`.
    pub confidence: f64,
    /// Adaptive threshold used to binarize the difference image.
    pub threshold: u8,
}

impl ShadowObservation {
    pub fn position(&self) -> Point {
        self.tip.position()
    }
}
