use super::observation::PointObservation;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for fingertip localization inside a hand region.
pub trait FingertipLocalizer: Send {
    /// Sub-pixel fingertip position in frame coordinates.
    fn locate(&self, frame: &Frame, hand_region: &Region) -> Option<PointObservation>;
}
