use super::observation::ShadowObservation;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for locating the fingertip's shadow against a
/// background reference.
pub trait ShadowLocalizer: Send {
    /// Stores a deep copy of `frame` as the background, replacing any
    /// previous reference.
    fn capture_reference(&mut self, frame: &Frame);

    fn has_reference(&self) -> bool;

    fn locate(&self, frame: &Frame, hand_region: &Region) -> Option<ShadowObservation>;
}
