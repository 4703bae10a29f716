use super::observation::HandObservation;
use crate::shared::frame::Frame;

/// Domain interface for coarse hand localization.
pub trait HandLocalizer: Send {
    /// Region likely to contain a hand, or `None` when nothing large and
    /// confident enough is found.
    fn locate(&self, frame: &Frame) -> Option<HandObservation>;

    /// Adapts the detector to the lighting and skin tone visible in
    /// `frame`. Returns `false` when the frame gave nothing to adapt to.
    fn calibrate(&mut self, frame: &Frame) -> bool;
}
