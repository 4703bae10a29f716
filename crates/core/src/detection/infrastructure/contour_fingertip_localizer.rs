use crate::contour::ContourAnalyzer;
use crate::detection::domain::fingertip_localizer::FingertipLocalizer;
use crate::detection::domain::observation::PointObservation;
use crate::shared::config::{ContourConfig, EdgeConfig};
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Fingertip as the sharpest point of the hand's edge contour.
pub struct ContourFingertipLocalizer {
    analyzer: ContourAnalyzer,
}

impl ContourFingertipLocalizer {
    pub fn new(edges: EdgeConfig, contour: ContourConfig) -> Self {
        Self {
            analyzer: ContourAnalyzer::new(edges, contour),
        }
    }
}

impl Default for ContourFingertipLocalizer {
    fn default() -> Self {
        Self::new(EdgeConfig::default(), ContourConfig::default())
    }
}

impl FingertipLocalizer for ContourFingertipLocalizer {
    fn locate(&self, frame: &Frame, hand_region: &Region) -> Option<PointObservation> {
        let roi = hand_region.clip(frame.width(), frame.height())?;
        let crop = frame.crop(&roi)?;
        let tip = self.analyzer.tip_in_image(&crop.to_gray(), roi.origin())?;
        log::trace!(
            "fingertip at ({:.2}, {:.2}), angle {:.3} rad",
            tip.position.x,
            tip.position.y,
            tip.angle
        );
        Some(PointObservation::valid(tip.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::test_support::{fill_rect, fill_triangle, rgb_frame, solid_rgb};

    const SKIN: [u8; 3] = [220, 160, 130];
    const TABLE: [u8; 3] = [60, 60, 70];

    /// Finger pointing up: a triangular tip on a rectangular body.
    fn finger_frame() -> Frame {
        let mut data = solid_rgb(320, 240, TABLE);
        fill_triangle(&mut data, 320, (160, 60), 100, 15.0, SKIN);
        fill_rect(&mut data, 320, &Region::new(145, 100, 31, 80), SKIN);
        rgb_frame(data, 320, 240, 0, 0)
    }

    #[test]
    fn test_tip_is_in_frame_coordinates_near_apex() {
        let frame = finger_frame();
        let tip = ContourFingertipLocalizer::default()
            .locate(&frame, &Region::new(130, 50, 60, 140))
            .expect("finger should have a tip");
        assert!(tip.valid);
        assert!((tip.position.x - 160.0).abs() < 5.0, "{tip:?}");
        assert!(tip.position.y > 55.0 && tip.position.y < 75.0, "{tip:?}");
    }

    #[test]
    fn test_uniform_region_has_no_tip() {
        let frame = rgb_frame(solid_rgb(200, 200, SKIN), 200, 200, 0, 0);
        let localizer = ContourFingertipLocalizer::default();
        assert!(localizer.locate(&frame, &Region::new(20, 20, 100, 100)).is_none());
    }

    #[test]
    fn test_textured_skin_without_finger_has_no_tip() {
        let mut data = Vec::with_capacity(200 * 200 * 3);
        for y in 0..200usize {
            for x in 0..200usize {
                let jitter = ((x * 7 + y * 13) % 5) as u8;
                data.extend(SKIN.iter().map(|&c| c - 2 + jitter));
            }
        }
        let frame = rgb_frame(data, 200, 200, 0, 0);
        let localizer = ContourFingertipLocalizer::default();
        assert!(localizer.locate(&frame, &Region::new(20, 20, 160, 160)).is_none());
    }

    #[test]
    fn test_region_outside_frame_has_no_tip() {
        let frame = finger_frame();
        let localizer = ContourFingertipLocalizer::default();
        assert!(localizer.locate(&frame, &Region::new(400, 300, 50, 50)).is_none());
    }

    #[test]
    fn test_tiny_region_is_skipped() {
        let frame = finger_frame();
        let localizer = ContourFingertipLocalizer::default();
        assert!(localizer.locate(&frame, &Region::new(158, 58, 4, 4)).is_none());
    }
}
