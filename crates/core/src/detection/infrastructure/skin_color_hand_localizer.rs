use crate::detection::domain::hand_localizer::HandLocalizer;
use crate::detection::domain::observation::HandObservation;
use crate::imaging::color::{mean_hue, rgb_to_hsv, Hsv};
use crate::imaging::morphology::{close, Closing};
use crate::imaging::Mask;
use crate::shared::config::{HandConfig, SkinColorRanges, ValueRange};
use crate::shared::constants::{
    CALIBRATION_HUE_MARGIN, CALIBRATION_SATURATION_MARGIN, CALIBRATION_VALUE_MARGIN,
    HAND_CONFIDENCE_SCALE,
};
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Finds the hand as the bounding box of skin-colored pixels.
///
/// Pipeline: HSV skin mask → closing (dilate → erode → dilate) →
/// bounding box → area, size and confidence gates.
pub struct SkinColorHandLocalizer {
    config: HandConfig,
}

impl SkinColorHandLocalizer {
    pub fn new(config: HandConfig) -> Self {
        Self { config }
    }

    pub fn skin(&self) -> &SkinColorRanges {
        &self.config.skin
    }

    fn is_skin(&self, hsv: Hsv) -> bool {
        let skin = &self.config.skin;
        skin.hue_bands.iter().any(|band| band.contains(hsv.h))
            && skin.saturation.contains(hsv.s)
            && skin.value.contains(hsv.v)
    }

    fn skin_mask(&self, frame: &Frame) -> Mask {
        let view = frame.pixels();
        Mask::from_shape_fn((view.height(), view.width()), |(y, x)| {
            self.is_skin(rgb_to_hsv(view.rgb(x, y)))
        })
    }
}

impl Default for SkinColorHandLocalizer {
    fn default() -> Self {
        Self::new(HandConfig::default())
    }
}

impl HandLocalizer for SkinColorHandLocalizer {
    fn locate(&self, frame: &Frame) -> Option<HandObservation> {
        let raw = self.skin_mask(frame);
        let mask = close(&raw, self.config.morphology_kernel, Closing::DilateErodeDilate);

        let mut count = 0usize;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (usize::MAX, usize::MAX, 0, 0);
        for ((y, x), &set) in mask.indexed_iter() {
            if set {
                count += 1;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }

        if count == 0 || count < self.config.min_area {
            log::debug!("skin area {count} below minimum {}", self.config.min_area);
            return None;
        }
        let region = Region::from_bounds(min_x, min_y, max_x, max_y);
        let min_box = self.config.min_box_size as i32;
        if region.width < min_box || region.height < min_box {
            log::debug!(
                "hand box {}x{} below minimum {min_box}",
                region.width,
                region.height
            );
            return None;
        }

        let ratio = region.area() as f64 / frame.area() as f64;
        let confidence = (ratio * HAND_CONFIDENCE_SCALE).clamp(0.0, 1.0);
        if confidence < self.config.min_confidence {
            log::debug!(
                "hand confidence {confidence:.2} below {:.2}",
                self.config.min_confidence
            );
            return None;
        }

        Some(HandObservation { region, confidence })
    }

    fn calibrate(&mut self, frame: &Frame) -> bool {
        let view = frame.pixels();
        let (w, h) = (view.width(), view.height());
        let (x0, x1) = (w / 4, (3 * w / 4).max(w / 4 + 1));
        let (y0, y1) = (h / 4, (3 * h / 4).max(h / 4 + 1));

        let mut samples = Vec::with_capacity((x1 - x0) * (y1 - y0));
        for y in y0..y1 {
            for x in x0..x1 {
                samples.push(rgb_to_hsv(view.rgb(x, y)));
            }
        }
        let Some(hue) = mean_hue(samples.iter().map(|s| s.h)) else {
            log::warn!("calibration sample has no dominant hue, keeping skin ranges");
            return false;
        };
        let n = samples.len() as f64;
        let saturation = samples.iter().map(|s| s.s).sum::<f64>() / n;
        let value = samples.iter().map(|s| s.v).sum::<f64>() / n;

        self.config.skin = SkinColorRanges {
            hue_bands: hue_bands_around(hue, CALIBRATION_HUE_MARGIN),
            saturation: ValueRange::around(saturation, CALIBRATION_SATURATION_MARGIN, 0.0, 1.0),
            value: ValueRange::around(value, CALIBRATION_VALUE_MARGIN, 0.0, 1.0),
        };
        log::info!(
            "Calibrated skin ranges around hue {hue:.1}°, saturation {saturation:.2}, value {value:.2}"
        );
        true
    }
}

/// Two hue bands covering `center ± margin` on the hue circle. When the
/// interval does not cross 0°/360° both bands are identical.
fn hue_bands_around(center: f64, margin: f64) -> [ValueRange; 2] {
    let lo = center - margin;
    let hi = center + margin;
    if lo < 0.0 {
        [ValueRange::new(0.0, hi), ValueRange::new(lo + 360.0, 360.0)]
    } else if hi > 360.0 {
        [ValueRange::new(0.0, hi - 360.0), ValueRange::new(lo, 360.0)]
    } else {
        let band = ValueRange::new(lo, hi);
        [band, band]
    }
}
