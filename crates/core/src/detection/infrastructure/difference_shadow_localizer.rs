use ndarray::Array2;

use crate::contour::ContourAnalyzer;
use crate::detection::domain::observation::{ShadowObservation, ShadowTip};
use crate::detection::domain::shadow_localizer::ShadowLocalizer;
use crate::imaging::components::{largest_component, Component};
use crate::imaging::difference::{adaptive_threshold, binarize, difference, histogram, histogram_peak};
use crate::imaging::morphology::{close, Closing};
use crate::imaging::Mask;
use crate::shared::config::{ContourConfig, EdgeConfig, ShadowConfig};
use crate::shared::constants::{SHADOW_AREA_WEIGHT, SHADOW_THRESHOLD_WEIGHT};
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Background frame owned by the localizer. `gray` is derived once at
/// capture so each `locate` only converts the current frame.
struct Reference {
    frame: Frame,
    gray: Array2<u8>,
}

/// Finds the shadow as the largest changed region near the hand,
/// relative to a captured background.
///
/// Pipeline: grayscale difference → histogram peak → adaptive threshold
/// → binarize → closing (dilate → erode) → largest component inside the
/// expanded hand region → sharp tip, or centroid fallback.
pub struct DifferenceShadowLocalizer {
    config: ShadowConfig,
    analyzer: ContourAnalyzer,
    reference: Option<Reference>,
}

impl DifferenceShadowLocalizer {
    pub fn new(config: ShadowConfig, contour: ContourConfig) -> Self {
        Self {
            config,
            analyzer: ContourAnalyzer::new(EdgeConfig::default(), contour),
            reference: None,
        }
    }

    pub fn reference_frame(&self) -> Option<&Frame> {
        self.reference.as_ref().map(|r| &r.frame)
    }

    fn confidence(&self, area: usize, threshold: u8, tip: &ShadowTip) -> f64 {
        let area_score = (area as f64 / self.config.area_saturation).clamp(0.0, 1.0);
        let ideal = self.config.ideal_threshold;
        let threshold_score = (1.0 - (threshold as f64 - ideal).abs() / ideal).clamp(0.0, 1.0);
        (SHADOW_AREA_WEIGHT * area_score + SHADOW_THRESHOLD_WEIGHT * threshold_score)
            .clamp(0.0, 1.0)
            .min(tip.confidence_cap())
    }

    fn tip_of(&self, component: &Component) -> ShadowTip {
        let bounds = component.bounds;
        let mut local = Mask::from_elem((bounds.height as usize, bounds.width as usize), false);
        for &(x, y) in &component.pixels {
            local[[y - bounds.y as usize, x - bounds.x as usize]] = true;
        }
        match self.analyzer.tip_in_region(&local, bounds.origin()) {
            Some(tip) => ShadowTip::Precise(tip.position),
            None => {
                log::debug!("no sharp shadow point, falling back to centroid");
                ShadowTip::CentroidFallback(component.centroid())
            }
        }
    }
}

impl Default for DifferenceShadowLocalizer {
    fn default() -> Self {
        Self::new(ShadowConfig::default(), ContourConfig::default())
    }
}

impl ShadowLocalizer for DifferenceShadowLocalizer {
    fn capture_reference(&mut self, frame: &Frame) {
        log::info!(
            "Captured shadow reference frame #{} ({}x{})",
            frame.index(),
            frame.width(),
            frame.height()
        );
        self.reference = Some(Reference {
            gray: frame.to_gray(),
            frame: frame.clone(),
        });
    }

    fn has_reference(&self) -> bool {
        self.reference.is_some()
    }

    fn locate(&self, frame: &Frame, hand_region: &Region) -> Option<ShadowObservation> {
        let Some(reference) = &self.reference else {
            log::debug!("no shadow reference captured yet");
            return None;
        };
        if !frame.same_dimensions(&reference.frame) {
            log::warn!(
                "reference is {}x{} but frame #{} is {}x{}, skipping shadow",
                reference.frame.width(),
                reference.frame.height(),
                frame.index(),
                frame.width(),
                frame.height()
            );
            return None;
        }

        let diff = difference(&frame.to_gray(), &reference.gray, self.config.polarity);
        let peak = histogram_peak(&histogram(&diff))?;
        let threshold = adaptive_threshold(
            peak,
            self.config.threshold_multiplier,
            self.config.threshold_range,
        );
        let mask = close(
            &binarize(&diff, threshold),
            self.config.morphology_kernel,
            Closing::DilateErode,
        );

        let gate = hand_region
            .expand(self.config.search_margin)
            .clip(frame.width(), frame.height())?;
        let component = largest_component(&mask, &gate)?;
        if component.area() < self.config.min_area {
            log::debug!(
                "shadow area {} below minimum {}",
                component.area(),
                self.config.min_area
            );
            return None;
        }

        let tip = self.tip_of(&component);
        Some(ShadowObservation {
            confidence: self.confidence(component.area(), threshold, &tip),
            tip,
            region: component.bounds,
            threshold,
        })
    }
}
