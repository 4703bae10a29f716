use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::*;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} kernel size must be odd and >= 1, got {size}")]
    Kernel { name: &'static str, size: usize },
    #[error("{name} range is inverted: {min} > {max}")]
    InvertedRange {
        name: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{name} must lie in [{low}, {high}], got {value}")]
    OutOfBounds {
        name: &'static str,
        value: f64,
        low: f64,
        high: f64,
    },
    #[error("thresholds must satisfy 0 < touch <= release <= hover, got {touch}/{release}/{hover}")]
    ThresholdOrder { touch: f64, release: f64, hover: f64 },
    #[error("{0} must be at least 1")]
    Zero(&'static str),
}

/// Closed interval `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    /// Range centered on `center` with the given half-width, clamped into
    /// `[low, high]`.
    pub fn around(center: f64, margin: f64, low: f64, high: f64) -> Self {
        Self::new(
            (center - margin).clamp(low, high),
            (center + margin).clamp(low, high),
        )
    }

    fn check(&self, name: &'static str, low: f64, high: f64) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        check_bounds(name, self.min, low, high)?;
        check_bounds(name, self.max, low, high)
    }
}

/// HSV bounds a pixel must satisfy to count as skin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkinColorRanges {
    /// Hue in degrees. A pixel matches if it falls in either band.
    pub hue_bands: [ValueRange; 2],
    /// Normalized to [0, 1].
    pub saturation: ValueRange,
    /// Normalized to [0, 1].
    pub value: ValueRange,
}

impl Default for SkinColorRanges {
    fn default() -> Self {
        let [(h0, h1), (h2, h3)] = DEFAULT_SKIN_HUE_BANDS;
        Self {
            hue_bands: [ValueRange::new(h0, h1), ValueRange::new(h2, h3)],
            saturation: ValueRange::new(DEFAULT_SKIN_SATURATION.0, DEFAULT_SKIN_SATURATION.1),
            value: ValueRange::new(DEFAULT_SKIN_VALUE.0, DEFAULT_SKIN_VALUE.1),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandConfig {
    pub skin: SkinColorRanges,
    pub morphology_kernel: usize,
    pub min_area: usize,
    pub min_box_size: u32,
    pub min_confidence: f64,
}

impl Default for HandConfig {
    fn default() -> Self {
        Self {
            skin: SkinColorRanges::default(),
            morphology_kernel: DEFAULT_HAND_KERNEL,
            min_area: DEFAULT_MIN_HAND_AREA,
            min_box_size: DEFAULT_MIN_HAND_BOX,
            min_confidence: DEFAULT_MIN_HAND_CONFIDENCE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub blur_sigma: f64,
    /// Weak-edge cutoff on the Sobel magnitude of the `[0, 1]` image.
    pub low_threshold: f64,
    /// Strong-edge cutoff on the same scale.
    pub high_threshold: f64,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            blur_sigma: DEFAULT_EDGE_SIGMA,
            low_threshold: DEFAULT_EDGE_LOW,
            high_threshold: DEFAULT_EDGE_HIGH,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    pub min_length: usize,
    pub max_length: usize,
    pub top_k: usize,
    pub neighbor_offset: usize,
    /// Radians. Sharpest angles above this mean "no tip".
    pub max_tip_angle: f64,
    pub refine_radius: usize,
    pub min_roi_size: u32,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_CONTOUR_MIN_LENGTH,
            max_length: DEFAULT_CONTOUR_MAX_LENGTH,
            top_k: DEFAULT_CONTOUR_TOP_K,
            neighbor_offset: DEFAULT_NEIGHBOR_OFFSET,
            max_tip_angle: DEFAULT_MAX_TIP_ANGLE,
            refine_radius: DEFAULT_REFINE_RADIUS,
            min_roi_size: DEFAULT_MIN_ROI_SIZE,
        }
    }
}

/// Which pixel changes count toward the shadow difference image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowPolarity {
    /// `|current - reference|`.
    #[default]
    Absolute,
    /// Only pixels that got darker than the reference.
    DarkerOnly,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    pub morphology_kernel: usize,
    pub min_area: usize,
    /// Bounds for the adaptive threshold on the 0-255 difference scale.
    pub threshold_range: (u8, u8),
    pub threshold_multiplier: f64,
    pub search_margin: i32,
    pub area_saturation: f64,
    pub ideal_threshold: f64,
    pub polarity: ShadowPolarity,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            morphology_kernel: DEFAULT_SHADOW_KERNEL,
            min_area: DEFAULT_MIN_SHADOW_AREA,
            threshold_range: DEFAULT_SHADOW_THRESHOLD_RANGE,
            threshold_multiplier: DEFAULT_THRESHOLD_MULTIPLIER,
            search_margin: DEFAULT_SHADOW_SEARCH_MARGIN,
            area_saturation: DEFAULT_SHADOW_AREA_SATURATION,
            ideal_threshold: DEFAULT_IDEAL_SHADOW_THRESHOLD,
            polarity: ShadowPolarity::Absolute,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub touch_threshold: f64,
    pub hover_threshold: f64,
    pub release_threshold: f64,
    pub debounce_frames: u32,
    pub debounce_millis: u64,
    pub min_confidence: f64,
    pub key_hit_margin: f64,
    pub require_shadow_validation: bool,
}

impl ValidatorConfig {
    pub fn debounce_duration(&self) -> Duration {
        Duration::from_millis(self.debounce_millis)
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            touch_threshold: DEFAULT_TOUCH_THRESHOLD,
            hover_threshold: DEFAULT_HOVER_THRESHOLD,
            release_threshold: DEFAULT_RELEASE_THRESHOLD,
            debounce_frames: DEFAULT_DEBOUNCE_FRAMES,
            debounce_millis: DEFAULT_DEBOUNCE_MILLIS,
            min_confidence: DEFAULT_MIN_TOUCH_CONFIDENCE,
            key_hit_margin: DEFAULT_KEY_HIT_MARGIN,
            require_shadow_validation: false,
        }
    }
}

/// Every tunable of the pipeline. Built once and handed to the stages
/// by value; only hand calibration changes skin ranges afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchConfig {
    pub hand: HandConfig,
    pub edges: EdgeConfig,
    pub contour: ContourConfig,
    pub shadow: ShadowConfig,
    pub validator: ValidatorConfig,
}

impl TouchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let hand = &self.hand;
        for band in &hand.skin.hue_bands {
            band.check("hue band", 0.0, 360.0)?;
        }
        hand.skin.saturation.check("saturation", 0.0, 1.0)?;
        hand.skin.value.check("value", 0.0, 1.0)?;
        check_kernel("hand morphology", hand.morphology_kernel)?;
        if hand.min_area == 0 {
            return Err(ConfigError::Zero("min hand area"));
        }
        check_bounds("min hand confidence", hand.min_confidence, 0.0, 1.0)?;

        let edges = &self.edges;
        check_bounds("edge blur sigma", edges.blur_sigma, 0.0, 10.0)?;
        ValueRange::new(edges.low_threshold, edges.high_threshold).check(
            "edge hysteresis",
            0.0,
            1.0,
        )?;

        let contour = &self.contour;
        if contour.top_k == 0 {
            return Err(ConfigError::Zero("contour top-k"));
        }
        if contour.neighbor_offset == 0 {
            return Err(ConfigError::Zero("angle neighbor offset"));
        }
        if contour.min_length > contour.max_length {
            return Err(ConfigError::InvertedRange {
                name: "contour length",
                min: contour.min_length as f64,
                max: contour.max_length as f64,
            });
        }
        check_bounds(
            "max tip angle",
            contour.max_tip_angle,
            0.0,
            std::f64::consts::PI,
        )?;

        let shadow = &self.shadow;
        check_kernel("shadow morphology", shadow.morphology_kernel)?;
        let (lo, hi) = shadow.threshold_range;
        if lo > hi {
            return Err(ConfigError::InvertedRange {
                name: "shadow threshold",
                min: lo as f64,
                max: hi as f64,
            });
        }
        if shadow.area_saturation <= 0.0 || shadow.ideal_threshold <= 0.0 {
            return Err(ConfigError::OutOfBounds {
                name: "shadow confidence scale",
                value: shadow.area_saturation.min(shadow.ideal_threshold),
                low: f64::MIN_POSITIVE,
                high: f64::MAX,
            });
        }

        let v = &self.validator;
        if !(v.touch_threshold > 0.0
            && v.touch_threshold <= v.release_threshold
            && v.release_threshold <= v.hover_threshold)
        {
            return Err(ConfigError::ThresholdOrder {
                touch: v.touch_threshold,
                release: v.release_threshold,
                hover: v.hover_threshold,
            });
        }
        if v.debounce_frames == 0 {
            return Err(ConfigError::Zero("debounce frame count"));
        }
        check_bounds("min touch confidence", v.min_confidence, 0.0, 1.0)?;
        check_bounds("key hit margin", v.key_hit_margin, 0.0, f64::MAX)
    }
}

fn check_kernel(name: &'static str, size: usize) -> Result<(), ConfigError> {
    if size == 0 || size % 2 == 0 {
        return Err(ConfigError::Kernel { name, size });
    }
    Ok(())
}

fn check_bounds(name: &'static str, value: f64, low: f64, high: f64) -> Result<(), ConfigError> {
    if !(low..=high).contains(&value) {
        return Err(ConfigError::OutOfBounds {
            name,
            value,
            low,
            high,
        });
    }
    Ok(())
}
