/// Skin hue bands in degrees; two bands cover the red wrap-around at 0°/360°.
pub const DEFAULT_SKIN_HUE_BANDS: [(f64, f64); 2] = [(0.0, 25.0), (335.0, 360.0)];
pub const DEFAULT_SKIN_SATURATION: (f64, f64) = (0.15, 0.75);
pub const DEFAULT_SKIN_VALUE: (f64, f64) = (0.35, 1.0);

/// Calibration margins around the sampled skin color.
pub const CALIBRATION_HUE_MARGIN: f64 = 10.0;
pub const CALIBRATION_SATURATION_MARGIN: f64 = 0.15;
pub const CALIBRATION_VALUE_MARGIN: f64 = 30.0 / 255.0;

pub const DEFAULT_HAND_KERNEL: usize = 5;
pub const DEFAULT_MIN_HAND_AREA: usize = 5000;
pub const DEFAULT_MIN_HAND_BOX: u32 = 50;
pub const DEFAULT_MIN_HAND_CONFIDENCE: f64 = 0.7;
/// Box-to-frame area ratio is scaled by this before clamping to [0, 1].
pub const HAND_CONFIDENCE_SCALE: f64 = 10.0;

pub const DEFAULT_EDGE_SIGMA: f64 = 1.4;
pub const DEFAULT_EDGE_LOW: f64 = 0.20;
pub const DEFAULT_EDGE_HIGH: f64 = 0.59;

pub const DEFAULT_CONTOUR_MIN_LENGTH: usize = 10;
pub const DEFAULT_CONTOUR_MAX_LENGTH: usize = 10_000;
pub const DEFAULT_CONTOUR_TOP_K: usize = 3;
pub const DEFAULT_NEIGHBOR_OFFSET: usize = 3;
pub const DEFAULT_MAX_TIP_ANGLE: f64 = 1.57;
pub const DEFAULT_REFINE_RADIUS: usize = 2;
/// ROIs narrower or shorter than this are not traced at all.
pub const DEFAULT_MIN_ROI_SIZE: u32 = 8;

pub const DEFAULT_SHADOW_KERNEL: usize = 3;
pub const DEFAULT_MIN_SHADOW_AREA: usize = 1000;
pub const DEFAULT_SHADOW_THRESHOLD_RANGE: (u8, u8) = (20, 80);
pub const DEFAULT_THRESHOLD_MULTIPLIER: f64 = 2.5;
pub const DEFAULT_SHADOW_SEARCH_MARGIN: i32 = 50;
pub const DEFAULT_SHADOW_AREA_SATURATION: f64 = 5000.0;
pub const DEFAULT_IDEAL_SHADOW_THRESHOLD: f64 = 40.0;
pub const SHADOW_AREA_WEIGHT: f64 = 0.7;
pub const SHADOW_THRESHOLD_WEIGHT: f64 = 0.3;
/// Confidence ceiling when the shadow tip falls back to the region centroid.
pub const CENTROID_FALLBACK_CONFIDENCE_CAP: f64 = 0.7;

pub const DEFAULT_TOUCH_THRESHOLD: f64 = 1.0;
pub const DEFAULT_HOVER_THRESHOLD: f64 = 3.0;
pub const DEFAULT_RELEASE_THRESHOLD: f64 = 2.0;
pub const DEFAULT_DEBOUNCE_FRAMES: u32 = 2;
pub const DEFAULT_DEBOUNCE_MILLIS: u64 = 50;
pub const DEFAULT_MIN_TOUCH_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_KEY_HIT_MARGIN: f64 = 2.0;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];
