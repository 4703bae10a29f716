use ndarray::{Array2, Zip};

use super::Mask;
use crate::shared::config::ShadowPolarity;

pub type Histogram = [u32; 256];

/// Per-pixel change between two equally-sized grayscale images.
pub fn difference(current: &Array2<u8>, reference: &Array2<u8>, polarity: ShadowPolarity) -> Array2<u8> {
    Zip::from(current)
        .and(reference)
        .map_collect(|&c, &r| match polarity {
            ShadowPolarity::Absolute => c.abs_diff(r),
            ShadowPolarity::DarkerOnly => r.saturating_sub(c),
        })
}

pub fn histogram(image: &Array2<u8>) -> Histogram {
    let mut bins = [0u32; 256];
    for &v in image {
        bins[v as usize] += 1;
    }
    bins
}

/// Most populated non-zero bin; the lowest bin wins ties. `None` when
/// every pixel is unchanged.
pub fn histogram_peak(bins: &Histogram) -> Option<u8> {
    let mut best: Option<(u8, u32)> = None;
    for (value, &count) in bins.iter().enumerate().skip(1) {
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((value as u8, count));
        }
    }
    best.map(|(value, _)| value)
}

/// `peak × multiplier`, clamped into `range`.
pub fn adaptive_threshold(peak: u8, multiplier: f64, range: (u8, u8)) -> u8 {
    (peak as f64 * multiplier)
        .round()
        .clamp(range.0 as f64, range.1 as f64) as u8
}

pub fn binarize(image: &Array2<u8>, threshold: u8) -> Mask {
    image.mapv(|v| v >= threshold)
}
