use std::collections::VecDeque;

use ndarray::Array2;

use super::gaussian::gaussian_blur;
use super::Mask;
use crate::shared::config::EdgeConfig;

/// Single-pixel-wide edge map: Gaussian blur → Sobel magnitude →
/// non-maximum suppression → hysteresis thresholding.
///
/// Hysteresis fractions are absolute: the Sobel magnitude is taken on
/// intensities scaled to `[0, 1]` and compared against the fractions
/// directly, with 1.0 as full scale. Regions without enough contrast,
/// flat or noise-only, have no edges.
pub fn detect_edges(gray: &Array2<u8>, config: &EdgeConfig) -> Mask {
    let image = gray.mapv(|v| v as f32 / 255.0);
    let blurred = gaussian_blur(&image, config.blur_sigma);
    let (magnitude, gx, gy) = sobel(&blurred);

    let thin = non_maximum_suppression(&magnitude, &gx, &gy);
    hysteresis(
        &thin,
        config.low_threshold as f32,
        config.high_threshold as f32,
    )
}

/// Gradient magnitude and components. Border pixels are left at zero.
fn sobel(image: &Array2<f32>) -> (Array2<f32>, Array2<f32>, Array2<f32>) {
    let (height, width) = image.dim();
    let mut gx = Array2::zeros((height, width));
    let mut gy = Array2::zeros((height, width));
    let mut mag = Array2::zeros((height, width));
    if height < 3 || width < 3 {
        return (mag, gx, gy);
    }
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let p = |dx: isize, dy: isize| {
                image[[(y as isize + dy) as usize, (x as isize + dx) as usize]]
            };
            let sx = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
            let sy = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));
            gx[[y, x]] = sx;
            gy[[y, x]] = sy;
            mag[[y, x]] = sx.hypot(sy);
        }
    }
    (mag, gx, gy)
}

/// Keeps only local maxima along the gradient direction, quantized to
/// 0°/45°/90°/135°. Ties are broken toward the forward neighbor so a
/// symmetric ridge stays one pixel wide.
fn non_maximum_suppression(mag: &Array2<f32>, gx: &Array2<f32>, gy: &Array2<f32>) -> Array2<f32> {
    let (height, width) = mag.dim();
    let mut out = Array2::zeros((height, width));
    if height < 3 || width < 3 {
        return out;
    }
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let m = mag[[y, x]];
            if m <= 0.0 {
                continue;
            }
            let angle = gy[[y, x]].atan2(gx[[y, x]]).to_degrees().rem_euclid(180.0);
            let (dx, dy): (isize, isize) = if !(22.5..157.5).contains(&angle) {
                (1, 0)
            } else if angle < 67.5 {
                (1, 1)
            } else if angle < 112.5 {
                (0, 1)
            } else {
                (-1, 1)
            };
            let forward = mag[[(y as isize + dy) as usize, (x as isize + dx) as usize]];
            let backward = mag[[(y as isize - dy) as usize, (x as isize - dx) as usize]];
            if m > backward && m >= forward {
                out[[y, x]] = m;
            }
        }
    }
    out
}

/// Strong pixels seed the map; weak pixels survive only when 8-connected
/// to a strong one.
fn hysteresis(thin: &Array2<f32>, low: f32, high: f32) -> Mask {
    let (height, width) = thin.dim();
    let mut edges = Mask::from_elem((height, width), false);
    let mut queue = VecDeque::new();

    for ((y, x), &m) in thin.indexed_iter() {
        if m >= high && m > 0.0 {
            edges[[y, x]] = true;
            queue.push_back((x, y));
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        for (nx, ny) in super::neighbors8(x, y, width, height) {
            if !edges[[ny, nx]] && thin[[ny, nx]] >= low && thin[[ny, nx]] > 0.0 {
                edges[[ny, nx]] = true;
                queue.push_back((nx, ny));
            }
        }
    }
    edges
}
