/// Hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> Hsv {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };

    Hsv { h, s, v: max }
}

/// Circular mean of hues in degrees, or `None` when the hues cancel out.
pub fn mean_hue(hues: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (mut sin, mut cos, mut n) = (0.0, 0.0, 0usize);
    for h in hues {
        let rad = h.to_radians();
        sin += rad.sin();
        cos += rad.cos();
        n += 1;
    }
    if n == 0 || (sin.abs() < 1e-9 && cos.abs() < 1e-9) {
        return None;
    }
    Some(sin.atan2(cos).to_degrees().rem_euclid(360.0))
}
