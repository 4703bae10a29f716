use crate::shared::point::Point;

/// Interior angle at `p` of the triangle `(prev, p, next)`, via the law
/// of cosines. `None` when any side has zero length.
pub fn interior_angle(prev: Point, p: Point, next: Point) -> Option<f64> {
    let a = p.distance(prev);
    let b = p.distance(next);
    let c = prev.distance(next);
    if a == 0.0 || b == 0.0 || c == 0.0 {
        return None;
    }
    let cos = ((a * a + b * b - c * c) / (2.0 * a * b)).clamp(-1.0, 1.0);
    Some(cos.acos())
}

/// Index and angle of the sharpest point on a closed contour, comparing
/// each point with the neighbors `offset` steps away on either side.
/// The first minimum wins ties.
pub fn sharpest_point(points: &[Point], offset: usize) -> Option<(usize, f64)> {
    let n = points.len();
    if offset == 0 || n <= 2 * offset {
        return None;
    }
    let mut best: Option<(usize, f64)> = None;
    for i in 0..n {
        let prev = points[(i + n - offset) % n];
        let next = points[(i + offset) % n];
        let Some(angle) = interior_angle(prev, points[i], next) else {
            continue;
        };
        if best.map_or(true, |(_, a)| angle < a) {
            best = Some((i, angle));
        }
    }
    best
}

/// Gaussian-weighted centroid of the points within `radius` steps of
/// `index` (wrapping), weighted by `exp(-d² / 4)` of their distance to
/// the selected point.
pub fn refine(points: &[Point], index: usize, radius: usize) -> Point {
    let n = points.len();
    let center = points[index];
    let span = radius.min((n.saturating_sub(1)) / 2);

    let (mut sx, mut sy, mut sw) = (0.0, 0.0, 0.0);
    for k in 0..=2 * span {
        let p = points[(index + n - span + k) % n];
        let w = (-center.distance_squared(p) / 4.0).exp();
        sx += p.x * w;
        sy += p.y * w;
        sw += w;
    }
    Point::new(sx / sw, sy / sw)
}
