use crate::imaging::{neighbors8, Mask};
use crate::shared::config::ContourConfig;
use crate::shared::point::Point;

/// Ordered pixel chain in mask coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Traces 8-connected pixel chains through `edges`.
///
/// Every set pixel is visited at most once and each trace stops at
/// `max_length` points, so the walk terminates on any input. Traces
/// shorter than `min_length` are dropped; the `top_k` longest remain,
/// longest first.
pub fn trace_contours(edges: &Mask, config: &ContourConfig) -> Vec<Contour> {
    let (height, width) = edges.dim();
    let mut visited = Mask::from_elem((height, width), false);
    let mut contours = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if !edges[[y, x]] || visited[[y, x]] {
                continue;
            }
            let contour = trace_from(edges, &mut visited, (x, y), config.max_length);
            if contour.len() >= config.min_length {
                contours.push(contour);
            }
        }
    }

    contours.sort_by(|a, b| b.len().cmp(&a.len()));
    contours.truncate(config.top_k);
    contours
}

fn trace_from(
    edges: &Mask,
    visited: &mut Mask,
    start: (usize, usize),
    max_length: usize,
) -> Contour {
    let (height, width) = edges.dim();
    let mut points = vec![Point::new(start.0 as f64, start.1 as f64)];
    visited[[start.1, start.0]] = true;
    let mut current = start;

    let open = |visited: &Mask, (x, y): (usize, usize)| edges[[y, x]] && !visited[[y, x]];

    while points.len() < max_length {
        // Step to the open neighbor with the fewest open neighbors of its
        // own, so corner pixels are not skipped and left as dead ends.
        let next = neighbors8(current.0, current.1, width, height)
            .filter(|&n| open(visited, n))
            .min_by_key(|&(nx, ny)| {
                neighbors8(nx, ny, width, height)
                    .filter(|&m| open(visited, m))
                    .count()
            });
        let Some((nx, ny)) = next else {
            break;
        };
        visited[[ny, nx]] = true;
        points.push(Point::new(nx as f64, ny as f64));
        current = (nx, ny);
    }

    Contour { points }
}

/// Foreground pixels with at least one background (or out-of-image)
/// 4-neighbor. Turns a filled region into its one-pixel outline.
pub fn boundary(mask: &Mask) -> Mask {
    let (height, width) = mask.dim();
    Mask::from_shape_fn((height, width), |(y, x)| {
        if !mask[[y, x]] {
            return false;
        }
        x == 0
            || y == 0
            || x + 1 == width
            || y + 1 == height
            || !mask[[y, x - 1]]
            || !mask[[y, x + 1]]
            || !mask[[y - 1, x]]
            || !mask[[y + 1, x]]
    })
}
