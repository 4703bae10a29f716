//! Connected-component labeling with union-find.

use std::collections::HashMap;

use super::Mask;
use crate::shared::point::Point;
use crate::shared::region::Region;

/// One 8-connected foreground region.
#[derive(Clone, Debug)]
pub struct Component {
    /// `(x, y)` pixel coordinates in mask space.
    pub pixels: Vec<(usize, usize)>,
    pub bounds: Region,
}

impl Component {
    pub fn area(&self) -> usize {
        self.pixels.len()
    }

    pub fn centroid(&self) -> Point {
        let n = self.pixels.len().max(1) as f64;
        let (sx, sy) = self
            .pixels
            .iter()
            .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x as f64, sy + y as f64));
        Point::new(sx / n, sy / n)
    }

    /// Mask of the same size as the source holding only this component.
    pub fn to_mask(&self, dim: (usize, usize)) -> Mask {
        let mut mask = Mask::from_elem(dim, false);
        for &(x, y) in &self.pixels {
            mask[[y, x]] = true;
        }
        mask
    }
}

/// Find root of element `i` with path halving for amortized near-O(1).
fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[ra] = rb;
    }
}

/// Largest 8-connected component of `mask` restricted to `gate`
/// (already clipped to the mask). Ties go to the component found first
/// in raster order.
pub fn largest_component(mask: &Mask, gate: &Region) -> Option<Component> {
    let (height, width) = mask.dim();
    let x0 = gate.left().max(0) as usize;
    let y0 = gate.top().max(0) as usize;
    let x1 = (gate.right().max(0) as usize).min(width);
    let y1 = (gate.bottom().max(0) as usize).min(height);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    let gw = x1 - x0;
    let gh = y1 - y0;
    let idx = |x: usize, y: usize| (y - y0) * gw + (x - x0);

    let mut parent: Vec<usize> = (0..gw * gh).collect();
    for y in y0..y1 {
        for x in x0..x1 {
            if !mask[[y, x]] {
                continue;
            }
            // Previously visited neighbors in raster order: W, NW, N, NE.
            let mut link = |nx: usize, ny: usize| {
                if mask[[ny, nx]] {
                    union(&mut parent, idx(x, y), idx(nx, ny));
                }
            };
            if x > x0 {
                link(x - 1, y);
            }
            if y > y0 {
                if x > x0 {
                    link(x - 1, y - 1);
                }
                link(x, y - 1);
                if x + 1 < x1 {
                    link(x + 1, y - 1);
                }
            }
        }
    }

    let mut order: Vec<usize> = Vec::new();
    let mut groups: HashMap<usize, Vec<(usize, usize)>> = HashMap::new();
    for y in y0..y1 {
        for x in x0..x1 {
            if mask[[y, x]] {
                let root = find(&mut parent, idx(x, y));
                let group = groups.entry(root).or_insert_with(|| {
                    order.push(root);
                    Vec::new()
                });
                group.push((x, y));
            }
        }
    }

    let mut best: Option<Vec<(usize, usize)>> = None;
    for root in order {
        if let Some(pixels) = groups.remove(&root) {
            if best.as_ref().map_or(true, |b| pixels.len() > b.len()) {
                best = Some(pixels);
            }
        }
    }

    best.map(|pixels| {
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (usize::MAX, usize::MAX, 0, 0);
        for &(x, y) in &pixels {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Component {
            bounds: Region::from_bounds(min_x, min_y, max_x, max_y),
            pixels,
        }
    })
}
