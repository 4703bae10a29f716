use crate::shared::point::Point;
use crate::shared::region::Region;
use crate::touch::domain::key_layout::{KeyId, KeyLayout};

/// Labels for a 10x4 grid, row by row.
pub const QWERTY_LABELS: [&str; 40] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "0", //
    "Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P", //
    "A", "S", "D", "F", "G", "H", "J", "K", "L", ";", //
    "Z", "X", "C", "V", "B", "N", "M", ",", ".", "/",
];

/// Keyboard made of labelled rectangles in frame coordinates.
#[derive(Clone, Debug, Default)]
pub struct RectKeyLayout {
    keys: Vec<(KeyId, Region)>,
}

impl RectKeyLayout {
    pub fn new(keys: Vec<(KeyId, Region)>) -> Self {
        Self { keys }
    }

    /// Splits `area` into `cols × rows` equal keys. Keys take their
    /// labels from `labels` in row-major order; keys beyond the supplied
    /// labels are named `r{row}c{col}`. Counts beyond the area's size in
    /// pixels are clamped to it.
    pub fn grid(area: Region, cols: u32, rows: u32, labels: &[&str]) -> Self {
        let cols = i64::from(cols).clamp(1, i64::from(area.width.max(1)));
        let rows = i64::from(rows).clamp(1, i64::from(area.height.max(1)));
        let (x, y) = (i64::from(area.x), i64::from(area.y));
        let (width, height) = (i64::from(area.width), i64::from(area.height));
        // Bounds lie inside `area`, so they fit in i32.
        let edge = |origin: i64, span: i64, i: i64, n: i64| (origin + i * span / n) as i32;

        let mut keys = Vec::with_capacity((cols * rows) as usize);
        for row in 0..rows {
            let y0 = edge(y, height, row, rows);
            let y1 = edge(y, height, row + 1, rows);
            for col in 0..cols {
                let x0 = edge(x, width, col, cols);
                let x1 = edge(x, width, col + 1, cols);
                let label = labels
                    .get((row * cols + col) as usize)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("r{row}c{col}"));
                keys.push((KeyId(label), Region::new(x0, y0, x1 - x0, y1 - y0)));
            }
        }
        Self { keys }
    }

    pub fn keys(&self) -> &[(KeyId, Region)] {
        &self.keys
    }
}

fn within(region: &Region, p: Point, margin: f64) -> bool {
    p.x >= region.left() as f64 - margin
        && p.x < region.right() as f64 + margin
        && p.y >= region.top() as f64 - margin
        && p.y < region.bottom() as f64 + margin
}

impl KeyLayout for RectKeyLayout {
    /// A key that strictly contains the point wins; inside the margin
    /// band between keys the nearest key center wins.
    fn key_at(&self, point: Point, margin: f64) -> Option<KeyId> {
        if let Some((id, _)) = self.keys.iter().find(|(_, r)| r.contains(point)) {
            return Some(id.clone());
        }
        self.keys
            .iter()
            .filter(|(_, r)| within(r, point, margin))
            .min_by(|(_, a), (_, b)| {
                a.center()
                    .distance_squared(point)
                    .total_cmp(&b.center().distance_squared(point))
            })
            .map(|(id, _)| id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn qwerty() -> RectKeyLayout {
        RectKeyLayout::grid(Region::new(0, 200, 600, 160), 10, 4, &QWERTY_LABELS)
    }

    #[rstest]
    #[case::first_key(Point::new(5.0, 205.0), Some("1"))]
    #[case::q(Point::new(30.0, 250.0), Some("Q"))]
    #[case::last_key(Point::new(599.0, 359.0), Some("/"))]
    #[case::above_keyboard(Point::new(30.0, 100.0), None)]
    #[case::inside_margin_below(Point::new(30.0, 361.0), Some("Z"))]
    #[case::outside_margin(Point::new(30.0, 363.0), None)]
    fn test_key_lookup(#[case] p: Point, #[case] expected: Option<&str>) {
        assert_eq!(qwerty().key_at(p, 2.0), expected.map(KeyId::new));
    }

    #[test]
    fn test_grid_covers_area_without_gaps() {
        let layout = RectKeyLayout::grid(Region::new(0, 0, 101, 37), 3, 2, &[]);
        assert_eq!(layout.keys().len(), 6);
        let area: i64 = layout.keys().iter().map(|(_, r)| r.area()).sum();
        assert_eq!(area, 101 * 37);
        assert_eq!(layout.keys()[4].0, KeyId::new("r1c1"));
    }

    #[test]
    fn test_oversized_grid_is_clamped_to_pixels() {
        let layout = RectKeyLayout::grid(Region::new(0, 0, 4, 3), u32::MAX, 70_000, &[]);
        assert_eq!(layout.keys().len(), 12);
        assert!(layout.keys().iter().all(|(_, r)| r.width == 1 && r.height == 1));
    }

    #[test]
    fn test_margin_band_prefers_nearest_key() {
        let layout = RectKeyLayout::new(vec![
            (KeyId::new("L"), Region::new(0, 0, 50, 50)),
            (KeyId::new("R"), Region::new(60, 0, 50, 50)),
        ]);
        assert_eq!(layout.key_at(Point::new(51.0, 25.0), 5.0), Some(KeyId::new("L")));
        assert_eq!(layout.key_at(Point::new(58.0, 25.0), 5.0), Some(KeyId::new("R")));
    }
}
