pub mod color;
pub mod components;
pub mod difference;
pub mod edges;
pub mod gaussian;
pub mod morphology;

use ndarray::Array2;

/// Binary image indexed `[[y, x]]`.
pub type Mask = Array2<bool>;

/// 8-connected neighbors of `(x, y)` inside a `width × height` grid,
/// orthogonal neighbors first.
pub fn neighbors8(
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> impl Iterator<Item = (usize, usize)> {
    const OFFSETS: [(isize, isize); 8] = [
        (1, 0),
        (0, 1),
        (-1, 0),
        (0, -1),
        (1, 1),
        (-1, 1),
        (-1, -1),
        (1, -1),
    ];
    OFFSETS.iter().filter_map(move |&(dx, dy)| {
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        (nx >= 0 && ny >= 0 && (nx as usize) < width && (ny as usize) < height)
            .then_some((nx as usize, ny as usize))
    })
}
