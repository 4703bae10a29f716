//! Binary morphology with square structuring elements.
//!
//! A square kernel is separable, so each operation runs as a horizontal
//! pass followed by a vertical pass. Pixels outside the mask are ignored
//! rather than treated as background, so regions touching the frame
//! border are not eroded away.

use super::Mask;

/// Pass sequence used by [`close`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Closing {
    /// dilate → erode → dilate. Bridges gaps, removes specks, then
    /// restores the outer boundary.
    DilateErodeDilate,
    /// dilate → erode. Tighter containment, used for shadow masks.
    DilateErode,
}

pub fn dilate(mask: &Mask, kernel: usize) -> Mask {
    apply(mask, kernel, true)
}

pub fn erode(mask: &Mask, kernel: usize) -> Mask {
    apply(mask, kernel, false)
}

pub fn close(mask: &Mask, kernel: usize, passes: Closing) -> Mask {
    let closed = erode(&dilate(mask, kernel), kernel);
    match passes {
        Closing::DilateErodeDilate => dilate(&closed, kernel),
        Closing::DilateErode => closed,
    }
}

/// `grow = true` keeps a pixel if any neighbor is set (dilate),
/// otherwise only if all are (erode).
fn apply(mask: &Mask, kernel: usize, grow: bool) -> Mask {
    if kernel <= 1 || mask.is_empty() {
        return mask.clone();
    }
    let half = (kernel / 2) as isize;
    let (height, width) = mask.dim();

    let horizontal = Mask::from_shape_fn((height, width), |(y, x)| {
        let lo = (x as isize - half).max(0) as usize;
        let hi = (x as isize + half).min(width as isize - 1) as usize;
        reduce(grow, (lo..=hi).map(|sx| mask[[y, sx]]))
    });

    Mask::from_shape_fn((height, width), |(y, x)| {
        let lo = (y as isize - half).max(0) as usize;
        let hi = (y as isize + half).min(height as isize - 1) as usize;
        reduce(grow, (lo..=hi).map(|sy| horizontal[[sy, x]]))
    })
}

fn reduce(grow: bool, mut values: impl Iterator<Item = bool>) -> bool {
    if grow {
        values.any(|v| v)
    } else {
        values.all(|v| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with(width: usize, height: usize, set: &[(usize, usize)]) -> Mask {
        let mut m = Mask::from_elem((height, width), false);
        for &(x, y) in set {
            m[[y, x]] = true;
        }
        m
    }

    fn filled(m: &mut Mask, x0: usize, y0: usize, x1: usize, y1: usize) {
        for y in y0..y1 {
            for x in x0..x1 {
                m[[y, x]] = true;
            }
        }
    }

    fn count(m: &Mask) -> usize {
        m.iter().filter(|&&v| v).count()
    }

    #[test]
    fn test_dilate_single_pixel_to_square() {
        let m = mask_with(9, 9, &[(4, 4)]);
        let d = dilate(&m, 3);
        assert_eq!(count(&d), 9);
        assert!(d[[3, 3]] && d[[5, 5]]);
        assert!(!d[[2, 4]]);
    }

    #[test]
    fn test_erode_removes_single_pixel() {
        let m = mask_with(9, 9, &[(4, 4)]);
        assert_eq!(count(&erode(&m, 3)), 0);
    }

    #[test]
    fn test_kernel_one_is_identity() {
        let m = mask_with(5, 5, &[(1, 1), (3, 2)]);
        assert_eq!(dilate(&m, 1), m);
        assert_eq!(erode(&m, 1), m);
    }

    #[test]
    fn test_closing_bridges_one_pixel_gap() {
        let mut m = Mask::from_elem((20, 30), false);
        filled(&mut m, 5, 5, 14, 15);
        filled(&mut m, 15, 5, 25, 15);
        let closed = close(&m, 3, Closing::DilateErode);
        assert!(closed[[10, 14]]);
    }

    #[test]
    fn test_dilate_erode_keeps_rectangle_size() {
        let mut m = Mask::from_elem((30, 30), false);
        filled(&mut m, 10, 10, 20, 20);
        let closed = close(&m, 3, Closing::DilateErode);
        assert_eq!(closed, m);
    }

    #[test]
    fn test_final_dilate_grows_boundary() {
        let mut m = Mask::from_elem((30, 30), false);
        filled(&mut m, 10, 10, 20, 20);
        let closed = close(&m, 5, Closing::DilateErodeDilate);
        assert_eq!(count(&closed), 14 * 14);
        assert!(closed[[8, 8]]);
    }

    #[test]
    fn test_region_touching_border_is_not_eroded() {
        let mut m = Mask::from_elem((10, 10), false);
        filled(&mut m, 0, 0, 5, 5);
        let e = erode(&m, 3);
        assert!(e[[0, 0]]);
        assert!(!e[[4, 4]]);
    }
}
