use ndarray::{ArrayView2, s};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Half-open pixel rectangle `[x_start, x_end) x [y_start, y_end)` inside an image.
/// `x` runs along columns, `y` along rows.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Region {
    pub x_start: usize,
    pub x_end: usize,
    pub y_start: usize,
    pub y_end: usize,
}

impl Region {
    pub fn full(rows: usize, cols: usize) -> Self {
        Self {
            x_start: 0,
            x_end: cols,
            y_start: 0,
            y_end: rows,
        }
    }

    pub fn width(&self) -> usize {
        self.x_end - self.x_start
    }

    pub fn height(&self) -> usize {
        self.y_end - self.y_start
    }

    pub fn is_full(&self, rows: usize, cols: usize) -> bool {
        *self == Self::full(rows, cols)
    }

    /// View of the pixels inside this region.
    pub fn slice<'a, T>(&self, image: ArrayView2<'a, T>) -> ArrayView2<'a, T> {
        image.slice_move(s![self.y_start..self.y_end, self.x_start..self.x_end])
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "x=[{}, {}) y=[{}, {})",
            self.x_start, self.x_end, self.y_start, self.y_end
        )
    }
}

/// Choose the part of a `(rows, cols)` image that reaches a
/// `buffer_width` x `buffer_height` frame buffer.
///
/// Images that fit are shown whole. Larger images are cropped around their
/// center, per axis, to at most the buffer size.
pub fn select(shape: (usize, usize), buffer_width: usize, buffer_height: usize) -> Result<Region> {
    let (rows, cols) = shape;
    if rows == 0 || cols == 0 {
        return Err(Error::shape(format!(
            "image must have at least one row and column, got {rows}x{cols}"
        )));
    }
    if buffer_width == 0 || buffer_height == 0 {
        return Err(Error::shape(format!(
            "frame buffer must be non-empty, got {buffer_width}x{buffer_height}"
        )));
    }

    if cols <= buffer_width && rows <= buffer_height {
        return Ok(Region::full(rows, cols));
    }

    let (x_start, x_end) = center_span(cols, buffer_width);
    let (y_start, y_end) = center_span(rows, buffer_height);
    let region = Region {
        x_start,
        x_end,
        y_start,
        y_end,
    };
    debug!(
        "Cropping {}x{} image to {} for {}x{} frame buffer",
        cols, rows, region, buffer_width, buffer_height
    );
    Ok(region)
}

fn center_span(dim: usize, buffer: usize) -> (usize, usize) {
    let extent = dim.min(buffer);
    let start = (dim / 2).saturating_sub(buffer / 2).min(dim - extent);
    (start, start + extent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn small_image_is_shown_whole() {
        let region = select((100, 300), 512, 512).unwrap();
        assert_eq!(region, Region::full(100, 300));
        assert!(region.is_full(100, 300));
    }

    #[test]
    fn large_image_is_centered() {
        let region = select((2000, 2000), 512, 512).unwrap();
        assert_eq!(
            region,
            Region {
                x_start: 744,
                x_end: 1256,
                y_start: 744,
                y_end: 1256
            }
        );
        assert_eq!((region.width(), region.height()), (512, 512));
    }

    #[test]
    fn only_oversized_axis_is_cropped() {
        // 300 rows fit, 1500 columns do not.
        let region = select((300, 1500), 1024, 512).unwrap();
        assert_eq!((region.x_start, region.x_end), (238, 1262));
        assert_eq!((region.y_start, region.y_end), (0, 300));
    }

    #[test]
    fn odd_sizes_stay_in_bounds() {
        for rows in 1..40 {
            for buf in 1..20 {
                let region = select((rows, rows + 3), buf, buf).unwrap();
                assert!(region.y_end <= rows);
                assert!(region.x_end <= rows + 3);
                assert!(region.width() <= buf && region.height() <= buf);
            }
        }
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(select((0, 10), 512, 512).is_err());
        assert!(select((10, 10), 0, 512).is_err());
    }

    #[test]
    fn slice_matches_region() {
        let image = Array2::from_shape_fn((6, 8), |(r, c)| r * 10 + c);
        let region = select((6, 8), 4, 2).unwrap();
        let view = region.slice(image.view());
        assert_eq!(view.dim(), (2, 4));
        assert_eq!(view[[0, 0]], image[[region.y_start, region.x_start]]);
    }
}
