use ndarray::{Array2, ArrayView2};
use tracing::warn;

use crate::types::DisplayRange;

/// Lowest byte value written for image pixels.
pub const PIXEL_MIN: u8 = 1;
/// Highest byte value written for image pixels. The display tool reserves 0
/// and everything above 200 for overlay and cursor graphics.
pub const PIXEL_MAX: u8 = 200;

/// Map `section` onto bytes in `[PIXEL_MIN, PIXEL_MAX]` with `z1`/`z2` as the
/// black and white points.
///
/// A zero-width range cannot be scaled and yields an all-zero image of the
/// same shape. NaN pixels map to `PIXEL_MIN`.
pub fn quantize(section: ArrayView2<f64>, range: DisplayRange) -> Array2<u8> {
    if range.is_degenerate() {
        warn!("Zero-width display range {}; image scaled to a single value", range);
        return Array2::zeros(section.dim());
    }

    let pmin = PIXEL_MIN as f64;
    let pmax = PIXEL_MAX as f64;
    let scale = pmax / (range.width() + 1.0);
    let z1 = range.z1;

    section.mapv(|v| {
        let scaled = (v - z1 + 1.0) * scale;
        if scaled.is_nan() {
            PIXEL_MIN
        } else {
            scaled.clamp(pmin, pmax) as u8
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_range_yields_zero_image() {
        let image = Array2::from_elem((3, 5), 42.0);
        let out = quantize(image.view(), DisplayRange::new(42.0, 42.0));
        assert_eq!(out.dim(), (3, 5));
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn constant_image_maps_to_mid_value_on_widened_range() {
        let image = Array2::from_elem((4, 4), 5.0);
        let out = quantize(image.view(), DisplayRange::new(4.0, 6.0));
        // (5 - 4 + 1) * 200 / 3
        assert!(out.iter().all(|&b| b == 133));
    }

    #[test]
    fn output_is_clamped_and_monotonic() {
        let values: Vec<f64> = (-50..=300).map(|v| v as f64).collect();
        let image = Array2::from_shape_vec((1, values.len()), values).unwrap();
        let out = quantize(image.view(), DisplayRange::new(0.0, 199.0));

        assert_eq!(out[[0, 0]], PIXEL_MIN);
        assert_eq!(out[[0, out.ncols() - 1]], PIXEL_MAX);
        for w in out.row(0).to_vec().windows(2) {
            assert!(w[0] <= w[1]);
        }
        assert!(out.iter().all(|&b| (PIXEL_MIN..=PIXEL_MAX).contains(&b)));
    }

    #[test]
    fn nan_pixels_map_to_floor() {
        let image = Array2::from_shape_vec((1, 2), vec![f64::NAN, 5.0]).unwrap();
        let out = quantize(image.view(), DisplayRange::new(0.0, 10.0));
        assert_eq!(out[[0, 0]], PIXEL_MIN);
        // (5 - 0 + 1) * 200 / 11
        assert_eq!(out[[0, 1]], 109);
    }
}
