//! IRAF-style "zscale" display range estimation.
//!
//! A sparse grid of pixels is sorted and a straight line is fitted to value
//! versus normalized rank. Outliers are clipped iteratively, and the slope of
//! the surviving line (scaled by `contrast`) decides how far z1/z2 extend
//! from the median. Hot pixels and cosmic rays land at the top of the sorted
//! sample, far from the line, and stop influencing the range.
use ndarray::ArrayView2;
use tracing::debug;

use crate::core::params::ZscaleParams;
use crate::error::{Error, Result};
use crate::types::{DisplayRange, RangeStatus};

/// Residuals below this many ulps of the sample magnitude are treated as exact.
const ROUNDOFF_ULPS: f64 = 64.0;

/// Outcome of a range estimate, with enough detail to explain the choice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeEstimate {
    pub range: DisplayRange,
    pub status: RangeStatus,
    /// Usable samples after blank filtering.
    pub samples: usize,
    /// Samples that survived clipping (0 when no fit was attempted).
    pub survivors: usize,
    /// Fitted slope per sample index, after the contrast adjustment.
    pub slope: f64,
}

impl RangeEstimate {
    fn unfitted(range: DisplayRange, status: RangeStatus, samples: usize) -> Self {
        Self {
            range,
            status,
            samples,
            survivors: 0,
            slope: 0.0,
        }
    }
}

/// Estimate a robust display range for `image`.
pub fn estimate(image: ArrayView2<f64>, params: &ZscaleParams) -> Result<RangeEstimate> {
    params.validate()?;
    let (rows, cols) = image.dim();
    if rows == 0 || cols == 0 {
        return Err(Error::shape(format!(
            "cannot estimate a display range for a {rows}x{cols} image"
        )));
    }

    let mut sample = sample_image(image, params.sample_step, params.max_lines);
    sample.sort_by(f64::total_cmp);
    let npix = sample.len();
    debug!(
        "zscale: sampled {} pixels from {}x{} (step={}, max_lines={})",
        npix, rows, cols, params.sample_step, params.max_lines
    );

    match npix {
        0 => {
            return Ok(RangeEstimate::unfitted(
                DisplayRange::new(0.0, 0.0),
                RangeStatus::Flat,
                0,
            ));
        }
        1 => {
            return Ok(RangeEstimate::unfitted(
                DisplayRange::new(sample[0], sample[0]),
                RangeStatus::InsufficientSample,
                1,
            ));
        }
        _ => {}
    }

    // The lowest sorted sample is not trusted as the minimum.
    let zmin = sample[1];
    let zmax = sample[npix - 1];
    let raw = DisplayRange::new(zmin, zmax);

    if params.contrast == 0.0 {
        debug!("zscale: contrast=0, using raw sample range {}", raw);
        return Ok(RangeEstimate::unfitted(raw, RangeStatus::RawRange, npix));
    }

    let fit = fit_line(&sample, params.reject_sigma, params.iterations);
    let survivors: Vec<f64> = sample
        .iter()
        .zip(&fit.good)
        .filter_map(|(&v, &keep)| keep.then_some(v))
        .collect();
    let n = survivors.len();
    debug!(
        "zscale: {} of {} samples survived {} clipping rounds",
        n, npix, fit.rounds
    );

    if n < params.max_lines {
        debug!(
            "zscale: {} survivors < max_lines={}, fit unreliable, using raw range",
            n, params.max_lines
        );
        return Ok(RangeEstimate {
            range: raw,
            status: RangeStatus::RawRange,
            samples: npix,
            survivors: n,
            slope: 0.0,
        });
    }

    let xscale = 2.0 / (npix - 1) as f64;
    let slope = fit.slope * xscale / params.contrast;
    let center = ((n + 1) / 2).max(1);
    let median = median_of_sorted(&survivors);

    let z1 = zmin.max(median - (center - 1) as f64 * slope);
    let z2 = zmax.min(median + (n - center) as f64 * slope);
    if z1 > z2 {
        debug!("zscale: fitted range inverted ({}, {}), using raw range", z1, z2);
        return Ok(RangeEstimate {
            range: raw,
            status: RangeStatus::RawRange,
            samples: npix,
            survivors: n,
            slope,
        });
    }

    Ok(RangeEstimate {
        range: DisplayRange::new(z1, z2),
        status: RangeStatus::Fitted,
        samples: npix,
        survivors: n,
        slope,
    })
}

/// Every `step`-th column of at most `max_lines` evenly spaced rows,
/// without blank (zero) or non-finite pixels.
fn sample_image(image: ArrayView2<f64>, step: usize, max_lines: usize) -> Vec<f64> {
    let row_stride = (image.nrows() / max_lines).max(1);
    image
        .rows()
        .into_iter()
        .step_by(row_stride)
        .take(max_lines)
        .flat_map(|row| row.into_iter().step_by(step).copied())
        .filter(|v| *v != 0.0 && v.is_finite())
        .collect()
}

struct LineFit {
    slope: f64,
    good: Vec<bool>,
    rounds: usize,
}

/// Fit `value = intercept + slope * x` over the sorted sample with x in [-1, 1],
/// clipping points beyond `reject_sigma` standard deviations.
fn fit_line(sample: &[f64], reject_sigma: f64, iterations: usize) -> LineFit {
    let npix = sample.len();
    let xscale = 2.0 / (npix - 1) as f64;
    let xnorm: Vec<f64> = (0..npix).map(|i| i as f64 * xscale - 1.0).collect();

    let magnitude = sample.iter().fold(1.0_f64, |m, v| m.max(v.abs()));
    let floor = ROUNDOFF_ULPS * f64::EPSILON * magnitude;

    let mut good = vec![true; npix];
    let (mut intercept, mut slope) = least_squares(&xnorm, sample, &good)
        .unwrap_or_else(|| (sample.iter().sum::<f64>() / npix as f64, 0.0));
    let mut rounds = 0;

    for _ in 0..iterations {
        rounds += 1;
        let residuals: Vec<f64> = sample
            .iter()
            .zip(&xnorm)
            .map(|(v, x)| v - (intercept + slope * x))
            .collect();
        let sigma = residual_sigma(&residuals, &good);
        let threshold = (reject_sigma * sigma).max(floor);

        let mut next = good.clone();
        let mut rejected = 0;
        for (keep, r) in next.iter_mut().zip(&residuals) {
            if *keep && r.abs() > threshold {
                *keep = false;
                rejected += 1;
            }
        }
        if rejected == 0 {
            break;
        }
        if next.iter().filter(|&&k| k).count() < 2 {
            debug!("zscale: clipping would leave fewer than 2 points, keeping previous fit");
            break;
        }
        match least_squares(&xnorm, sample, &next) {
            Some((a, b)) => {
                intercept = a;
                slope = b;
                good = next;
            }
            None => break,
        }
    }

    LineFit {
        slope,
        good,
        rounds,
    }
}

/// Normal equations for a straight line over the selected points.
/// Returns `(intercept, slope)`, or `None` when the points cannot define a line.
fn least_squares(x: &[f64], y: &[f64], good: &[bool]) -> Option<(f64, f64)> {
    let mut n = 0.0;
    let mut sumx = 0.0;
    let mut sumy = 0.0;
    let mut sumxx = 0.0;
    let mut sumxy = 0.0;
    for ((&xi, &yi), _) in x.iter().zip(y).zip(good).filter(|(_, k)| **k) {
        n += 1.0;
        sumx += xi;
        sumy += yi;
        sumxx += xi * xi;
        sumxy += xi * yi;
    }
    let delta = n * sumxx - sumx * sumx;
    if n < 2.0 || delta <= 0.0 {
        return None;
    }
    let intercept = (sumxx * sumy - sumx * sumxy) / delta;
    let slope = (n * sumxy - sumx * sumy) / delta;
    Some((intercept, slope))
}

fn residual_sigma(residuals: &[f64], good: &[bool]) -> f64 {
    let mut n = 0.0;
    let mut sum = 0.0;
    let mut sumsq = 0.0;
    for (&r, _) in residuals.iter().zip(good).filter(|(_, k)| **k) {
        n += 1.0;
        sum += r;
        sumsq += r * r;
    }
    if n < 2.0 {
        return 0.0;
    }
    let var = sumsq / (n - 1.0) - sum * sum / (n * (n - 1.0));
    if var > 0.0 { var.sqrt() } else { 0.0 }
}

fn median_of_sorted(values: &[f64]) -> f64 {
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn dense(max_lines: usize) -> ZscaleParams {
        ZscaleParams {
            sample_step: 1,
            max_lines,
            ..Default::default()
        }
    }

    #[test]
    fn linear_ramp_recovers_full_range() {
        let image = Array2::from_shape_fn((10, 10), |(r, c)| (r * 10 + c) as f64);
        let est = estimate(image.view(), &dense(10)).unwrap();

        assert_eq!(est.status, RangeStatus::Fitted);
        assert_eq!(est.samples, 99); // the single zero pixel is blank
        assert_eq!(est.survivors, 99);
        assert!((est.slope - 1.0).abs() < 1e-9, "slope={}", est.slope);
        assert!(est.range.z1 >= 0.0 && est.range.z1 <= 0.05 * 99.0);
        assert!((est.range.z2 - 99.0).abs() <= 0.05 * 99.0);
    }

    #[test]
    fn all_zero_image_is_flat() {
        let image = Array2::<f64>::zeros((8, 8));
        let est = estimate(image.view(), &ZscaleParams::default()).unwrap();
        assert_eq!(est.status, RangeStatus::Flat);
        assert_eq!(est.range, DisplayRange::new(0.0, 0.0));
    }

    #[test]
    fn single_sample_is_insufficient() {
        let mut image = Array2::<f64>::zeros((4, 4));
        image[[2, 0]] = 7.5;
        let est = estimate(image.view(), &dense(4)).unwrap();
        assert_eq!(est.status, RangeStatus::InsufficientSample);
        assert_eq!(est.range, DisplayRange::new(7.5, 7.5));
    }

    #[test]
    fn small_constant_image_falls_back_to_raw_range() {
        let image = Array2::from_elem((4, 4), 5.0);
        let est = estimate(image.view(), &ZscaleParams::default()).unwrap();
        assert_eq!(est.status, RangeStatus::RawRange);
        assert!(est.range.is_degenerate());
        assert_eq!(est.range.z1, 5.0);
    }

    #[test]
    fn hot_pixels_are_clipped() {
        let mut image =
            Array2::from_shape_fn((100, 100), |(r, c)| 1000.0 + ((r * 7 + c * 13) % 50) as f64);
        for k in 0..5 {
            image[[k * 17, k * 11]] = 1.0e6;
        }
        let est = estimate(image.view(), &dense(100)).unwrap();

        assert_eq!(est.status, RangeStatus::Fitted);
        assert!(est.survivors < est.samples);
        assert!(est.range.z1 >= 1000.0 && est.range.z1 < 1010.0, "{}", est.range);
        assert!(est.range.z2 > 1040.0 && est.range.z2 < 1100.0, "{}", est.range);
    }

    #[test]
    fn higher_contrast_never_widens_range() {
        let image = Array2::from_shape_fn((64, 64), |(r, c)| {
            let x = (r * 64 + c) as f64;
            100.0 + x + if (r * 31 + c * 17) % 97 == 0 { 5000.0 } else { 0.0 }
        });
        let loose = estimate(image.view(), &dense(32)).unwrap();
        let tight = estimate(
            image.view(),
            &ZscaleParams {
                contrast: 4.0,
                ..dense(32)
            },
        )
        .unwrap();
        assert!(tight.range.z1 >= loose.range.z1);
        assert!(tight.range.z2 <= loose.range.z2);
        assert!(tight.range.z1 <= tight.range.z2);
    }

    #[test]
    fn zero_contrast_requests_raw_range() {
        let image = Array2::from_shape_fn((10, 10), |(r, c)| (r * 10 + c + 1) as f64);
        let params = ZscaleParams {
            contrast: 0.0,
            ..dense(10)
        };
        let est = estimate(image.view(), &params).unwrap();
        assert_eq!(est.status, RangeStatus::RawRange);
        assert_eq!(est.range, DisplayRange::new(2.0, 100.0));
    }

    #[test]
    fn negative_contrast_is_an_error() {
        let image = Array2::from_elem((4, 4), 1.0);
        let params = ZscaleParams {
            contrast: -0.5,
            ..Default::default()
        };
        assert!(matches!(
            estimate(image.view(), &params),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn empty_image_is_a_shape_error() {
        let image = Array2::<f64>::zeros((0, 5));
        assert!(matches!(
            estimate(image.view(), &ZscaleParams::default()),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn row_sampling_respects_max_lines() {
        let image = Array2::from_shape_fn((1000, 1), |(r, _)| (r + 1) as f64);
        let est = estimate(image.view(), &dense(10)).unwrap();
        assert_eq!(est.samples, 10);
    }

    #[test]
    fn non_finite_pixels_are_ignored() {
        let mut image = Array2::from_shape_fn((10, 10), |(r, c)| (r * 10 + c + 1) as f64);
        image[[3, 3]] = f64::NAN;
        image[[4, 4]] = f64::INFINITY;
        let est = estimate(image.view(), &dense(10)).unwrap();
        assert_eq!(est.samples, 98);
        assert!(est.range.is_finite());
    }
}
