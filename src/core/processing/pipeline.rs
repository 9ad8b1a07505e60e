use ndarray::{Array2, ArrayView2};
use tracing::{debug, info, warn};

use crate::core::params::DisplaySettings;
use crate::core::processing::quantize::quantize;
use crate::core::processing::region::{Region, select};
use crate::core::processing::transform::{self, TransformSpec, finite_min_max};
use crate::core::processing::zscale;
use crate::error::{Error, Result};
use crate::types::{DisplayRange, FrameBufferSize, RangeStatus, ScaleMode};

/// Everything the display device needs for one frame.
#[derive(Debug, Clone)]
pub struct DisplayFrame {
    /// Quantized pixels of `region`, values in `[1, 200]` (all zero for a flat range).
    pub image: Array2<u8>,
    pub region: Region,
    /// Final black/white points, in transformed pixel units.
    pub range: DisplayRange,
    pub status: RangeStatus,
    /// True when the transform collapsed the range and was not applied.
    pub transform_fallback: bool,
    pub name: Option<String>,
    pub frame: u32,
    /// `(rows, cols)` of the source image.
    pub source_shape: (usize, usize),
    pub buffer: FrameBufferSize,
}

/// Convert any numeric image to the `f64` working representation.
pub fn to_f64_image<T>(image: ArrayView2<T>) -> Array2<f64>
where
    T: Copy + Into<f64>,
{
    image.mapv(|v| v.into())
}

/// Run one display call: range, transform, region selection and quantization.
///
/// The caller's image is never modified; the same inputs always produce the
/// same frame.
pub fn prepare_frame(
    image: ArrayView2<f64>,
    settings: &DisplaySettings,
    buffer: FrameBufferSize,
    name: Option<&str>,
) -> Result<DisplayFrame> {
    let (rows, cols) = image.dim();
    if rows == 0 || cols == 0 {
        return Err(Error::shape(format!(
            "image must have at least one row and column, got {rows}x{cols}"
        )));
    }
    let frame = settings.frame_number()?;

    let (range, status) = initial_range(image, settings)?;
    debug!("Initial display range {} ({})", range, status);
    let range = if range.is_degenerate() {
        warn!("Zero-width display range {} ({}); widening by 1", range, status);
        range.widened()
    } else {
        range
    };

    let region = select((rows, cols), buffer.width, buffer.height)?;
    let spec = TransformSpec::from_settings(settings);
    let transformed =
        transform::apply(image, region, &spec, range, settings.has_explicit_range());
    let range = transformed.range.ordered();
    let bytes = quantize(transformed.image.view(), range);

    info!(
        "Frame {}: {} displayed with z1={} z2={} region {} in {} buffer",
        frame,
        name.unwrap_or("<unnamed>"),
        range.z1,
        range.z2,
        region,
        buffer
    );

    Ok(DisplayFrame {
        image: bytes,
        region,
        range,
        status,
        transform_fallback: transformed.fallback,
        name: name.map(str::to_string),
        frame,
        source_shape: (rows, cols),
        buffer,
    })
}

/// Range on the untransformed image: explicit values (a missing side taken
/// from the image extremes), otherwise the configured automatic mode.
fn initial_range(
    image: ArrayView2<f64>,
    settings: &DisplaySettings,
) -> Result<(DisplayRange, RangeStatus)> {
    if settings.has_explicit_range() {
        let extremes = finite_min_max(image).unwrap_or((0.0, 0.0));
        let z1 = settings.z1.unwrap_or(extremes.0);
        let z2 = settings.z2.unwrap_or(extremes.1);
        if !z1.is_finite() || !z2.is_finite() {
            return Err(Error::invalid("z1/z2", format!("{z1}/{z2}")));
        }
        return Ok((DisplayRange::new(z1, z2), RangeStatus::Explicit));
    }

    match settings.scale_mode {
        ScaleMode::Zscale => {
            let est = zscale::estimate(image, &settings.zscale_params())?;
            Ok((est.range, est.status))
        }
        ScaleMode::Minmax => match finite_min_max(image) {
            Some((lo, hi)) => Ok((DisplayRange::new(lo, hi), RangeStatus::RawRange)),
            None => Ok((DisplayRange::new(0.0, 0.0), RangeStatus::Flat)),
        },
    }
}
