use std::sync::Arc;

use ndarray::{Array2, ArrayView2, CowArray, Ix2};
use tracing::{debug, warn};

use crate::core::params::DisplaySettings;
use crate::core::processing::region::Region;
use crate::types::{DisplayRange, TransformFunction};

/// Pixel function applied after offset and scale.
#[derive(Clone)]
pub enum Transform {
    Builtin(TransformFunction),
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl Transform {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Transform::Custom(Arc::new(f))
    }

    #[inline]
    pub fn apply(&self, v: f64) -> f64 {
        match self {
            Transform::Builtin(func) => func.apply(v),
            Transform::Custom(f) => f(v),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Transform::Builtin(TransformFunction::Identity))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::Builtin(TransformFunction::Identity)
    }
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transform::Builtin(func) => write!(f, "Builtin({})", func),
            Transform::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// Offset, scale and function applied, in that order, to every pixel.
#[derive(Debug, Clone, Default)]
pub struct TransformSpec {
    pub offset: Option<f64>,
    pub scale: Option<f64>,
    pub function: Transform,
}

impl TransformSpec {
    pub fn from_settings(settings: &DisplaySettings) -> Self {
        let function = match (&settings.custom_transform, settings.transform) {
            (Some(custom), _) => custom.clone(),
            (None, Some(func)) => Transform::Builtin(func),
            (None, None) => Transform::default(),
        };
        Self {
            offset: settings.offset,
            scale: settings.scale,
            function,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.offset.is_none() && self.scale.is_none() && self.function.is_identity()
    }

    /// Offset, scale, then function, for a single value.
    #[inline]
    pub fn apply_value(&self, v: f64) -> f64 {
        let mut out = v;
        if let Some(offset) = self.offset {
            out += offset;
        }
        if let Some(scale) = self.scale {
            out *= scale;
        }
        self.function.apply(out)
    }

    /// Map both endpoints; clipping never applies to the range itself.
    pub fn apply_range(&self, range: DisplayRange) -> DisplayRange {
        DisplayRange::new(self.apply_value(range.z1), self.apply_value(range.z2))
    }

    /// Transform a copy of `image`, clipping it to `clip` first when given.
    pub fn apply_image(&self, image: ArrayView2<f64>, clip: Option<DisplayRange>) -> Array2<f64> {
        match clip {
            Some(range) => {
                let (lo, hi) = (range.z1.min(range.z2), range.z1.max(range.z2));
                image.mapv(|v| self.apply_value(v.clamp(lo, hi)))
            }
            None => image.mapv(|v| self.apply_value(v)),
        }
    }
}

/// Region pixels and range to hand on to quantization.
#[derive(Debug)]
pub struct Transformed<'a> {
    /// Borrowed from the source when no pixel needs to change.
    pub image: CowArray<'a, f64, Ix2>,
    pub range: DisplayRange,
    /// True when the transform collapsed the range and the untransformed
    /// image was used instead.
    pub fallback: bool,
}

/// Apply `spec` to the `region` of `source` and re-map `range` through the
/// same steps. Only the region's pixels are visited.
///
/// `range` must not be zero-width. If the mapped endpoints coincide (or are
/// not finite) the transform is abandoned: the untransformed region is
/// returned with the source's own min/max as the range, widened by ±1 when
/// the source is flat.
pub fn apply<'a>(
    source: ArrayView2<'a, f64>,
    region: Region,
    spec: &TransformSpec,
    range: DisplayRange,
    clip: bool,
) -> Transformed<'a> {
    let section = region.slice(source);
    let mapped = spec.apply_range(range);
    if mapped.is_degenerate() || !mapped.is_finite() {
        warn!(
            "Transform mapped {} to {}; displaying untransformed image",
            range, mapped
        );
        let (min, max) = finite_min_max(source).unwrap_or((0.0, 0.0));
        let fallback_range = DisplayRange::new(min, max);
        if fallback_range.is_degenerate() {
            warn!("Image is flat at {}; widening display range by 1", min);
        }
        return Transformed {
            image: CowArray::from(section),
            range: fallback_range.widened(),
            fallback: true,
        };
    }

    debug!(
        "Transform {:?}: range {} -> {} (clip={})",
        spec, range, mapped, clip
    );
    let clip_range = clip.then_some(range);
    let image = if spec.is_identity() && clip_range.is_none() {
        CowArray::from(section)
    } else {
        CowArray::from(spec.apply_image(section, clip_range))
    };
    Transformed {
        image,
        range: mapped,
        fallback: false,
    }
}

/// Minimum and maximum over finite pixels, `None` when there are none.
pub fn finite_min_max(image: ArrayView2<f64>) -> Option<(f64, f64)> {
    image
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
