//! Shared types and enums used across imdisp.
//! Includes `DisplayRange`, `RangeStatus`, `ScaleMode`, `TransformFunction`,
//! `OutputFormat` and `FrameBufferSize`.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Pixel values mapped to the black (`z1`) and white (`z2`) ends of the
/// display colormap. Ordering is not enforced; `z1 == z2` marks a flat range.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct DisplayRange {
    pub z1: f64,
    pub z2: f64,
}

impl DisplayRange {
    pub fn new(z1: f64, z2: f64) -> Self {
        Self { z1, z2 }
    }

    pub fn is_degenerate(&self) -> bool {
        self.z1 == self.z2
    }

    pub fn is_finite(&self) -> bool {
        self.z1.is_finite() && self.z2.is_finite()
    }

    /// Nudge a zero-width range to `(z1 - 1, z2 + 1)`; other ranges are returned as-is.
    pub fn widened(self) -> Self {
        if self.is_degenerate() {
            Self::new(self.z1 - 1.0, self.z2 + 1.0)
        } else {
            self
        }
    }

    /// Swap the endpoints if `z1 > z2`.
    pub fn ordered(self) -> Self {
        if self.z1 > self.z2 {
            Self::new(self.z2, self.z1)
        } else {
            self
        }
    }

    pub fn width(&self) -> f64 {
        self.z2 - self.z1
    }
}

impl std::fmt::Display for DisplayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.z1, self.z2)
    }
}

/// How a display range was obtained.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum RangeStatus {
    /// Clipped line fit succeeded; range narrowed around the median.
    Fitted,
    /// Extremes of the sorted sample (or of the image) were used.
    RawRange,
    /// Fewer than two usable samples; the range spans whatever was found.
    InsufficientSample,
    /// Nothing usable in the sample (e.g. an all-zero image).
    Flat,
    /// Range given by the caller.
    Explicit,
}

impl std::fmt::Display for RangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeStatus::Fitted => write!(f, "Fitted"),
            RangeStatus::RawRange => write!(f, "RawRange"),
            RangeStatus::InsufficientSample => write!(f, "InsufficientSample"),
            RangeStatus::Flat => write!(f, "Flat"),
            RangeStatus::Explicit => write!(f, "Explicit"),
        }
    }
}

/// Automatic range selection used when the caller gives no z1/z2.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// Sigma-clipped line fit over a sparse sample.
    #[default]
    Zscale,
    /// Full minimum and maximum of the image.
    Minmax,
}

impl std::fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleMode::Zscale => write!(f, "zscale"),
            ScaleMode::Minmax => write!(f, "minmax"),
        }
    }
}

/// Named pixel functions selectable from config files and the CLI.
/// Arbitrary closures go through `Transform::custom` instead.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TransformFunction {
    #[default]
    Identity,
    Log10,
    Ln,
    Sqrt,
    Asinh,
    Square,
}

impl TransformFunction {
    pub fn apply(self, v: f64) -> f64 {
        match self {
            TransformFunction::Identity => v,
            TransformFunction::Log10 => v.log10(),
            TransformFunction::Ln => v.ln(),
            TransformFunction::Sqrt => v.sqrt(),
            TransformFunction::Asinh => v.asinh(),
            TransformFunction::Square => v * v,
        }
    }
}

impl std::fmt::Display for TransformFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransformFunction::Identity => "identity",
            TransformFunction::Log10 => "log10",
            TransformFunction::Ln => "ln",
            TransformFunction::Sqrt => "sqrt",
            TransformFunction::Asinh => "asinh",
            TransformFunction::Square => "square",
        };
        write!(f, "{}", s)
    }
}

#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum, Serialize, Deserialize,
)]
pub enum OutputFormat {
    TIFF,
    JPEG, // Lossy, preview only
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::TIFF => "tiff",
            OutputFormat::JPEG => "jpg",
        }
    }
}

/// Pixel dimensions of the destination frame buffer.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct FrameBufferSize {
    pub width: usize,
    pub height: usize,
}

impl FrameBufferSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

impl Default for FrameBufferSize {
    /// `imt512`, the historical default buffer.
    fn default() -> Self {
        Self::new(512, 512)
    }
}

impl std::fmt::Display for FrameBufferSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for FrameBufferSize {
    type Err = String;

    /// Parses `WIDTHxHEIGHT`, e.g. `1024x768`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let width = w
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("invalid width '{w}'"))?;
        let height = h
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("invalid height '{h}'"))?;
        if width == 0 || height == 0 {
            return Err(format!("frame buffer must be non-empty, got '{s}'"));
        }
        Ok(Self::new(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widened_only_touches_flat_ranges() {
        assert_eq!(DisplayRange::new(5.0, 5.0).widened(), DisplayRange::new(4.0, 6.0));
        assert_eq!(DisplayRange::new(1.0, 3.0).widened(), DisplayRange::new(1.0, 3.0));
    }

    #[test]
    fn ordered_swaps_descending_range() {
        assert_eq!(DisplayRange::new(9.0, 2.0).ordered(), DisplayRange::new(2.0, 9.0));
    }

    #[test]
    fn width_is_signed() {
        assert_eq!(DisplayRange::new(4.0, 6.0).width(), 2.0);
        assert_eq!(DisplayRange::new(6.0, 4.0).width(), -2.0);
        assert_eq!(DisplayRange::new(5.0, 5.0).widened().width(), 2.0);
    }

    #[test]
    fn frame_buffer_size_parses() {
        let fb: FrameBufferSize = "1024x768".parse().unwrap();
        assert_eq!(fb, FrameBufferSize::new(1024, 768));
        assert!("0x10".parse::<FrameBufferSize>().is_err());
        assert!("1024".parse::<FrameBufferSize>().is_err());
    }
}
