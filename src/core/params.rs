use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::processing::transform::Transform;
use crate::error::{Error, Result};
use crate::types::{ScaleMode, TransformFunction};

/// Tuning of the zscale range estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZscaleParams {
    /// Divisor applied to the fitted slope; `0` requests the raw sample range.
    pub contrast: f64,
    /// Column stride of the sampling grid.
    pub sample_step: usize,
    /// Upper bound on sampled rows, and the minimum survivor count for a trusted fit.
    pub max_lines: usize,
    pub reject_sigma: f64,
    pub iterations: usize,
}

impl Default for ZscaleParams {
    fn default() -> Self {
        Self {
            contrast: 1.0,
            sample_step: 6,
            max_lines: 256,
            reject_sigma: 2.5,
            iterations: 3,
        }
    }
}

impl ZscaleParams {
    pub fn validate(&self) -> Result<()> {
        if !self.contrast.is_finite() || self.contrast < 0.0 {
            return Err(Error::invalid("contrast", self.contrast));
        }
        if self.sample_step == 0 {
            return Err(Error::invalid("sample_step", self.sample_step));
        }
        if self.max_lines == 0 {
            return Err(Error::invalid("max_lines", self.max_lines));
        }
        if !self.reject_sigma.is_finite() || self.reject_sigma <= 0.0 {
            return Err(Error::invalid("reject_sigma", self.reject_sigma));
        }
        Ok(())
    }
}

/// Display parameters for one display call, suitable for config files and CLI flags.
/// Every field is optional; unset means "automatic" or "identity".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Frame buffer frame to draw into (1-based); `None` means frame 1.
    pub frame: Option<u32>,
    pub z1: Option<f64>,
    pub z2: Option<f64>,
    /// Overrides `zscale.contrast` when set.
    pub contrast: Option<f64>,
    pub transform: Option<TransformFunction>,
    pub scale: Option<f64>,
    pub offset: Option<f64>,
    pub scale_mode: ScaleMode,
    pub zscale: ZscaleParams,
    /// Takes precedence over `transform`.
    #[serde(skip)]
    pub custom_transform: Option<Transform>,
}

impl DisplaySettings {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn frame_number(&self) -> Result<u32> {
        match self.frame {
            None => Ok(1),
            Some(0) => Err(Error::invalid("frame", 0)),
            Some(n) => Ok(n),
        }
    }

    pub fn has_explicit_range(&self) -> bool {
        self.z1.is_some() || self.z2.is_some()
    }

    /// Estimator parameters with the `contrast` override applied.
    pub fn zscale_params(&self) -> ZscaleParams {
        let mut params = self.zscale;
        if let Some(c) = self.contrast {
            params.contrast = c;
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contrast_override_wins() {
        let settings = DisplaySettings {
            contrast: Some(0.25),
            ..Default::default()
        };
        assert_eq!(settings.zscale_params().contrast, 0.25);
        assert_eq!(settings.zscale_params().max_lines, 256);
    }

    #[test]
    fn negative_contrast_is_rejected() {
        let params = ZscaleParams {
            contrast: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(Error::InvalidConfiguration { param: "contrast", .. })
        ));
    }

    #[test]
    fn frame_zero_is_rejected() {
        let settings = DisplaySettings {
            frame: Some(0),
            ..Default::default()
        };
        assert!(settings.frame_number().is_err());
        assert_eq!(DisplaySettings::default().frame_number().unwrap(), 1);
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let json = r#"{ "z1": 10.0, "transform": "log10", "scale_mode": "minmax" }"#;
        let settings: DisplaySettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.z1, Some(10.0));
        assert_eq!(settings.z2, None);
        assert_eq!(settings.transform, Some(TransformFunction::Log10));
        assert_eq!(settings.scale_mode, ScaleMode::Minmax);
        assert_eq!(settings.zscale, ZscaleParams::default());
    }
}
