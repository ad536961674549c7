// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Correction configuration: tunable pipeline constants and per-job options.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::AspectRatioPolicy;
use crate::error::{Result, SlidewerkError};

/// Tunable constants for the correction pipelines.
///
/// Passed explicitly into every pipeline call so that a correction is a pure
/// function of (image, options, config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// RGB distance below which a pixel counts as scanner background.
    /// Sensible values sit between 15 and 25.
    pub background_aggression: f64,
    /// Offsets added to `background_aggression`, tried in order.
    pub threshold_offsets: Vec<f64>,
    /// Inset (pixels) from each edge at which the background is sampled.
    pub sampling_offset: u32,
    /// Side length of the square box filter applied to the background mask.
    pub blur_kernel_size: u32,
    /// Physical aspect ratios a slide may have (long side / short side).
    pub acceptable_aspect_ratios: Vec<f64>,
    /// Relative tolerance around each acceptable aspect ratio.
    pub aspect_ratio_lenience: f64,
    /// Maximum top-edge tilt, in degrees.
    pub acceptable_tilt_degrees: f64,
    /// Canvas inflation applied when rectifying.
    pub negative_padding_factor: f64,
    /// Total percent of samples clipped by the colour balance (split evenly
    /// between both tails).
    pub color_balance_percent: f64,
    /// Percent of the short side trimmed from every edge of a print.
    pub print_crop_percent: f64,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            background_aggression: 16.0,
            threshold_offsets: vec![0.0, 1.0, -1.0, 2.0, -2.0, 4.0, -4.0],
            sampling_offset: 10,
            blur_kernel_size: 8,
            acceptable_aspect_ratios: vec![1.5, 1.33, 1.0],
            aspect_ratio_lenience: 0.04,
            acceptable_tilt_degrees: 5.0,
            negative_padding_factor: 1.05,
            color_balance_percent: 1.0,
            print_crop_percent: 1.0,
        }
    }
}

impl CorrectionConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&data)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.threshold_offsets.is_empty() {
            return Err(invalid("threshold_offsets must not be empty"));
        }
        if self.sampling_offset == 0 {
            return Err(invalid("sampling_offset must be at least 1 pixel"));
        }
        if self.blur_kernel_size == 0 {
            return Err(invalid("blur_kernel_size must be at least 1"));
        }
        if self.acceptable_aspect_ratios.is_empty()
            || self.acceptable_aspect_ratios.iter().any(|r| *r < 1.0)
        {
            return Err(invalid(
                "acceptable_aspect_ratios must be non-empty and each >= 1.0",
            ));
        }
        if !(0.0..1.0).contains(&self.aspect_ratio_lenience) {
            return Err(invalid("aspect_ratio_lenience must lie in [0, 1)"));
        }
        if !(0.0..=90.0).contains(&self.acceptable_tilt_degrees) {
            return Err(invalid("acceptable_tilt_degrees must lie in [0, 90]"));
        }
        if !self.negative_padding_factor.is_finite() || self.negative_padding_factor < 1.0 {
            return Err(invalid("negative_padding_factor must be >= 1.0"));
        }
        if !(self.color_balance_percent > 0.0 && self.color_balance_percent < 100.0) {
            return Err(invalid("color_balance_percent must lie in (0, 100)"));
        }
        if !(0.0..50.0).contains(&self.print_crop_percent) {
            return Err(invalid("print_crop_percent must lie in [0, 50)"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> SlidewerkError {
    SlidewerkError::InvalidParameter(message.to_owned())
}

/// Per-call options for slide correction.
///
/// Field names on the wire match the option keys the intake service sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideOptions {
    /// Skip boundary detection and rectification entirely.
    #[serde(rename = "slidesDisableCrop")]
    pub disable_crop: bool,
    /// Skip the colour balance step.
    #[serde(rename = "slidesDisableColorCorrection")]
    pub disable_color_correction: bool,
    /// Which aspect ratio(s) a detected boundary may match.
    #[serde(rename = "slidesEnforceAspectRatio")]
    pub enforce_aspect_ratio: AspectRatioPolicy,
}

/// Per-call options for print correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintOptions {
    #[serde(rename = "printsDisableCrop")]
    pub disable_crop: bool,
    #[serde(rename = "printsDisableColorCorrection")]
    pub disable_color_correction: bool,
}

/// The combined option payload attached to a correction job. Both media
/// types share one flat key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobOptions {
    #[serde(flatten)]
    pub slides: SlideOptions,
    #[serde(flatten)]
    pub prints: PrintOptions,
}

impl JobOptions {
    /// Parse a job option payload from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CorrectionConfig::default();
        config.validate().unwrap();
        assert_eq!(config.background_aggression, 16.0);
        assert_eq!(config.threshold_offsets, vec![0.0, 1.0, -1.0, 2.0, -2.0, 4.0, -4.0]);
        assert_eq!(config.negative_padding_factor, 1.05);
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config = CorrectionConfig::from_json_str(r#"{"background_aggression": 20}"#).unwrap();
        assert_eq!(config.background_aggression, 20.0);
        assert_eq!(config.sampling_offset, 10);
        assert_eq!(config.acceptable_aspect_ratios, vec![1.5, 1.33, 1.0]);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_percent = r#"{"color_balance_percent": 0}"#;
        assert!(matches!(
            CorrectionConfig::from_json_str(bad_percent),
            Err(SlidewerkError::InvalidParameter(_))
        ));

        let no_offsets = r#"{"threshold_offsets": []}"#;
        assert!(CorrectionConfig::from_json_str(no_offsets).is_err());

        let shrinking_pad = r#"{"negative_padding_factor": 0.9}"#;
        assert!(CorrectionConfig::from_json_str(shrinking_pad).is_err());
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        assert!(matches!(
            CorrectionConfig::from_json_str("{not json"),
            Err(SlidewerkError::Serialization(_))
        ));
    }

    #[test]
    fn config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("correction.json");

        let config = CorrectionConfig {
            background_aggression: 18.0,
            acceptable_tilt_degrees: 3.0,
            ..CorrectionConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = CorrectionConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = CorrectionConfig::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(SlidewerkError::Io(_))));
    }

    #[test]
    fn job_options_from_intake_payload() {
        let json = r#"{
            "slidesDisableCrop": false,
            "slidesDisableColorCorrection": true,
            "slidesEnforceAspectRatio": "4:3",
            "printsDisableCrop": true
        }"#;
        let options = JobOptions::from_json_str(json).unwrap();
        assert!(!options.slides.disable_crop);
        assert!(options.slides.disable_color_correction);
        assert_eq!(options.slides.enforce_aspect_ratio, AspectRatioPolicy::FourThree);
        assert!(options.prints.disable_crop);
        assert!(!options.prints.disable_color_correction);
    }

    #[test]
    fn empty_payload_uses_defaults() {
        let options = JobOptions::from_json_str("{}").unwrap();
        assert_eq!(options, JobOptions::default());
        assert_eq!(options.slides.enforce_aspect_ratio, AspectRatioPolicy::Any);
    }
}
