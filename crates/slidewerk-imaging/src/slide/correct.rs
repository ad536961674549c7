// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Slide correction — background sampling, threshold search, rectification,
// and colour balance, with the crop/colour policy that ties them together.

use image::RgbImage;
use slidewerk_core::{CorrectionConfig, Result, SlideOptions, SlidewerkError};
use tracing::{info, instrument, warn};

use super::background::sample_background;
use super::rectify::rectify;
use super::search::{GeometryValidator, MaskCandidateSource, ThresholdSearch, ThresholdSequence};
use crate::color::ColorBalancer;
use crate::outcome::CorrectionResult;

/// Crops and colour-balances scans of mounted slides.
///
/// Policy:
/// - crop disabled: colour balance only (unless also disabled);
/// - crop succeeded: rectify, then colour balance (unless disabled);
/// - crop failed: return the input untouched. The framing was never
///   validated, so colour balance is skipped too.
#[derive(Debug, Clone)]
pub struct SlideCorrector {
    config: CorrectionConfig,
    balancer: ColorBalancer,
}

impl SlideCorrector {
    /// Validate `config` and build a corrector.
    pub fn new(config: CorrectionConfig) -> Result<Self> {
        config.validate()?;
        let balancer = ColorBalancer::new(config.color_balance_percent)?;
        Ok(Self { config, balancer })
    }

    pub fn config(&self) -> &CorrectionConfig {
        &self.config
    }

    /// Correct one decoded scan.
    ///
    /// Only [`SlidewerkError::Geometry`] (image too small to sample the
    /// scanner bed) escapes; every crop failure is reported through
    /// [`CorrectionResult::cropped_successfully`].
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn correct(&self, image: RgbImage, options: &SlideOptions) -> Result<CorrectionResult> {
        if options.disable_crop {
            info!("Cropping disabled");
            return Ok(self.balance_unless_disabled(image, options, false));
        }

        let background = sample_background(&image, self.config.sampling_offset)?;
        let source = MaskCandidateSource::new(&image, &background, self.config.blur_kernel_size);
        let validator = GeometryValidator::new(&self.config, options.enforce_aspect_ratio);
        let report =
            ThresholdSearch::new(source, validator, ThresholdSequence::from_config(&self.config))
                .run();

        let Some(accepted) = report.accepted().copied() else {
            let last = report.last_measurement();
            warn!(
                attempts = report.attempts.len(),
                last_aspect_ratio = ?last.and_then(|m| m.aspect_ratio),
                last_tilt = ?last.map(|m| m.tilt_degrees),
                "Could not match the scan to a known slide boundary; returning it unchanged"
            );
            return Ok(CorrectionResult {
                image,
                cropped_successfully: false,
                color_balanced: false,
                chosen_threshold: None,
                measured_aspect_ratio: last.and_then(|m| m.aspect_ratio),
                measured_tilt_degrees: last.map(|m| m.tilt_degrees),
                attempts: report.attempts,
            });
        };

        let measurement = accepted.measurement;
        let Some(rectified) = rectify(
            &image,
            &accepted.quad,
            measurement.max_width,
            measurement.max_height,
            self.config.negative_padding_factor,
        ) else {
            warn!("Accepted boundary could not be rectified; returning scan unchanged");
            return Ok(CorrectionResult {
                image,
                cropped_successfully: false,
                color_balanced: false,
                chosen_threshold: None,
                measured_aspect_ratio: measurement.aspect_ratio,
                measured_tilt_degrees: Some(measurement.tilt_degrees),
                attempts: report.attempts,
            });
        };

        let mut result = self.balance_unless_disabled(rectified, options, true);
        result.chosen_threshold = Some(accepted.threshold);
        result.measured_aspect_ratio = measurement.aspect_ratio;
        result.measured_tilt_degrees = Some(measurement.tilt_degrees);
        result.attempts = report.attempts;
        Ok(result)
    }

    /// Decode `data` (any format the `image` crate reads) and correct it.
    pub fn correct_bytes(&self, data: &[u8], options: &SlideOptions) -> Result<CorrectionResult> {
        let image = image::load_from_memory(data).map_err(|err| {
            SlidewerkError::ImageError(format!("failed to decode slide scan: {}", err))
        })?;
        self.correct(image.to_rgb8(), options)
    }

    fn balance_unless_disabled(
        &self,
        image: RgbImage,
        options: &SlideOptions,
        cropped: bool,
    ) -> CorrectionResult {
        if options.disable_color_correction {
            info!("Colour correction disabled");
            return CorrectionResult::unsearched(image, cropped, false);
        }
        let balanced = self.balancer.apply(&image);
        CorrectionResult::unsearched(balanced, cropped, true)
    }
}

/// Correct one slide scan with the given options and configuration.
pub fn correct_slide(
    image: RgbImage,
    options: &SlideOptions,
    config: &CorrectionConfig,
) -> Result<CorrectionResult> {
    SlideCorrector::new(config.clone())?.correct(image, options)
}

/// Decode and correct one slide scan.
pub fn correct_slide_bytes(
    data: &[u8],
    options: &SlideOptions,
    config: &CorrectionConfig,
) -> Result<CorrectionResult> {
    SlideCorrector::new(config.clone())?.correct_bytes(data, options)
}
