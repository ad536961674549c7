// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Correction results shared by the slide and print pipelines.

use image::RgbImage;
use serde::Serialize;

use crate::slide::search::Attempt;

/// Output of one correction call.
#[derive(Debug, Clone)]
pub struct CorrectionResult {
    /// The corrected image, or the untouched input when cropping failed.
    pub image: RgbImage,
    /// Whether the image was cropped to the detected (or fixed) boundary.
    pub cropped_successfully: bool,
    /// Whether the colour balance ran.
    pub color_balanced: bool,
    /// Background threshold that produced the accepted boundary.
    pub chosen_threshold: Option<f64>,
    /// Long/short side ratio of the accepted boundary, or of the last
    /// measured one when none was accepted.
    pub measured_aspect_ratio: Option<f64>,
    /// Top-edge tilt, same provenance as `measured_aspect_ratio`.
    pub measured_tilt_degrees: Option<f64>,
    /// Every threshold evaluated, in order.
    pub attempts: Vec<Attempt>,
}

impl CorrectionResult {
    /// Result for an image that went through no boundary search.
    pub(crate) fn unsearched(image: RgbImage, cropped: bool, color_balanced: bool) -> Self {
        Self {
            image,
            cropped_successfully: cropped,
            color_balanced,
            chosen_threshold: None,
            measured_aspect_ratio: None,
            measured_tilt_degrees: None,
            attempts: Vec::new(),
        }
    }

    /// Everything except the pixels, for job records and logs.
    pub fn diagnostics(&self) -> CorrectionDiagnostics {
        CorrectionDiagnostics {
            width: self.image.width(),
            height: self.image.height(),
            cropped_successfully: self.cropped_successfully,
            color_balanced: self.color_balanced,
            chosen_threshold: self.chosen_threshold,
            measured_aspect_ratio: self.measured_aspect_ratio,
            measured_tilt_degrees: self.measured_tilt_degrees,
            attempts: self.attempts.clone(),
        }
    }
}

/// Serializable summary of a [`CorrectionResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionDiagnostics {
    pub width: u32,
    pub height: u32,
    pub cropped_successfully: bool,
    pub color_balanced: bool,
    pub chosen_threshold: Option<f64>,
    pub measured_aspect_ratio: Option<f64>,
    pub measured_tilt_degrees: Option<f64>,
    pub attempts: Vec<Attempt>,
}
