// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry validation and the background-threshold search.
//
// Scanner lighting varies enough that no single background threshold works
// for every scan, so the search walks a fixed sequence of thresholds around
// the configured aggression and stops at the first one whose boundary passes
// the tilt and aspect-ratio checks.

use image::RgbImage;
use serde::Serialize;
use slidewerk_core::{AspectRatioPolicy, CorrectionConfig};
use tracing::{debug, info, warn};

use super::background::BackgroundColorSet;
use super::boundary::{OrderedQuad, extract_boundary};
use super::mask::DistanceField;

// -- Threshold sequence -------------------------------------------------------

/// Background thresholds to try, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSequence(Vec<f64>);

impl ThresholdSequence {
    /// `base + offset` for each offset, preserving offset order.
    pub fn new(base: f64, offsets: &[f64]) -> Self {
        Self(offsets.iter().map(|offset| base + offset).collect())
    }

    pub fn from_config(config: &CorrectionConfig) -> Self {
        Self::new(config.background_aggression, &config.threshold_offsets)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

// -- Validation ---------------------------------------------------------------

/// Why a threshold's candidate was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// The mask had no usable contour.
    BoundaryNotFound,
    /// A measured side truncated to zero pixels.
    DegenerateSize,
    /// The top edge is tilted beyond tolerance.
    Tilt { degrees: f64 },
    /// The long/short side ratio matched no acceptable ratio.
    AspectRatio { ratio: f64 },
}

/// Measurements taken from an ordered quad.
///
/// `max_width` is the longer of the two TL-BL / TR-BR sides and `max_height`
/// the longer of TL-TR / BL-BR; both truncated to whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub tilt_degrees: f64,
    pub max_width: u32,
    pub max_height: u32,
    /// `None` when a side is zero.
    pub aspect_ratio: Option<f64>,
}

impl Measurement {
    pub fn of(quad: &OrderedQuad) -> Self {
        let OrderedQuad {
            top_left: tl,
            top_right: tr,
            bottom_right: br,
            bottom_left: bl,
        } = *quad;

        let tilt_degrees = (tr.y - tl.y).atan2(tr.x - tl.x).to_degrees();

        let max_width = (tl.distance(&bl) as u32).max(tr.distance(&br) as u32);
        let max_height = (tl.distance(&tr) as u32).max(bl.distance(&br) as u32);

        let long = max_width.max(max_height);
        let short = max_width.min(max_height);
        let aspect_ratio = (short > 0).then(|| long as f64 / short as f64);

        Self {
            tilt_degrees,
            max_width,
            max_height,
            aspect_ratio,
        }
    }
}

/// Tilt and aspect-ratio gate for boundary candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryValidator {
    acceptable_tilt_degrees: f64,
    ratios: Vec<f64>,
    lenience: f64,
}

impl GeometryValidator {
    pub fn new(config: &CorrectionConfig, policy: AspectRatioPolicy) -> Self {
        Self {
            acceptable_tilt_degrees: config.acceptable_tilt_degrees,
            ratios: policy.ratios(&config.acceptable_aspect_ratios),
            lenience: config.aspect_ratio_lenience,
        }
    }

    /// Ratios a candidate is compared against.
    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    /// Check a measurement, returning the first failed criterion.
    pub fn check(&self, measurement: &Measurement) -> Result<(), Rejection> {
        if measurement.tilt_degrees.abs() > self.acceptable_tilt_degrees {
            return Err(Rejection::Tilt {
                degrees: measurement.tilt_degrees,
            });
        }
        let ratio = measurement.aspect_ratio.ok_or(Rejection::DegenerateSize)?;
        if self.matches_ratio(ratio) {
            Ok(())
        } else {
            Err(Rejection::AspectRatio { ratio })
        }
    }

    fn matches_ratio(&self, ratio: f64) -> bool {
        self.ratios.iter().any(|&target| {
            let lower = target * (1.0 - self.lenience);
            let upper = target * (1.0 + self.lenience);
            ratio > lower && ratio < upper
        })
    }
}

// -- Search state machine -----------------------------------------------------

/// Produces a boundary quad for a given threshold.
pub trait CandidateSource {
    fn candidate(&mut self, threshold: f64) -> Option<OrderedQuad>;
}

/// The production source: threshold the precomputed distance field, filter,
/// and extract the largest contour.
pub struct MaskCandidateSource {
    field: DistanceField,
    kernel_size: u32,
}

impl MaskCandidateSource {
    pub fn new(image: &RgbImage, background: &BackgroundColorSet, kernel_size: u32) -> Self {
        Self {
            field: DistanceField::compute(image, background),
            kernel_size,
        }
    }
}

impl CandidateSource for MaskCandidateSource {
    fn candidate(&mut self, threshold: f64) -> Option<OrderedQuad> {
        let mask = self.field.mask(threshold, self.kernel_size);
        extract_boundary(&mask).map(|candidate| candidate.ordered())
    }
}

/// A boundary that passed validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptedCandidate {
    pub threshold: f64,
    pub quad: OrderedQuad,
    pub measurement: Measurement,
}

/// Result of evaluating one threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Attempt {
    pub threshold: f64,
    pub measurement: Option<Measurement>,
    pub rejection: Option<Rejection>,
}

impl Attempt {
    pub fn accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Trying(f64),
    Accepted(AcceptedCandidate),
    Exhausted,
}

impl SearchState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Trying(_))
    }
}

/// Walks a [`ThresholdSequence`] until a candidate is accepted or the
/// sequence runs out.
pub struct ThresholdSearch<S> {
    source: S,
    validator: GeometryValidator,
    sequence: ThresholdSequence,
    index: usize,
    state: SearchState,
    attempts: Vec<Attempt>,
}

impl<S: CandidateSource> ThresholdSearch<S> {
    pub fn new(source: S, validator: GeometryValidator, sequence: ThresholdSequence) -> Self {
        let state = match sequence.get(0) {
            Some(threshold) => SearchState::Trying(threshold),
            None => SearchState::Exhausted,
        };
        Self {
            source,
            validator,
            sequence,
            index: 0,
            state,
            attempts: Vec::new(),
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    /// Evaluate the current threshold and advance. A no-op once terminal.
    pub fn step(&mut self) -> &SearchState {
        let SearchState::Trying(threshold) = self.state else {
            return &self.state;
        };

        let (measurement, verdict) = match self.source.candidate(threshold) {
            None => (None, Err(Rejection::BoundaryNotFound)),
            Some(quad) => {
                let measurement = Measurement::of(&quad);
                let verdict = self.validator.check(&measurement).map(|()| quad);
                (Some(measurement), verdict)
            }
        };

        self.attempts.push(Attempt {
            threshold,
            measurement,
            rejection: verdict.err(),
        });

        self.state = match (verdict, measurement) {
            (Ok(quad), Some(measurement)) => {
                info!(
                    threshold,
                    tilt = measurement.tilt_degrees,
                    aspect_ratio = ?measurement.aspect_ratio,
                    "Boundary accepted"
                );
                SearchState::Accepted(AcceptedCandidate {
                    threshold,
                    quad,
                    measurement,
                })
            }
            (verdict, _) => {
                debug!(threshold, rejection = ?verdict.err(), "Threshold rejected");
                self.index += 1;
                match self.sequence.get(self.index) {
                    Some(next) => SearchState::Trying(next),
                    None => {
                        warn!(
                            attempts = self.attempts.len(),
                            "Threshold sequence exhausted without an acceptable boundary"
                        );
                        SearchState::Exhausted
                    }
                }
            }
        };

        &self.state
    }

    /// Step until terminal and return the full record.
    pub fn run(mut self) -> SearchReport {
        while !self.state.is_terminal() {
            self.step();
        }
        SearchReport {
            state: self.state,
            attempts: self.attempts,
        }
    }
}

/// Terminal state of a search plus every attempt made.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub state: SearchState,
    pub attempts: Vec<Attempt>,
}

impl SearchReport {
    pub fn accepted(&self) -> Option<&AcceptedCandidate> {
        match &self.state {
            SearchState::Accepted(candidate) => Some(candidate),
            _ => None,
        }
    }

    /// The most recent attempt that got as far as measuring a boundary.
    pub fn last_measurement(&self) -> Option<Measurement> {
        self.attempts.iter().rev().find_map(|a| a.measurement)
    }
}
