// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Slide pipeline — scanner-bed sampling, foreground masking, boundary
// extraction, geometry validation with threshold retry, and perspective
// rectification.

pub mod background;
pub mod boundary;
pub mod correct;
pub mod mask;
pub mod rectify;
pub mod search;

pub use background::{BackgroundColorSet, sample_background};
pub use boundary::{BoundaryCandidate, OrderedQuad, Vertex, extract_boundary, resolve_orientation};
pub use correct::{SlideCorrector, correct_slide, correct_slide_bytes};
pub use mask::{DistanceField, ForegroundMask, build_foreground_mask};
pub use rectify::{Canvas, compensate_orientation, rectify};
pub use search::{
    AcceptedCandidate, Attempt, CandidateSource, GeometryValidator, MaskCandidateSource,
    Measurement, Rejection, SearchReport, SearchState, ThresholdSearch, ThresholdSequence,
};
