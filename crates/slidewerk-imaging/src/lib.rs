// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// slidewerk-imaging — Correction pipelines for digitised media.
//
// Provides the slide pipeline (scanner-bed boundary detection, threshold
// retry, perspective rectification), the print pipeline (fixed-inset crop),
// the shared percentile colour balance, and a failure-isolating batch runner.
// Decoding, encoding, and metadata preservation are left to the caller.

pub mod batch;
pub mod color;
pub mod outcome;
pub mod print;
pub mod slide;

// Re-export the primary entry points so callers can use
// `slidewerk_imaging::SlideCorrector` etc.
pub use batch::{BatchItem, BatchOutcome, BatchSummary, correct_batch};
pub use color::ColorBalancer;
pub use outcome::{CorrectionDiagnostics, CorrectionResult};
pub use print::{PrintCorrector, correct_print};
pub use slide::{SlideCorrector, correct_slide, correct_slide_bytes};
