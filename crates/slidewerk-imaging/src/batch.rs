// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch runner — corrects independent scans in parallel. One bad scan never
// halts the batch: its error (or panic) is captured in its own outcome and
// every sibling still completes.

use std::panic::{AssertUnwindSafe, catch_unwind};

use image::RgbImage;
use rayon::prelude::*;
use serde::Serialize;
use slidewerk_core::{CorrectionConfig, JobOptions, MediaKind, Result, SlidewerkError};
use tracing::{info, instrument, warn};

use crate::outcome::CorrectionResult;
use crate::print::PrintCorrector;
use crate::slide::SlideCorrector;

/// One decoded scan to correct. `key` identifies it to the caller (usually
/// the source path) and is handed back untouched.
#[derive(Debug, Clone)]
pub struct BatchItem<K> {
    pub key: K,
    pub kind: MediaKind,
    pub image: RgbImage,
}

/// Outcome of one batch item.
#[derive(Debug)]
pub struct BatchOutcome<K> {
    pub key: K,
    pub kind: MediaKind,
    pub result: Result<CorrectionResult>,
}

/// Counts over a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub cropped: usize,
    pub uncropped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn of<K>(outcomes: &[BatchOutcome<K>]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match &outcome.result {
                Ok(result) if result.cropped_successfully => summary.cropped += 1,
                Ok(_) => summary.uncropped += 1,
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }
}

/// Correct every item on the rayon pool, preserving input order.
///
/// Configuration problems fail the whole call before any item runs; anything
/// that goes wrong inside one item only affects that item's outcome.
#[instrument(skip_all, fields(items = items.len()))]
pub fn correct_batch<K: Send>(
    items: Vec<BatchItem<K>>,
    options: &JobOptions,
    config: &CorrectionConfig,
) -> Result<Vec<BatchOutcome<K>>> {
    let slides = SlideCorrector::new(config.clone())?;
    let prints = PrintCorrector::new(config)?;

    let outcomes: Vec<BatchOutcome<K>> = items
        .into_par_iter()
        .map(|item| {
            let BatchItem { key, kind, image } = item;
            let attempt = catch_unwind(AssertUnwindSafe(|| match kind {
                MediaKind::Slide => slides.correct(image, &options.slides),
                MediaKind::Print => Ok(prints.correct(image, &options.prints)),
            }));
            let result = attempt.unwrap_or_else(|payload| {
                Err(SlidewerkError::WorkerPanic(panic_message(payload.as_ref())))
            });
            if let Err(err) = &result {
                warn!(%kind, error = %err, "Scan failed; continuing with the rest of the batch");
            }
            BatchOutcome { key, kind, result }
        })
        .collect();

    let summary = BatchSummary::of(&outcomes);
    info!(
        total = summary.total,
        cropped = summary.cropped,
        uncropped = summary.uncropped,
        failed = summary.failed,
        "Batch complete"
    );
    Ok(outcomes)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_are_readable() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn std::any::Any + Send> = Box::new(7u32);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }

    #[test]
    fn summary_counts() {
        let ok = |cropped| BatchOutcome {
            key: (),
            kind: MediaKind::Slide,
            result: Ok(CorrectionResult::unsearched(RgbImage::new(1, 1), cropped, false)),
        };
        let failed = BatchOutcome {
            key: (),
            kind: MediaKind::Slide,
            result: Err(SlidewerkError::Geometry("too small".into())),
        };
        let summary = BatchSummary::of(&[ok(true), ok(false), ok(true), failed]);
        assert_eq!(
            summary,
            BatchSummary {
                total: 4,
                cropped: 2,
                uncropped: 1,
                failed: 1
            }
        );
    }
}
