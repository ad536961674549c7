// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Slidewerk.

use thiserror::Error;

/// Top-level error type for all Slidewerk operations.
///
/// Only conditions that abort a whole correction call live here. A threshold
/// that finds no boundary, or a boundary that fails the tilt/aspect checks,
/// is recovered inside the threshold search and never surfaces as an error.
#[derive(Debug, Error)]
pub enum SlidewerkError {
    // -- Pipeline errors --
    #[error("image geometry unsuitable for correction: {0}")]
    Geometry(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("correction worker panicked: {0}")]
    WorkerPanic(String),

    // -- Configuration / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SlidewerkError>;
