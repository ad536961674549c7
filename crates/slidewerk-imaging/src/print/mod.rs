// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print pipeline — fixed-inset crop and colour balance for photographic prints.

pub mod correct;

pub use correct::{PrintCorrector, correct_print};
