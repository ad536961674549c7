// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Colour module — percentile-clip-then-stretch colour balance shared by the
// slide and print pipelines.

pub mod balance;

pub use balance::{ChannelLevels, ColorBalancer};
