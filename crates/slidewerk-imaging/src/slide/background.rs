// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Background sampling — reference colours of the scanner bed, read just inside
// the midpoint of each image edge.

use image::{Rgb, RgbImage};
use slidewerk_core::{Result, SlidewerkError};
use tracing::debug;

/// The four scanner-bed reference colours, in sampling order:
/// bottom-centre, right-centre, top-centre, left-centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundColorSet {
    pub colors: [Rgb<u8>; 4],
}

impl BackgroundColorSet {
    /// Iterate over the sampled colours.
    pub fn iter(&self) -> impl Iterator<Item = &Rgb<u8>> {
        self.colors.iter()
    }
}

/// Sample the background at the midpoint of each edge, inset by `offset`
/// pixels.
///
/// Fails with [`SlidewerkError::Geometry`] when the inset would not leave
/// the sample points strictly inside the image.
pub fn sample_background(image: &RgbImage, offset: u32) -> Result<BackgroundColorSet> {
    let (width, height) = image.dimensions();
    let min_side = width.min(height) as u64;

    if offset == 0 || 2 * offset as u64 >= min_side {
        return Err(SlidewerkError::Geometry(format!(
            "a {width}x{height} image is too small to sample the background {offset}px from each edge"
        )));
    }

    let points = [
        (width / 2, height - offset),
        (width - offset, height / 2),
        (width / 2, offset),
        (offset, height / 2),
    ];
    let colors = points.map(|(x, y)| *image.get_pixel(x, y));

    debug!(?colors, offset, "Background sampled");
    Ok(BackgroundColorSet { colors })
}
