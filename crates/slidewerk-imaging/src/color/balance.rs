// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// "Simplest colour balance": per channel, saturate the darkest and brightest
// `percent / 2` of samples and stretch what remains across the full 0..=255
// range. Removes colour casts from faded emulsions and restores dynamic range
// in one pass.

use image::RgbImage;
use slidewerk_core::{Result, SlidewerkError};
use tracing::{debug, info, instrument};

/// Clip levels found for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLevels {
    pub low: u8,
    pub high: u8,
}

impl ChannelLevels {
    /// Find the clip levels for a channel histogram.
    ///
    /// On the sorted samples, `low = sorted[floor(n * h)]` and
    /// `high = sorted[min(ceil(n * (1 - h)), n - 1)]` where
    /// `h = percent / 200`. Returns `None` for an empty histogram.
    pub fn from_histogram(histogram: &[u64; 256], percent: f64) -> Option<Self> {
        let total: u64 = histogram.iter().sum();
        if total == 0 {
            return None;
        }
        let half = percent / 200.0;
        let n = total as f64;

        let low_index = (n * half).floor() as u64;
        let high_index = ((n * (1.0 - half)).ceil() as u64).min(total - 1);

        Some(Self {
            low: nth_smallest(histogram, low_index),
            high: nth_smallest(histogram, high_index),
        })
    }

    /// Lookup table that clips to `[low, high]` and stretches to `[0, 255]`.
    /// A flat channel (`low == high`) has no range to stretch: every value
    /// saturates to `low`.
    pub fn lookup_table(&self) -> [u8; 256] {
        if self.low >= self.high {
            return [self.low; 256];
        }

        let mut table = [0u8; 256];

        let (low, high) = (self.low as f64, self.high as f64);
        let scale = 255.0 / (high - low);
        for (value, slot) in table.iter_mut().enumerate() {
            let clipped = (value as f64).clamp(low, high);
            *slot = ((clipped - low) * scale).round().clamp(0.0, 255.0) as u8;
        }
        table
    }
}

/// Value at `index` in the sorted sample list described by `histogram`.
fn nth_smallest(histogram: &[u64; 256], index: u64) -> u8 {
    let mut seen = 0u64;
    for (value, &count) in histogram.iter().enumerate() {
        seen += count;
        if seen > index {
            return value as u8;
        }
    }
    255
}

/// Per-channel percentile stretch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBalancer {
    percent: f64,
}

impl Default for ColorBalancer {
    fn default() -> Self {
        Self { percent: 1.0 }
    }
}

impl ColorBalancer {
    /// `percent` is the total share of samples clipped per channel and must
    /// lie strictly between 0 and 100.
    pub fn new(percent: f64) -> Result<Self> {
        if !(percent > 0.0 && percent < 100.0) {
            return Err(SlidewerkError::InvalidParameter(format!(
                "colour balance percent must lie in (0, 100), got {percent}"
            )));
        }
        Ok(Self { percent })
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Clip levels for each of the R, G, B channels.
    pub fn levels(&self, image: &RgbImage) -> Option<[ChannelLevels; 3]> {
        let mut histograms = [[0u64; 256]; 3];
        for pixel in image.pixels() {
            for (channel, &value) in pixel.0.iter().enumerate() {
                histograms[channel][value as usize] += 1;
            }
        }

        let [r, g, b] = histograms;
        Some([
            ChannelLevels::from_histogram(&r, self.percent)?,
            ChannelLevels::from_histogram(&g, self.percent)?,
            ChannelLevels::from_histogram(&b, self.percent)?,
        ])
    }

    /// Balance `image`, returning a new image of the same size.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        let Some(levels) = self.levels(image) else {
            debug!("Empty image; colour balance skipped");
            return image.clone();
        };
        debug!(?levels, percent = self.percent, "Channel clip levels");

        let tables = levels.map(|l| l.lookup_table());
        let mut out = image.clone();
        for pixel in out.pixels_mut() {
            for (channel, value) in pixel.0.iter_mut().enumerate() {
                *value = tables[channel][*value as usize];
            }
        }

        info!("Colour balance applied");
        out
    }
}
