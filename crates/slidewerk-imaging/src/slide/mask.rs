// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Foreground mask construction — classify pixels against the sampled scanner
// bed, close small gaps with a box filter, and invert so the medium is white.

use image::{GrayImage, Luma, RgbImage};
use tracing::debug;

use super::background::BackgroundColorSet;

/// Binary mask of candidate media pixels: 255 = foreground, 0 = background.
#[derive(Debug, Clone)]
pub struct ForegroundMask(GrayImage);

impl ForegroundMask {
    /// Wrap an existing grayscale buffer; any nonzero pixel is foreground.
    pub fn from_gray(mut gray: GrayImage) -> Self {
        for pixel in gray.pixels_mut() {
            *pixel = Luma([if pixel.0[0] > 0 { 255 } else { 0 }]);
        }
        Self(gray)
    }

    /// Borrow the mask as a grayscale image.
    pub fn as_gray(&self) -> &GrayImage {
        &self.0
    }

    pub fn into_gray(self) -> GrayImage {
        self.0
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    /// Whether the pixel at (x, y) is foreground.
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.0.get_pixel(x, y).0[0] == 255
    }

    /// Number of foreground pixels.
    pub fn foreground_count(&self) -> usize {
        self.0.pixels().filter(|p| p.0[0] == 255).count()
    }
}

/// Squared RGB distance from every pixel to its nearest background sample.
///
/// A pixel is background at threshold `t` when its distance to *any* sample
/// is below `t`, which is the same as its distance to the nearest one. The
/// field does not depend on the threshold, so the threshold search computes
/// it once and re-thresholds it per attempt.
#[derive(Debug, Clone)]
pub struct DistanceField {
    width: u32,
    height: u32,
    min_sq: Vec<u32>,
}

impl DistanceField {
    pub fn compute(image: &RgbImage, background: &BackgroundColorSet) -> Self {
        let (width, height) = image.dimensions();
        let min_sq = image
            .pixels()
            .map(|pixel| {
                background
                    .iter()
                    .map(|bg| squared_distance(pixel.0, bg.0))
                    .min()
                    .unwrap_or(u32::MAX)
            })
            .collect();
        Self {
            width,
            height,
            min_sq,
        }
    }

    /// Intermediate buffer with background pixels set to 255.
    pub fn background_buffer(&self, threshold: f64) -> GrayImage {
        let limit = threshold * threshold;
        let values = self
            .min_sq
            .iter()
            .map(|&d| {
                if threshold > 0.0 && (d as f64) < limit {
                    255u8
                } else {
                    0u8
                }
            })
            .collect();
        // Length matches width * height by construction.
        GrayImage::from_raw(self.width, self.height, values)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }

    /// Full mask for one threshold.
    pub fn mask(&self, threshold: f64, kernel_size: u32) -> ForegroundMask {
        let background = self.background_buffer(threshold);
        let mut filtered = saturating_box_sum(&background, kernel_size);
        image::imageops::invert(&mut filtered);

        let mask = ForegroundMask::from_gray(filtered);
        debug!(
            threshold,
            foreground = mask.foreground_count(),
            "Foreground mask built"
        );
        mask
    }
}

/// Build the foreground mask of `image` for a single background `threshold`.
///
/// `kernel_size` is the side of the square box filter (8 for slide scans).
pub fn build_foreground_mask(
    image: &RgbImage,
    background: &BackgroundColorSet,
    threshold: f64,
    kernel_size: u32,
) -> ForegroundMask {
    DistanceField::compute(image, background).mask(threshold, kernel_size)
}

fn squared_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&p, &q)| {
            let d = p as i32 - q as i32;
            (d * d) as u32
        })
        .sum()
}

// -- Box filter ---------------------------------------------------------------

/// Convolve with an unnormalised `k`x`k` all-ones kernel, saturating at 255.
///
/// The window for pixel x spans `[x - k/2, x - k/2 + k - 1]` on each axis and
/// is clamped at the image border. With a 0/255 input a single background
/// pixel saturates the window.
fn saturating_box_sum(gray: &GrayImage, kernel_size: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let table = SummedArea::of(gray);
    let anchor = (kernel_size / 2) as i64;
    let k = kernel_size as i64;
    let clamp = |v: i64, limit: u32| v.clamp(0, limit as i64) as u32;

    GrayImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as i64, y as i64);
        let sum = table.window_sum(
            (clamp(x - anchor, width), clamp(y - anchor, height)),
            (clamp(x - anchor + k, width), clamp(y - anchor + k, height)),
        );
        Luma([sum.min(255) as u8])
    })
}

/// Summed-area table of a mask buffer, so every box-filter window costs four
/// lookups whatever the kernel size.
struct SummedArea {
    stride: usize,
    cells: Vec<u64>,
}

impl SummedArea {
    /// Cell `(x, y)` holds the sum over `[0, x) x [0, y)`; row and column 0
    /// are zero.
    fn of(gray: &GrayImage) -> Self {
        let stride = gray.width() as usize + 1;
        let mut cells = vec![0u64; stride * (gray.height() as usize + 1)];

        for (y, row) in gray.rows().enumerate() {
            let mut running = 0u64;
            for (x, pixel) in row.enumerate() {
                running += u64::from(pixel.0[0]);
                cells[(y + 1) * stride + x + 1] = cells[y * stride + x + 1] + running;
            }
        }
        Self { stride, cells }
    }

    fn at(&self, x: u32, y: u32) -> u64 {
        self.cells[y as usize * self.stride + x as usize]
    }

    /// Sum over the half-open window `[x0, x1) x [y0, y1)`.
    fn window_sum(&self, (x0, y0): (u32, u32), (x1, y1): (u32, u32)) -> u64 {
        self.at(x1, y1) + self.at(x0, y0) - self.at(x1, y0) - self.at(x0, y1)
    }
}
