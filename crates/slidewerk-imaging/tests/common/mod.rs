// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic flatbed scans for integration tests.

#![allow(dead_code)]

use image::{Rgb, RgbImage};

pub const BED: Rgb<u8> = Rgb([128, 128, 128]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const RED: Rgb<u8> = Rgb([220, 30, 30]);
pub const GREEN: Rgb<u8> = Rgb([30, 200, 30]);

/// A slide of `slide_w` x `slide_h` centred on a uniform bed and rotated by
/// `tilt_degrees` (positive = clockwise on screen). `paint` colours the slide
/// in its own upright coordinates, with (0, 0) at its top-left corner.
pub fn scan_with(
    width: u32,
    height: u32,
    slide_w: f64,
    slide_h: f64,
    tilt_degrees: f64,
    paint: impl Fn(f64, f64) -> Rgb<u8>,
) -> RgbImage {
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let (sin, cos) = tilt_degrees.to_radians().sin_cos();

    RgbImage::from_fn(width, height, |x, y| {
        let dx = x as f64 + 0.5 - cx;
        let dy = y as f64 + 0.5 - cy;
        // Undo the rotation to land in slide coordinates.
        let u = dx * cos + dy * sin;
        let v = -dx * sin + dy * cos;
        if u.abs() < slide_w / 2.0 && v.abs() < slide_h / 2.0 {
            paint(u + slide_w / 2.0, v + slide_h / 2.0)
        } else {
            BED
        }
    })
}

/// A plain white slide on the grey bed.
pub fn white_slide(width: u32, height: u32, slide_w: f64, slide_h: f64, tilt: f64) -> RgbImage {
    scan_with(width, height, slide_w, slide_h, tilt, |_, _| WHITE)
}

/// The standard 1500x1000 scan with a 900x600 (3:2) slide.
pub fn standard_scan(tilt: f64) -> RgbImage {
    white_slide(1500, 1000, 900.0, 600.0, tilt)
}

pub fn is_close(actual: &Rgb<u8>, expected: Rgb<u8>, tolerance: i32) -> bool {
    actual
        .0
        .iter()
        .zip(expected.0.iter())
        .all(|(&a, &e)| (a as i32 - e as i32).abs() <= tolerance)
}
