// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification — warp the accepted quad onto an axis-aligned
// canvas and restore its orientation.

use image::imageops::{flip_vertical, rotate90};
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::{debug, info, warn};

use super::boundary::OrderedQuad;

/// Output canvas for a rectification.
///
/// `end_*` is the measured side inflated by the padding factor and `start_*`
/// the inflation itself. The destination quad spans `[-start, end]` on each
/// axis, so the medium overshoots the canvas slightly and the scanner bed
/// never shows at the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub end_x: u32,
    pub end_y: u32,
    pub start_x: u32,
    pub start_y: u32,
}

impl Canvas {
    pub fn new(max_width: u32, max_height: u32, padding_factor: f64) -> Self {
        let end_x = (max_width as f64 * padding_factor) as u32;
        let end_y = (max_height as f64 * padding_factor) as u32;
        Self {
            end_x,
            end_y,
            start_x: end_x.saturating_sub(max_width),
            start_y: end_y.saturating_sub(max_height),
        }
    }

    /// Destination points for `[TL, TR, BR, BL]`.
    ///
    /// The top edge runs down the canvas' left column and the left edge
    /// along its top row, i.e. the warp lands transposed. See
    /// [`compensate_orientation`].
    pub fn destination_points(&self) -> [(f32, f32); 4] {
        let (sx, sy) = (-(self.start_x as f32), -(self.start_y as f32));
        let (ex, ey) = (self.end_x as f32, self.end_y as f32);
        [(sx, sy), (sx, ey), (ex, ey), (ex, sy)]
    }

    /// Size of the final image after orientation compensation.
    pub fn output_dimensions(&self) -> (u32, u32) {
        (self.end_y, self.end_x)
    }
}

/// Warp `quad` out of `image` and return the upright result.
///
/// Returns `None` when the canvas is empty or the quad is degenerate enough
/// that no projective transform exists.
pub fn rectify(
    image: &RgbImage,
    quad: &OrderedQuad,
    max_width: u32,
    max_height: u32,
    padding_factor: f64,
) -> Option<RgbImage> {
    let canvas = Canvas::new(max_width, max_height, padding_factor);
    if canvas.end_x == 0 || canvas.end_y == 0 {
        warn!(?canvas, "Empty rectification canvas");
        return None;
    }

    let src = quad.control_points();
    let dest = canvas.destination_points();
    debug!(?src, ?dest, "Rectification control points");

    let Some(projection) = Projection::from_control_points(src, dest) else {
        warn!("Failed to compute projective transform");
        return None;
    };

    let mut warped = RgbImage::new(canvas.end_x, canvas.end_y);
    warp_into(
        image,
        &projection,
        Interpolation::Bilinear,
        Rgb([0, 0, 0]),
        &mut warped,
    );

    let upright = compensate_orientation(&warped);
    info!(
        width = upright.width(),
        height = upright.height(),
        "Rectification applied"
    );
    Some(upright)
}

/// Vertical flip followed by a 90 degree clockwise rotation.
///
/// Together these transpose the image, which undoes the transposed layout of
/// [`Canvas::destination_points`].
pub fn compensate_orientation(warped: &RgbImage) -> RgbImage {
    rotate90(&flip_vertical(warped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slide::boundary::{Vertex, resolve_orientation};

    const RED: Rgb<u8> = Rgb([220, 20, 20]);
    const GREEN: Rgb<u8> = Rgb([20, 220, 20]);
    const BLUE: Rgb<u8> = Rgb([20, 20, 220]);
    const WHITE: Rgb<u8> = Rgb([240, 240, 240]);

    fn assert_close(actual: &Rgb<u8>, expected: Rgb<u8>) {
        let near = actual
            .0
            .iter()
            .zip(expected.0.iter())
            .all(|(&a, &e)| (a as i32 - e as i32).abs() <= 2);
        assert!(near, "expected ~{expected:?}, got {actual:?}");
    }

    /// A 200x120 slide at (50, 40) with one colour per quadrant.
    fn quadrant_slide() -> RgbImage {
        RgbImage::from_fn(300, 200, |x, y| {
            if !(50..250).contains(&x) || !(40..160).contains(&y) {
                return Rgb([128, 128, 128]);
            }
            match (x < 150, y < 100) {
                (true, true) => RED,
                (false, true) => GREEN,
                (true, false) => BLUE,
                (false, false) => WHITE,
            }
        })
    }

    #[test]
    fn canvas_inflation() {
        let canvas = Canvas::new(592, 892, 1.05);
        assert_eq!(canvas.end_x, 621);
        assert_eq!(canvas.end_y, 936);
        assert_eq!(canvas.start_x, 29);
        assert_eq!(canvas.start_y, 44);
        assert_eq!(canvas.output_dimensions(), (936, 621));
    }

    #[test]
    fn unit_padding_has_no_overshoot() {
        let canvas = Canvas::new(100, 150, 1.0);
        assert_eq!((canvas.start_x, canvas.start_y), (0, 0));
        assert_eq!(
            canvas.destination_points(),
            [(0.0, 0.0), (0.0, 150.0), (100.0, 150.0), (100.0, 0.0)]
        );
    }

    #[test]
    fn compensation_is_a_transpose() {
        let canvas = RgbImage::from_fn(2, 3, |x, y| Rgb([x as u8, y as u8, 0]));
        let out = compensate_orientation(&canvas);
        assert_eq!(out.dimensions(), (3, 2));
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(out.get_pixel(x, y).0, [y as u8, x as u8, 0]);
            }
        }
    }

    #[test]
    fn rectified_slide_is_upright_and_unmirrored() {
        let image = quadrant_slide();
        let quad = resolve_orientation(&[
            Vertex::new(249.0, 159.0),
            Vertex::new(50.0, 40.0),
            Vertex::new(50.0, 159.0),
            Vertex::new(249.0, 40.0),
        ]);

        let out = rectify(&image, &quad, 119, 199, 1.05).unwrap();
        assert_eq!(out.dimensions(), (208, 124));

        assert_close(out.get_pixel(52, 31), RED);
        assert_close(out.get_pixel(156, 31), GREEN);
        assert_close(out.get_pixel(52, 93), BLUE);
        assert_close(out.get_pixel(156, 93), WHITE);
    }

    #[test]
    fn negative_padding_keeps_scanner_bed_out() {
        let image = quadrant_slide();
        let quad = resolve_orientation(&[
            Vertex::new(50.0, 40.0),
            Vertex::new(249.0, 40.0),
            Vertex::new(249.0, 159.0),
            Vertex::new(50.0, 159.0),
        ]);
        let out = rectify(&image, &quad, 119, 199, 1.05).unwrap();

        let (w, h) = out.dimensions();
        for (x, y) in [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)] {
            let pixel = out.get_pixel(x, y);
            let bed = pixel.0.iter().all(|&c| (c as i32 - 128).abs() <= 2);
            assert!(!bed, "corner ({x}, {y}) shows the scanner bed: {pixel:?}");
        }
    }

    #[test]
    fn degenerate_quad_is_refused() {
        let image = quadrant_slide();
        let point = Vertex::new(10.0, 10.0);
        let quad = OrderedQuad {
            top_left: point,
            top_right: point,
            bottom_right: point,
            bottom_left: point,
        };
        assert!(rectify(&image, &quad, 0, 0, 1.05).is_none());
    }
}
