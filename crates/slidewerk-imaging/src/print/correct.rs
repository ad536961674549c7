// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print correction. Prints are scanned edge-to-edge, so instead of boundary
// detection a fixed percentage of the short side is trimmed from every edge
// to drop the scanner's edge shadow before colour balancing.

use image::RgbImage;
use image::imageops::crop_imm;
use slidewerk_core::{CorrectionConfig, PrintOptions, Result};
use tracing::{info, instrument};

use crate::color::ColorBalancer;
use crate::outcome::CorrectionResult;

/// Crops and colour-balances scans of photographic prints.
#[derive(Debug, Clone)]
pub struct PrintCorrector {
    crop_percent: f64,
    balancer: ColorBalancer,
}

impl PrintCorrector {
    pub fn new(config: &CorrectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            crop_percent: config.print_crop_percent,
            balancer: ColorBalancer::new(config.color_balance_percent)?,
        })
    }

    /// Pixels trimmed from each edge of a `width` x `height` scan.
    pub fn inset(&self, width: u32, height: u32) -> u32 {
        (width.min(height) as f64 * self.crop_percent * 0.01) as u32
    }

    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn correct(&self, image: RgbImage, options: &PrintOptions) -> CorrectionResult {
        let (width, height) = image.dimensions();

        let (image, cropped) = if options.disable_crop {
            info!("Cropping disabled");
            (image, false)
        } else {
            let inset = self.inset(width, height);
            let cropped = crop_imm(
                &image,
                inset,
                inset,
                width.saturating_sub(2 * inset),
                height.saturating_sub(2 * inset),
            )
            .to_image();
            info!(inset, "Print edges trimmed");
            (cropped, true)
        };

        if options.disable_color_correction {
            info!("Colour correction disabled");
            return CorrectionResult::unsearched(image, cropped, false);
        }
        CorrectionResult::unsearched(self.balancer.apply(&image), cropped, true)
    }
}

/// Correct one print scan with the given options and configuration.
pub fn correct_print(
    image: RgbImage,
    options: &PrintOptions,
    config: &CorrectionConfig,
) -> Result<CorrectionResult> {
    Ok(PrintCorrector::new(config)?.correct(image, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn scan() -> RgbImage {
        RgbImage::from_fn(600, 400, |x, y| Rgb([(x % 200) as u8 + 20, (y % 180) as u8 + 30, 90]))
    }

    #[test]
    fn inset_is_percent_of_short_side() {
        let corrector = PrintCorrector::new(&CorrectionConfig::default()).unwrap();
        assert_eq!(corrector.inset(600, 400), 4);
        assert_eq!(corrector.inset(50, 80), 0);
    }

    #[test]
    fn trims_every_edge() {
        let input = scan();
        let options = PrintOptions {
            disable_color_correction: true,
            ..PrintOptions::default()
        };
        let result = correct_print(input.clone(), &options, &CorrectionConfig::default()).unwrap();

        assert!(result.cropped_successfully);
        assert_eq!(result.image.dimensions(), (592, 392));
        assert_eq!(result.image.get_pixel(0, 0), input.get_pixel(4, 4));
    }

    #[test]
    fn balances_after_crop() {
        let result =
            correct_print(scan(), &PrintOptions::default(), &CorrectionConfig::default()).unwrap();
        assert!(result.color_balanced);
        let reds: Vec<u8> = result.image.pixels().map(|p| p.0[0]).collect();
        assert_eq!(reds.iter().min(), Some(&0));
        assert_eq!(reds.iter().max(), Some(&255));
    }

    #[test]
    fn disabled_crop_keeps_dimensions() {
        let options = PrintOptions {
            disable_crop: true,
            disable_color_correction: true,
        };
        let input = scan();
        let result = correct_print(input.clone(), &options, &CorrectionConfig::default()).unwrap();
        assert!(!result.cropped_successfully);
        assert_eq!(result.image, input);
    }
}
