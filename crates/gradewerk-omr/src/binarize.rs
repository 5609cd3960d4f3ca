// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global binarization of the rectified sheet.
//
// One fixed intensity threshold for the whole sheet. Uneven lighting can push
// paper below it or lift faint pencil above it; whether to move to a local
// threshold is an open product decision, so none is attempted here.

use image::{GrayImage, Luma};
use tracing::{debug, instrument};

/// Foreground (ink) value in a binarized mask.
pub const INK: u8 = 255;

/// Background (paper) value in a binarized mask.
pub const PAPER: u8 = 0;

/// Convert a grayscale sheet into an ink mask.
///
/// Pixels with intensity at or below `threshold` become [`INK`]; everything
/// brighter becomes [`PAPER`]. The output has the input's dimensions.
#[instrument(skip(gray), fields(width = gray.width(), height = gray.height()))]
pub fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    let mask = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] <= threshold {
            Luma([INK])
        } else {
            Luma([PAPER])
        }
    });
    debug!(threshold, "Sheet binarized");
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_pixels_become_ink() {
        let gray = GrayImage::from_fn(4, 1, |x, _| Luma([[0u8, 149, 150, 151][x as usize]]));
        let mask = binarize(&gray, 150);
        let values: Vec<u8> = mask.pixels().map(|p| p.0[0]).collect();
        assert_eq!(values, vec![INK, INK, INK, PAPER]);
    }

    #[test]
    fn preserves_dimensions() {
        let gray = GrayImage::from_pixel(37, 53, Luma([200u8]));
        let mask = binarize(&gray, 150);
        assert_eq!(mask.dimensions(), (37, 53));
        assert!(mask.pixels().all(|p| p.0[0] == PAPER));
    }
}
