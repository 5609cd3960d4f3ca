// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification - warp the located sheet quadrilateral onto a
// fixed-size, top-down rectangle.

use gradewerk_core::error::{GradewerkError, Result};
use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::{debug, instrument};

use crate::corners::CornerSet;

/// Warp the quadrilateral bounded by `corners` in `gray` onto a
/// `width` x `height` image.
///
/// The corners map to the outermost pixel centres of the output, so the
/// sheet's own aspect ratio is not preserved: content is stretched to fill
/// the canonical rectangle. The output always has exactly the requested
/// dimensions. Pixels that project outside the source read as paper white.
///
/// Fails with [`GradewerkError::Processing`] when the corners are degenerate
/// (collinear or coincident) and no projection exists.
#[instrument(skip(gray, corners), fields(src_w = gray.width(), src_h = gray.height()))]
pub fn rectify(gray: &GrayImage, corners: &CornerSet, width: u32, height: u32) -> Result<GrayImage> {
    if width == 0 || height == 0 {
        return Err(GradewerkError::Processing(format!(
            "cannot rectify onto a {width}x{height} sheet"
        )));
    }

    let area = quad_area(&corners.to_array());
    if area < 1.0 {
        return Err(GradewerkError::Processing(format!(
            "degenerate sheet corners enclose no area: {:?}",
            corners.to_array()
        )));
    }

    let right = (width - 1) as f32;
    let bottom = (height - 1) as f32;
    let dest: [(f32, f32); 4] = [
        (0.0, 0.0),       // top-left
        (right, 0.0),     // top-right
        (right, bottom),  // bottom-right
        (0.0, bottom),    // bottom-left
    ];

    let projection = Projection::from_control_points(corners.to_array(), dest).ok_or_else(|| {
        GradewerkError::Processing(format!(
            "degenerate sheet corners, no perspective transform: {:?}",
            corners.to_array()
        ))
    })?;

    let mut output = GrayImage::new(width, height);
    warp_into(gray, &projection, Interpolation::Bilinear, Luma([255u8]), &mut output);

    debug!(width, height, area, "Sheet rectified");
    Ok(output)
}

/// Shoelace area of the corner quadrilateral, in source pixels.
fn quad_area(corners: &[(f32, f32); 4]) -> f32 {
    let mut area = 0.0f32;
    for i in 0..4 {
        let j = (i + 1) % 4;
        area += corners[i].0 * corners[j].1;
        area -= corners[j].0 * corners[i].1;
    }
    area.abs() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corners::order_corners;
    use imageproc::point::Point;

    fn corners(points: [(f32, f32); 4]) -> CornerSet {
        order_corners(points.map(|(x, y)| Point::new(x, y)))
    }

    #[test]
    fn output_has_canonical_size_for_any_quad() {
        let gray = GrayImage::from_pixel(400, 300, Luma([200u8]));
        let quads = [
            [(10.0, 10.0), (390.0, 10.0), (390.0, 290.0), (10.0, 290.0)],
            [(40.0, 20.0), (300.0, 45.0), (280.0, 260.0), (25.0, 240.0)],
            [(100.0, 100.0), (140.0, 102.0), (139.0, 130.0), (101.0, 128.0)],
        ];
        for quad in quads {
            for (w, h) in [(550, 700), (100, 40), (2, 2)] {
                let out = rectify(&gray, &corners(quad), w, h).unwrap();
                assert_eq!(out.dimensions(), (w, h));
            }
        }
    }

    #[test]
    fn identity_quad_preserves_content() {
        // Left half dark, right half light.
        let gray = GrayImage::from_fn(100, 80, |x, _| if x < 50 { Luma([0u8]) } else { Luma([255u8]) });
        let out = rectify(
            &gray,
            &corners([(0.0, 0.0), (99.0, 0.0), (99.0, 79.0), (0.0, 79.0)]),
            100,
            80,
        )
        .unwrap();
        assert_eq!(out.get_pixel(10, 40).0[0], 0);
        assert_eq!(out.get_pixel(90, 40).0[0], 255);
    }

    #[test]
    fn sub_region_is_stretched_to_fill() {
        // A dark square in the middle of a light page; rectifying exactly that
        // square should give an all-dark output.
        let mut gray = GrayImage::from_pixel(200, 200, Luma([255u8]));
        for y in 50..150 {
            for x in 50..150 {
                gray.put_pixel(x, y, Luma([0u8]));
            }
        }
        let out = rectify(
            &gray,
            &corners([(52.0, 52.0), (147.0, 52.0), (147.0, 147.0), (52.0, 147.0)]),
            60,
            30,
        )
        .unwrap();
        assert!(out.pixels().all(|p| p.0[0] < 128));
    }

    #[test]
    fn collinear_corners_are_a_processing_error() {
        let gray = GrayImage::new(50, 50);
        let flat = CornerSet {
            top_left: Point::new(0.0, 0.0),
            top_right: Point::new(10.0, 0.0),
            bottom_right: Point::new(20.0, 0.0),
            bottom_left: Point::new(30.0, 0.0),
        };
        assert!(matches!(
            rectify(&gray, &flat, 550, 700),
            Err(GradewerkError::Processing(_))
        ));
    }
}
