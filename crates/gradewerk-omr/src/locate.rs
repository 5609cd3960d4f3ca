// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document location - find the answer sheet's outer quadrilateral in an edge
// map by polygon-approximating every external contour and keeping the largest
// four-sided one.

use gradewerk_core::error::{GradewerkError, Result};
use image::GrayImage;
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use tracing::{debug, info, instrument, warn};

/// Find the answer sheet in a binary edge map.
///
/// Every external contour is approximated by a polygon with tolerance
/// `tolerance * perimeter`. Only four-vertex approximations qualify, and the
/// one enclosing the strictly greatest area wins (the first one seen keeps
/// the spot on an exact tie). The returned corners are in contour order, not
/// yet labelled.
///
/// Returns [`GradewerkError::SheetNotFound`] when no contour approximates to
/// exactly four vertices.
#[instrument(skip(edges), fields(width = edges.width(), height = edges.height()))]
pub fn locate_sheet(edges: &GrayImage, tolerance: f64) -> Result<[Point<i32>; 4]> {
    let contours = find_contours::<i32>(edges);
    debug!(contour_count = contours.len(), "Contours extracted");

    let mut best: Option<([Point<i32>; 4], f64)> = None;

    for contour in contours.iter().filter(|c| is_external(c)) {
        let Some(quad) = approximate_quad(&contour.points, tolerance) else {
            continue;
        };
        let area = polygon_area(&contour.points);
        let beats_best = match &best {
            Some((_, best_area)) => area > *best_area,
            None => area > 0.0,
        };
        if beats_best {
            best = Some((quad, area));
        }
    }

    match best {
        Some((quad, area)) => {
            info!(area, corners = ?quad, "Answer sheet located");
            Ok(quad)
        }
        None => {
            warn!("No four-sided contour found in edge map");
            Err(GradewerkError::SheetNotFound)
        }
    }
}

/// An outer border with no enclosing contour.
fn is_external(contour: &Contour<i32>) -> bool {
    matches!(contour.border_type, BorderType::Outer) && contour.parent.is_none()
}

/// Approximate a closed contour and return its vertices if there are exactly
/// four of them.
fn approximate_quad(points: &[Point<i32>], tolerance: f64) -> Option<[Point<i32>; 4]> {
    if points.len() < 4 {
        return None;
    }
    let perimeter = arc_length(points, true);
    if perimeter <= 0.0 {
        return None;
    }
    let polygon = approximate_closed_polygon(points, tolerance * perimeter);
    <[Point<i32>; 4]>::try_from(polygon).ok()
}

/// Douglas-Peucker approximation of a closed curve.
///
/// The curve is cut at its start and at the point farthest from the start,
/// each half is simplified as an open polyline, and the halves are joined.
/// The start point itself is dropped when it lies within `epsilon` of the
/// chord between its neighbours, so the result does not depend on where the
/// contour tracer happened to begin.
pub(crate) fn approximate_closed_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let Some(&start) = points.first() else {
        return Vec::new();
    };

    let mut split = 0;
    let mut split_dist = 0i64;
    for (i, p) in points.iter().enumerate() {
        let dist = squared_distance(start, *p);
        if dist > split_dist {
            split = i;
            split_dist = dist;
        }
    }
    if split == 0 {
        return vec![start];
    }

    let mut polygon = approximate_polygon_dp(&points[..=split], epsilon, false);
    let mut closing = points[split..].to_vec();
    closing.push(start);
    let second_half = approximate_polygon_dp(&closing, epsilon, false);

    // `split` ends the first half and starts the second; `start` ends the second.
    polygon.pop();
    polygon.extend(second_half);
    polygon.pop();

    if polygon.len() > 3 {
        let prev = polygon[polygon.len() - 1];
        let next = polygon[1];
        if distance_to_line(polygon[0], prev, next) <= epsilon {
            polygon.remove(0);
        }
    }

    polygon
}

fn squared_distance(a: Point<i32>, b: Point<i32>) -> i64 {
    let dx = (a.x - b.x) as i64;
    let dy = (a.y - b.y) as i64;
    dx * dx + dy * dy
}

/// Perpendicular distance from `p` to the line through `a` and `b`.
fn distance_to_line(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (bx, by) = (b.x as f64, b.y as f64);
    let (px, py) = (p.x as f64, p.y as f64);
    let length = ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt();
    if length == 0.0 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }
    ((bx - ax) * (ay - py) - (ax - px) * (by - ay)).abs() / length
}

/// Area enclosed by a closed polygon, via the shoelace formula.
pub(crate) fn polygon_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0i64;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += points[i].x as i64 * points[j].y as i64;
        twice_area -= points[j].x as i64 * points[i].y as i64;
    }
    twice_area.abs() as f64 / 2.0
}
