// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner ordering - label four located sheet corners as top-left, top-right,
// bottom-right and bottom-left from their coordinates alone.

use imageproc::point::Point;

/// The four sheet corners, labelled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerSet {
    pub top_left: Point<f32>,
    pub top_right: Point<f32>,
    pub bottom_right: Point<f32>,
    pub bottom_left: Point<f32>,
}

impl CornerSet {
    /// Corners clockwise from top-left, the order projection control points
    /// are given in.
    pub fn to_array(&self) -> [(f32, f32); 4] {
        [
            (self.top_left.x, self.top_left.y),
            (self.top_right.x, self.top_right.y),
            (self.bottom_right.x, self.bottom_right.y),
            (self.bottom_left.x, self.bottom_left.y),
        ]
    }
}

/// Label four corner points.
///
/// - top-left minimises `x + y`
/// - bottom-right maximises `x + y`
/// - top-right minimises `y - x`
/// - bottom-left maximises `y - x`
///
/// The first point wins an exact tie. For a near-square sheet rotated close to
/// 45 degrees two extrema can land on the same point; that regime is not
/// handled here and surfaces later as a degenerate projection.
pub fn order_corners(points: [Point<f32>; 4]) -> CornerSet {
    let sum = |p: &Point<f32>| p.x + p.y;
    let diff = |p: &Point<f32>| p.y - p.x;

    CornerSet {
        top_left: extreme(&points, sum, Extreme::Min),
        top_right: extreme(&points, diff, Extreme::Min),
        bottom_right: extreme(&points, sum, Extreme::Max),
        bottom_left: extreme(&points, diff, Extreme::Max),
    }
}

/// Convert integer contour corners and label them.
pub fn order_contour_corners(points: [Point<i32>; 4]) -> CornerSet {
    order_corners(points.map(|p| Point::new(p.x as f32, p.y as f32)))
}

#[derive(Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

fn extreme(points: &[Point<f32>; 4], key: impl Fn(&Point<f32>) -> f32, which: Extreme) -> Point<f32> {
    let mut best = points[0];
    let mut best_key = key(&best);
    for p in &points[1..] {
        let k = key(p);
        let better = match which {
            Extreme::Min => k < best_key,
            Extreme::Max => k > best_key,
        };
        if better {
            best = *p;
            best_key = k;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point<f32> {
        Point::new(x, y)
    }

    /// Every ordering of the four input points.
    fn permutations(points: [Point<f32>; 4]) -> Vec<[Point<f32>; 4]> {
        let mut out = Vec::new();
        for a in 0..4 {
            for b in 0..4 {
                for c in 0..4 {
                    for d in 0..4 {
                        let idx = [a, b, c, d];
                        let mut seen = [false; 4];
                        if idx.iter().all(|&i| !std::mem::replace(&mut seen[i], true)) {
                            out.push(idx.map(|i| points[i]));
                        }
                    }
                }
            }
        }
        out
    }

    #[test]
    fn labels_upright_rectangle() {
        let corners = order_corners([p(500.0, 20.0), p(10.0, 700.0), p(10.0, 20.0), p(500.0, 700.0)]);
        assert_eq!(corners.top_left, p(10.0, 20.0));
        assert_eq!(corners.top_right, p(500.0, 20.0));
        assert_eq!(corners.bottom_right, p(500.0, 700.0));
        assert_eq!(corners.bottom_left, p(10.0, 700.0));
    }

    #[test]
    fn labels_are_independent_of_input_order() {
        // A sheet photographed with a slight rotation and keystone.
        let sheet = [p(62.0, 41.0), p(238.0, 72.0), p(207.0, 251.0), p(28.0, 219.0)];
        let expected = order_corners(sheet);
        assert_eq!(expected.top_left, sheet[0]);
        assert_eq!(expected.top_right, sheet[1]);
        assert_eq!(expected.bottom_right, sheet[2]);
        assert_eq!(expected.bottom_left, sheet[3]);

        let all = permutations(sheet);
        assert_eq!(all.len(), 24);
        for perm in all {
            assert_eq!(order_corners(perm), expected, "input order {perm:?}");
        }
    }

    #[test]
    fn to_array_is_clockwise_from_top_left() {
        let corners = order_corners([p(0.0, 0.0), p(9.0, 0.0), p(9.0, 9.0), p(0.0, 9.5)]);
        assert_eq!(
            corners.to_array(),
            [(0.0, 0.0), (9.0, 0.0), (9.0, 9.0), (0.0, 9.5)]
        );
    }

    #[test]
    fn integer_contour_corners_convert() {
        let corners = order_contour_corners([
            Point::new(3, 4),
            Point::new(90, 2),
            Point::new(95, 120),
            Point::new(1, 118),
        ]);
        assert_eq!(corners.top_left, p(3.0, 4.0));
        assert_eq!(corners.bottom_left, p(1.0, 118.0));
    }
}
