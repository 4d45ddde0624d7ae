//! Arrow auto-routing between shape nodes.
//!
//! Routes connect a mount point on one node to a mount point on another with
//! an orthogonal L- or Z-shaped path. The mount pair is the one with minimum
//! Manhattan distance over all 4×4 combinations; ties resolve to the first
//! pair in (start index, end index) ascending scan order, so routing is a
//! pure, deterministic function of the two nodes' bounds.

use crate::geometry::{Point, Rect};

/// Selects the closest pair of mount points between two rectangles.
///
/// Returns `(start_index, end_index)` into the rectangles' mount-point
/// arrays. The scan updates the best candidate only on a strict improvement,
/// so equal-distance pairs resolve to the earliest in iteration order.
pub fn closest_mount_pair(start: Rect, end: Rect) -> (usize, usize) {
    let start_mounts = start.mount_points();
    let end_mounts = end.mount_points();

    let mut best = (0, 0);
    let mut best_distance = f64::INFINITY;
    for (si, sp) in start_mounts.iter().enumerate() {
        for (ei, ep) in end_mounts.iter().enumerate() {
            let distance = Point::manhattan_distance(*sp, *ep);
            if distance < best_distance {
                best = (si, ei);
                best_distance = distance;
            }
        }
    }
    best
}

/// Computes the orthogonal route between two node rectangles.
///
/// The route runs from the chosen start mount to the chosen end mount with
/// either one L bend (mount sides of different parity) or a Z jog through
/// the midline (same parity). Every segment is purely horizontal or
/// vertical by construction.
pub fn compute_route(start: Rect, end: Rect) -> Vec<Point> {
    let (start_index, end_index) = closest_mount_pair(start, end);
    let start_point = start.mount_points()[start_index];
    let end_point = end.mount_points()[end_index];

    let mut route = vec![start_point];
    if start_index % 2 == end_index % 2 {
        // Z-shaped jog between same-facing sides.
        if start_index == 0 || end_index == 0 {
            // A top mount is involved: bend at the horizontal midline.
            let mid_y = (start_point.y + end_point.y) / 2.0;
            route.push(Point::new(start_point.x, mid_y));
            route.push(Point::new(end_point.x, mid_y));
        } else {
            // Bend at the vertical midline.
            let mid_x = (start_point.x + end_point.x) / 2.0;
            route.push(Point::new(mid_x, start_point.y));
            route.push(Point::new(mid_x, end_point.y));
        }
    } else if start_index % 2 == 0 {
        // Vertical-facing start to horizontal-facing end: single L bend.
        route.push(Point::new(start_point.x, end_point.y));
    } else {
        // Horizontal-facing start to vertical-facing end.
        route.push(Point::new(end_point.x, start_point.y));
    }
    route.push(end_point);
    route
}

/// Whether a point lies within `threshold` of any segment of the route.
///
/// Segments are axis-aligned, so each check is a perpendicular band test:
/// within the segment's extent along its axis and within the threshold
/// across it.
pub fn route_contains(route: &[Point], point: Point, threshold: f64) -> bool {
    route.windows(2).any(|pair| {
        let (a, b) = (pair[0], pair[1]);
        if a.x == b.x {
            // Vertical segment.
            (point.x - a.x).abs() <= threshold
                && point.y >= a.y.min(b.y)
                && point.y <= a.y.max(b.y)
        } else {
            // Horizontal segment.
            (point.y - a.y).abs() <= threshold
                && point.x >= a.x.min(b.x)
                && point.x <= a.x.max(b.x)
        }
    })
}

/// A positioned end-cap glyph, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct CapGlyph {
    /// Glyph outline in logical coordinates, tip at the route's end point.
    pub points: Vec<Point>,
    /// Whether the outline forms a closed polygon (open polyline otherwise).
    pub closed: bool,
    /// Whether a closed outline is filled.
    pub filled: bool,
}

/// End-cap shapes in a local frame pointing along +x with the tip at the
/// origin, parameterized by glyph length and half-width.
fn cap_template(cap: crate::types::EndCapStyle, length: f64, half_width: f64) -> Option<CapGlyph> {
    use crate::types::EndCapStyle::*;
    match cap {
        None => Option::None,
        OpenArrow => Some(CapGlyph {
            points: vec![
                Point::new(-length, -half_width),
                Point::new(0.0, 0.0),
                Point::new(-length, half_width),
            ],
            closed: false,
            filled: false,
        }),
        Triangle => Some(CapGlyph {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(-length, -half_width),
                Point::new(-length, half_width),
            ],
            closed: true,
            filled: false,
        }),
        FilledDiamond | OutlineDiamond => Some(CapGlyph {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(-length / 2.0, -half_width),
                Point::new(-length, 0.0),
                Point::new(-length / 2.0, half_width),
            ],
            closed: true,
            filled: matches!(cap, FilledDiamond),
        }),
    }
}

/// Builds the end-cap glyph for a route, rotated to the final segment's
/// direction and translated to the end point.
///
/// Returns `None` for [`EndCapStyle::None`] or a route too short to have a
/// direction.
pub fn cap_glyph(
    cap: crate::types::EndCapStyle,
    route: &[Point],
    length: f64,
    half_width: f64,
) -> Option<CapGlyph> {
    if route.len() < 2 {
        return None;
    }
    let tip = route[route.len() - 1];
    let prev = route[route.len() - 2];
    let angle = (tip.y - prev.y).atan2(tip.x - prev.x);
    let (sin, cos) = angle.sin_cos();

    let mut glyph = cap_template(cap, length, half_width)?;
    for p in &mut glyph.points {
        let rotated = Point::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos);
        *p = rotated + tip;
    }
    Some(glyph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::types::EndCapStyle;

    fn rect(x: f64, y: f64) -> Rect {
        Rect::new(Point::new(x, y), Size::new(150.0, 70.0))
    }

    #[test]
    fn test_diagonal_nodes_pick_facing_sides() {
        // Greater horizontal than vertical separation: right-mid to left-mid.
        let a = rect(100.0, 100.0);
        let b = rect(400.0, 300.0);

        assert_eq!(closest_mount_pair(a, b), (1, 3));

        let route = compute_route(a, b);
        assert_eq!(route.first().copied(), Some(Point::new(250.0, 135.0)));
        assert_eq!(route.last().copied(), Some(Point::new(400.0, 335.0)));
        // Same-parity pair: one Z jog through the vertical midline.
        assert_eq!(route.len(), 4);
        assert_eq!(route[1], Point::new(325.0, 135.0));
        assert_eq!(route[2], Point::new(325.0, 335.0));
    }

    #[test]
    fn test_stacked_nodes_route_through_horizontal_midline() {
        let a = rect(0.0, 0.0);
        let b = rect(0.0, 400.0);

        // Bottom of a to top of b.
        assert_eq!(closest_mount_pair(a, b), (2, 0));

        let route = compute_route(a, b);
        assert_eq!(route.len(), 4);
        assert_eq!(route[0], Point::new(75.0, 70.0));
        assert_eq!(route[1], Point::new(75.0, 235.0));
        assert_eq!(route[2], Point::new(75.0, 235.0));
        assert_eq!(route[3], Point::new(75.0, 400.0));
    }

    #[test]
    fn test_adjacent_sides_make_single_l_bend() {
        // End well below and slightly right: bottom of a to left of b once
        // the horizontal gap is small.
        let a = rect(0.0, 0.0);
        let b = rect(120.0, 500.0);
        let (si, ei) = closest_mount_pair(a, b);
        assert_ne!(si % 2, ei % 2);

        let route = compute_route(a, b);
        assert_eq!(route.len(), 3);
        let start = route[0];
        let bend = route[1];
        let end = route[2];
        if si % 2 == 0 {
            assert_eq!(bend, Point::new(start.x, end.y));
        } else {
            assert_eq!(bend, Point::new(end.x, start.y));
        }
    }

    #[test]
    fn test_route_is_deterministic() {
        let a = rect(13.0, 97.0);
        let b = rect(512.0, 222.0);
        assert_eq!(compute_route(a, b), compute_route(a, b));
    }

    #[test]
    fn test_tie_break_prefers_first_pair_in_scan_order() {
        // Coincident rectangles: every pair has distance zero, so the first
        // scanned pair (top, top) must win.
        let a = rect(50.0, 50.0);
        assert_eq!(closest_mount_pair(a, a), (0, 0));
    }

    #[test]
    fn test_route_segments_are_axis_aligned() {
        let a = rect(10.0, 20.0);
        let b = rect(333.0, 444.0);
        let route = compute_route(a, b);
        for pair in route.windows(2) {
            assert!(pair[0].x == pair[1].x || pair[0].y == pair[1].y);
        }
    }

    #[test]
    fn test_route_contains_band() {
        let route = vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 200.0),
        ];

        assert!(route_contains(&route, Point::new(50.0, 30.0), 40.0));
        assert!(route_contains(&route, Point::new(80.0, 150.0), 40.0));
        assert!(!route_contains(&route, Point::new(50.0, 50.0), 40.0));
        // Beyond the segment's extent along its axis.
        assert!(!route_contains(&route, Point::new(150.0, 300.0), 40.0));
        assert!(!route_contains(&route, Point::new(-41.0, 0.0), 40.0));
    }

    #[test]
    fn test_cap_glyph_alignment() {
        // Final segment points in -y (upward); the triangle tip sits at the
        // end point and its base extends back down the segment.
        let route = vec![Point::new(100.0, 300.0), Point::new(100.0, 100.0)];
        let glyph = cap_glyph(EndCapStyle::Triangle, &route, 14.0, 7.0).unwrap();

        assert_eq!(glyph.points.len(), 3);
        assert!(glyph.closed && !glyph.filled);
        let tip = glyph.points[0];
        assert!((tip.x - 100.0).abs() < 1e-9 && (tip.y - 100.0).abs() < 1e-9);
        for base in &glyph.points[1..] {
            assert!(base.y > tip.y);
        }
    }

    #[test]
    fn test_cap_glyph_styles() {
        let route = vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)];

        assert!(cap_glyph(EndCapStyle::None, &route, 14.0, 7.0).is_none());

        let open = cap_glyph(EndCapStyle::OpenArrow, &route, 14.0, 7.0).unwrap();
        assert_eq!(open.points.len(), 3);
        assert!(!open.closed);

        let filled = cap_glyph(EndCapStyle::FilledDiamond, &route, 14.0, 7.0).unwrap();
        assert_eq!(filled.points.len(), 4);
        assert!(filled.closed && filled.filled);

        let outline = cap_glyph(EndCapStyle::OutlineDiamond, &route, 14.0, 7.0).unwrap();
        assert!(outline.closed && !outline.filled);

        // Too-short routes have no direction to align to.
        assert!(cap_glyph(EndCapStyle::Triangle, &[Point::default()], 14.0, 7.0).is_none());
    }
}
