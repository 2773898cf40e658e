//! Area engine for display-space shapes.
//!
//! All inputs are display coordinates. Results keep the sign produced by the
//! winding of the input; callers that need a magnitude take `abs()` themselves.

use super::{DisplayCoord, round2};

/// Trapezoid accumulation over a closed ring.
///
/// Only the edges ending at `ring[1..len - 1]` are summed: the last edge of the
/// closed ring (back onto the appended first vertex) never contributes. Map
/// figures depend on this, so it is kept.
pub fn polygon_area(ring: &[DisplayCoord]) -> f64 {
    let mut area = 0.0;
    for i in 1..ring.len().saturating_sub(1) {
        area += (ring[i - 1].lng + ring[i].lng) * (ring[i - 1].lat - ring[i].lat);
    }
    area / 2.0
}

/// Area of an open ring: a copy is closed by re-appending its first vertex.
pub fn ring_area(ring: &[DisplayCoord]) -> f64 {
    let Some(first) = ring.first() else {
        return 0.0;
    };
    let mut closed = Vec::with_capacity(ring.len() + 1);
    closed.extend_from_slice(ring);
    closed.push(*first);
    polygon_area(&closed)
}

/// Outer ring area minus the cutout ring area.
pub fn area(ring: &[DisplayCoord], cutout: Option<&[DisplayCoord]>) -> f64 {
    ring_area(ring) - cutout.map(ring_area).unwrap_or(0.0)
}

/// Signed area spanned by two opposite corners.
pub fn rectangle_area(corner1: DisplayCoord, corner2: DisplayCoord) -> f64 {
    (corner1.lat - corner2.lat) * (corner1.lng - corner2.lng)
}

/// Share of the world surface in percent, rounded to two decimals.
///
/// A zero or non-finite world surface yields `0.0`.
pub fn percentage(area: f64, world_size_x: f64, world_size_z: f64) -> f64 {
    let surface = world_size_x * world_size_z;
    if surface == 0.0 || !surface.is_finite() {
        return 0.0;
    }
    round2(100.0 * area / surface)
}

#[cfg(test)]
mod tests {
    use super::{area, percentage, polygon_area, rectangle_area, ring_area};
    use crate::math::DisplayCoord;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn ring(points: &[(f64, f64)]) -> Vec<DisplayCoord> {
        points
            .iter()
            .map(|&(lat, lng)| DisplayCoord::new(lat, lng))
            .collect()
    }

    #[test]
    fn unit_square_has_unit_magnitude() {
        let closed = ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);
        assert_close(polygon_area(&closed).abs(), 1.0, 1e-12);

        let open = ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        assert_close(ring_area(&open).abs(), 1.0, 1e-12);
    }

    #[test]
    fn closing_edge_is_not_summed() {
        // Unit square away from the origin: the skipped edge (2,1)->(1,1) carries weight.
        let open = ring(&[(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (2.0, 1.0)]);
        assert_close(ring_area(&open), -2.0, 1e-12);

        // Game triangle (0,0) (4,0) (4,4) at scale 1.
        let triangle = ring(&[(0.0, 0.0), (0.0, 4.0), (-4.0, 4.0)]);
        assert_close(ring_area(&triangle), 16.0, 1e-12);

        let mut closed = triangle.clone();
        closed.push(triangle[0]);
        assert_close(polygon_area(&closed), 16.0, 1e-12);
        assert_eq!(polygon_area(&closed[..2]), 0.0);
    }

    #[test]
    fn sign_follows_winding() {
        let cw = ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        let mut ccw = cw.clone();
        ccw.reverse();
        assert_close(ring_area(&cw), -ring_area(&ccw), 1e-12);
    }

    #[test]
    fn cutout_is_subtracted() {
        let outer = ring(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)]);
        let hole = ring(&[(0.0, 0.0), (0.0, 1.0), (2.0, 1.0), (2.0, 0.0)]);
        let full = ring_area(&outer);
        let cut = area(&outer, Some(&hole));
        assert_close(cut.abs(), full.abs() / 2.0, 1e-12);
        assert_close(area(&outer, None), full, 1e-12);
    }

    #[test]
    fn degenerate_rings_have_no_area() {
        assert_eq!(ring_area(&[]), 0.0);
        assert_eq!(ring_area(&ring(&[(3.0, 4.0)])), 0.0);
        assert_eq!(area(&[], Some(&[])), 0.0);
    }

    #[test]
    fn rectangle_area_from_corners() {
        let a = DisplayCoord::new(0.0, 0.0);
        let b = DisplayCoord::new(-10.0, 5.0);
        assert_close(rectangle_area(a, b), -50.0, 1e-12);
        assert_close(rectangle_area(b, a), -50.0, 1e-12);
        assert_close(
            rectangle_area(DisplayCoord::new(10.0, 10.0), DisplayCoord::new(0.0, 0.0)),
            100.0,
            1e-12,
        );
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(percentage(5_000.0, 100.0, 100.0), 50.0);
        assert_eq!(percentage(1.0, 30.0, 30.0), 0.11);
        assert_eq!(percentage(14_400.0, 12_000.0, 12_000.0), 0.01);
        assert_eq!(percentage(10.0, 0.0, 100.0), 0.0);
    }
}
