//! Plot geometry helpers
//!
//! All computations work directly on latitude/longitude degrees. The area
//! conversion treats one degree as 111 km on both axes, which is a planar
//! approximation: it ignores the shrinking of longitude degrees away from
//! the equator and is only meaningful for small plots.

use serde::{Deserialize, Serialize};

use crate::types::GeoPoint;

/// Metres per degree used by the planar area approximation
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Upper bound applied to computed plot areas to absorb degenerate drawings
pub const MAX_PLOT_AREA_HECTARES: f64 = 1000.0;

const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Arithmetic mean of the distinct ring points, `None` for an empty boundary.
///
/// A duplicated closing point is counted once.
pub fn centroid(boundary: &[GeoPoint]) -> Option<GeoPoint> {
    let ring = open_ring(boundary);
    if ring.is_empty() {
        return None;
    }
    let n = ring.len() as f64;
    let (lat, lng) = ring
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.latitude, lng + p.longitude));
    Some(GeoPoint::new(lat / n, lng / n))
}

/// Shoelace area of the ring in square degrees. The ring is closed implicitly.
pub fn area_square_degrees(boundary: &[GeoPoint]) -> f64 {
    if boundary.len() < 3 {
        return 0.0;
    }
    let sum: f64 = boundary
        .iter()
        .zip(boundary.iter().cycle().skip(1))
        .map(|(a, b)| a.latitude * b.longitude - b.latitude * a.longitude)
        .sum();
    sum.abs() / 2.0
}

/// Approximate plot area in hectares, capped at [`MAX_PLOT_AREA_HECTARES`].
///
/// Fewer than three points yield 0.
pub fn area_hectares(boundary: &[GeoPoint]) -> f64 {
    let hectares = area_square_degrees(boundary) * METERS_PER_DEGREE * METERS_PER_DEGREE
        / SQUARE_METERS_PER_HECTARE;
    hectares.min(MAX_PLOT_AREA_HECTARES)
}

/// Drop a duplicated closing point so the ring is stored open
pub fn open_ring(points: &[GeoPoint]) -> Vec<GeoPoint> {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 && first == last => {
            points[..points.len() - 1].to_vec()
        }
        _ => points.to_vec(),
    }
}

/// Ring with the first point repeated at the end, as GeoJSON requires
pub fn closed_ring(points: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut ring = open_ring(points);
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}

/// Axis-aligned bounding box of a boundary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    pub fn of(boundary: &[GeoPoint]) -> Option<Self> {
        let first = boundary.first()?;
        let init = Bounds {
            north: first.latitude,
            south: first.latitude,
            east: first.longitude,
            west: first.longitude,
        };
        Some(boundary.iter().skip(1).fold(init, |b, p| Bounds {
            north: b.north.max(p.latitude),
            south: b.south.min(p.latitude),
            east: b.east.max(p.longitude),
            west: b.west.min(p.longitude),
        }))
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new((self.north + self.south) / 2.0, (self.east + self.west) / 2.0)
    }

    /// Larger of the latitude and longitude spans, in degrees
    pub fn max_span(&self) -> f64 {
        (self.north - self.south).max(self.east - self.west)
    }
}

/// Map zoom level that keeps a plot of the given extent in view
pub fn suggested_zoom(bounds: &Bounds) -> u8 {
    let span = bounds.max_span();
    if span > 0.05 {
        14
    } else if span > 0.02 {
        15
    } else if span > 0.01 {
        16
    } else {
        18
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64) -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(20.0, 85.0),
            GeoPoint::new(20.0, 85.0 + side),
            GeoPoint::new(20.0 + side, 85.0 + side),
            GeoPoint::new(20.0 + side, 85.0),
        ]
    }

    #[test]
    fn test_centroid_empty_and_single() {
        assert_eq!(centroid(&[]), None);
        let p = GeoPoint::new(20.2961, 85.8245);
        assert_eq!(centroid(&[p]), Some(p));
    }

    #[test]
    fn test_centroid_ignores_closing_point() {
        let open = square(0.02);
        let closed = closed_ring(&open);
        assert_eq!(centroid(&closed), centroid(&open));
    }

    #[test]
    fn test_centroid_of_square() {
        let c = centroid(&square(0.02)).unwrap();
        assert!((c.latitude - 20.01).abs() < 1e-9);
        assert!((c.longitude - 85.01).abs() < 1e-9);
    }

    #[test]
    fn test_area_of_small_square() {
        // 0.001° x 0.001° => 1e-6 deg² => 1.2321 ha
        let area = area_hectares(&square(0.001));
        assert!((area - 1.2321).abs() < 1e-4);
    }

    #[test]
    fn test_area_orientation_does_not_matter() {
        let mut ring = square(0.003);
        let forward = area_hectares(&ring);
        ring.reverse();
        assert!((forward - area_hectares(&ring)).abs() < 1e-4);
    }

    #[test]
    fn test_area_is_capped() {
        assert_eq!(area_hectares(&square(1.0)), MAX_PLOT_AREA_HECTARES);
    }

    #[test]
    fn test_area_degenerate() {
        assert_eq!(area_hectares(&square(0.01)[..2]), 0.0);
    }

    #[test]
    fn test_ring_helpers() {
        let ring = square(0.01);
        let closed = closed_ring(&ring);
        assert_eq!(closed.len(), 5);
        assert_eq!(closed.first(), closed.last());
        assert_eq!(open_ring(&closed), ring);
        assert_eq!(closed_ring(&closed).len(), 5);
        assert!(closed_ring(&[]).is_empty());
    }

    #[test]
    fn test_bounds_and_zoom() {
        let bounds = Bounds::of(&square(0.015)).unwrap();
        assert_eq!(bounds.south, 20.0);
        assert!((bounds.north - 20.015).abs() < 1e-9);
        assert_eq!(suggested_zoom(&bounds), 16);
        assert_eq!(suggested_zoom(&Bounds::of(&square(0.005)).unwrap()), 18);
        assert_eq!(suggested_zoom(&Bounds::of(&square(0.03)).unwrap()), 15);
        assert_eq!(suggested_zoom(&Bounds::of(&square(0.2)).unwrap()), 14);
        assert!(Bounds::of(&[]).is_none());
    }

    proptest::proptest! {
        #[test]
        fn prop_zoom_never_increases_with_span(a in 0.0f64..0.2, b in 0.0f64..0.2) {
            let (small, large) = if a <= b { (a, b) } else { (b, a) };
            let zoom_small = suggested_zoom(&Bounds::of(&square(small)).unwrap());
            let zoom_large = suggested_zoom(&Bounds::of(&square(large)).unwrap());
            proptest::prop_assert!(zoom_large <= zoom_small);
        }
    }
}
