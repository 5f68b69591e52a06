//! Tests for plot geometry
//! Verifies area, centroid and ring handling on drawn boundaries

use proptest::prelude::*;
use shared::geometry::{
    area_hectares, area_square_degrees, centroid, closed_ring, open_ring, Bounds,
    MAX_PLOT_AREA_HECTARES, METERS_PER_DEGREE,
};
use shared::GeoPoint;

// =============================================================================
// Property Test Strategies
// =============================================================================

fn point_strategy() -> impl Strategy<Value = GeoPoint> {
    (-60.0f64..60.0, -170.0f64..170.0).prop_map(|(lat, lng)| GeoPoint::new(lat, lng))
}

fn rectangle(lat: f64, lng: f64, height: f64, width: f64) -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(lat, lng),
        GeoPoint::new(lat, lng + width),
        GeoPoint::new(lat + height, lng + width),
        GeoPoint::new(lat + height, lng),
    ]
}

fn expected_hectares(height: f64, width: f64) -> f64 {
    (height * width * METERS_PER_DEGREE * METERS_PER_DEGREE / 10_000.0).min(MAX_PLOT_AREA_HECTARES)
}

// =============================================================================
// Area Properties
// =============================================================================

proptest! {
    /// Fewer than three points never enclose an area
    #[test]
    fn area_of_degenerate_boundary_is_zero(points in prop::collection::vec(point_strategy(), 0..3)) {
        prop_assert_eq!(area_hectares(&points), 0.0);
    }

    /// Axis-aligned rectangles match width x height
    #[test]
    fn rectangle_area_matches_formula(
        lat in -45.0f64..45.0,
        lng in -120.0f64..120.0,
        height in 0.0005f64..0.02,
        width in 0.0005f64..0.02,
    ) {
        let area = area_hectares(&rectangle(lat, lng, height, width));
        let expected = expected_hectares(height, width);
        prop_assert!((area - expected).abs() <= expected * 1e-6 + 1e-3,
            "area {} vs expected {}", area, expected);
    }

    /// Areas are never negative and never exceed the cap
    #[test]
    fn area_is_bounded(points in prop::collection::vec(point_strategy(), 3..12)) {
        let area = area_hectares(&points);
        prop_assert!(area >= 0.0);
        prop_assert!(area <= MAX_PLOT_AREA_HECTARES);
    }

    /// Walking the ring backwards gives the same area
    #[test]
    fn area_ignores_orientation(points in prop::collection::vec(point_strategy(), 3..12)) {
        let forward = area_square_degrees(&points);
        let mut reversed = points.clone();
        reversed.reverse();
        prop_assert!((forward - area_square_degrees(&reversed)).abs() <= forward.abs() * 1e-9 + 1e-6);
    }

    /// A duplicated closing point does not change the area
    #[test]
    fn closing_point_does_not_change_area(points in prop::collection::vec(point_strategy(), 3..12)) {
        let open = area_square_degrees(&points);
        let closed = area_square_degrees(&closed_ring(&points));
        prop_assert!((open - closed).abs() <= open.abs() * 1e-9 + 1e-6);
    }
}

// =============================================================================
// Centroid Properties
// =============================================================================

proptest! {
    #[test]
    fn centroid_of_single_point_is_that_point(p in point_strategy()) {
        prop_assert_eq!(centroid(&[p]), Some(p));
    }

    /// Closing the ring explicitly does not move the centroid
    #[test]
    fn closing_point_does_not_change_centroid(points in prop::collection::vec(point_strategy(), 3..12)) {
        prop_assume!(points.first() != points.last());
        prop_assert_eq!(centroid(&closed_ring(&points)), centroid(&points));
    }

    /// The centroid lies inside the bounding box
    #[test]
    fn centroid_within_bounds(points in prop::collection::vec(point_strategy(), 1..20)) {
        let c = centroid(&points).unwrap();
        let b = Bounds::of(&points).unwrap();
        prop_assert!(c.latitude >= b.south - 1e-9 && c.latitude <= b.north + 1e-9);
        prop_assert!(c.longitude >= b.west - 1e-9 && c.longitude <= b.east + 1e-9);
    }

    /// Closing then opening a ring returns the original points
    #[test]
    fn ring_normalisation_round_trip(points in prop::collection::vec(point_strategy(), 3..12)) {
        prop_assert_eq!(open_ring(&closed_ring(&points)), points);
    }
}

#[test]
fn centroid_of_empty_boundary_is_none() {
    assert_eq!(centroid(&[]), None);
}

#[test]
fn one_hectare_square() {
    // 100 m x 100 m at 111 km per degree
    let side = 100.0 / METERS_PER_DEGREE;
    let area = area_hectares(&rectangle(20.0, 85.0, side, side));
    assert!((area - 1.0).abs() < 1e-4);
}
