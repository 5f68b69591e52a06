//! GeoJSON export of plot boundaries
//!
//! Coordinates are written `[longitude, latitude]` and every polygon ring is
//! explicitly closed by repeating its first point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry;
use crate::models::{Analysis, CropType, Plot};
use crate::types::GeoPoint;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum FeatureCollection {
    FeatureCollection { features: Vec<Feature> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    pub properties: PlotProperties,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FeatureKind {
    Feature,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Polygon(Vec<Vec<[f64; 2]>>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlotProperties {
    pub plot_name: String,
    pub crop_type: CropType,
    #[serde(default)]
    pub analysis: Option<Analysis>,
    pub exported_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq)]
pub enum GeoJsonError {
    #[error("Polygon has no exterior ring")]
    MissingRing,
    #[error("Polygon ring is not closed")]
    OpenRing,
    #[error("A polygon needs at least 3 distinct points, got {0}")]
    TooFewPoints(usize),
}

impl FeatureCollection {
    pub fn features(&self) -> &[Feature] {
        match self {
            FeatureCollection::FeatureCollection { features } => features,
        }
    }
}

impl Geometry {
    /// Exterior ring as map points, including the closing point
    pub fn exterior_ring(&self) -> Result<Vec<GeoPoint>, GeoJsonError> {
        let Geometry::Polygon(rings) = self;
        let ring = rings.first().ok_or(GeoJsonError::MissingRing)?;
        if ring.first() != ring.last() {
            return Err(GeoJsonError::OpenRing);
        }
        Ok(ring.iter().map(|[lng, lat]| GeoPoint::new(*lat, *lng)).collect())
    }

    /// Boundary as stored on a plot: the exterior ring without its closing point
    pub fn boundary(&self) -> Result<Vec<GeoPoint>, GeoJsonError> {
        let boundary = geometry::open_ring(&self.exterior_ring()?);
        if boundary.len() < 3 {
            return Err(GeoJsonError::TooFewPoints(boundary.len()));
        }
        Ok(boundary)
    }
}

/// One feature for a plot, or an error when the boundary cannot form a polygon
pub fn plot_feature(plot: &Plot, exported_at: DateTime<Utc>) -> Result<Feature, GeoJsonError> {
    let open = geometry::open_ring(&plot.boundary);
    if open.len() < 3 {
        return Err(GeoJsonError::TooFewPoints(open.len()));
    }
    let ring = geometry::closed_ring(&open)
        .iter()
        .map(|p| [p.longitude, p.latitude])
        .collect();

    Ok(Feature {
        kind: FeatureKind::Feature,
        properties: PlotProperties {
            plot_name: plot.name.clone(),
            crop_type: plot.crop_type,
            analysis: plot.analysis.clone(),
            exported_at,
        },
        geometry: Geometry::Polygon(vec![ring]),
    })
}

/// Collection of every plot that has a drawable boundary
pub fn export_plots(plots: &[Plot], exported_at: DateTime<Utc>) -> FeatureCollection {
    let features = plots
        .iter()
        .filter_map(|plot| plot_feature(plot, exported_at).ok())
        .collect();
    FeatureCollection::FeatureCollection { features }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IrrigationMethod, SoilType};
    use uuid::Uuid;

    fn plot(name: &str, boundary: Vec<GeoPoint>) -> Plot {
        Plot {
            id: Uuid::nil(),
            name: name.to_string(),
            crop_type: CropType::Rice,
            soil_type: SoilType::Clay,
            irrigation: IrrigationMethod::Flood,
            notes: String::new(),
            temperature: 28.0,
            rainfall: 1400.0,
            boundary,
            created_at: Utc::now(),
            analysis: None,
        }
    }

    fn triangle() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(20.29, 85.82),
            GeoPoint::new(20.30, 85.83),
            GeoPoint::new(20.28, 85.84),
        ]
    }

    #[test]
    fn test_feature_json_layout() {
        let fc = export_plots(&[plot("Paddy", triangle())], Utc::now());
        let json = serde_json::to_value(&fc).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["type"], "Feature");
        assert_eq!(json["features"][0]["geometry"]["type"], "Polygon");
        let ring = &json["features"][0]["geometry"]["coordinates"][0];
        assert_eq!(ring.as_array().unwrap().len(), 4);
        assert_eq!(ring[0][0], 85.82);
        assert_eq!(ring[0][1], 20.29);
        assert_eq!(ring[0], ring[3]);
    }

    #[test]
    fn test_round_trip_through_json() {
        let fc = export_plots(&[plot("Paddy", triangle())], Utc::now());
        let text = serde_json::to_string(&fc).unwrap();
        let parsed: FeatureCollection = serde_json::from_str(&text).unwrap();
        let ring = parsed.features()[0].geometry.exterior_ring().unwrap();
        let mut expected = triangle();
        expected.push(expected[0]);
        assert_eq!(ring, expected);
        assert_eq!(parsed.features()[0].geometry.boundary().unwrap(), triangle());
    }

    #[test]
    fn test_plots_without_polygon_are_skipped() {
        let fc = export_plots(
            &[plot("Empty", vec![]), plot("Paddy", triangle())],
            Utc::now(),
        );
        assert_eq!(fc.features().len(), 1);
        assert_eq!(fc.features()[0].properties.plot_name, "Paddy");
        assert_eq!(
            plot_feature(&plot("Line", triangle()[..2].to_vec()), Utc::now()),
            Err(GeoJsonError::TooFewPoints(2))
        );
    }

    #[test]
    fn test_open_ring_is_rejected_on_parse() {
        let geometry = Geometry::Polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]]);
        assert_eq!(geometry.exterior_ring(), Err(GeoJsonError::OpenRing));
    }
}
