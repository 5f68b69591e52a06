//! Farm plot models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry;
use crate::models::Analysis;
use crate::types::GeoPoint;

/// A user-drawn field boundary with its agronomic metadata.
///
/// Names are chosen by the user and are not guaranteed to be unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plot {
    pub id: Uuid,
    pub name: String,
    pub crop_type: CropType,
    pub soil_type: SoilType,
    pub irrigation: IrrigationMethod,
    #[serde(default)]
    pub notes: String,
    /// Average temperature in °C
    pub temperature: f64,
    /// Annual rainfall in mm
    pub rainfall: f64,
    /// Open ring; the closing edge back to the first point is implied
    pub boundary: Vec<GeoPoint>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
}

/// Form input for a new plot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotDraft {
    pub name: String,
    pub crop_type: CropType,
    pub soil_type: SoilType,
    pub irrigation: IrrigationMethod,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_rainfall")]
    pub rainfall: f64,
    pub boundary: Vec<GeoPoint>,
}

fn default_temperature() -> f64 {
    25.0
}

fn default_rainfall() -> f64 {
    500.0
}

impl PlotDraft {
    /// Build the stored plot, normalising the boundary to an open ring
    pub fn into_plot(self, id: Uuid, created_at: DateTime<Utc>) -> Plot {
        Plot {
            id,
            name: self.name.trim().to_string(),
            crop_type: self.crop_type,
            soil_type: self.soil_type,
            irrigation: self.irrigation,
            notes: self.notes,
            temperature: self.temperature,
            rainfall: self.rainfall,
            boundary: geometry::open_ring(&self.boundary),
            created_at,
            analysis: None,
        }
    }
}

impl Plot {
    pub fn area_hectares(&self) -> f64 {
        geometry::area_hectares(&self.boundary)
    }

    pub fn centroid(&self) -> Option<GeoPoint> {
        geometry::centroid(&self.boundary)
    }
}

/// Crops offered by the plot form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CropType {
    Rice,
    Wheat,
    Corn,
    Sugarcane,
    Cotton,
    Soybeans,
}

/// Soil classes offered by the plot form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SoilType {
    Clay,
    Sandy,
    Loamy,
    Silt,
}

/// Irrigation methods offered by the plot form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IrrigationMethod {
    Drip,
    Sprinkler,
    Flood,
    Rainfed,
}

impl std::fmt::Display for CropType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CropType::Rice => write!(f, "Rice"),
            CropType::Wheat => write!(f, "Wheat"),
            CropType::Corn => write!(f, "Corn"),
            CropType::Sugarcane => write!(f, "Sugarcane"),
            CropType::Cotton => write!(f, "Cotton"),
            CropType::Soybeans => write!(f, "Soybeans"),
        }
    }
}

impl std::fmt::Display for SoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoilType::Clay => write!(f, "Clay"),
            SoilType::Sandy => write!(f, "Sandy"),
            SoilType::Loamy => write!(f, "Loamy"),
            SoilType::Silt => write!(f, "Silt"),
        }
    }
}

impl std::fmt::Display for IrrigationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IrrigationMethod::Drip => write!(f, "Drip Irrigation"),
            IrrigationMethod::Sprinkler => write!(f, "Sprinkler"),
            IrrigationMethod::Flood => write!(f, "Flood Irrigation"),
            IrrigationMethod::Rainfed => write!(f, "Rain-fed"),
        }
    }
}
