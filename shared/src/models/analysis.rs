//! Crop analysis models produced by the CNN+LSTM inference service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One inference result for one plot at one point in time.
///
/// Percentages are clamped when the record is built from a service
/// response (see [`Analysis::clamped`]); a stored record is never modified,
/// only replaced by a newer one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Analysis {
    /// Spatial crop health, 0-100
    pub crop_health: f64,
    /// Temporal water stress, 0-100
    pub water_stress: f64,
    pub pest_risk: PestRisk,
    /// Confidence of the pest classification, 0-1
    pub pest_confidence: f64,
    /// Predicted share of the expected yield, 0-100
    pub yield_prediction: f64,
    #[serde(default)]
    pub model_type: String,
    pub architecture: ModelArchitecture,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub processed_at: DateTime<Utc>,
}

/// Pest risk category reported by the CNN branch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PestRisk {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for PestRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PestRisk::Low => write!(f, "low"),
            PestRisk::Medium => write!(f, "medium"),
            PestRisk::High => write!(f, "high"),
        }
    }
}

/// Informational description of the model that produced an analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ModelArchitecture {
    #[serde(default)]
    pub cnn_features: String,
    #[serde(default)]
    pub lstm_features: String,
    #[serde(default)]
    pub fusion_method: String,
    #[serde(default)]
    pub total_parameters: u64,
}

/// Colour band used when painting a plot by crop health
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Healthy,
    Watch,
    Poor,
}

impl HealthBand {
    pub fn from_health(crop_health: f64) -> Self {
        if crop_health > 80.0 {
            HealthBand::Healthy
        } else if crop_health > 60.0 {
            HealthBand::Watch
        } else {
            HealthBand::Poor
        }
    }

    /// Hex colour used by the map overlay
    pub fn color(&self) -> &'static str {
        match self {
            HealthBand::Healthy => "#4CAF50",
            HealthBand::Watch => "#FF9800",
            HealthBand::Poor => "#F44336",
        }
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

impl Analysis {
    /// Clamp every bounded field into its documented range.
    ///
    /// Non-finite values collapse to 0.
    pub fn clamped(mut self) -> Self {
        self.crop_health = clamp_percent(self.crop_health);
        self.water_stress = clamp_percent(self.water_stress);
        self.yield_prediction = clamp_percent(self.yield_prediction);
        self.pest_confidence = if self.pest_confidence.is_finite() {
            self.pest_confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    /// Soil moisture proxy shown on the dashboard, floored at 0
    pub fn moisture(&self) -> f64 {
        (100.0 - self.water_stress).max(0.0)
    }

    pub fn health_band(&self) -> HealthBand {
        HealthBand::from_health(self.crop_health)
    }
}
