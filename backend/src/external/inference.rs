//! CNN+LSTM Field Analysis Client
//!
//! Client for the hosted crop analysis service. One request per analysis,
//! sent to `{endpoint}/analyze/field` with the plot centroid and climate
//! inputs. There is no retry.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use shared::{geometry, Analysis, GeoPoint, ModelArchitecture, PestRisk};

use crate::config::InferenceConfig;
use crate::error::{AppError, AppResult};

/// Request body of `POST /analyze/field`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldAnalysisRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
    pub rainfall: f64,
}

#[derive(Debug, Deserialize)]
struct FieldAnalysisResponse {
    analysis: WireAnalysis,
}

/// Analysis as the service sends it
#[derive(Debug, Deserialize)]
struct WireAnalysis {
    crop_health: f64,
    water_stress: f64,
    pest_risk: PestRisk,
    #[serde(default)]
    pest_confidence: f64,
    yield_prediction: f64,
    #[serde(default)]
    model_type: String,
    #[serde(default)]
    architecture: ModelArchitecture,
    #[serde(default)]
    recommendations: Vec<String>,
    #[serde(default)]
    processing_date: Option<String>,
}

impl WireAnalysis {
    fn into_analysis(self, received_at: DateTime<Utc>) -> Analysis {
        Analysis {
            crop_health: self.crop_health,
            water_stress: self.water_stress,
            pest_risk: self.pest_risk,
            pest_confidence: self.pest_confidence,
            yield_prediction: self.yield_prediction,
            model_type: self.model_type,
            architecture: self.architecture,
            recommendations: self.recommendations,
            processed_at: parse_processing_date(self.processing_date.as_deref(), received_at),
        }
        .clamped()
    }
}

/// RFC 3339 first, then a naive timestamp read as UTC, else the receive time
pub fn parse_processing_date(raw: Option<&str>, received_at: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return received_at;
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc);
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .unwrap_or(received_at)
}

/// Turn a raw service response into an [`Analysis`]
pub fn decode_response(status: StatusCode, body: &str, received_at: DateTime<Utc>) -> AppResult<Analysis> {
    if !status.is_success() {
        return Err(AppError::InferenceError(format!("API Error: {}", status.as_u16())));
    }

    let parsed: FieldAnalysisResponse = serde_json::from_str(body)
        .map_err(|e| AppError::InferenceError(format!("Failed to parse response: {}", e)))?;

    Ok(parsed.analysis.into_analysis(received_at))
}

/// Anything that can analyse a field at a point
#[axum::async_trait]
pub trait FieldAnalyzer: Send + Sync {
    async fn analyze_field(&self, request: &FieldAnalysisRequest) -> AppResult<Analysis>;
}

/// Analyse a drawn boundary at its centroid.
///
/// An empty boundary is rejected before any request is made.
pub async fn request_analysis<A>(
    analyzer: &A,
    boundary: &[GeoPoint],
    temperature: f64,
    rainfall: f64,
) -> AppResult<Analysis>
where
    A: FieldAnalyzer + ?Sized,
{
    let center = geometry::centroid(boundary)
        .ok_or_else(|| AppError::validation("boundary", "Draw a plot boundary before analysis"))?;

    let request = FieldAnalysisRequest {
        latitude: center.latitude,
        longitude: center.longitude,
        temperature,
        rainfall,
    };

    tracing::info!(
        latitude = center.latitude,
        longitude = center.longitude,
        "Requesting field analysis"
    );

    analyzer.analyze_field(&request).await.map_err(|e| {
        tracing::warn!(
            latitude = center.latitude,
            longitude = center.longitude,
            "Field analysis failed: {}",
            e
        );
        e
    })
}

/// HTTP client for the hosted inference service
#[derive(Clone)]
pub struct InferenceClient {
    endpoint: String,
    timeout: Duration,
    http_client: Client,
}

impl InferenceClient {
    pub fn new(http_client: Client, config: &InferenceConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            http_client,
        }
    }
}

#[axum::async_trait]
impl FieldAnalyzer for InferenceClient {
    async fn analyze_field(&self, request: &FieldAnalysisRequest) -> AppResult<Analysis> {
        let url = format!("{}/analyze/field", self.endpoint);

        let response = self
            .http_client
            .post(&url)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::InferenceError(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::InferenceError(format!("Failed to read response: {}", e)))?;

        decode_response(status, &body, Utc::now())
    }
}
