//! WebAssembly module for the AgriLens client
//!
//! Provides client-side computation for:
//! - Plot area and centroid while drawing
//! - Dashboard metrics and the CHI trend chart
//! - NDVI raster rendering
//! - GeoJSON export and offline form validation

use chrono::Utc;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::dashboard::{self, TrendSeries};
use shared::{chart, geojson, geometry, Analysis, GeoPoint, Plot};

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("agrilens-wasm ready"));
}

fn js_error(what: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("Invalid {}: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_error("output", e))
}

fn parse_boundary(boundary_json: &str) -> Result<Vec<GeoPoint>, JsValue> {
    serde_json::from_str(boundary_json).map_err(|e| js_error("boundary JSON", e))
}

/// `null` or an empty string means "no analysis yet"
fn parse_analysis(analysis_json: &str) -> Result<Option<Analysis>, JsValue> {
    if analysis_json.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(analysis_json).map_err(|e| js_error("analysis JSON", e))
}

/// Seeded from the browser's Math.random; not cryptographic
fn browser_rng() -> SmallRng {
    SmallRng::seed_from_u64((js_sys::Math::random() * u64::MAX as f64) as u64)
}

/// Area in hectares of a boundary given as `[{lat, lng}, ...]`
#[wasm_bindgen]
pub fn plot_area_hectares(boundary_json: &str) -> Result<f64, JsValue> {
    Ok(geometry::area_hectares(&parse_boundary(boundary_json)?))
}

/// Centroid as `{latitude, longitude}`, or `null` for an empty boundary
#[wasm_bindgen]
pub fn plot_centroid(boundary_json: &str) -> Result<String, JsValue> {
    to_json(&geometry::centroid(&parse_boundary(boundary_json)?))
}

fn dashboard_json(analysis: Option<&Analysis>, rng: &mut SmallRng) -> Result<String, JsValue> {
    to_json(&dashboard::derive(analysis, rng))
}

/// KPIs, trend and risks for the selected plot's analysis
#[wasm_bindgen]
pub fn dashboard_metrics(analysis_json: &str) -> Result<String, JsValue> {
    let analysis = parse_analysis(analysis_json)?;
    dashboard_json(analysis.as_ref(), &mut browser_rng())
}

/// SVG for a trend series previously returned by `dashboard_metrics`
#[wasm_bindgen]
pub fn trend_chart_svg(trend_json: &str, crop_health: f64) -> Result<String, JsValue> {
    let series: TrendSeries =
        serde_json::from_str(trend_json).map_err(|e| js_error("trend JSON", e))?;
    Ok(chart::render_trend_svg(&series, crop_health))
}

/// RGBA bytes for an NDVI canvas of the given size
#[wasm_bindgen]
pub fn ndvi_rgba(analysis_json: &str, width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    let analysis = parse_analysis(analysis_json)?;
    Ok(chart::ndvi_rgba(analysis.as_ref(), width, height, &mut browser_rng()))
}

/// FeatureCollection for every saved plot with a drawable boundary
#[wasm_bindgen]
pub fn export_geojson(plots_json: &str) -> Result<String, JsValue> {
    let plots: Vec<Plot> =
        serde_json::from_str(plots_json).map_err(|e| js_error("plots JSON", e))?;
    to_json(&geojson::export_plots(&plots, Utc::now()))
}

/// Returns `null` when the form is valid, otherwise `{field, message}`
#[wasm_bindgen]
pub fn validate_signup_fields(
    name: &str,
    email_or_phone: &str,
    password: &str,
    confirm_password: &str,
) -> Result<String, JsValue> {
    let error = validate_signup_form(name, email_or_phone, password, confirm_password)
        .err()
        .map(|e| serde_json::json!({ "field": e.field, "message": e.message }));
    to_json(&error)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"[
        {"lat": 20.0, "lng": 85.0},
        {"lat": 20.0, "lng": 85.001},
        {"lat": 20.001, "lng": 85.001},
        {"lat": 20.001, "lng": 85.0}
    ]"#;

    #[test]
    fn test_plot_area_and_centroid() {
        let area = plot_area_hectares(SQUARE).unwrap();
        assert!(area > 1.0 && area < 1.5);

        let centroid: GeoPoint = serde_json::from_str(&plot_centroid(SQUARE).unwrap()).unwrap();
        assert!((centroid.latitude - 20.0005).abs() < 1e-9);
        assert_eq!(plot_centroid("[]").unwrap(), "null");
    }

    #[test]
    fn test_dashboard_defaults_feed_chart() {
        let mut rng = SmallRng::seed_from_u64(4);
        let json = dashboard_json(None, &mut rng).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kpis"]["source"], "defaults");

        let svg = trend_chart_svg(&value["trend"].to_string(), 75.0).unwrap();
        assert!(svg.starts_with("<svg"));
    }

    #[test]
    fn test_parse_analysis_blank_is_none() {
        assert!(parse_analysis("").unwrap().is_none());
        assert!(parse_analysis("null").unwrap().is_none());
    }

    #[test]
    fn test_validate_signup_fields() {
        assert_eq!(validate_signup_fields("Asha", "asha@example.com", "secret1", "secret1").unwrap(), "null");

        let err: serde_json::Value =
            serde_json::from_str(&validate_signup_fields("Asha", "asha@example.com", "secret1", "secret2").unwrap())
                .unwrap();
        assert_eq!(err["field"], "confirmPassword");

        let err: serde_json::Value =
            serde_json::from_str(&validate_signup_fields("Asha", "", "secret1", "secret1").unwrap()).unwrap();
        assert_eq!(err["field"], "emailOrPhone");
    }

    #[test]
    fn test_export_skips_unfinished_plots() {
        let json = export_geojson("[]").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"].as_array().map(Vec::len), Some(0));
    }
}
