//! Analysis preview handler

use axum::{extract::State, Json};
use serde::Deserialize;

use shared::{Analysis, GeoPoint};

use crate::error::AppResult;
use crate::external::inference::request_analysis;
use crate::middleware::CurrentUser;
use crate::AppState;

#[derive(Deserialize)]
pub struct PreviewRequest {
    pub boundary: Vec<GeoPoint>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_rainfall")]
    pub rainfall: f64,
}

fn default_temperature() -> f64 {
    25.0
}

fn default_rainfall() -> f64 {
    500.0
}

/// Analyse a freshly drawn boundary without saving it
pub async fn preview_analysis(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(body): Json<PreviewRequest>,
) -> AppResult<Json<Analysis>> {
    let analyzer = state.inference();
    let analysis =
        request_analysis(&analyzer, &body.boundary, body.temperature, body.rainfall).await?;
    Ok(Json(analysis))
}
