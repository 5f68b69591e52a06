//! Plot management HTTP handlers

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::geojson::{self, FeatureCollection};
use shared::{Plot, PlotDraft};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::analysis::{CreatePlotOutcome, RefreshOutcome};
use crate::services::AnalysisService;
use crate::AppState;

const GEOJSON_CONTENT_TYPE: &str = "application/geo+json";

#[derive(Deserialize)]
pub struct CreatePlotRequest {
    #[serde(flatten)]
    pub draft: PlotDraft,
    /// Request an analysis before saving
    #[serde(default)]
    pub analyze: bool,
}

/// Plot with its derived geometry
#[derive(Serialize)]
pub struct PlotResponse {
    #[serde(flatten)]
    pub plot: Plot,
    pub area_hectares: f64,
}

impl From<Plot> for PlotResponse {
    fn from(plot: Plot) -> Self {
        Self {
            area_hectares: plot.area_hectares(),
            plot,
        }
    }
}

#[derive(Serialize)]
pub struct PlotListResponse {
    pub plots: Vec<PlotResponse>,
}

/// List all plots of the current user in creation order
pub async fn list_plots(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<PlotListResponse>> {
    let plots = state.plots(current_user.0.user_id).list().await?;
    Ok(Json(PlotListResponse {
        plots: plots.into_iter().map(PlotResponse::from).collect(),
    }))
}

/// Create a new plot
pub async fn create_plot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreatePlotRequest>,
) -> AppResult<(StatusCode, Json<CreatePlotOutcome>)> {
    let plots = state.plots(current_user.0.user_id);
    let analyzer = state.inference();
    let outcome = AnalysisService::new(&plots, &analyzer)
        .create_plot(body.draft, body.analyze)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn get_plot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(plot_id): Path<Uuid>,
) -> AppResult<Json<PlotResponse>> {
    let plot = state.plots(current_user.0.user_id).find_by_id(plot_id).await?;
    Ok(Json(plot.into()))
}

/// First plot with the given name
pub async fn get_plot_by_name(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(name): Path<String>,
) -> AppResult<Json<PlotResponse>> {
    let plot = state.plots(current_user.0.user_id).find_by_name(&name).await?;
    Ok(Json(plot.into()))
}

/// Re-run the analysis for a saved plot
pub async fn refresh_analysis(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(name): Path<String>,
) -> AppResult<Json<RefreshOutcome>> {
    let plots = state.plots(current_user.0.user_id);
    let analyzer = state.inference();
    let outcome = AnalysisService::new(&plots, &analyzer).refresh(&name).await?;
    Ok(Json(outcome))
}

fn geojson_download(collection: FeatureCollection, filename: &str) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, GEOJSON_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Json(collection),
    )
}

/// GeoJSON of every plot with a drawable boundary
pub async fn export_plots(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<impl IntoResponse> {
    let plots = state.plots(current_user.0.user_id).list().await?;
    let collection = geojson::export_plots(&plots, Utc::now());
    Ok(geojson_download(collection, "agrilens_plots.geojson"))
}

/// GeoJSON of one plot
pub async fn export_plot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let plot = state.plots(current_user.0.user_id).find_by_name(&name).await?;
    let feature = geojson::plot_feature(&plot, Utc::now())
        .map_err(|e| AppError::validation("boundary", e.to_string()))?;

    let filename = format!("{}.geojson", plot.name.replace(|c: char| !c.is_alphanumeric(), "_"));
    let collection = FeatureCollection::FeatureCollection {
        features: vec![feature],
    };
    Ok(geojson_download(collection, &filename))
}
