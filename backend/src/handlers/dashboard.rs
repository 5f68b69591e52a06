//! Dashboard handlers

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::Deserialize;

use shared::chart;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::dashboard::DashboardView;
use crate::services::DashboardService;
use crate::AppState;

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub plot: Option<String>,
}

pub(crate) async fn load_view(
    state: &AppState,
    current_user: &CurrentUser,
    plot: Option<&str>,
) -> AppResult<DashboardView> {
    let plots = state.plots(current_user.0.user_id);
    let mut rng = StdRng::from_entropy();
    DashboardService::new(&plots, state.config.maps.static_api_key.as_deref())
        .view(plot, &mut rng)
        .await
}

/// KPIs, trend and risks for the selected plot
pub async fn get_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DashboardView>> {
    let view = load_view(&state, &current_user, query.plot.as_deref()).await?;
    Ok(Json(view))
}

/// The CHI trend rendered as SVG
pub async fn get_trend_chart(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<impl IntoResponse> {
    let view = load_view(&state, &current_user, query.plot.as_deref()).await?;
    let svg = chart::render_trend_svg(&view.metrics.trend, view.metrics.kpis.crop_health);
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}
