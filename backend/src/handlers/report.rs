//! Report handlers

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::dashboard::load_view;
use crate::middleware::CurrentUser;
use crate::services::report;
use crate::AppState;

#[derive(Deserialize)]
pub struct ReportQuery {
    pub plot: Option<String>,
    pub format: Option<String>, // "json" or "csv"
}

/// Plot report for the selected plot
pub async fn get_plot_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let view = load_view(&state, &current_user, query.plot.as_deref()).await?;

    // The view only carries a summary, so fetch the analysis for its advice
    let analysis = match &view.selected {
        Some(selected) => {
            state
                .plots(current_user.0.user_id)
                .find_by_id(selected.id)
                .await?
                .analysis
        }
        None => None,
    };

    let plot_name = view.selected.as_ref().map(|s| s.name.clone());
    let report = report::build_report(plot_name, &view.metrics, analysis.as_ref(), Utc::now());

    if query.format.as_deref() == Some("csv") {
        let csv = report::export_to_csv(&report.rows)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"plot_report.csv\""),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(report).into_response())
    }
}
