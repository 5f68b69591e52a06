//! Assistant chat handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::external::assistant::{AssistantContext, ChatTurn};
use crate::external::AssistantClient;
use crate::middleware::CurrentUser;
use crate::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    /// Plot whose analysis grounds the answer; the first plot when absent
    pub plot: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

pub async fn assistant_chat(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let client = AssistantClient::from_config(state.http.clone(), &state.config.assistant)?;

    let plots = state.plots(current_user.0.user_id).list().await?;
    let plot = match body.plot.as_deref() {
        Some(name) => plots.iter().find(|p| p.name == name),
        None => plots.first(),
    };
    let analysis = plot.and_then(|p| p.analysis.as_ref());

    let ctx = AssistantContext {
        crop_health: analysis.map(|a| a.crop_health),
        water_stress: analysis.map(|a| a.water_stress),
        yield_prediction: analysis.map(|a| a.yield_prediction),
        model_params: analysis.map(|a| a.architecture.total_parameters),
    };

    tracing::debug!(user = %current_user.0.name, turns = body.history.len(), "Assistant chat");

    let reply = client.chat(&ctx, &body.history, &body.message).await?;
    Ok(Json(ChatResponse { reply }))
}
