//! Profile handlers

use axum::{extract::State, Json};

use shared::{ProfileUpdate, UserProfile};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UserProfile>> {
    let profile = state.profiles(current_user.0.user_id).get().await?;
    Ok(Json(profile))
}

/// Partial update; omitted fields keep their value
pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(patch): Json<ProfileUpdate>,
) -> AppResult<Json<UserProfile>> {
    let profile = state.profiles(current_user.0.user_id).update(patch).await?;
    Ok(Json(profile))
}
