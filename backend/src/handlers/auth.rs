//! Credential handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use shared::PublicUser;

use crate::error::AppResult;
use crate::services::{AuthService, PgCredentialStore};
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email_or_phone: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub message: &'static str,
    pub user: PublicUser,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email_or_phone: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: PublicUser,
    pub token: String,
}

fn auth_service(state: &AppState) -> AuthService<PgCredentialStore> {
    AuthService::new(
        PgCredentialStore::new(state.db.clone()),
        &state.config.jwt,
        &state.config.auth,
    )
}

/// Signup endpoint handler
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    let user = auth_service(&state)
        .signup(&body.name, &body.email_or_phone, &body.password)
        .await?;

    state.profiles(user.id).ensure(&user).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created",
            user,
        }),
    ))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (user, token) = auth_service(&state)
        .login(&body.email_or_phone, &body.password)
        .await?;

    state.profiles(user.id).ensure(&user).await?;

    Ok(Json(LoginResponse {
        message: "Login successful",
        user,
        token,
    }))
}
