use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::auth::service::{
    self, AuthResponse, ChangePasswordRequest, LoginRequest, ProfileUpdate, RegisterRequest,
    ResetPasswordRequest,
};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::user::User;
use crate::state::AppState;

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let resp = service::register(state.store.as_ref(), req, state.config.session_ttl_hours).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let resp = service::login(state.store.as_ref(), req, state.config.session_ttl_hours).await?;
    Ok(Json(resp))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<StatusCode, AppError> {
    service::logout(state.store.as_ref(), &current.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn handle_me(current: CurrentUser) -> Json<User> {
    Json(User::from(&current.user))
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

/// POST /api/v1/auth/forgot-password
pub async fn handle_forgot_password(
    State(state): State<AppState>,
    AppJson(req): AppJson<ForgotPasswordRequest>,
) -> Result<StatusCode, AppError> {
    service::forgot_password(state.store.as_ref(), &req.email).await?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /api/v1/auth/reset-password
pub async fn handle_reset_password(
    State(state): State<AppState>,
    AppJson(req): AppJson<ResetPasswordRequest>,
) -> Result<StatusCode, AppError> {
    service::reset_password(state.store.as_ref(), req).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    AppJson(req): AppJson<ProfileUpdate>,
) -> Result<Json<User>, AppError> {
    let user = service::update_profile(state.store.as_ref(), current.user, req).await?;
    Ok(Json(user))
}

/// POST /api/v1/profile/password
pub async fn handle_change_password(
    State(state): State<AppState>,
    current: CurrentUser,
    AppJson(req): AppJson<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    service::change_password(state.store.as_ref(), current.user, req).await?;
    Ok(StatusCode::NO_CONTENT)
}
