//! HTTP boundary: maps requests to account service calls and results to
//! JSON responses. No business rules live here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::instrument;

use crate::auth::dto::{
    AuthResponse, ChangePasswordRequest, CheckEmailResponse, ForgotPasswordRequest,
    ForgotPasswordResponse, LoginRequest, MessageResponse, ProfileResponse, RegisterRequest,
    ResetPasswordRequest, UpdateProfileRequest,
};
use crate::auth::extractors::{AppJson, AuthUser};
use crate::auth::service;
use crate::error::AuthError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/check-email/:email", get(check_email))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/change-password", put(change_password))
        .route("/logout", post(logout))
}

async fn index() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "hubauth authentication API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "auth service is healthy",
    }))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let response = service::register(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = service::login(&state, payload).await?;
    Ok(Json(response))
}

#[instrument(skip(state))]
async fn check_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<CheckEmailResponse>, AuthError> {
    let response = service::check_email(&state, &email).await?;
    Ok(Json(response))
}

#[instrument(skip(state))]
async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, AuthError> {
    let response = service::get_profile(&state, user_id).await?;
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AuthError> {
    let response = service::update_profile(&state, user_id, payload).await?;
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
async fn forgot_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>, AuthError> {
    let response = service::forgot_password(&state, &payload.email).await?;
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
async fn reset_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    service::reset_password(&state, payload).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Password reset successful".into(),
    }))
}

#[instrument(skip(state, payload))]
async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    service::change_password(&state, user_id, payload).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Password changed successfully".into(),
    }))
}

/// Sessions are stateless bearer tokens with no revocation list; logout is
/// an acknowledgement behind the auth gate and the client drops the token.
#[instrument(skip_all)]
async fn logout(AuthUser(_user_id): AuthUser) -> Json<MessageResponse> {
    Json(MessageResponse {
        success: true,
        message: "Logged out".into(),
    })
}
