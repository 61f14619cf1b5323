//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use dailyflip_common::AppResult;
use dailyflip_core::RegisterInput;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, MessageResponse},
};

/// Register response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub id: String,
}

/// Create a new account.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<ApiResponse<RegisterResponse>> {
    let user = state.user_service.register(input).await?;

    Ok(ApiResponse::created(RegisterResponse {
        message: "User registered successfully".to_string(),
        id: user.id,
    }))
}

/// Signin request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Signin response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub token: String,
}

/// Sign in to an existing account.
async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> AppResult<ApiResponse<SigninResponse>> {
    let user = state
        .user_service
        .authenticate(&req.email, &req.password)
        .await?;

    Ok(ApiResponse::ok(SigninResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        image: user.image,
        token: user.token,
    }))
}

/// Sign out (invalidate current token by regenerating).
async fn signout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.user_service.sign_out(user).await?;

    Ok(ApiResponse::ok(MessageResponse::new("Signed out")))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
}
