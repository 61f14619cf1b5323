//! User endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use dailyflip_common::AppResult;
use dailyflip_core::{UpdateUserInput, UserWithProfile};
use dailyflip_db::entities::user::{self, Role};
use serde::Serialize;

use super::posts::{FeedPostResponse, FeedQuery};
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Public user fields shown next to posts and friendships.
#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PublicUserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

impl From<user::Model> for PublicUserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            image: user.image,
        }
    }
}

/// User with profile response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub role: Role,
    pub bio: String,
    pub background_image: String,
    pub created_at: String,
}

impl From<UserWithProfile> for UserDetailResponse {
    fn from(UserWithProfile { user, profile }: UserWithProfile) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            image: user.image,
            role: user.role,
            bio: profile.bio,
            background_image: profile.background_image,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Current session identity.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: PublicUserResponse,
    pub role: Role,
}

/// Get the signed-in user.
async fn me(AuthUser(user): AuthUser) -> AppResult<ApiResponse<MeResponse>> {
    let role = user.role;
    Ok(ApiResponse::ok(MeResponse {
        user: user.into(),
        role,
    }))
}

/// Get a user and their profile.
async fn show(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserDetailResponse>> {
    let detail = state.user_service.get_with_profile(&id).await?;
    Ok(ApiResponse::ok(detail.into()))
}

/// Update a user and their profile.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<ApiResponse<UserDetailResponse>> {
    let detail = state.user_service.update(&user.id, &id, input).await?;
    Ok(ApiResponse::ok(detail.into()))
}

/// Get a user's public posts.
async fn posts(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> AppResult<ApiResponse<Vec<FeedPostResponse>>> {
    let limit = state.feed.clamp(query.limit);
    let feed = state.feed_service.for_user(&id, limit).await?;

    Ok(ApiResponse::ok(
        feed.into_iter().map(FeedPostResponse::from).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/{id}", get(show).patch(update))
        .route("/{id}/posts", get(posts))
}
