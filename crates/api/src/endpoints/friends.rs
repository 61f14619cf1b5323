//! Friendship endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use dailyflip_common::{AppError, AppResult};
use dailyflip_core::FriendEntry;
use dailyflip_db::entities::friendship::{self, FriendshipStatus};
use serde::{Deserialize, Serialize};

use super::users::PublicUserResponse;
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, MessageResponse},
};

/// Friendship row response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipResponse {
    pub id: String,
    pub requester_id: String,
    pub recipient_id: String,
    pub status: FriendshipStatus,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<friendship::Model> for FriendshipResponse {
    fn from(row: friendship::Model) -> Self {
        Self {
            id: row.id,
            requester_id: row.requester_id,
            recipient_id: row.recipient_id,
            status: row.status,
            created_at: row.created_at.to_rfc3339(),
            updated_at: row.updated_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// An accepted friend: the other user plus the friendship id for removal.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendResponse {
    #[serde(flatten)]
    pub user: PublicUserResponse,
    pub friendship_id: String,
}

impl From<FriendEntry> for FriendResponse {
    fn from(entry: FriendEntry) -> Self {
        Self {
            user: entry.user.into(),
            friendship_id: entry.friendship.id,
        }
    }
}

/// A pending request with the other party attached.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestResponse {
    pub id: String,
    pub status: FriendshipStatus,
    pub created_at: String,
    pub user: PublicUserResponse,
}

impl From<FriendEntry> for FriendRequestResponse {
    fn from(entry: FriendEntry) -> Self {
        Self {
            id: entry.friendship.id,
            status: entry.friendship.status,
            created_at: entry.friendship.created_at.to_rfc3339(),
            user: entry.user.into(),
        }
    }
}

/// Friend request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFriendRequest {
    pub friend_id: String,
}

/// Accept or reject body.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub action: String,
}

/// Result of answering a request.
#[derive(Serialize)]
#[serde(untagged)]
pub enum RespondResponse {
    Accepted(FriendshipResponse),
    Rejected(MessageResponse),
}

/// List accepted friends.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<FriendResponse>>> {
    let friends = state.friendship_service.list_friends(&user.id).await?;
    Ok(ApiResponse::ok(friends.into_iter().map(Into::into).collect()))
}

/// List requests waiting for the current user's answer.
async fn pending(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<FriendRequestResponse>>> {
    let requests = state
        .friendship_service
        .list_pending_received(&user.id)
        .await?;
    Ok(ApiResponse::ok(requests.into_iter().map(Into::into).collect()))
}

/// List requests the current user has sent.
async fn sent(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<FriendRequestResponse>>> {
    let requests = state.friendship_service.list_pending_sent(&user.id).await?;
    Ok(ApiResponse::ok(requests.into_iter().map(Into::into).collect()))
}

/// Send a friend request.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateFriendRequest>,
) -> AppResult<ApiResponse<FriendshipResponse>> {
    let row = state
        .friendship_service
        .request(&user.id, &req.friend_id)
        .await?;
    Ok(ApiResponse::created(row.into()))
}

/// Accept or reject a pending request.
async fn respond(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RespondRequest>,
) -> AppResult<ApiResponse<RespondResponse>> {
    match req.action.as_str() {
        "accept" => {
            let row = state.friendship_service.accept(&user.id, &id).await?;
            Ok(ApiResponse::ok(RespondResponse::Accepted(row.into())))
        }
        "reject" => {
            state.friendship_service.reject(&user.id, &id).await?;
            Ok(ApiResponse::ok(RespondResponse::Rejected(
                MessageResponse::new("Friendship request rejected"),
            )))
        }
        _ => Err(AppError::BadRequest("Invalid action".to_string())),
    }
}

/// Remove a friendship or withdraw a request.
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.friendship_service.remove(&user.id, &id).await?;
    Ok(ApiResponse::ok(MessageResponse::new("Friendship removed")))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/pending", get(pending))
        .route("/sent", get(sent))
        .route("/{id}", patch(respond).delete(remove))
}
