//! Post endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use dailyflip_common::AppResult;
use dailyflip_core::{CreatePostInput, FeedComment, FeedPost, UpdatePostInput};
use dailyflip_db::entities::{
    post::{self, MediaType},
    user,
};
use serde::{Deserialize, Serialize};

use super::users::PublicUserResponse;
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, MessageResponse},
};

/// Feed paging query.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<u64>,
}

/// Post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub media_url: Option<String>,
    pub media_type: Option<MediaType>,
    pub is_private: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<post::Model> for PostResponse {
    fn from(post: post::Model) -> Self {
        Self {
            id: post.id,
            user_id: post.user_id,
            content: post.content,
            media_url: post.media_url,
            media_type: post.media_type,
            is_private: post.is_private,
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Commenter fields shown in comment previews.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommenterResponse {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
}

impl From<user::Model> for CommenterResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            image: user.image,
        }
    }
}

/// Comment preview attached to a feed post.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPreviewResponse {
    pub id: String,
    pub content: String,
    pub created_at: String,
    pub user: CommenterResponse,
}

impl From<FeedComment> for CommentPreviewResponse {
    fn from(FeedComment { comment, author }: FeedComment) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            created_at: comment.created_at.to_rfc3339(),
            user: author.into(),
        }
    }
}

/// Feed post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPostResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub user: PublicUserResponse,
    pub comments: Vec<CommentPreviewResponse>,
}

impl From<FeedPost> for FeedPostResponse {
    fn from(item: FeedPost) -> Self {
        Self {
            post: item.post.into(),
            user: item.author.into(),
            comments: item.comments.into_iter().map(Into::into).collect(),
        }
    }
}

/// Get the global feed.
async fn feed(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<ApiResponse<Vec<FeedPostResponse>>> {
    let limit = state.feed.clamp(query.limit);
    let feed = state.feed_service.global(limit).await?;

    Ok(ApiResponse::ok(
        feed.into_iter().map(FeedPostResponse::from).collect(),
    ))
}

/// Create a new post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.create(&user.id, input).await?;
    Ok(ApiResponse::created(post.into()))
}

/// Edit a post.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.update(&user.id, &id, input).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Delete a post and its comments.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.post_service.delete(&user.id, &id).await?;
    Ok(ApiResponse::ok(MessageResponse::new("Post deleted")))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(feed).post(create))
        .route("/{id}", patch(update).delete(delete))
}
