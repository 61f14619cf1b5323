//! Comment endpoints.

use axum::{Json, Router, extract::State, routing::post};
use dailyflip_common::{AppError, AppResult};
use dailyflip_core::CreateCommentInput;
use dailyflip_db::entities::comment;
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Comment response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(comment: comment::Model) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            content: comment.content,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

/// Comment on a post.
///
/// Another user's private post is reported as missing.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let post = state.post_service.get(&input.post_id).await?;
    if post.is_private && post.user_id != user.id {
        return Err(AppError::PostNotFound(input.post_id));
    }

    let comment = state.comment_service.create(&user.id, input).await?;
    Ok(ApiResponse::created(comment.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create))
}
