//! Post service.

use dailyflip_common::{AppError, AppResult, IdGenerator};
use dailyflip_db::{
    entities::post::{self, MediaType},
    repositories::{PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for creating a new post.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub content: String,

    #[validate(length(min = 1, max = 2048))]
    pub media_url: Option<String>,

    pub media_type: Option<MediaType>,

    #[serde(default)]
    pub is_private: bool,
}

/// Input for editing a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostInput {
    #[validate(length(max = 5000))]
    pub content: String,

    pub is_private: bool,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(post_repo: PostRepository, user_repo: UserRepository) -> Self {
        Self {
            post_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post owned by `user_id`.
    pub async fn create(&self, user_id: &str, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;

        if input.media_url.is_some() != input.media_type.is_some() {
            return Err(AppError::BadRequest(
                "mediaUrl and mediaType must be given together".to_string(),
            ));
        }

        if input.content.trim().is_empty() && input.media_url.is_none() {
            return Err(AppError::BadRequest(
                "Post must have content or media".to_string(),
            ));
        }

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            content: Set(input.content),
            media_url: Set(input.media_url),
            media_type: Set(input.media_type),
            is_private: Set(input.is_private),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let post = self.post_repo.create(model).await?;

        tracing::info!(post_id = %post.id, user_id = %user_id, "Post created");

        Ok(post)
    }

    /// Get a post by ID.
    pub async fn get(&self, id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// Overwrite the content and privacy of a post. Owner only.
    pub async fn update(
        &self,
        actor_id: &str,
        id: &str,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let post = self.post_repo.get_by_id(id).await?;

        if post.user_id != actor_id {
            tracing::warn!(
                post_id = %id,
                actor_id = %actor_id,
                "Refused edit of another user's post"
            );
            return Err(AppError::Forbidden(
                "You can only edit your own posts".to_string(),
            ));
        }

        if input.content.trim().is_empty() && post.media_url.is_none() {
            return Err(AppError::BadRequest(
                "Post must have content or media".to_string(),
            ));
        }

        let mut active: post::ActiveModel = post.into();
        active.content = Set(input.content);
        active.is_private = Set(input.is_private);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.post_repo.update(active).await
    }

    /// Delete a post and its comments. Owner or admin only.
    pub async fn delete(&self, actor_id: &str, id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(id).await?;

        if post.user_id != actor_id {
            let is_admin = self
                .user_repo
                .find_by_id(actor_id)
                .await?
                .is_some_and(|u| u.is_admin());

            if !is_admin {
                tracing::warn!(
                    post_id = %id,
                    actor_id = %actor_id,
                    "Refused delete of another user's post"
                );
                return Err(AppError::Forbidden(
                    "You can only delete your own posts".to_string(),
                ));
            }
        }

        let comments = self.post_repo.delete_with_comments(id).await?;

        tracing::info!(
            post_id = %id,
            actor_id = %actor_id,
            comments_deleted = comments,
            "Post deleted"
        );

        Ok(())
    }
}
