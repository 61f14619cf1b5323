//! Comment service.

use dailyflip_common::{AppError, AppResult, IdGenerator};
use dailyflip_db::{
    entities::comment,
    repositories::{CommentRepository, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

/// Input for commenting on a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    pub post_id: String,

    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, post_repo: PostRepository) -> Self {
        Self {
            comment_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a comment by `user_id`.
    ///
    /// Visibility of the target post is not checked here.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        if input.content.trim().is_empty() {
            return Err(AppError::BadRequest("Comment cannot be blank".to_string()));
        }

        let post = self.post_repo.get_by_id(&input.post_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            post_id: Set(post.id),
            content: Set(input.content),
            created_at: Set(chrono::Utc::now().into()),
        };

        let comment = self.comment_repo.create(model).await?;

        tracing::info!(
            comment_id = %comment.id,
            post_id = %comment.post_id,
            user_id = %user_id,
            "Comment created"
        );

        Ok(comment)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dailyflip_db::{entities::post, test_utils::fixtures};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn create_test_service(db: DatabaseConnection) -> CommentService {
        let db = Arc::new(db);
        CommentService::new(CommentRepository::new(Arc::clone(&db)), PostRepository::new(db))
    }

    fn input(post_id: &str, content: &str) -> CreateCommentInput {
        CreateCommentInput {
            post_id: post_id.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_comment() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[fixtures::post("p1", "owner", "hello", false)]])
            .append_query_results([[fixtures::comment("c1", "user2", "p1", "nice")]])
            .into_connection();

        let service = create_test_service(db);
        let comment = service.create("user2", input("p1", "nice")).await.unwrap();

        assert_eq!(comment.post_id, "p1");
        assert_eq!(comment.user_id, "user2");
    }

    #[tokio::test]
    async fn test_comment_on_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let service = create_test_service(db);
        let result = service.create("user2", input("gone", "hello?")).await;

        match result {
            Err(AppError::PostNotFound(id)) => assert_eq!(id, "gone"),
            _ => panic!("Expected PostNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_comment_length_limits() {
        let service =
            create_test_service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let empty = service.create("user2", input("p1", "")).await;
        assert!(matches!(empty, Err(AppError::Validation(_))));

        let long = service.create("user2", input("p1", &"x".repeat(2001))).await;
        assert!(matches!(long, Err(AppError::Validation(_))));

        let blank = service.create("user2", input("p1", "  ")).await;
        assert!(matches!(blank, Err(AppError::BadRequest(_))));
    }
}
