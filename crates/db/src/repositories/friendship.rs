//! Friendship repository.

use std::sync::Arc;

use crate::entities::{
    Friendship,
    friendship::{self, FriendshipStatus},
};
use dailyflip_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, SqlErr,
};

/// Friendship repository for database operations.
#[derive(Clone)]
pub struct FriendshipRepository {
    db: Arc<DatabaseConnection>,
}

impl FriendshipRepository {
    /// Create a new friendship repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a friendship by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<friendship::Model>> {
        Friendship::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the row for the unordered pair {a, b}, whichever direction it has.
    pub async fn find_by_pair(&self, a: &str, b: &str) -> AppResult<Option<friendship::Model>> {
        Friendship::find()
            .filter(friendship::Column::PairKey.eq(friendship::pair_key(a, b)))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a pending request by ID addressed to `recipient_id`.
    pub async fn find_pending_for_recipient(
        &self,
        id: &str,
        recipient_id: &str,
    ) -> AppResult<Option<friendship::Model>> {
        Friendship::find_by_id(id)
            .filter(friendship::Column::RecipientId.eq(recipient_id))
            .filter(friendship::Column::Status.eq(FriendshipStatus::Pending))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a friendship by ID where `user_id` is either party.
    pub async fn find_for_party(
        &self,
        id: &str,
        user_id: &str,
    ) -> AppResult<Option<friendship::Model>> {
        Friendship::find_by_id(id)
            .filter(party_condition(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new friendship row.
    ///
    /// A unique violation on the pair key means another row for the same
    /// pair was inserted concurrently; it is reported as `Conflict`.
    pub async fn create(&self, model: friendship::ActiveModel) -> AppResult<friendship::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_insert_error)
    }

    /// Update a friendship row.
    ///
    /// A row deleted since it was read yields `NotFound`.
    pub async fn update(&self, model: friendship::ActiveModel) -> AppResult<friendship::Model> {
        model.update(self.db.as_ref()).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => AppError::NotFound("Friendship not found".to_string()),
            _ => AppError::Database(e.to_string()),
        })
    }

    /// Delete a friendship row.
    pub async fn delete(&self, model: friendship::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get accepted friendships where `user_id` is either party.
    pub async fn find_accepted(&self, user_id: &str) -> AppResult<Vec<friendship::Model>> {
        Friendship::find()
            .filter(party_condition(user_id))
            .filter(friendship::Column::Status.eq(FriendshipStatus::Accepted))
            .order_by_desc(friendship::Column::UpdatedAt)
            .order_by_desc(friendship::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get pending requests received by a user, newest first.
    pub async fn find_pending_received(&self, user_id: &str) -> AppResult<Vec<friendship::Model>> {
        Friendship::find()
            .filter(friendship::Column::RecipientId.eq(user_id))
            .filter(friendship::Column::Status.eq(FriendshipStatus::Pending))
            .order_by_desc(friendship::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get pending requests sent by a user, newest first.
    pub async fn find_pending_sent(&self, user_id: &str) -> AppResult<Vec<friendship::Model>> {
        Friendship::find()
            .filter(friendship::Column::RequesterId.eq(user_id))
            .filter(friendship::Column::Status.eq(FriendshipStatus::Pending))
            .order_by_desc(friendship::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

fn party_condition(user_id: &str) -> Condition {
    Condition::any()
        .add(friendship::Column::RequesterId.eq(user_id))
        .add(friendship::Column::RecipientId.eq(user_id))
}

fn map_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Friendship request already exists".to_string())
        }
        _ => AppError::Database(err.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_by_pair_uses_canonical_key() {
        let row = fixtures::friendship("f1", "user2", "user1", FriendshipStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row.clone()]])
                .into_connection(),
        );

        let repo = FriendshipRepository::new(Arc::clone(&db));
        let found = repo.find_by_pair("user1", "user2").await.unwrap();
        assert_eq!(found.unwrap().requester_id, "user2");
        drop(repo);

        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains("user1:user2"));
    }

    #[tokio::test]
    async fn test_find_pending_for_recipient_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<friendship::Model>::new()])
                .into_connection(),
        );

        let repo = FriendshipRepository::new(db);
        let found = repo.find_pending_for_recipient("f1", "user1").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_accepted_matches_either_party() {
        let f1 = fixtures::friendship("f1", "user1", "user2", FriendshipStatus::Accepted);
        let f2 = fixtures::friendship("f2", "user3", "user1", FriendshipStatus::Accepted);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[f1, f2]])
                .into_connection(),
        );

        let repo = FriendshipRepository::new(Arc::clone(&db));
        let rows = repo.find_accepted("user1").await.unwrap();
        assert_eq!(rows.len(), 2);
        drop(repo);

        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains(" OR "));
        assert!(log.contains("ACCEPTED"));
    }

    #[test]
    fn test_non_unique_insert_error_is_database_error() {
        let err = map_insert_error(DbErr::Custom("connection reset".to_string()));
        assert!(matches!(err, AppError::Database(_)));
    }
}
