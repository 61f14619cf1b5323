//! Friendship service.
//!
//! Each unordered pair of users moves through `none -> pending -> accepted`,
//! and back to `none` when a request is rejected or a friendship removed.
//! Only the recipient of a pending request may accept or reject it; either
//! party may remove a row in any state.

use std::collections::HashMap;

use dailyflip_common::{AppError, AppResult, IdGenerator};
use dailyflip_db::{
    entities::{
        friendship::{self, FriendshipStatus},
        user,
    },
    repositories::{FriendshipRepository, UserRepository},
};
use sea_orm::Set;

/// Friendship service for business logic.
#[derive(Clone)]
pub struct FriendshipService {
    friendship_repo: FriendshipRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// A friendship row paired with the other party's account.
#[derive(Debug, Clone)]
pub struct FriendEntry {
    pub friendship: friendship::Model,
    pub user: user::Model,
}

impl FriendshipService {
    /// Create a new friendship service.
    #[must_use]
    pub const fn new(friendship_repo: FriendshipRepository, user_repo: UserRepository) -> Self {
        Self {
            friendship_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Send a friend request from `requester_id` to `recipient_id`.
    ///
    /// Fails with `Conflict` while any row exists for the pair, in either
    /// direction and in any state.
    pub async fn request(
        &self,
        requester_id: &str,
        recipient_id: &str,
    ) -> AppResult<friendship::Model> {
        if requester_id == recipient_id {
            return Err(AppError::BadRequest(
                "Cannot send a friend request to yourself".to_string(),
            ));
        }

        self.user_repo.get_by_id(recipient_id).await?;

        if self
            .friendship_repo
            .find_by_pair(requester_id, recipient_id)
            .await?
            .is_some()
        {
            tracing::warn!(
                requester_id = %requester_id,
                recipient_id = %recipient_id,
                "Friendship request already exists"
            );
            return Err(AppError::Conflict(
                "Friendship request already exists".to_string(),
            ));
        }

        let model = friendship::ActiveModel {
            id: Set(self.id_gen.generate()),
            requester_id: Set(requester_id.to_string()),
            recipient_id: Set(recipient_id.to_string()),
            status: Set(FriendshipStatus::Pending),
            pair_key: Set(friendship::pair_key(requester_id, recipient_id)),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.friendship_repo.create(model).await?;

        tracing::info!(
            friendship_id = %created.id,
            requester_id = %requester_id,
            recipient_id = %recipient_id,
            "Friend request sent"
        );

        Ok(created)
    }

    /// Accept a pending request addressed to `actor_id`.
    pub async fn accept(&self, actor_id: &str, id: &str) -> AppResult<friendship::Model> {
        let pending = self.pending_for(actor_id, id).await?;

        let mut active: friendship::ActiveModel = pending.into();
        active.status = Set(FriendshipStatus::Accepted);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let accepted = self.friendship_repo.update(active).await?;

        tracing::info!(friendship_id = %id, recipient_id = %actor_id, "Friend request accepted");

        Ok(accepted)
    }

    /// Reject a pending request addressed to `actor_id`, deleting it.
    pub async fn reject(&self, actor_id: &str, id: &str) -> AppResult<()> {
        let pending = self.pending_for(actor_id, id).await?;
        self.friendship_repo.delete(pending).await?;

        tracing::info!(friendship_id = %id, recipient_id = %actor_id, "Friend request rejected");

        Ok(())
    }

    /// Remove a friendship or request that `actor_id` is party to.
    pub async fn remove(&self, actor_id: &str, id: &str) -> AppResult<()> {
        let row = self
            .friendship_repo
            .find_for_party(id, actor_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Friendship not found".to_string()))?;

        self.friendship_repo.delete(row).await?;

        tracing::info!(friendship_id = %id, user_id = %actor_id, "Friendship removed");

        Ok(())
    }

    /// List accepted friends of a user. Each entry carries the counterpart.
    pub async fn list_friends(&self, user_id: &str) -> AppResult<Vec<FriendEntry>> {
        let rows = self.friendship_repo.find_accepted(user_id).await?;
        self.attach_users(rows, |row| row.counterpart_of(user_id).to_string())
            .await
    }

    /// List pending requests received by a user, with the requester attached.
    pub async fn list_pending_received(&self, user_id: &str) -> AppResult<Vec<FriendEntry>> {
        let rows = self.friendship_repo.find_pending_received(user_id).await?;
        self.attach_users(rows, |row| row.requester_id.clone())
            .await
    }

    /// List pending requests sent by a user, with the recipient attached.
    pub async fn list_pending_sent(&self, user_id: &str) -> AppResult<Vec<FriendEntry>> {
        let rows = self.friendship_repo.find_pending_sent(user_id).await?;
        self.attach_users(rows, |row| row.recipient_id.clone())
            .await
    }

    async fn pending_for(&self, recipient_id: &str, id: &str) -> AppResult<friendship::Model> {
        self.friendship_repo
            .find_pending_for_recipient(id, recipient_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Friendship request not found".to_string()))
    }

    async fn attach_users<F>(
        &self,
        rows: Vec<friendship::Model>,
        other_party: F,
    ) -> AppResult<Vec<FriendEntry>>
    where
        F: Fn(&friendship::Model) -> String,
    {
        let ids: Vec<String> = rows.iter().map(&other_party).collect();
        let users: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let other = other_party(&row);
                let user = users.get(&other).cloned();
                if user.is_none() {
                    tracing::warn!(
                        friendship_id = %row.id,
                        user_id = %other,
                        "Friendship references a missing user"
                    );
                }
                user.map(|user| FriendEntry {
                    friendship: row,
                    user,
                })
            })
            .collect())
    }
}
