//! Friendship entity (friend requests and accepted friendships).
//!
//! A row is directional while pending (`requester_id` asked `recipient_id`),
//! but `pair_key` identifies the unordered pair so the unique index allows
//! only one row per pair in either direction. Rejected or removed
//! friendships are deleted rather than kept under a third status.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Friendship status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum FriendshipStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "ACCEPTED")]
    Accepted,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "friendship")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who sent the request
    pub requester_id: String,

    /// The user who received the request
    pub recipient_id: String,

    pub status: FriendshipStatus,

    /// Canonical unordered-pair key, see [`pair_key`]
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub pair_key: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// The party that is not `user_id`.
    #[must_use]
    pub fn counterpart_of(&self, user_id: &str) -> &str {
        if self.requester_id == user_id {
            &self.recipient_id
        } else {
            &self.requester_id
        }
    }
}

/// Build the canonical key for the unordered pair {a, b}.
#[must_use]
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}:{b}")
    } else {
        format!("{b}:{a}")
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RequesterId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Requester,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_order_independent() {
        assert_eq!(pair_key("alice", "bob"), pair_key("bob", "alice"));
        assert_eq!(pair_key("alice", "bob"), "alice:bob");
    }

    #[test]
    fn test_counterpart_of() {
        let row = Model {
            id: "f1".to_string(),
            requester_id: "u1".to_string(),
            recipient_id: "u2".to_string(),
            status: FriendshipStatus::Accepted,
            pair_key: pair_key("u1", "u2"),
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        };

        assert_eq!(row.counterpart_of("u1"), "u2");
        assert_eq!(row.counterpart_of("u2"), "u1");
    }
}
