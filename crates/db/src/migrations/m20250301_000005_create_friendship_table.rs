//! Create friendship table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Friendship::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Friendship::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Friendship::RequesterId).string_len(32).not_null())
                    .col(ColumnDef::new(Friendship::RecipientId).string_len(32).not_null())
                    .col(ColumnDef::new(Friendship::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Friendship::PairKey).string_len(65).not_null())
                    .col(
                        ColumnDef::new(Friendship::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Friendship::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friendship_requester")
                            .from(Friendship::Table, Friendship::RequesterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friendship_recipient")
                            .from(Friendship::Table, Friendship::RecipientId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: pair_key - one row per unordered pair, either direction
        manager
            .create_index(
                Index::create()
                    .name("idx_friendship_pair_key")
                    .table(Friendship::Table)
                    .col(Friendship::PairKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (recipient_id, status) for incoming requests and friend lists
        manager
            .create_index(
                Index::create()
                    .name("idx_friendship_recipient_status")
                    .table(Friendship::Table)
                    .col(Friendship::RecipientId)
                    .col(Friendship::Status)
                    .to_owned(),
            )
            .await?;

        // Index: (requester_id, status) for outgoing requests and friend lists
        manager
            .create_index(
                Index::create()
                    .name("idx_friendship_requester_status")
                    .table(Friendship::Table)
                    .col(Friendship::RequesterId)
                    .col(Friendship::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Friendship::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Friendship {
    Table,
    Id,
    RequesterId,
    RecipientId,
    Status,
    PairKey,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
