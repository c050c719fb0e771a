//! Migration: Create invite_links table

use sea_orm_migration::prelude::*;

use super::m20260601_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InviteLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InviteLinks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InviteLinks::LinkType).string().not_null())
                    .col(
                        ColumnDef::new(InviteLinks::TargetId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InviteLinks::Token)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(InviteLinks::Slug)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(InviteLinks::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(InviteLinks::ExpireReason).string().null())
                    .col(
                        ColumnDef::new(InviteLinks::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(InviteLinks::MaxUses)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(InviteLinks::UsedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InviteLinks::InvitedUserId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(InviteLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InviteLinks::CreatedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(InviteLinks::Table, InviteLinks::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(InviteLinks::Table, InviteLinks::InvitedUserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invite_links_token")
                    .table(InviteLinks::Table)
                    .col(InviteLinks::Token)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invite_links_slug")
                    .table(InviteLinks::Table)
                    .col(InviteLinks::Slug)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invite_links_target")
                    .table(InviteLinks::Table)
                    .col(InviteLinks::LinkType)
                    .col(InviteLinks::TargetId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(InviteLinks::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum InviteLinks {
    Table,
    Id,
    #[iden = "link_type"]
    LinkType,
    #[iden = "target_id"]
    TargetId,
    Token,
    Slug,
    Status,
    #[iden = "expire_reason"]
    ExpireReason,
    #[iden = "expires_at"]
    ExpiresAt,
    #[iden = "max_uses"]
    MaxUses,
    #[iden = "used_count"]
    UsedCount,
    #[iden = "invited_user_id"]
    InvitedUserId,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "created_by"]
    CreatedBy,
}
