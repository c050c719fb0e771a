//! Migration: Create board_members table

use sea_orm_migration::prelude::*;

use super::m20260601_000001_create_users::Users;
use super::m20260601_000004_create_boards::Boards;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BoardMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BoardMembers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BoardMembers::BoardId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BoardMembers::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BoardMembers::Role).string().not_null())
                    .col(
                        ColumnDef::new(BoardMembers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BoardMembers::Table, BoardMembers::BoardId)
                            .to(Boards::Table, Boards::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BoardMembers::Table, BoardMembers::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_board_members_board_user")
                    .table(BoardMembers::Table)
                    .col(BoardMembers::BoardId)
                    .col(BoardMembers::UserId)
                    .unique()
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
                    .table(BoardMembers::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum BoardMembers {
    Table,
    Id,
    #[iden = "board_id"]
    BoardId,
    #[iden = "user_id"]
    UserId,
    Role,
    #[iden = "created_at"]
    CreatedAt,
}
