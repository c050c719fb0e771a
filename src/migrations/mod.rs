pub use sea_orm_migration::prelude::*;

mod m20260601_000001_create_users;
mod m20260601_000002_create_workspaces;
mod m20260601_000003_create_workspace_members;
mod m20260601_000004_create_boards;
mod m20260601_000005_create_board_members;
mod m20260601_000006_create_invite_links;
mod m20260601_000007_create_audit_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260601_000001_create_users::Migration),
            Box::new(m20260601_000002_create_workspaces::Migration),
            Box::new(m20260601_000003_create_workspace_members::Migration),
            Box::new(m20260601_000004_create_boards::Migration),
            Box::new(m20260601_000005_create_board_members::Migration),
            Box::new(m20260601_000006_create_invite_links::Migration),
            Box::new(m20260601_000007_create_audit_logs::Migration),
        ]
    }
}
