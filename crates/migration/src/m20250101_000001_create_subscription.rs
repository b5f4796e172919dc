//! Create `subscription` table.
//! One row per paid service a user is subscribed to, with a closed date range.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscription::Table)
                    .if_not_exists()
                    .col(uuid(Subscription::Id).primary_key())
                    .col(string_len(Subscription::ServiceName, 255).not_null())
                    .col(
                        integer(Subscription::Price)
                            .not_null()
                            .check(Expr::col(Subscription::Price).gte(0)),
                    )
                    .col(uuid(Subscription::UserId).not_null())
                    .col(date(Subscription::StartDate).not_null())
                    .col(date(Subscription::EndDate).not_null())
                    .col(timestamp_with_time_zone(Subscription::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Subscription::UpdatedAt).not_null())
                    .check(Expr::col(Subscription::EndDate).gte(Expr::col(Subscription::StartDate)))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Subscription::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Subscription {
    Table,
    Id,
    ServiceName,
    Price,
    UserId,
    StartDate,
    EndDate,
    CreatedAt,
    UpdatedAt,
}
