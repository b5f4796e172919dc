use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Filters on list/total
        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_user")
                    .table(Subscription::Table)
                    .col(Subscription::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_service_name")
                    .table(Subscription::Table)
                    .col(Subscription::ServiceName)
                    .to_owned(),
            )
            .await?;

        // Overlap predicate: start_date <= to AND end_date >= from
        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_period")
                    .table(Subscription::Table)
                    .col(Subscription::StartDate)
                    .col(Subscription::EndDate)
                    .to_owned(),
            )
            .await?;

        // List ordering
        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_created_at")
                    .table(Subscription::Table)
                    .col(Subscription::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_subscription_user",
            "idx_subscription_service_name",
            "idx_subscription_period",
            "idx_subscription_created_at",
        ] {
            manager
                .drop_index(Index::drop().name(name).table(Subscription::Table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Subscription { Table, UserId, ServiceName, StartDate, EndDate, CreatedAt }
