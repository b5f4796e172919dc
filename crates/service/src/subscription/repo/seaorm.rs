use std::future::Future;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use tracing::warn;
use uuid::Uuid;

use models::subscription::{self, Column, Entity as SubscriptionEntity};

use crate::errors::ServiceError;
use crate::pagination::Page;
use crate::subscription::domain::{Filters, Subscription};
use crate::subscription::repository::SubscriptionRepository;

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// SeaORM-backed repository over the `subscription` table.
///
/// Each call issues a single statement and is abandoned once
/// `query_timeout` elapses; dropping the returned future cancels it as well.
pub struct SeaOrmSubscriptionRepository {
    pub db: DatabaseConnection,
    pub query_timeout: Duration,
}

impl SeaOrmSubscriptionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, query_timeout: DEFAULT_QUERY_TIMEOUT }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, DbErr>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(res) => res.map_err(ServiceError::from),
            Err(_) => {
                warn!(op, timeout_ms = self.query_timeout.as_millis() as u64, "subscription query timed out");
                Err(ServiceError::Db(format!("{} timed out after {:?}", op, self.query_timeout)))
            }
        }
    }
}

impl From<subscription::Model> for Subscription {
    fn from(m: subscription::Model) -> Self {
        Subscription {
            id: m.id,
            service_name: m.service_name,
            price: m.price,
            user_id: m.user_id,
            start_date: m.start_date,
            end_date: m.end_date,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

fn apply_filters(mut finder: Select<SubscriptionEntity>, filters: &Filters) -> Select<SubscriptionEntity> {
    if let Some(uid) = filters.user_id {
        finder = finder.filter(Column::UserId.eq(uid));
    }
    if let Some(name) = &filters.service_name {
        finder = finder.filter(Column::ServiceName.eq(name.as_str()));
    }
    finder
}

#[async_trait::async_trait]
impl SubscriptionRepository for SeaOrmSubscriptionRepository {
    async fn create(&self, sub: &Subscription) -> Result<(), ServiceError> {
        let am = subscription::ActiveModel {
            id: Set(sub.id),
            service_name: Set(sub.service_name.clone()),
            price: Set(sub.price),
            user_id: Set(sub.user_id),
            start_date: Set(sub.start_date),
            end_date: Set(sub.end_date),
            created_at: Set(sub.created_at.into()),
            updated_at: Set(sub.updated_at.into()),
        };
        self.bounded("create", SubscriptionEntity::insert(am).exec(&self.db)).await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Subscription, ServiceError> {
        self.bounded("get", SubscriptionEntity::find_by_id(id).one(&self.db))
            .await?
            .map(Subscription::from)
            .ok_or_else(|| ServiceError::not_found("subscription"))
    }

    async fn update(&self, sub: &Subscription) -> Result<(), ServiceError> {
        let am = subscription::ActiveModel {
            id: NotSet,
            service_name: Set(sub.service_name.clone()),
            price: Set(sub.price),
            user_id: Set(sub.user_id),
            start_date: Set(sub.start_date),
            end_date: Set(sub.end_date),
            created_at: NotSet,
            updated_at: Set(sub.updated_at.into()),
        };
        let res = self
            .bounded(
                "update",
                SubscriptionEntity::update_many().set(am).filter(Column::Id.eq(sub.id)).exec(&self.db),
            )
            .await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("subscription"));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let res = self.bounded("delete", SubscriptionEntity::delete_by_id(id).exec(&self.db)).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("subscription"));
        }
        Ok(())
    }

    async fn list(&self, filters: &Filters, page: Page) -> Result<Vec<Subscription>, ServiceError> {
        let finder = apply_filters(SubscriptionEntity::find(), filters)
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(page.limit)
            .offset(page.offset);
        let rows = self.bounded("list", finder.all(&self.db)).await?;
        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    async fn total_cost_for_period(&self, from: NaiveDate, to: NaiveDate, filters: &Filters) -> Result<i64, ServiceError> {
        let query = apply_filters(SubscriptionEntity::find(), filters)
            .select_only()
            .column_as(Column::Price.sum(), "total")
            .filter(Column::StartDate.lte(to))
            .filter(Column::EndDate.gte(from))
            .into_tuple::<Option<i64>>();
        let total = self.bounded("total_cost_for_period", query.one(&self.db)).await?;
        Ok(total.flatten().unwrap_or(0))
    }
}
