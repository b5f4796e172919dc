use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, SubsecRound, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use models::subscription as rules;

use super::domain::{default_end_date, Filters, ListFilter, Subscription, SubscriptionInput};
use super::repository::SubscriptionRepository;
use crate::errors::ServiceError;

/// Fields that passed validation, ready to be written.
struct Validated {
    service_name: String,
    price: i32,
    user_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

fn validate(input: SubscriptionInput) -> Result<Validated, ServiceError> {
    rules::validate_service_name(&input.service_name)?;
    rules::validate_price(input.price)?;
    let user_id = rules::parse_user_id(&input.user_id)?;
    let start_date = rules::first_of_month(input.start_date);
    let end_date = match input.end_date {
        Some(end) if end < start_date => {
            return Err(ServiceError::invalid("end_date must be >= start_date"));
        }
        Some(end) => end,
        None => default_end_date(start_date),
    };
    Ok(Validated {
        service_name: input.service_name.trim().to_string(),
        price: input.price,
        user_id,
        start_date,
        end_date,
    })
}

fn parse_filters(user_id: Option<&str>, service_name: Option<&str>) -> Result<Filters, ServiceError> {
    let user_id = user_id.map(rules::parse_user_id).transpose()?;
    // stored names are trimmed, so filters must be too
    let service_name = service_name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
    Ok(Filters { user_id, service_name })
}

/// Current time at the storage precision (microseconds).
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Application service encapsulating subscription business rules.
/// Validation and defaulting happen here; persistence is delegated to `R`.
pub struct SubscriptionService<R: SubscriptionRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: SubscriptionRepository + ?Sized> SubscriptionService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Validate, default the end date, assign id and timestamps, persist.
    ///
    /// # Examples
    /// ```
    /// use service::subscription::{SubscriptionService, domain::SubscriptionInput, repository::mock::MockSubscriptionRepository};
    /// use chrono::NaiveDate;
    /// use std::sync::Arc;
    /// let svc = SubscriptionService::new(Arc::new(MockSubscriptionRepository::default()));
    /// let input = SubscriptionInput {
    ///     service_name: "Netflix".into(),
    ///     price: 499,
    ///     user_id: uuid::Uuid::new_v4().to_string(),
    ///     start_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
    ///     end_date: None,
    /// };
    /// let sub = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert_eq!(sub.end_date, NaiveDate::from_ymd_opt(2025, 10, 31).unwrap());
    /// ```
    #[instrument(skip(self, input), fields(service_name = %input.service_name))]
    pub async fn create(&self, input: SubscriptionInput) -> Result<Subscription, ServiceError> {
        let v = validate(input)?;
        let now = now();
        let sub = Subscription {
            id: Uuid::new_v4(),
            service_name: v.service_name,
            price: v.price,
            user_id: v.user_id,
            start_date: v.start_date,
            end_date: v.end_date,
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&sub).await?;
        info!(
            id = %sub.id,
            user_id = %sub.user_id,
            service_name = %sub.service_name,
            price = sub.price,
            start_date = %sub.start_date,
            end_date = %sub.end_date,
            "subscription_created"
        );
        Ok(sub)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Subscription, ServiceError> { self.repo.get(id).await }

    /// Full replace of every mutable field; `id` and `created_at` are kept.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: SubscriptionInput) -> Result<Subscription, ServiceError> {
        let existing = self.repo.get(id).await?;
        let v = validate(input)?;
        let mut updated_at = now();
        if updated_at <= existing.updated_at {
            updated_at = existing.updated_at + Duration::microseconds(1);
        }
        let sub = Subscription {
            id: existing.id,
            service_name: v.service_name,
            price: v.price,
            user_id: v.user_id,
            start_date: v.start_date,
            end_date: v.end_date,
            created_at: existing.created_at,
            updated_at,
        };
        self.repo.update(&sub).await?;
        info!(id = %sub.id, user_id = %sub.user_id, service_name = %sub.service_name, price = sub.price, "subscription_updated");
        Ok(sub)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.repo.delete(id).await?;
        info!(id = %id, "subscription_deleted");
        Ok(())
    }

    /// Filtered page, newest first. No match is an empty list.
    pub async fn list(&self, filter: ListFilter) -> Result<Vec<Subscription>, ServiceError> {
        let filters = parse_filters(filter.user_id.as_deref(), filter.service_name.as_deref())?;
        let page = filter.page.normalize();
        let rows = self.repo.list(&filters, page).await?;
        debug!(count = rows.len(), limit = page.limit, offset = page.offset, "subscriptions_listed");
        Ok(rows)
    }

    /// Total `price` of subscriptions overlapping `[from, to]` (inclusive on both ends).
    #[instrument(skip(self))]
    pub async fn sum_for_period(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        user_id: Option<&str>,
        service_name: Option<&str>,
    ) -> Result<i64, ServiceError> {
        if to < from {
            return Err(ServiceError::invalid("'to' must not be before 'from'"));
        }
        let filters = parse_filters(user_id, service_name)?;
        self.repo.total_cost_for_period(from, to, &filters).await
    }
}
