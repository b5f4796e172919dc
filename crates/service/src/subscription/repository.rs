use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::domain::{Filters, Subscription};
use crate::errors::ServiceError;
use crate::pagination::Page;

/// Persistence for subscriptions, keyed by id.
///
/// Absence is reported as `ServiceError::NotFound`; every other failure is
/// `ServiceError::Db`.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn create(&self, sub: &Subscription) -> Result<(), ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Subscription, ServiceError>;
    /// Replace all mutable columns; `NotFound` if no row was affected.
    async fn update(&self, sub: &Subscription) -> Result<(), ServiceError>;
    /// Hard delete; `NotFound` if no row was affected.
    async fn delete(&self, id: Uuid) -> Result<(), ServiceError>;
    /// Newest `created_at` first.
    async fn list(&self, filters: &Filters, page: Page) -> Result<Vec<Subscription>, ServiceError>;
    /// Sum of `price` over rows with `start_date <= to AND end_date >= from`.
    async fn total_cost_for_period(&self, from: NaiveDate, to: NaiveDate, filters: &Filters) -> Result<i64, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockSubscriptionRepository {
        rows: Mutex<Vec<Subscription>>, // insertion order
        fail_with: Option<String>,
    }

    impl MockSubscriptionRepository {
        /// A repository whose every call fails with `ServiceError::Db(msg)`.
        pub fn failing(msg: &str) -> Self {
            Self { rows: Mutex::new(Vec::new()), fail_with: Some(msg.to_string()) }
        }

        pub fn len(&self) -> usize { self.rows.lock().unwrap().len() }

        pub fn is_empty(&self) -> bool { self.len() == 0 }

        fn check(&self) -> Result<(), ServiceError> {
            match &self.fail_with {
                Some(msg) => Err(ServiceError::Db(msg.clone())),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl SubscriptionRepository for MockSubscriptionRepository {
        async fn create(&self, sub: &Subscription) -> Result<(), ServiceError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|r| r.id == sub.id) {
                return Err(ServiceError::Db(format!("duplicate key: {}", sub.id)));
            }
            rows.push(sub.clone());
            Ok(())
        }

        async fn get(&self, id: Uuid) -> Result<Subscription, ServiceError> {
            self.check()?;
            let rows = self.rows.lock().unwrap();
            rows.iter().find(|r| r.id == id).cloned().ok_or_else(|| ServiceError::not_found("subscription"))
        }

        async fn update(&self, sub: &Subscription) -> Result<(), ServiceError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            let Some(row) = rows.iter_mut().find(|r| r.id == sub.id) else {
                return Err(ServiceError::not_found("subscription"));
            };
            // created_at is never written by an update
            let created_at = row.created_at;
            *row = Subscription { created_at, ..sub.clone() };
            Ok(())
        }

        async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.id != id);
            if rows.len() == before {
                return Err(ServiceError::not_found("subscription"));
            }
            Ok(())
        }

        async fn list(&self, filters: &Filters, page: Page) -> Result<Vec<Subscription>, ServiceError> {
            self.check()?;
            let rows = self.rows.lock().unwrap();
            // newest insert first, then a stable sort keeps that order for equal timestamps
            let mut out: Vec<Subscription> = rows.iter().rev().filter(|r| filters.matches(r)).cloned().collect();
            out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(out.into_iter().skip(page.offset as usize).take(page.limit as usize).collect())
        }

        async fn total_cost_for_period(&self, from: NaiveDate, to: NaiveDate, filters: &Filters) -> Result<i64, ServiceError> {
            self.check()?;
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|r| r.overlaps(from, to) && filters.matches(r))
                .map(|r| i64::from(r.price))
                .sum())
        }
    }
}
