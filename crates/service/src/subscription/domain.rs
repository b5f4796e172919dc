use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pagination::Pagination;

/// Length of the default term applied when no end date is supplied.
pub const DEFAULT_TERM_DAYS: i64 = 30;

/// Stored subscription (business view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Inclusive interval overlap: `start_date <= to && end_date >= from`.
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start_date <= to && self.end_date >= from
    }
}

/// Input for create and full-replace update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionInput {
    pub service_name: String,
    pub price: i32,
    pub user_id: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Caller-facing list filter; `user_id` is still unparsed here.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub page: Pagination,
}

/// Validated equality filters shared by list and period totals.
/// `None` matches any value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}

impl Filters {
    pub fn matches(&self, s: &Subscription) -> bool {
        self.user_id.map_or(true, |u| s.user_id == u)
            && self.service_name.as_deref().map_or(true, |n| s.service_name == n)
    }
}

/// `start + 30 days`.
pub fn default_end_date(start: NaiveDate) -> NaiveDate {
    start + Duration::days(DEFAULT_TERM_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

    fn sub(start: NaiveDate, end: NaiveDate) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: Uuid::new_v4(),
            service_name: "Netflix".into(),
            price: 499,
            user_id: Uuid::new_v4(),
            start_date: start,
            end_date: end,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn default_term_is_thirty_days() {
        assert_eq!(default_end_date(ymd(2025, 10, 1)), ymd(2025, 10, 31));
        assert_eq!(default_end_date(ymd(2025, 2, 1)), ymd(2025, 3, 3));
        assert_eq!(default_end_date(ymd(2024, 12, 1)), ymd(2024, 12, 31));
    }

    #[test]
    fn overlap_counts_contained_window() {
        let s = sub(ymd(2025, 1, 1), ymd(2025, 2, 1));
        assert!(s.overlaps(ymd(2025, 1, 15), ymd(2025, 1, 20)));
    }

    #[test]
    fn overlap_counts_partial_window_across_end() {
        let s = sub(ymd(2025, 1, 1), ymd(2025, 2, 1));
        assert!(s.overlaps(ymd(2025, 1, 25), ymd(2025, 2, 15)));
    }

    #[test]
    fn overlap_excludes_window_after_end() {
        let s = sub(ymd(2025, 1, 1), ymd(2025, 2, 1));
        assert!(!s.overlaps(ymd(2025, 2, 2), ymd(2025, 3, 1)));
    }

    #[test]
    fn overlap_is_inclusive_on_both_edges() {
        let s = sub(ymd(2025, 1, 1), ymd(2025, 2, 1));
        assert!(s.overlaps(ymd(2025, 2, 1), ymd(2025, 2, 1)));
        assert!(s.overlaps(ymd(2024, 12, 1), ymd(2025, 1, 1)));
        assert!(!s.overlaps(ymd(2024, 12, 1), ymd(2024, 12, 31)));
    }

    #[test]
    fn empty_filters_match_everything() {
        let s = sub(ymd(2025, 1, 1), ymd(2025, 2, 1));
        assert!(Filters::default().matches(&s));
    }

    #[test]
    fn filters_are_anded() {
        let s = sub(ymd(2025, 1, 1), ymd(2025, 2, 1));
        let both = Filters { user_id: Some(s.user_id), service_name: Some("Netflix".into()) };
        assert!(both.matches(&s));
        let wrong_name = Filters { user_id: Some(s.user_id), service_name: Some("Spotify".into()) };
        assert!(!wrong_name.matches(&s));
        let wrong_user = Filters { user_id: Some(Uuid::new_v4()), service_name: None };
        assert!(!wrong_user.matches(&s));
    }
}
