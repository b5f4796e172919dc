//! Service layer for subscription records.
//! - Validates and defaults input before anything reaches storage.
//! - Storage is behind the `SubscriptionRepository` trait (SeaORM or in-memory).
//! - Errors are typed by kind: invalid input, not found, storage failure.

pub mod errors;
pub mod pagination;
pub mod subscription;
#[cfg(test)]
pub mod test_support;
