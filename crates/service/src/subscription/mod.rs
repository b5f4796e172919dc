//! Subscription records: domain types, repository abstraction, business service.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::SubscriptionService;
