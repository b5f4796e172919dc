use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use chrono::NaiveDate;
use service::subscription::SubscriptionService;
use service::subscription::domain::SubscriptionInput;
use service::subscription::repository::mock::MockSubscriptionRepository;

fn bench_sum_for_period(c: &mut Criterion) {
    let repo = Arc::new(MockSubscriptionRepository::default());
    let svc = SubscriptionService::new(repo.clone());
    let uid = uuid::Uuid::new_v4().to_string();
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

    // seed records outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    for i in 0..1_000 {
        let _ = rt.block_on(svc.create(SubscriptionInput {
            service_name: format!("service-{}", i % 10),
            price: 100 + i,
            user_id: uid.clone(),
            start_date: start,
            end_date: None,
        }));
    }

    let from = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
    let to = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
    c.bench_function("subscription_sum_for_period", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.sum_for_period(from, to, Some(&uid), Some("service-3"))).unwrap();
        });
    });
}

criterion_group!(benches, bench_sum_for_period);
criterion_main!(benches);
