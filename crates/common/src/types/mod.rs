use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

impl Health {
    pub fn ok() -> Self { Self { status: "ok" } }
}

/// Body of `GET /subscriptions/total`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Total {
    pub total: i64,
}
