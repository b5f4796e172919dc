use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct SubscriptionRequestDoc {
    pub service_name: String,
    /// Whole currency units, >= 0
    pub price: i32,
    pub user_id: Uuid,
    /// MM-YYYY
    #[schema(example = "07-2025")]
    pub start_date: String,
    /// MM-YYYY; defaults to start + 30 days
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

#[derive(ToSchema)]
pub struct SubscriptionDoc {
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    #[schema(example = "2025-07-01")]
    pub start_date: String,
    #[schema(example = "2025-07-31")]
    pub end_date: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(ToSchema)]
pub struct TotalDoc { pub total: i64 }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::subscriptions::create,
        crate::routes::subscriptions::list,
        crate::routes::subscriptions::total,
        crate::routes::subscriptions::get,
        crate::routes::subscriptions::update,
        crate::routes::subscriptions::delete,
    ),
    components(
        schemas(
            HealthResponse,
            SubscriptionRequestDoc,
            SubscriptionDoc,
            TotalDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "subscriptions")
    )
)]
pub struct ApiDoc;
