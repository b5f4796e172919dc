use std::sync::Arc;

use axum::{routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;
use service::subscription::repository::SubscriptionRepository;
use service::subscription::SubscriptionService;

use crate::openapi::ApiDoc;

pub mod subscriptions;

/// Shared handler state.
#[derive(Clone)]
pub struct ServerState {
    pub subscriptions: Arc<SubscriptionService<dyn SubscriptionRepository>>,
}

impl ServerState {
    pub fn new(repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions: Arc::new(SubscriptionService::new(repo)) }
    }
}

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json));

    // static `/subscriptions/total` wins over `/:id` in the matcher
    let subs = Router::new()
        .route("/subscriptions", get(subscriptions::list).post(subscriptions::create))
        .route("/subscriptions/total", get(subscriptions::total))
        .route(
            "/subscriptions/:id",
            get(subscriptions::get).put(subscriptions::update).delete(subscriptions::delete),
        )
        .with_state(state);

    public
        .merge(subs)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use service::subscription::repository::mock::MockSubscriptionRepository;
    use tower::ServiceExt;

    fn app() -> Router {
        let repo: Arc<dyn SubscriptionRepository> = Arc::new(MockSubscriptionRepository::default());
        build_router(ServerState::new(repo), CorsLayer::very_permissive())
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { serde_json::Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }

    #[tokio::test]
    async fn health_ok() {
        let (status, body) = call(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn openapi_lists_subscription_paths() {
        let (status, body) = call(&app(), Method::GET, "/api-docs/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/subscriptions"].is_object());
        assert!(body["paths"]["/subscriptions/total"].is_object());
        assert!(body["paths"]["/subscriptions/{id}"].is_object());
    }

    #[tokio::test]
    async fn create_get_delete_flow() {
        let app = app();
        let user = uuid::Uuid::new_v4().to_string();
        let (status, created) = call(
            &app,
            Method::POST,
            "/subscriptions",
            Some(serde_json::json!({"service_name": "Yandex Plus", "price": 400, "user_id": user, "start_date": "07-2025"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["start_date"], "2025-07-01");
        assert_eq!(created["end_date"], "2025-07-31");
        let id = created["id"].as_str().unwrap().to_string();

        let (status, got) = call(&app, Method::GET, &format!("/subscriptions/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(got, created);

        let (status, _) = call(&app, Method::DELETE, &format!("/subscriptions/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = call(&app, Method::GET, &format!("/subscriptions/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not Found");
    }

    #[tokio::test]
    async fn malformed_id_is_400() {
        let (status, body) = call(&app(), Method::GET, "/subscriptions/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "id must be uuid");
    }

    #[tokio::test]
    async fn total_requires_both_bounds() {
        let (status, _) = call(&app(), Method::GET, "/subscriptions/total?from=2025-01-01", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, body) = call(&app(), Method::GET, "/subscriptions/total?from=2025-01-01&to=2025-12-31", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn invalid_json_is_400() {
        let app = app();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/subscriptions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_is_400_with_detail() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/subscriptions")
            .body(Body::from(r#"{"service_name":"X","price":1,"user_id":"u","start_date":"01-2025"}"#))
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["detail"].as_str().unwrap().starts_with("invalid JSON"));
    }
}
