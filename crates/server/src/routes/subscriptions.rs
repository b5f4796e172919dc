use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::types::Total;
use models::subscription::parse_month_year;
use service::pagination::Pagination;
use service::subscription::domain::{ListFilter, Subscription, SubscriptionInput};

use crate::errors::JsonApiError;
use crate::routes::ServerState;

/// Create/update body. Dates are `MM-YYYY`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SubscriptionRequest {
    pub service_name: String,
    pub price: i32,
    pub user_id: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl SubscriptionRequest {
    fn into_input(self) -> Result<SubscriptionInput, JsonApiError> {
        let start_date = parse_month_year(&self.start_date)
            .map_err(|_| JsonApiError::bad_request("start_date must be MM-YYYY"))?;
        let end_date = self
            .end_date
            .as_deref()
            .map(parse_month_year)
            .transpose()
            .map_err(|_| JsonApiError::bad_request("end_date must be MM-YYYY"))?;
        Ok(SubscriptionInput {
            service_name: self.service_name,
            price: self.price,
            user_id: self.user_id,
            start_date,
            end_date,
        })
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    /// 1..=1000, default 50
    pub limit: Option<String>,
    /// >= 0, default 0
    pub offset: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TotalQuery {
    /// YYYY-MM-DD
    pub from: Option<String>,
    /// YYYY-MM-DD
    pub to: Option<String>,
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

/// Empty query values mean "no filter".
fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

fn parse_id(raw: &str) -> Result<Uuid, JsonApiError> {
    Uuid::parse_str(raw).map_err(|_| JsonApiError::bad_request("id must be uuid"))
}

fn parse_body(payload: Result<Json<SubscriptionRequest>, JsonRejection>) -> Result<SubscriptionInput, JsonApiError> {
    let Json(req) = payload.map_err(|e| JsonApiError::bad_request(format!("invalid JSON: {}", e.body_text())))?;
    req.into_input()
}

fn parse_day(raw: &str, field: &str) -> Result<NaiveDate, JsonApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| JsonApiError::bad_request(format!("{} must be YYYY-MM-DD", field)))
}

#[utoipa::path(
    post, path = "/subscriptions", tag = "subscriptions",
    request_body = crate::openapi::SubscriptionRequestDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::SubscriptionDoc),
        (status = 400, description = "Validation Error"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Result<Response, JsonApiError> {
    let input = parse_body(payload)?;
    let created = state.subscriptions.create(input).await?;
    let location = format!("/subscriptions/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)).into_response())
}

#[utoipa::path(
    get, path = "/subscriptions", tag = "subscriptions",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK", body = [crate::openapi::SubscriptionDoc]),
        (status = 400, description = "Validation Error"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<Vec<Subscription>>, JsonApiError> {
    let page = Pagination::new(
        q.limit.as_deref().and_then(|l| l.trim().parse().ok()),
        q.offset.as_deref().and_then(|o| o.trim().parse().ok()),
    );
    let filter = ListFilter { user_id: non_empty(q.user_id), service_name: non_empty(q.service_name), page };
    let subs = state.subscriptions.list(filter).await?;
    Ok(Json(subs))
}

#[utoipa::path(
    get, path = "/subscriptions/total", tag = "subscriptions",
    params(TotalQuery),
    responses(
        (status = 200, description = "Total cost of overlapping subscriptions", body = crate::openapi::TotalDoc),
        (status = 400, description = "Validation Error"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn total(State(state): State<ServerState>, Query(q): Query<TotalQuery>) -> Result<Json<Total>, JsonApiError> {
    let (Some(from), Some(to)) = (non_empty(q.from), non_empty(q.to)) else {
        return Err(JsonApiError::bad_request("`from` and `to` required"));
    };
    let from = parse_day(&from, "from")?;
    let to = parse_day(&to, "to")?;
    let user_id = non_empty(q.user_id);
    let service_name = non_empty(q.service_name);
    let total = state
        .subscriptions
        .sum_for_period(from, to, user_id.as_deref(), service_name.as_deref())
        .await?;
    Ok(Json(Total { total }))
}

#[utoipa::path(
    get, path = "/subscriptions/{id}", tag = "subscriptions",
    params(("id" = Uuid, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::SubscriptionDoc),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Subscription>, JsonApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.subscriptions.get_by_id(id).await?))
}

#[utoipa::path(
    put, path = "/subscriptions/{id}", tag = "subscriptions",
    params(("id" = Uuid, Path, description = "Subscription ID")),
    request_body = crate::openapi::SubscriptionRequestDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::SubscriptionDoc),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Result<Json<Subscription>, JsonApiError> {
    let id = parse_id(&id)?;
    let input = parse_body(payload)?;
    Ok(Json(state.subscriptions.update(id, input).await?))
}

#[utoipa::path(
    delete, path = "/subscriptions/{id}", tag = "subscriptions",
    params(("id" = Uuid, Path, description = "Subscription ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Result<StatusCode, JsonApiError> {
    let id = parse_id(&id)?;
    state.subscriptions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start: &str, end: Option<&str>) -> SubscriptionRequest {
        SubscriptionRequest {
            service_name: "Netflix".into(),
            price: 499,
            user_id: Uuid::new_v4().to_string(),
            start_date: start.into(),
            end_date: end.map(str::to_string),
        }
    }

    #[test]
    fn month_year_body_becomes_first_of_month_dates() {
        let input = request("10-2025", Some("12-2025")).into_input().unwrap();
        assert_eq!(input.start_date, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
        assert_eq!(input.end_date, NaiveDate::from_ymd_opt(2025, 12, 1));
    }

    #[test]
    fn bad_start_date_is_rejected() {
        let err = request("2025-10-01", None).into_input().unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.detail.as_deref(), Some("start_date must be MM-YYYY"));
    }

    #[test]
    fn bad_end_date_is_rejected() {
        let err = request("10-2025", Some("oct")).into_input().unwrap_err();
        assert_eq!(err.detail.as_deref(), Some("end_date must be MM-YYYY"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<SubscriptionRequest, _> = serde_json::from_value(serde_json::json!({
            "service_name": "Netflix", "price": 1, "user_id": "x", "start_date": "01-2025", "extra": true
        }));
        assert!(res.is_err());
    }

    #[test]
    fn empty_query_values_are_no_filter() {
        assert_eq!(non_empty(Some("".into())), None);
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some("Netflix".into())), Some("Netflix".into()));
    }

    #[test]
    fn day_parsing_is_strict_iso() {
        assert!(parse_day("2025-01-15", "from").is_ok());
        assert!(parse_day("15-01-2025", "from").is_err());
    }
}
