//! HTTP request handlers for the timesheet API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{months_back, period_summary, trend_report};
use crate::error::{EngineError, EngineResult};
use crate::models::{CompensationPolicy, DayRecord};
use crate::store::{POLICY_SETTINGS_KEY, Settings, Storage};

use super::request::{SummaryQuery, TrendsQuery};
use super::response::{ApiError, ApiErrorResponse, PingResponse, SaveResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/work-days", get(get_work_days).post(save_work_days))
        .route("/settings", get(get_settings).post(save_settings))
        .route("/ping", get(ping))
        .route("/summary", get(summary))
        .route("/trends", get(trends))
        .with_state(state)
}

/// Runs a storage call off the async executor.
async fn with_storage<T, F>(state: &AppState, call: F) -> EngineResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn Storage) -> EngineResult<T> + Send + 'static,
{
    let storage = state.storage();
    tokio::task::spawn_blocking(move || call(storage.as_ref()))
        .await
        .map_err(|e| EngineError::Storage {
            message: format!("storage task failed: {}", e),
        })?
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, error.error)
}

fn engine_error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    error_response(err.into())
}

/// Maps a body extraction failure to a 400 response.
fn json_rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            ApiError::validation_error(body_text)
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    error_response(ApiErrorResponse::bad_request(error))
}

fn query_rejection_response(correlation_id: Uuid, rejection: QueryRejection) -> Response {
    let body_text = rejection.body_text();
    warn!(
        correlation_id = %correlation_id,
        error = %body_text,
        "Invalid query string"
    );
    error_response(ApiErrorResponse::bad_request(ApiError::validation_error(
        body_text,
    )))
}

/// Handler for GET /work-days.
async fn get_work_days(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();

    match with_storage(&state, |storage| storage.load_work_days()).await {
        Ok(records) => {
            info!(
                correlation_id = %correlation_id,
                count = records.len(),
                "Work days loaded"
            );
            json_response(StatusCode::OK, records)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /work-days.
///
/// Replaces the whole collection with the posted array.
async fn save_work_days(
    State(state): State<AppState>,
    payload: Result<Json<Vec<DayRecord>>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let records = match payload {
        Ok(Json(records)) => records,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let received = records.len();
    let start_time = Instant::now();
    match with_storage(&state, move |storage| storage.replace_work_days(records)).await {
        Ok(saved) => {
            info!(
                correlation_id = %correlation_id,
                received,
                saved,
                duration_us = start_time.elapsed().as_micros(),
                "Work days replaced"
            );
            json_response(StatusCode::OK, SaveResponse { saved })
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /settings.
async fn get_settings(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();

    match with_storage(&state, |storage| storage.load_settings()).await {
        Ok(settings) => json_response(StatusCode::OK, settings),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /settings.
///
/// Merges the posted keys into the stored document. A `compensationPolicy`
/// key must hold a valid policy.
async fn save_settings(
    State(state): State<AppState>,
    payload: Result<Json<Settings>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let patch = match payload {
        Ok(Json(patch)) => patch,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    if let Some(policy) = patch.get(POLICY_SETTINGS_KEY) {
        let checked = serde_json::from_value::<CompensationPolicy>(policy.clone())
            .map_err(|e| EngineError::InvalidPolicy {
                field: POLICY_SETTINGS_KEY.to_string(),
                message: e.to_string(),
            })
            .and_then(|policy| policy.validate());
        if let Err(err) = checked {
            return engine_error_response(correlation_id, err);
        }
    }

    let keys = patch.len();
    match with_storage(&state, move |storage| storage.merge_settings(patch)).await {
        Ok(settings) => {
            info!(correlation_id = %correlation_id, keys, "Settings merged");
            json_response(StatusCode::OK, settings)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /ping.
async fn ping(State(state): State<AppState>) -> Response {
    let db_connected = with_storage(&state, |storage| Ok(storage.is_healthy()))
        .await
        .unwrap_or(false);
    json_response(StatusCode::OK, PingResponse::new(db_connected))
}

/// Handler for GET /summary.
async fn summary(
    State(state): State<AppState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejection_response(correlation_id, rejection),
    };
    let month = match query.month() {
        Ok(month) => month.map(|m| m.prefix()),
        Err(error) => return error_response(ApiErrorResponse::bad_request(error)),
    };

    let loaded = with_storage(&state, |storage| {
        Ok((storage.load_work_days()?, storage.load_settings()?))
    })
    .await;
    let (records, settings) = match loaded {
        Ok(loaded) => loaded,
        Err(err) => return engine_error_response(correlation_id, err),
    };

    let start_time = Instant::now();
    let policy = state.effective_policy(&settings);
    let summary = period_summary(&records, month.as_deref(), &policy);
    info!(
        correlation_id = %correlation_id,
        month = month.as_deref().unwrap_or("all"),
        records = summary.record_count,
        duration_us = start_time.elapsed().as_micros(),
        "Summary computed"
    );
    json_response(StatusCode::OK, summary)
}

/// Handler for GET /trends.
async fn trends(
    State(state): State<AppState>,
    query: Result<Query<TrendsQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejection_response(correlation_id, rejection),
    };
    let months = match query.months() {
        Ok(months) => months,
        Err(error) => return error_response(ApiErrorResponse::bad_request(error)),
    };

    let loaded = with_storage(&state, |storage| {
        Ok((storage.load_work_days()?, storage.load_settings()?))
    })
    .await;
    let (records, settings) = match loaded {
        Ok(loaded) => loaded,
        Err(err) => return engine_error_response(correlation_id, err),
    };

    let start_time = Instant::now();
    let policy = state.effective_policy(&settings);
    let window = months_back(months as usize, state.today());
    let report = trend_report(&records, &window, &policy);
    info!(
        correlation_id = %correlation_id,
        months,
        insights = report.insights.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Trend report computed"
    );
    json_response(StatusCode::OK, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::store::MemoryStorage;
    use axum::{body::Body, http::Request};
    use chrono::NaiveDate;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn make_record(id: i64, date: &str, clock_in: &str, clock_out: &str) -> DayRecord {
        DayRecord {
            id,
            date: date.to_string(),
            clock_in: clock_in.to_string(),
            break_out: String::new(),
            break_in: String::new(),
            clock_out: clock_out.to_string(),
            is_saturday: false,
        }
    }

    fn create_test_state(storage: Arc<MemoryStorage>) -> AppState {
        let config = ConfigLoader::load("./config/default").expect("Failed to load config");
        AppState::new(config, storage).with_today(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    async fn send(
        router: Router,
        method: &str,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(body) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = router
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_get_work_days_returns_stored_order() {
        let storage = Arc::new(MemoryStorage::with_records(vec![
            make_record(2, "2024-06-02", "08:00", "17:00"),
            make_record(1, "2024-06-01", "08:00", "17:00"),
        ]));
        let router = create_router(create_test_state(storage));

        let (status, body) = send(router, "GET", "/work-days", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], 2);
        assert_eq!(body[1]["id"], 1);
        assert_eq!(body[0]["clockIn"], "08:00");
    }

    #[tokio::test]
    async fn test_post_work_days_replaces_and_dedupes() {
        let storage = Arc::new(MemoryStorage::with_records(vec![make_record(
            9,
            "2024-05-01",
            "08:00",
            "17:00",
        )]));
        let router = create_router(create_test_state(Arc::clone(&storage)));

        let body = json!([
            {"id": 1, "date": "2024-06-01", "clockIn": "08:00", "clockOut": "17:00"},
            {"id": 1, "date": "2024-06-09"},
            {"id": 2, "date": "2024-06-02", "isSaturday": true}
        ]);
        let (status, response) = send(router, "POST", "/work-days", Some(&body.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response, json!({"saved": 2}));

        let stored = storage.load_work_days().unwrap();
        let ids: Vec<i64> = stored.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(stored[0].date, "2024-06-01");
        assert!(stored[1].is_saturday);
    }

    #[tokio::test]
    async fn test_post_work_days_rejects_non_array() {
        let storage = Arc::new(MemoryStorage::new());
        let router = create_router(create_test_state(storage));

        let (status, body) = send(router, "POST", "/work-days", Some("{\"id\": 1}")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_post_work_days_malformed_json() {
        let storage = Arc::new(MemoryStorage::new());
        let router = create_router(create_test_state(storage));

        let (status, body) = send(router, "POST", "/work-days", Some("[{invalid")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_settings_merge() {
        let storage = Arc::new(MemoryStorage::new());
        let state = create_test_state(storage);

        let (status, _) = send(
            create_router(state.clone()),
            "POST",
            "/settings",
            Some(r#"{"theme": "dark", "locale": "pt-BR"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, merged) = send(
            create_router(state.clone()),
            "POST",
            "/settings",
            Some(r#"{"theme": "light"}"#),
        )
        .await;
        assert_eq!(merged, json!({"theme": "light", "locale": "pt-BR"}));

        let (_, loaded) = send(create_router(state), "GET", "/settings", None).await;
        assert_eq!(loaded, merged);
    }

    #[tokio::test]
    async fn test_settings_rejects_invalid_policy() {
        let storage = Arc::new(MemoryStorage::new());
        let router = create_router(create_test_state(Arc::clone(&storage)));

        let (status, body) = send(
            router,
            "POST",
            "/settings",
            Some(r#"{"compensationPolicy": {"standardDailyMinutes": 0}}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_POLICY");
        assert!(storage.load_settings().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ping_reports_storage_health() {
        let storage = Arc::new(MemoryStorage::new());
        let state = create_test_state(Arc::clone(&storage));

        let (status, body) = send(create_router(state.clone()), "GET", "/ping", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok", "dbConnected": true}));

        storage.set_healthy(false);
        let (status, body) = send(create_router(state), "GET", "/ping", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dbConnected"], false);
    }

    #[tokio::test]
    async fn test_summary_for_month() {
        let storage = Arc::new(MemoryStorage::with_records(vec![
            make_record(1, "2024-06-03", "08:00", "17:00"),
            make_record(2, "2024-06-04", "08:00", "16:00"),
            make_record(3, "2024-05-31", "08:00", "20:00"),
        ]));
        let router = create_router(create_test_state(storage));

        let (status, body) = send(router, "GET", "/summary?month=2024-06", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["month"], "2024-06");
        assert_eq!(body["recordCount"], 2);
        assert_eq!(body["totals"]["total"], 1020);
        assert_eq!(body["totals"]["overtime"], 12);
        assert_eq!(body["totals"]["deficit"], 48);
        assert_eq!(body["workingDays"], 20);
        assert_eq!(body["balance"]["kind"], "debt");
    }

    #[tokio::test]
    async fn test_summary_uses_stored_policy() {
        let storage = Arc::new(MemoryStorage::with_records(vec![make_record(
            1,
            "2024-06-03",
            "08:00",
            "17:00",
        )]));
        let mut patch = Settings::new();
        patch.insert(
            POLICY_SETTINGS_KEY.to_string(),
            json!({"standardDailyMinutes": 480}),
        );
        storage.merge_settings(patch).unwrap();
        let router = create_router(create_test_state(storage));

        let (_, body) = send(router, "GET", "/summary?month=2024-06", None).await;

        assert_eq!(body["totals"]["overtime"], 60);
    }

    #[tokio::test]
    async fn test_summary_rejects_bad_month() {
        let storage = Arc::new(MemoryStorage::new());
        let router = create_router(create_test_state(storage));

        let (status, body) = send(router, "GET", "/summary?month=June", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_trends_window() {
        let storage = Arc::new(MemoryStorage::with_records(vec![
            make_record(1, "2024-05-02", "08:00", "17:00"),
            make_record(2, "2024-06-03", "08:00", "17:00"),
        ]));
        let router = create_router(create_test_state(storage));

        let (status, body) = send(router, "GET", "/trends?months=3", None).await;

        assert_eq!(status, StatusCode::OK);
        let months: Vec<&str> = body["months"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["month"].as_str().unwrap())
            .collect();
        assert_eq!(months, vec!["2024-04", "2024-05", "2024-06"]);
        assert_eq!(body["insights"][0]["kind"], "positive_balance");
    }

    #[tokio::test]
    async fn test_trends_rejects_out_of_range() {
        let storage = Arc::new(MemoryStorage::new());
        let state = create_test_state(storage);

        let (status, _) = send(create_router(state.clone()), "GET", "/trends?months=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(create_router(state), "GET", "/trends?months=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}
