//! Admin Lambda - usage analytics for the dashboard.
//!
//! Endpoints:
//! - GET /admin_stats - Today's visits/requests plus 7-day series
//! - GET /ai_report - 7-day conversation aggregates
//!
//! Both are gated by the session admin flag, which is only ever set by
//! the in-chat credential probe. There is no separate admin login.

use chrono::NaiveDate;
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use shared::http::{error_response, json_response, session_id};
use shared::SessionStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VisitPoint {
    visit_date: String,
    visit_count: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestPoint {
    request_date: String,
    total_requests: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminStatsResponse {
    today_visits: i32,
    today_requests: i64,
    visits_data: Vec<VisitPoint>,
    requests_data: Vec<RequestPoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportPoint {
    date: String,
    total_conversations: i64,
    avg_user_input_length: f64,
    avg_ai_response_length: f64,
}

/// Application state
struct AppState {
    db_pool: PgPool,
    sessions: SessionStore,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let (_config, db_pool) = shared::db::connect_from_env()
            .await
            .map_err(|e| format!("Failed to initialize state: {}", e))?;

        Ok(Self {
            sessions: SessionStore::new(db_pool.clone()),
            db_pool,
        })
    }
}

async fn admin_stats(state: &AppState) -> Result<Response<Body>, Error> {
    let today_visits: Option<i32> = sqlx::query_scalar(
        "SELECT visit_count FROM website_visits WHERE visit_date = CURRENT_DATE",
    )
    .fetch_optional(&state.db_pool)
    .await
    .unwrap_or_else(|e| {
        error!("Failed to fetch today's visits: {}", e);
        None
    });

    let today_requests: Option<i64> = sqlx::query_scalar(
        "SELECT SUM(request_count)::int8 FROM document_request_stats \
         WHERE request_date = CURRENT_DATE",
    )
    .fetch_one(&state.db_pool)
    .await
    .unwrap_or_else(|e| {
        error!("Failed to fetch today's requests: {}", e);
        None
    });

    let visits: Vec<(NaiveDate, i32)> = match sqlx::query_as(
        "SELECT visit_date, visit_count FROM website_visits \
         ORDER BY visit_date DESC LIMIT 7",
    )
    .fetch_all(&state.db_pool)
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to fetch visit series: {}", e);
            return error_response(500, "Failed to fetch stats");
        }
    };

    let requests: Vec<(NaiveDate, Option<i64>)> = match sqlx::query_as(
        "SELECT request_date, SUM(request_count)::int8 FROM document_request_stats \
         GROUP BY request_date ORDER BY request_date DESC LIMIT 7",
    )
    .fetch_all(&state.db_pool)
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to fetch request series: {}", e);
            return error_response(500, "Failed to fetch stats");
        }
    };

    let response = AdminStatsResponse {
        today_visits: today_visits.unwrap_or(0),
        today_requests: today_requests.unwrap_or(0),
        visits_data: visits
            .into_iter()
            .map(|(visit_date, visit_count)| VisitPoint {
                visit_date: visit_date.to_string(),
                visit_count,
            })
            .collect(),
        requests_data: requests
            .into_iter()
            .map(|(request_date, total)| RequestPoint {
                request_date: request_date.to_string(),
                total_requests: total.unwrap_or(0),
            })
            .collect(),
    };

    json_response(200, &response)
}

async fn ai_report(state: &AppState) -> Result<Response<Body>, Error> {
    let rows: Vec<(NaiveDate, i64, Option<f64>, Option<f64>)> = match sqlx::query_as(
        r#"
        SELECT created_at::date AS date,
               COUNT(*)::int8,
               AVG(CHAR_LENGTH(user_input))::float8,
               AVG(CHAR_LENGTH(ai_response))::float8
        FROM conversation_logs
        GROUP BY created_at::date
        ORDER BY date DESC
        LIMIT 7
        "#,
    )
    .fetch_all(&state.db_pool)
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to generate report: {}", e);
            return error_response(500, "Failed to generate report");
        }
    };

    let report: Vec<ReportPoint> = rows
        .into_iter()
        .map(|(date, total, avg_in, avg_out)| ReportPoint {
            date: date.to_string(),
            total_conversations: total,
            avg_user_input_length: avg_in.unwrap_or(0.0),
            avg_ai_response_length: avg_out.unwrap_or(0.0),
        })
        .collect();

    json_response(200, &report)
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let path = event.uri().path();

    info!("Admin request: {} {}", method, path);

    let authorized = match session_id(&event) {
        Some(session) => state.sessions.is_admin(&session).await,
        None => false,
    };
    if !authorized {
        return error_response(401, "Unauthorized");
    }

    match (method, path) {
        ("GET", "/admin_stats") => admin_stats(&state).await,
        ("GET", "/ai_report") => ai_report(&state).await,
        _ => error_response(404, "Not found"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}
