//! Session Lambda - anonymous session lifecycle.
//!
//! Endpoints:
//! - POST /session/start - New visit: bump the visit counter and reset
//!   the session-scoped conversation context
//! - POST /session/clear - Explicit context reset
//!
//! Persisted chats are untouched by both; only the anonymous context
//! follows the reset-per-visit policy.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use shared::http::{error_response, json_response, session_id, ApiResponse};
use shared::SessionStore;

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

/// Daily visit counter, best-effort.
async fn log_website_visit(pool: &PgPool) {
    let result = sqlx::query(
        r#"
        INSERT INTO website_visits (visit_date, visit_count)
        VALUES (CURRENT_DATE, 1)
        ON CONFLICT (visit_date)
        DO UPDATE SET visit_count = website_visits.visit_count + 1
        "#,
    )
    .execute(pool)
    .await;

    if let Err(e) = result {
        error!("Failed to log website visit: {}", e);
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let path = event.uri().path();

    info!("Session request: {} {}", method, path);

    let Some(session) = session_id(&event) else {
        return error_response(400, "Session id is required");
    };

    match (method, path) {
        ("POST", "/session/start") => {
            log_website_visit(&state.db_pool).await;
            state.sessions.clear(&session).await;
            json_response(
                200,
                &ApiResponse::success(serde_json::json!({ "sessionId": session })),
            )
        }
        ("POST", "/session/clear") => {
            state.sessions.clear(&session).await;
            json_response(
                200,
                &ApiResponse::success(serde_json::json!({ "sessionId": session })),
            )
        }
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
