//! Chats Lambda - persisted chat management for signed-in residents.
//!
//! Endpoints:
//! - GET /user/chats - List the user's active chats
//! - POST /user/chats/new - Create a chat
//! - GET /user/chats/{id}/messages - Messages of an owned chat
//! - POST /user/chats/{id}/rename - Rename an owned chat
//! - POST /user/chats/{id}/delete - Soft-delete an owned chat
//!
//! Every query is scoped by the owner id; a chat that exists but
//! belongs to someone else is indistinguishable from a missing one.

use chrono::{DateTime, Utc};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use shared::http::{error_response, json_response, ApiResponse};
use shared::{auth, parse_body};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateChatRequest {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenameChatRequest {
    title: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ChatSummaryRow {
    id: Uuid,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatSummary {
    id: String,
    title: String,
    created_at: String,
    updated_at: String,
}

impl From<ChatSummaryRow> for ChatSummary {
    fn from(row: ChatSummaryRow) -> Self {
        Self {
            id: row.id.to_string(),
            title: row.title,
            created_at: row.created_at.to_rfc3339(),
            updated_at: row.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatMessageView {
    user_input: String,
    ai_response: String,
    created_at: String,
}

/// Application state
struct AppState {
    db_pool: PgPool,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let (_config, db_pool) = shared::db::connect_from_env()
            .await
            .map_err(|e| format!("Failed to initialize state: {}", e))?;

        Ok(Self { db_pool })
    }
}

async fn list_chats(state: &AppState, user_id: Uuid) -> Result<Response<Body>, Error> {
    let rows: Vec<ChatSummaryRow> = match sqlx::query_as(
        r#"
        SELECT id, title, created_at, updated_at
        FROM chats
        WHERE user_id = $1 AND is_active = TRUE
        ORDER BY updated_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&state.db_pool)
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to list chats for {}: {}", user_id, e);
            return error_response(500, "Failed to list chats");
        }
    };

    let chats: Vec<ChatSummary> = rows.into_iter().map(ChatSummary::from).collect();
    json_response(200, &ApiResponse::success(chats))
}

async fn create_chat(
    state: &AppState,
    user_id: Uuid,
    title: Option<String>,
) -> Result<Response<Body>, Error> {
    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "New Chat".to_string());

    let row: Result<ChatSummaryRow, sqlx::Error> = sqlx::query_as(
        r#"
        INSERT INTO chats (id, user_id, title, is_active)
        VALUES ($1, $2, $3, TRUE)
        RETURNING id, title, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&title)
    .fetch_one(&state.db_pool)
    .await;

    match row {
        Ok(row) => {
            info!("Created chat {} for user {}", row.id, user_id);
            json_response(201, &ApiResponse::success(ChatSummary::from(row)))
        }
        Err(e) => {
            error!("Failed to create chat for {}: {}", user_id, e);
            error_response(500, "Failed to create chat")
        }
    }
}

async fn chat_messages(
    state: &AppState,
    user_id: Uuid,
    chat_id: Uuid,
) -> Result<Response<Body>, Error> {
    // Ownership check first; a foreign chat id is a 404.
    let exists: Result<Option<(Uuid,)>, sqlx::Error> =
        sqlx::query_as("SELECT id FROM chats WHERE id = $1 AND user_id = $2 AND is_active = TRUE")
            .bind(chat_id)
            .bind(user_id)
            .fetch_optional(&state.db_pool)
            .await;

    match exists {
        Ok(None) => return error_response(404, "Not found"),
        Err(e) => {
            error!("Chat lookup failed: {}", e);
            return error_response(500, "Failed to fetch messages");
        }
        Ok(Some(_)) => {}
    }

    let rows: Vec<(String, String, DateTime<Utc>)> = match sqlx::query_as(
        r#"
        SELECT user_input, ai_response, created_at
        FROM chat_messages
        WHERE chat_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(chat_id)
    .fetch_all(&state.db_pool)
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to fetch messages for {}: {}", chat_id, e);
            return error_response(500, "Failed to fetch messages");
        }
    };

    let messages: Vec<ChatMessageView> = rows
        .into_iter()
        .map(|(user_input, ai_response, created_at)| ChatMessageView {
            user_input,
            ai_response,
            created_at: created_at.to_rfc3339(),
        })
        .collect();

    json_response(200, &ApiResponse::success(messages))
}

async fn rename_chat(
    state: &AppState,
    user_id: Uuid,
    chat_id: Uuid,
    title: &str,
) -> Result<Response<Body>, Error> {
    let title = title.trim();
    if title.is_empty() {
        return error_response(400, "Title is required");
    }

    let result = sqlx::query(
        r#"
        UPDATE chats SET title = $1, updated_at = NOW()
        WHERE id = $2 AND user_id = $3 AND is_active = TRUE
        "#,
    )
    .bind(title)
    .bind(chat_id)
    .bind(user_id)
    .execute(&state.db_pool)
    .await;

    match result {
        Ok(outcome) if outcome.rows_affected() == 0 => error_response(404, "Not found"),
        Ok(_) => json_response(
            200,
            &ApiResponse::success(serde_json::json!({ "id": chat_id.to_string(), "title": title })),
        ),
        Err(e) => {
            error!("Failed to rename chat {}: {}", chat_id, e);
            error_response(500, "Failed to rename chat")
        }
    }
}

async fn delete_chat(
    state: &AppState,
    user_id: Uuid,
    chat_id: Uuid,
) -> Result<Response<Body>, Error> {
    // Soft delete; messages stay attached to the inactive chat.
    let result = sqlx::query(
        r#"
        UPDATE chats SET is_active = FALSE, updated_at = NOW()
        WHERE id = $1 AND user_id = $2 AND is_active = TRUE
        "#,
    )
    .bind(chat_id)
    .bind(user_id)
    .execute(&state.db_pool)
    .await;

    match result {
        Ok(outcome) if outcome.rows_affected() == 0 => error_response(404, "Not found"),
        Ok(_) => {
            info!("Soft-deleted chat {} for user {}", chat_id, user_id);
            json_response(
                200,
                &ApiResponse::success(serde_json::json!({ "id": chat_id.to_string() })),
            )
        }
        Err(e) => {
            error!("Failed to delete chat {}: {}", chat_id, e);
            error_response(500, "Failed to delete chat")
        }
    }
}

fn chat_id_from(path: &str, suffix: &str) -> Option<Uuid> {
    let id = path
        .trim_start_matches("/user/chats/")
        .trim_end_matches(suffix);
    Uuid::parse_str(id).ok()
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str().to_string();
    let path = event.uri().path().to_string();

    info!("Chats request: {} {}", method, path);

    let user = match auth::require_user(&event) {
        Ok(user) => user,
        Err(e) => return error_response(e.status_code(), e.to_string()),
    };

    match (method.as_str(), path.as_str()) {
        ("GET", "/user/chats") => list_chats(&state, user.user_id).await,
        ("POST", "/user/chats/new") => {
            let request: CreateChatRequest = parse_body!(event.body());
            create_chat(&state, user.user_id, request.title).await
        }
        _ if path.starts_with("/user/chats/") && path.ends_with("/messages") => {
            if method != "GET" {
                return error_response(405, "Method not allowed");
            }
            match chat_id_from(&path, "/messages") {
                Some(chat_id) => chat_messages(&state, user.user_id, chat_id).await,
                None => error_response(400, "Invalid chat id"),
            }
        }
        _ if path.starts_with("/user/chats/") && path.ends_with("/rename") => {
            if method != "POST" {
                return error_response(405, "Method not allowed");
            }
            match chat_id_from(&path, "/rename") {
                Some(chat_id) => {
                    let request: RenameChatRequest = parse_body!(event.body());
                    rename_chat(&state, user.user_id, chat_id, &request.title).await
                }
                None => error_response(400, "Invalid chat id"),
            }
        }
        _ if path.starts_with("/user/chats/") && path.ends_with("/delete") => {
            if method != "POST" {
                return error_response(405, "Method not allowed");
            }
            match chat_id_from(&path, "/delete") {
                Some(chat_id) => delete_chat(&state, user.user_id, chat_id).await,
                None => error_response(400, "Invalid chat id"),
            }
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
