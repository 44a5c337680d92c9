//! Documents Lambda - document request workflow.
//!
//! Endpoints:
//! - POST /submit_document - Create a document request (authenticated)
//! - GET /user/copy-limits - Current daily copy standing per type
//! - GET /admin/document_requests - List requests (admin session)
//! - POST /admin/document_requests/{id}/status - Update request status

use chrono::{Days, NaiveDate, Utc};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use validator::Validate;

use shared::documents::{self, DocumentStatus, DocumentType, DAILY_COPY_LIMIT};
use shared::http::{error_response, json_response, session_id, ApiResponse};
use shared::models::LimitInfo;
use shared::{auth, parse_body, SessionStore};

/// Submit request payload, as the chat client's form sends it.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct SubmitDocumentRequest {
    #[serde(alias = "document_types")]
    #[validate(length(min = 1, message = "Select at least one document"))]
    document_types: Vec<String>,
    #[validate(length(min = 1, message = "Full name is required"))]
    full_name: String,
    #[validate(length(min = 1, message = "Address is required"))]
    address: String,
    #[validate(length(min = 1, message = "Purpose is required"))]
    purpose: String,
    date: Option<NaiveDate>,
    #[serde(default)]
    copy_c: i32,
    #[serde(default)]
    copy_i: i32,
    #[serde(default)]
    copy_r: i32,
}

impl SubmitDocumentRequest {
    /// Copies requested for one type: at least 1 when the type is
    /// selected, 0 when it isn't.
    fn copies_for(&self, doc_type: DocumentType, selected: &[DocumentType]) -> i32 {
        if !selected.contains(&doc_type) {
            return 0;
        }
        let copies = match doc_type {
            DocumentType::Clearance => self.copy_c,
            DocumentType::Indigency => self.copy_i,
            DocumentType::Residency => self.copy_r,
        };
        copies.max(1)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitDocumentResponse {
    response: String,
    reference: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CopyLimitStanding {
    document_type: String,
    used: i64,
    limit: i64,
    remaining: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateStatusRequest {
    status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentRequestView {
    id: i64,
    reference: String,
    document_types: Vec<String>,
    full_name: String,
    address: String,
    purpose: String,
    status: String,
    pickup_date: Option<String>,
    created_at: String,
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

/// Copies of one document type the user has already requested today.
async fn copies_used_today(
    pool: &PgPool,
    user_id: uuid::Uuid,
    doc_type: DocumentType,
) -> Result<i64, sqlx::Error> {
    let column = match doc_type {
        DocumentType::Clearance => "copies_clearance",
        DocumentType::Indigency => "copies_indigency",
        DocumentType::Residency => "copies_residency",
    };

    let used: Option<i64> = sqlx::query_scalar(&format!(
        "SELECT SUM({})::int8 FROM document_requests \
         WHERE user_id = $1 AND created_at::date = CURRENT_DATE",
        column
    ))
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(used.unwrap_or(0))
}

fn next_midnight_utc() -> String {
    let tomorrow = Utc::now().date_naive() + Days::new(1);
    format!("{}T00:00:00Z", tomorrow)
}

async fn submit_document(state: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    let user = match auth::require_user(event) {
        Ok(user) => user,
        Err(e) => return error_response(e.status_code(), e.to_string()),
    };

    let request: SubmitDocumentRequest = parse_body!(event.body());

    if let Err(e) = request.validate() {
        return error_response(400, format!("Invalid request: {}", e));
    }

    let mut selected = Vec::new();
    for name in &request.document_types {
        match DocumentType::parse(name) {
            Some(doc_type) => selected.push(doc_type),
            None => return error_response(400, format!("Unknown document type: {}", name)),
        }
    }

    // Daily copy limit per type; the first exhausted type rejects the
    // whole submission so the citizen can adjust and resubmit.
    for doc_type in &selected {
        let used = match copies_used_today(&state.db_pool, user.user_id, *doc_type).await {
            Ok(used) => used,
            Err(e) => {
                error!("Limit check failed: {}", e);
                return error_response(500, "Failed to submit document request");
            }
        };

        let requested = request.copies_for(*doc_type, &selected) as i64;
        if used + requested > DAILY_COPY_LIMIT {
            let body = serde_json::json!({
                "success": false,
                "error": "Daily copy limit reached",
                "limit_info": LimitInfo {
                    document_type: doc_type.as_str().to_string(),
                    used,
                    limit: DAILY_COPY_LIMIT,
                    reset_time: next_midnight_utc(),
                },
            });
            return json_response(429, &body);
        }
    }

    let type_names: Vec<String> = selected.iter().map(|d| d.as_str().to_string()).collect();

    let id: i64 = match sqlx::query_scalar(
        r#"
        INSERT INTO document_requests
            (user_id, document_types, full_name, address, purpose,
             pickup_date_requested, copies_clearance, copies_indigency, copies_residency,
             status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending')
        RETURNING id
        "#,
    )
    .bind(user.user_id)
    .bind(&type_names)
    .bind(&request.full_name)
    .bind(&request.address)
    .bind(&request.purpose)
    .bind(request.date)
    .bind(request.copies_for(DocumentType::Clearance, &selected))
    .bind(request.copies_for(DocumentType::Indigency, &selected))
    .bind(request.copies_for(DocumentType::Residency, &selected))
    .fetch_one(&state.db_pool)
    .await
    {
        Ok(id) => id,
        Err(e) => {
            error!("Failed to create document request: {}", e);
            return error_response(500, "Failed to submit document request");
        }
    };

    // Daily analytics counter, best-effort.
    for doc_type in &selected {
        let result = sqlx::query(
            r#"
            INSERT INTO document_request_stats (request_date, document_type, request_count)
            VALUES (CURRENT_DATE, $1, 1)
            ON CONFLICT (request_date, document_type)
            DO UPDATE SET request_count = document_request_stats.request_count + 1
            "#,
        )
        .bind(doc_type.as_str())
        .execute(&state.db_pool)
        .await;

        if let Err(e) = result {
            error!("Failed to bump request stats: {}", e);
        }
    }

    info!("Created document request {} for user {}", id, user.user_id);

    json_response(
        200,
        &ApiResponse::success(SubmitDocumentResponse {
            response: documents::submission_reply(id, &type_names),
            reference: documents::format_reference(id),
        }),
    )
}

async fn copy_limits(state: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    let user = match auth::require_user(event) {
        Ok(user) => user,
        Err(e) => return error_response(e.status_code(), e.to_string()),
    };

    let mut limits = Vec::new();
    for doc_type in DocumentType::ALL {
        let used = match copies_used_today(&state.db_pool, user.user_id, doc_type).await {
            Ok(used) => used,
            Err(e) => {
                error!("Limit read failed: {}", e);
                return error_response(500, "Failed to fetch copy limits");
            }
        };

        limits.push(CopyLimitStanding {
            document_type: doc_type.as_str().to_string(),
            used,
            limit: DAILY_COPY_LIMIT,
            remaining: (DAILY_COPY_LIMIT - used).max(0),
        });
    }

    json_response(200, &ApiResponse::success(limits))
}

/// Admin session gate; fails closed with no detail.
async fn is_admin_session(state: &AppState, event: &Request) -> bool {
    match session_id(event) {
        Some(session) => state.sessions.is_admin(&session).await,
        None => false,
    }
}

async fn list_requests(state: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    if !is_admin_session(state, event).await {
        return error_response(401, "Unauthorized");
    }

    let rows: Vec<documents::DocumentRequestRow> = match sqlx::query_as(
        r#"
        SELECT id, user_id, document_types, full_name, address, purpose,
               status, pickup_date, created_at
        FROM document_requests
        ORDER BY created_at DESC
        LIMIT 100
        "#,
    )
    .fetch_all(&state.db_pool)
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to list document requests: {}", e);
            return error_response(500, "Failed to list document requests");
        }
    };

    let views: Vec<DocumentRequestView> = rows
        .into_iter()
        .map(|row| DocumentRequestView {
            reference: documents::format_reference(row.id),
            id: row.id,
            document_types: row.document_types,
            full_name: row.full_name,
            address: row.address,
            purpose: row.purpose,
            status: row.status,
            pickup_date: row.pickup_date.map(|d| d.to_string()),
            created_at: row.created_at.to_rfc3339(),
        })
        .collect();

    json_response(200, &ApiResponse::success(views))
}

async fn update_status(
    state: &AppState,
    event: &Request,
    id_segment: &str,
) -> Result<Response<Body>, Error> {
    if !is_admin_session(state, event).await {
        return error_response(401, "Unauthorized");
    }

    let Ok(request_id) = id_segment.parse::<i64>() else {
        return error_response(400, "Invalid request id");
    };

    let request: UpdateStatusRequest = parse_body!(event.body());
    if request.status.trim().is_empty() {
        return error_response(400, "Status is required");
    }

    // The operator chooses the transition; only the Claimed spelling
    // additionally stamps the pickup date.
    let status = DocumentStatus::parse(&request.status);
    let result = if status.stamps_pickup_date() {
        sqlx::query(
            "UPDATE document_requests \
             SET status = $1, pickup_date = CURRENT_DATE, updated_at = NOW() WHERE id = $2",
        )
        .bind(status.as_str())
        .bind(request_id)
        .execute(&state.db_pool)
        .await
    } else {
        sqlx::query(
            "UPDATE document_requests SET status = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(status.as_str())
        .bind(request_id)
        .execute(&state.db_pool)
        .await
    };

    match result {
        Ok(outcome) if outcome.rows_affected() == 0 => error_response(404, "Not found"),
        Ok(_) => {
            info!("Request {} set to {}", request_id, status.as_str());
            json_response(
                200,
                &ApiResponse::success(serde_json::json!({
                    "id": request_id,
                    "status": status.as_str(),
                })),
            )
        }
        Err(e) => {
            error!("Failed to update request {}: {}", request_id, e);
            error_response(500, "Failed to update request")
        }
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str().to_string();
    let path = event.uri().path().to_string();

    info!("Documents request: {} {}", method, path);

    match (method.as_str(), path.as_str()) {
        ("POST", "/submit_document") => submit_document(&state, &event).await,
        ("GET", "/user/copy-limits") => copy_limits(&state, &event).await,
        ("GET", "/admin/document_requests") => list_requests(&state, &event).await,
        _ if path.starts_with("/admin/document_requests/") && path.ends_with("/status") => {
            if method != "POST" {
                return error_response(405, "Method not allowed");
            }
            let id_segment = path
                .trim_start_matches("/admin/document_requests/")
                .trim_end_matches("/status");
            update_status(&state, &event, id_segment).await
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
