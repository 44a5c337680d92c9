//! User Signup Lambda - Cognito Post-Confirmation Trigger
//!
//! Runs after a resident confirms their account. Creates the user row
//! the chat and document endpoints key their ownership checks on.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Cognito trigger event
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CognitoTriggerEvent {
    version: String,
    trigger_source: String,
    region: String,
    user_pool_id: String,
    user_name: String,
    request: CognitoRequest,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct CognitoRequest {
    user_attributes: UserAttributes,
}

#[derive(Debug, Deserialize, Serialize)]
struct UserAttributes {
    sub: String,
    email: String,
    email_verified: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Serialize, Default)]
struct CognitoResponse {}

/// Response must match input structure for Cognito triggers
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CognitoTriggerResponse {
    version: String,
    trigger_source: String,
    region: String,
    user_pool_id: String,
    user_name: String,
    request: serde_json::Value,
    response: CognitoResponse,
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

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<CognitoTriggerEvent>,
) -> Result<CognitoTriggerResponse, Error> {
    let trigger = event.payload;

    info!(
        "Processing {} trigger for user {}",
        trigger.trigger_source, trigger.user_name
    );

    // Only process PostConfirmation triggers
    if !trigger.trigger_source.starts_with("PostConfirmation") {
        info!("Skipping non-PostConfirmation trigger");
        return Ok(CognitoTriggerResponse {
            version: trigger.version,
            trigger_source: trigger.trigger_source,
            region: trigger.region,
            user_pool_id: trigger.user_pool_id,
            user_name: trigger.user_name,
            request: serde_json::to_value(&trigger.request)?,
            response: CognitoResponse {},
        });
    }

    let user_attrs = &trigger.request.user_attributes;
    let user_id =
        Uuid::parse_str(&user_attrs.sub).map_err(|e| format!("Invalid user sub: {}", e))?;

    let display_name = user_attrs
        .name
        .clone()
        .unwrap_or_else(|| {
            user_attrs
                .email
                .split('@')
                .next()
                .unwrap_or("Resident")
                .to_string()
        });

    let result = sqlx::query(
        r#"
        INSERT INTO users (id, email, display_name, cognito_sub, settings)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE SET
            email = EXCLUDED.email,
            display_name = COALESCE(NULLIF(users.display_name, ''), EXCLUDED.display_name),
            updated_at = NOW()
        "#,
    )
    .bind(user_id)
    .bind(&user_attrs.email)
    .bind(&display_name)
    .bind(&user_attrs.sub)
    .bind(serde_json::json!({
        "timezone": "Asia/Manila",
        "notifications_enabled": true,
    }))
    .execute(&state.db_pool)
    .await;

    match result {
        Ok(_) => info!("Created/updated user {} ({})", user_id, user_attrs.email),
        Err(e) => {
            // Don't fail the Cognito flow; the resident can still sign in.
            error!("Failed to create user {}: {}", user_id, e);
        }
    }

    Ok(CognitoTriggerResponse {
        version: trigger.version,
        trigger_source: trigger.trigger_source,
        region: trigger.region,
        user_pool_id: trigger.user_pool_id,
        user_name: trigger.user_name,
        request: serde_json::to_value(&trigger.request)?,
        response: CognitoResponse {},
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
