//! Configuration management for Lambda functions.
//!
//! Plain environment-variable configuration plus the reloadable admin
//! chat credentials. The credentials live behind a process-wide lock so
//! a database override can replace them without restarting the worker.

use std::env;
use std::sync::OnceLock;

use sqlx::PgPool;
use tokio::sync::RwLock;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database host
    pub db_host: String,
    /// Database name
    pub db_name: String,
    /// ARN of the secret containing database credentials
    pub db_secret_arn: String,
    /// AWS region
    pub aws_region: String,
    /// Bedrock model id used for freeform replies
    pub model_id: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            db_host: env::var("DATABASE_HOST")?,
            db_name: env::var("DATABASE_NAME").unwrap_or_else(|_| "baac".to_string()),
            db_secret_arn: env::var("DATABASE_URL_SECRET_ARN")?,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "ap-southeast-1".to_string()),
            model_id: env::var("COMPLETION_MODEL_ID")
                .unwrap_or_else(|_| "amazon.nova-lite-v1:0".to_string()),
        })
    }
}

/// The in-chat admin credential pair.
///
/// A message consisting of exactly these two whitespace-separated tokens
/// authenticates the session as admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub key: String,
    pub passphrase: String,
}

impl AdminCredentials {
    /// Load the seed credentials from the environment.
    pub fn from_env() -> Self {
        Self {
            key: env::var("ADMIN_KEY").unwrap_or_else(|_| "EASTER".to_string()),
            passphrase: env::var("ADMIN_PASS").unwrap_or_else(|_| "EGG".to_string()),
        }
    }
}

static ADMIN_CREDENTIALS: OnceLock<RwLock<AdminCredentials>> = OnceLock::new();

fn credentials_cell() -> &'static RwLock<AdminCredentials> {
    ADMIN_CREDENTIALS.get_or_init(|| RwLock::new(AdminCredentials::from_env()))
}

/// Read the currently active admin credentials.
pub async fn admin_credentials() -> AdminCredentials {
    credentials_cell().read().await.clone()
}

/// Replace the active admin credentials.
pub async fn set_admin_credentials(credentials: AdminCredentials) {
    *credentials_cell().write().await = credentials;
}

/// Refresh the admin credentials from the database override row.
///
/// A missing row leaves the current credentials in place.
pub async fn refresh_admin_credentials(pool: &PgPool) -> crate::Result<()> {
    let row: Option<(String, String)> =
        sqlx::query_as("SELECT admin_key, admin_pass FROM admin_settings WHERE id = 1")
            .fetch_optional(pool)
            .await?;

    if let Some((key, passphrase)) = row {
        set_admin_credentials(AdminCredentials { key, passphrase }).await;
    }

    Ok(())
}
