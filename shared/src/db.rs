//! Database connection management.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::{Config, Error, Result};

/// Database credentials stored in Secrets Manager.
#[derive(Debug, Deserialize)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

/// Create a database connection pool.
///
/// Connections are checked out per query and returned on every path;
/// the pool is the only shared mutable resource a handler touches.
pub async fn create_pool(config: &Config, credentials: &DatabaseCredentials) -> Result<PgPool> {
    let database_url = format!(
        "postgres://{}:{}@{}:5432/{}",
        credentials.username, credentials.password, config.db_host, config.db_name
    );

    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&database_url)
        .await
        .map_err(Error::Database)?;

    Ok(pool)
}

/// Fetch database credentials from Secrets Manager.
pub async fn fetch_credentials(
    client: &SecretsClient,
    secret_arn: &str,
) -> Result<DatabaseCredentials> {
    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get DB secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Aws("DB secret has no string value".to_string()))?;

    serde_json::from_str(secret_string)
        .map_err(|e| Error::Aws(format!("Failed to parse database credentials: {}", e)))
}

/// Build a pool from the environment: load config, resolve the
/// credential secret, connect. Every binary's `AppState::new` goes
/// through here.
pub async fn connect_from_env() -> Result<(Config, PgPool)> {
    let config = Config::from_env().map_err(|e| Error::Config(e.to_string()))?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let secrets_client = SecretsClient::new(&aws_config);

    let credentials = fetch_credentials(&secrets_client, &config.db_secret_arn).await?;
    let pool = create_pool(&config, &credentials).await?;

    Ok((config, pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credentials() {
        let json = r#"{"username":"baacadmin","password":"secret123"}"#;
        let creds: DatabaseCredentials = serde_json::from_str(json).unwrap();
        assert_eq!(creds.username, "baacadmin");
        assert_eq!(creds.password, "secret123");
    }
}
