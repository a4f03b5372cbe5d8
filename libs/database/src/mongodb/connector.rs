use bson::doc;
use mongodb::{Client, Database, options::ClientOptions};
use tracing::info;

use super::MongoConfig;
use crate::common::{RetryConfig, retry_with_backoff};

#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    /// Unparsable connection string or rejected client options
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// Client built, but the server never answered `ping`
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// [`connect_from_config`] with every pool setting at its default
pub async fn connect(url: &str) -> Result<Client, MongoError> {
    connect_from_config(&MongoConfig::new(url)).await
}

/// Build the shared client and confirm the server is reachable.
///
/// The client owns the connection pool: create one at startup and hand
/// `client.database(..)` to each repository.
pub async fn connect_from_config(config: &MongoConfig) -> Result<Client, MongoError> {
    let mut options = ClientOptions::parse(config.url()).await?;
    options.app_name = config.app_name.clone();
    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(config.connect_timeout);
    options.server_selection_timeout = Some(config.server_selection_timeout);

    let client = Client::with_options(options)?;
    if let Err(e) = ping(&client.database(config.database())).await {
        return Err(MongoError::ConnectionFailed(e.to_string()));
    }

    info!(database = config.database(), "Connected to MongoDB");
    Ok(client)
}

/// [`connect_from_config`] retried with backoff; `None` uses [`RetryConfig::default`]
///
/// ```ignore
/// let client = connect_from_config_with_retry(&config.mongodb, None).await?;
/// ```
pub async fn connect_from_config_with_retry(
    config: &MongoConfig,
    retry: Option<RetryConfig>,
) -> Result<Client, MongoError> {
    info!(database = config.database(), "Connecting to MongoDB");
    retry_with_backoff(|| connect_from_config(config), retry.unwrap_or_default()).await
}

/// Close every pooled connection; call once during graceful shutdown
pub async fn shutdown(client: Client) {
    client.shutdown().await;
    info!("MongoDB client shut down");
}

pub(crate) async fn ping(database: &Database) -> Result<(), mongodb::error::Error> {
    database.run_command(doc! { "ping": 1 }).await.map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_malformed_url_fails_before_connecting() {
        let result = connect("not-a-mongodb-url").await;
        assert!(matches!(result, Err(MongoError::Mongo(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_ping() {
        let mut config = MongoConfig::new("mongodb://127.0.0.1:1/shop");
        config.server_selection_timeout = Duration::from_millis(200);

        let result = connect_from_config(&config).await;
        assert!(matches!(result, Err(MongoError::ConnectionFailed(_))));
    }

    #[tokio::test]
    #[ignore = "requires a running MongoDB"]
    async fn test_connect_and_shutdown() {
        let url = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = connect_from_config(&MongoConfig::with_database(url, "test"))
            .await
            .unwrap();
        shutdown(client).await;
    }
}
