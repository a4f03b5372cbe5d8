//! Shared application state, cloned into every router

use axum_helpers::JwtAuth;
use database::mongodb::{Client, Database, connect_from_config_with_retry};

use crate::api;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Shares one connection pool across clones
    pub mongo_client: Client,
    pub db: Database,
    pub jwt: JwtAuth,
}

impl AppState {
    /// Open the MongoDB pool (with retries), ensure every collection's
    /// indexes and build the token signer
    pub async fn connect(config: Config) -> eyre::Result<Self> {
        let mongo_client = connect_from_config_with_retry(&config.mongodb, None).await?;
        let db = mongo_client.database(config.mongodb.database());

        api::users::init_indexes(&db).await?;
        api::products::init_indexes(&db).await?;

        Ok(Self {
            jwt: JwtAuth::new(&config.jwt),
            config,
            mongo_client,
            db,
        })
    }
}

#[cfg(test)]
impl AppState {
    /// State whose MongoDB never answers; the driver connects lazily, so
    /// building it needs no server
    pub(crate) async fn unreachable() -> Self {
        use crate::config::Environment;
        use axum_helpers::{JwtConfig, RateLimitConfig};
        use core_config::{AppInfo, ServerConfig};
        use database::mongodb::MongoConfig;

        const URL: &str = "mongodb://127.0.0.1:1/shop?serverSelectionTimeoutMS=200";

        let jwt = JwtConfig::new("this-is-a-valid-secret-with-32-chars!").unwrap();
        let mongo_client = Client::with_uri_str(URL).await.unwrap();
        let db = mongo_client.database("shop");

        Self {
            config: Config {
                app: AppInfo::new("shop_api", "0.1.0"),
                mongodb: MongoConfig::new(URL),
                server: ServerConfig::default(),
                jwt: jwt.clone(),
                rate_limit: RateLimitConfig::default(),
                auth_rate_limit: RateLimitConfig::strict(),
                environment: Environment::Development,
            },
            mongo_client,
            db,
            jwt: JwtAuth::new(&jwt),
        }
    }
}
