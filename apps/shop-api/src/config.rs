use axum_helpers::{JwtConfig, RateLimitConfig};
use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::mongodb::MongoConfig;

pub use core_config::Environment;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    /// Per-IP budget for everything under `/api`
    pub rate_limit: RateLimitConfig,
    /// Tighter budget for register and login
    pub auth_rate_limit: RateLimitConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;
        let rate_limit = RateLimitConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            jwt,
            rate_limit,
            auth_rate_limit: RateLimitConfig::strict(),
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "this-is-a-valid-secret-with-32-chars!";

    #[test]
    fn test_from_env_reads_every_section() {
        temp_env::with_vars(
            [
                ("MONGODB_URI", None),
                ("MONGODB_URL", Some("mongodb://db:27017/shop")),
                ("MONGODB_DATABASE", None),
                ("MONGO_DATABASE", None),
                ("JWT_SECRET", Some(SECRET)),
                ("JWT_EXPIRES_IN", Some("12h")),
                ("PORT", Some("4000")),
                ("RATE_LIMIT_WINDOW_MS", Some("60000")),
                ("RATE_LIMIT_MAX_REQUESTS", Some("50")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.app.name, "shop_api");
                assert_eq!(config.mongodb.database(), "shop");
                assert_eq!(config.jwt.expires_in_secs, 12 * 3600);
                assert_eq!(config.server.port, 4000);
                assert_eq!(config.rate_limit.max_requests, 50);
                assert_eq!(config.auth_rate_limit.max_requests, 5);
            },
        );
    }

    #[test]
    fn test_from_env_requires_jwt_secret() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://db:27017/shop")),
                ("JWT_SECRET", None),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
