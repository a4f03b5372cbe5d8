#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_parse_or, env_var};
use std::time::Duration;

/// Database name used when neither the environment nor the URL names one
pub const DEFAULT_DATABASE: &str = "shop";

/// Connection string plus the pool knobs applied to the process-wide client.
///
/// ```ignore
/// let config = MongoConfig::new("mongodb://localhost:27017/shop")
///     .with_pool(20, 2)
///     .with_app_name("shop-api");
/// assert_eq!(config.database(), "shop");
/// ```
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// `mongodb://` or `mongodb+srv://` connection string; may carry credentials
    pub url: String,
    pub database: String,
    /// Reported to the server and visible in its logs
    pub app_name: Option<String>,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connect_timeout: Duration,
    pub server_selection_timeout: Duration,
}

impl MongoConfig {
    /// The database comes from the URL path, falling back to [`DEFAULT_DATABASE`]
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            database: database_from_url(&url).unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            url,
            app_name: None,
            max_pool_size: 100,
            min_pool_size: 5,
            connect_timeout: Duration::from_secs(10),
            server_selection_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_database(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::new(url)
        }
    }

    pub fn with_pool(self, max_pool_size: u32, min_pool_size: u32) -> Self {
        Self {
            max_pool_size,
            min_pool_size,
            ..self
        }
    }

    pub fn with_app_name(self, app_name: impl Into<String>) -> Self {
        Self {
            app_name: Some(app_name.into()),
            ..self
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self::new("mongodb://localhost:27017")
    }
}

/// Path segment of a connection string, if it names a database
///
/// `mongodb://host:27017/shop?retryWrites=true` gives `shop`;
/// `mongodb://host:27017/?tls=true` gives `None`.
pub fn database_from_url(url: &str) -> Option<String> {
    let (_, after_scheme) = url.split_once("://")?;
    let (_, path) = after_scheme.split_once('/')?;
    let name = path.split_once('?').map_or(path, |(name, _)| name);
    (!name.is_empty()).then(|| name.to_owned())
}

#[cfg(feature = "config")]
fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| env_var(key))
}

/// | Variable | Default |
/// |---|---|
/// | `MONGODB_URI`, `MONGODB_URL`, `MONGO_URL` | required, first one set wins |
/// | `MONGODB_DATABASE`, `MONGO_DATABASE` | URL path, then `shop` |
/// | `MONGODB_APP_NAME` | unset |
/// | `MONGODB_MAX_POOL_SIZE` / `MONGODB_MIN_POOL_SIZE` | 100 / 5 |
/// | `MONGODB_CONNECT_TIMEOUT_SECS` | 10 |
/// | `MONGODB_SERVER_SELECTION_TIMEOUT_SECS` | 30 |
#[cfg(feature = "config")]
impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        const URL_KEYS: [&str; 3] = ["MONGODB_URI", "MONGODB_URL", "MONGO_URL"];

        let url = first_env(&URL_KEYS)
            .ok_or_else(|| ConfigError::MissingEnvVar(URL_KEYS.join(", ")))?;
        let base = match first_env(&["MONGODB_DATABASE", "MONGO_DATABASE"]) {
            Some(database) => Self::with_database(url, database),
            None => Self::new(url),
        };

        let secs = |key: &str, default: Duration| {
            env_parse_or(key, default.as_secs()).map(Duration::from_secs)
        };

        Ok(Self {
            app_name: env_var("MONGODB_APP_NAME"),
            max_pool_size: env_parse_or("MONGODB_MAX_POOL_SIZE", base.max_pool_size)?,
            min_pool_size: env_parse_or("MONGODB_MIN_POOL_SIZE", base.min_pool_size)?,
            connect_timeout: secs("MONGODB_CONNECT_TIMEOUT_SECS", base.connect_timeout)?,
            server_selection_timeout: secs(
                "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
                base.server_selection_timeout,
            )?,
            ..base
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_applies_pool_defaults() {
        let config = MongoConfig::default();
        assert_eq!(config.url(), "mongodb://localhost:27017");
        assert_eq!(config.database(), DEFAULT_DATABASE);
        assert_eq!((config.max_pool_size, config.min_pool_size), (100, 5));
        assert_eq!(config.server_selection_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builders() {
        let config = MongoConfig::with_database("mongodb://localhost:27017/ignored", "orders")
            .with_pool(20, 2)
            .with_app_name("shop-api");
        assert_eq!(config.database(), "orders");
        assert_eq!((config.max_pool_size, config.min_pool_size), (20, 2));
        assert_eq!(config.app_name.as_deref(), Some("shop-api"));
    }

    #[test]
    fn test_database_from_url() {
        let cases = [
            ("mongodb://localhost:27017/shop", Some("shop")),
            ("mongodb+srv://u:p@cluster.example.net/orders?retryWrites=true", Some("orders")),
            ("mongodb://localhost:27017", None),
            ("mongodb://localhost:27017/?tls=true", None),
            ("localhost:27017/shop", None),
        ];
        for (url, expected) in cases {
            assert_eq!(database_from_url(url).as_deref(), expected, "{url}");
        }
    }

    #[cfg(feature = "config")]
    mod from_env {
        use super::*;

        #[test]
        fn test_database_from_uri_path() {
            temp_env::with_vars(
                [
                    ("MONGODB_URI", Some("mongodb://localhost:27017/ecommerce")),
                    ("MONGODB_DATABASE", None),
                    ("MONGO_DATABASE", None),
                ],
                || {
                    let config = MongoConfig::from_env().unwrap();
                    assert_eq!(config.database(), "ecommerce");
                    assert_eq!(config.max_pool_size, 100);
                },
            );
        }

        #[test]
        fn test_explicit_database_and_pool() {
            temp_env::with_vars(
                [
                    ("MONGODB_URI", None),
                    ("MONGODB_URL", Some("mongodb://localhost:27017/ignored")),
                    ("MONGODB_DATABASE", Some("testdb")),
                    ("MONGODB_MAX_POOL_SIZE", Some("20")),
                    ("MONGODB_CONNECT_TIMEOUT_SECS", Some("3")),
                ],
                || {
                    let config = MongoConfig::from_env().unwrap();
                    assert_eq!(config.database(), "testdb");
                    assert_eq!(config.max_pool_size, 20);
                    assert_eq!(config.connect_timeout, Duration::from_secs(3));
                },
            );
        }

        #[test]
        fn test_last_fallback_url() {
            temp_env::with_vars(
                [
                    ("MONGODB_URI", None),
                    ("MONGODB_URL", Some("  ")),
                    ("MONGO_URL", Some("mongodb://fallback:27017")),
                    ("MONGODB_DATABASE", None),
                    ("MONGO_DATABASE", None),
                ],
                || {
                    let config = MongoConfig::from_env().unwrap();
                    assert_eq!(config.url(), "mongodb://fallback:27017");
                    assert_eq!(config.database(), DEFAULT_DATABASE);
                },
            );
        }

        #[test]
        fn test_missing_url() {
            temp_env::with_vars(
                [("MONGODB_URI", None::<&str>), ("MONGODB_URL", None), ("MONGO_URL", None)],
                || {
                    let err = MongoConfig::from_env().unwrap_err();
                    assert!(err.to_string().contains("MONGODB_URI"));
                },
            );
        }

        #[test]
        fn test_bad_pool_size() {
            temp_env::with_vars(
                [
                    ("MONGODB_URI", Some("mongodb://localhost:27017")),
                    ("MONGODB_MAX_POOL_SIZE", Some("lots")),
                ],
                || {
                    let err = MongoConfig::from_env().unwrap_err();
                    assert!(err.to_string().contains("MONGODB_MAX_POOL_SIZE"));
                },
            );
        }
    }
}
