//! MongoDB connectivity and the MongoDB-backed [`crate::Repository`]

mod config;
mod connector;
mod health;
mod repository;

pub use config::{DEFAULT_DATABASE, MongoConfig, database_from_url};
pub use connector::{
    MongoError, connect, connect_from_config, connect_from_config_with_retry, shutdown,
};
pub use health::{HealthStatus, check_health, check_health_detailed};
pub use repository::MongoRepository;

// Re-export MongoDB types for convenience
pub use mongodb::{Client, Collection, Database};
