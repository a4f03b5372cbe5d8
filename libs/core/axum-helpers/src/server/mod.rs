//! Server infrastructure.
//!
//! - Router assembly with OpenAPI documentation and the standard layer stack
//! - Detailed health, liveness and readiness endpoints
//! - Graceful shutdown coordination
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//! use core_config::{Environment, app_info};
//!
//! let router = create_router::<ApiDoc>(api_routes, &RateLimitConfig::default()).await?;
//! let app = router.merge(health_router(app_info!(), Environment::from_env(), state.clone()));
//!
//! create_production_app(app, &config.server, Duration::from_secs(30), async {}).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_production_app, create_router, serve_with_shutdown};
pub use health::{
    HealthCheckFuture, HealthChecks, HealthResponse, health_router, run_health_checks,
};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
