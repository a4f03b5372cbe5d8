//! `/health`, `/health/live` and `/health/ready`, backed by a MongoDB ping

use axum::Router;
use axum_helpers::{HealthCheckFuture, HealthChecks, health_router};
use database::mongodb::check_health_detailed;

use crate::state::AppState;

impl HealthChecks for AppState {
    fn checks(&self) -> Vec<(&'static str, HealthCheckFuture<'_>)> {
        let db = &self.db;
        let mongodb: HealthCheckFuture<'_> = Box::pin(async move {
            let status = check_health_detailed(db).await;
            if status.healthy {
                Ok(())
            } else {
                Err(status.message.unwrap_or_else(|| "ping failed".to_string()))
            }
        });
        vec![("mongodb", mongodb)]
    }
}

pub fn router(state: &AppState) -> Router {
    health_router(state.config.app, state.config.environment, state.clone())
}
