use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use core_config::{AppInfo, Environment};
use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

/// Check for one dependency; `Err` carries the reason it is down
pub type HealthCheckFuture<'a> = Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

/// Named dependency checks, rebuilt for every health request
///
/// ```ignore
/// impl HealthChecks for AppState {
///     fn checks(&self) -> Vec<(&'static str, HealthCheckFuture<'_>)> {
///         let db = &self.db;
///         vec![("mongodb", Box::pin(async move {
///             check_health(db).await.then_some(()).ok_or_else(|| "ping failed".to_string())
///         }))]
///     }
/// }
/// ```
pub trait HealthChecks: Clone + Send + Sync + 'static {
    fn checks(&self) -> Vec<(&'static str, HealthCheckFuture<'_>)>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `healthy` when every dependency answered
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub environment: String,
    /// Seconds since the router was built
    pub uptime: u64,
    pub timestamp: DateTime<Utc>,
    /// `connected` or `disconnected` per dependency
    pub dependencies: Map<String, Value>,
}

/// Awaits every check together; the map holds `connected` or
/// `disconnected` per dependency
async fn check_all(checks: Vec<(&str, HealthCheckFuture<'_>)>) -> (bool, Map<String, Value>) {
    let (names, pending): (Vec<&str>, Vec<_>) = checks.into_iter().unzip();
    let outcomes = join_all(pending).await;

    let states = names
        .iter()
        .zip(&outcomes)
        .map(|(name, outcome)| {
            if let Err(reason) = outcome {
                tracing::error!(check = name, error = %reason, "Health check failed");
            }
            let state = if outcome.is_ok() { "connected" } else { "disconnected" };
            (name.to_string(), json!(state))
        })
        .collect();

    (outcomes.iter().all(Result::is_ok), states)
}

/// Readiness answer: each dependency as `connected` or `disconnected`,
/// with an overall `status` of `ready` or `not ready`.
///
/// Any failed check turns the whole answer into the `Err` arm with 503.
pub async fn run_health_checks(
    checks: Vec<(&str, HealthCheckFuture<'_>)>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let (ready, mut body) = check_all(checks).await;
    body.insert("status".into(), json!(if ready { "ready" } else { "not ready" }));

    let body = Json(Value::Object(body));
    if ready {
        Ok((StatusCode::OK, body))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, body))
    }
}

struct HealthState<C> {
    app: AppInfo,
    environment: Environment,
    started: Instant,
    checks: C,
}

/// Detailed report; always 200 so dashboards can read a degraded state
async fn health_handler<C: HealthChecks>(State(state): State<Arc<HealthState<C>>>) -> Response {
    let (healthy, dependencies) = check_all(state.checks.checks()).await;

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        name: state.app.name,
        version: state.app.version,
        environment: state.environment.to_string(),
        uptime: state.started.elapsed().as_secs(),
        timestamp: Utc::now(),
        dependencies,
    })
    .into_response()
}

async fn live_handler() -> Json<Value> {
    Json(json!({ "status": "alive" }))
}

async fn ready_handler<C: HealthChecks>(State(state): State<Arc<HealthState<C>>>) -> Response {
    run_health_checks(state.checks.checks()).await.into_response()
}

/// `GET /health`, `/health/live` and `/health/ready`, outside `/api` so
/// orchestrators skip auth and rate limits
pub fn health_router<C: HealthChecks>(app: AppInfo, environment: Environment, checks: C) -> Router {
    let state = Arc::new(HealthState {
        app,
        environment,
        started: Instant::now(),
        checks,
    });

    Router::new()
        .route("/health", get(health_handler::<C>))
        .route("/health/live", get(live_handler))
        .route("/health/ready", get(ready_handler::<C>))
        .with_state(state)
}
