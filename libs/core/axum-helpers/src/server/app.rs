use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::{method_not_allowed, not_found};
use crate::http::{
    RateLimitConfig, RateLimiter, X_CORRELATION_ID, correlation_id, cors_layer_from_env,
    rate_limit, security_headers,
};
use axum::{Router, body::Body, extract::Request, middleware};
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span, info, warn};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable as _};
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

const OPENAPI_JSON: &str = "/api-docs/openapi.json";

fn request_span(request: &Request<Body>) -> Span {
    let correlation_id = request
        .headers()
        .get(&X_CORRELATION_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        correlation_id = %correlation_id,
    )
}

/// Swagger UI, ReDoc, RapiDoc and Scalar over one document
fn docs_router<T: OpenApi>() -> Router {
    let doc = T::openapi();
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url(OPENAPI_JSON, doc.clone()))
        .merge(Redoc::with_url("/redoc", doc.clone()))
        .merge(RapiDoc::new(OPENAPI_JSON).path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", doc))
}

/// Mounts `apis` under `/api`, limited per client IP by `api_limit`, next to
/// the documentation UIs. Everything is wrapped in the shared layer stack:
/// request tracing keyed by correlation id, security headers, CORS and
/// compression.
///
/// Unmatched paths and methods answer with the JSON error body. Health
/// routes are not included; merge [`super::health_router`] separately.
///
/// # Errors
///
/// Fails when `CORS_ALLOWED_ORIGIN` is missing, empty or unparsable
/// (see [`crate::http::create_cors_layer`]).
pub async fn create_router<T>(apis: Router, api_limit: &RateLimitConfig) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let cors = cors_layer_from_env()?;
    let trace = TraceLayer::new_for_http()
        .make_span_with(request_span)
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Ok(docs_router::<T>()
        .nest(
            "/api",
            apis.layer(middleware::from_fn_with_state(RateLimiter::new(api_limit), rate_limit)),
        )
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(trace)
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(correlation_id))
        .layer(cors)
        .layer(CompressionLayer::new()))
}

/// Binds `server_config.address()` and serves until SIGINT or SIGTERM.
///
/// After the signal, in-flight requests get `shutdown_timeout` to drain,
/// then `cleanup` (closing the database client, for instance) gets the same
/// budget.
///
/// ```ignore
/// let client = state.mongo_client.clone();
/// create_production_app(router, &config.server, Duration::from_secs(30), async move {
///     database::mongodb::shutdown(client).await;
/// })
/// .await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(server_config.address()).await?;
    let coordinator = ShutdownCoordinator::new();
    let signals = coordinator.listen_for_signals();

    let result = serve_with_shutdown(listener, router, coordinator, shutdown_timeout, cleanup).await;
    signals.abort();
    result
}

/// Serves on an already bound listener until `coordinator` is triggered
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    router: Router,
    coordinator: ShutdownCoordinator,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(address = %listener.local_addr()?, "Server listening");

    let stopping = coordinator.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(async move { stopping.wait().await })
            .await
    });

    let served = tokio::select! {
        joined = &mut server => flatten(joined),
        () = coordinator.wait() => {
            match tokio::time::timeout(shutdown_timeout, &mut server).await {
                Ok(joined) => flatten(joined),
                Err(_) => {
                    warn!(timeout = ?shutdown_timeout, "Connections still open, aborting");
                    server.abort();
                    Ok(())
                }
            }
        }
    };

    if let Err(e) = &served {
        tracing::error!(error = %e, "Server stopped with an error");
    }

    info!(timeout = ?shutdown_timeout, "Running cleanup");
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!("Cleanup finished"),
        Err(_) => warn!(timeout = ?shutdown_timeout, "Cleanup timed out"),
    }

    served
}

fn flatten(joined: Result<io::Result<()>, JoinError>) -> io::Result<()> {
    joined.map_err(io::Error::other)?
}
