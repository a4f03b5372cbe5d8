use axum_helpers::server::{create_production_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use openapi::ApiDoc;
use state::AppState;

/// Budget for draining requests, and again for closing MongoDB
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();
    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let state = AppState::connect(config).await?;
    let app = create_router::<ApiDoc>(api::routes(&state), &state.config.rate_limit)
        .await?
        .merge(api::health::router(&state));

    let client = state.mongo_client.clone();
    let close_mongo = async move { database::mongodb::shutdown(client).await };
    create_production_app(app, &state.config.server, SHUTDOWN_TIMEOUT, close_mongo).await?;

    info!("Shop API stopped");
    Ok(())
}
