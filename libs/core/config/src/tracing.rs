use crate::Environment;
use tracing::{debug, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

const PRODUCTION_FILTER: &str = "info,tower_http=info,mongodb=warn";
const DEVELOPMENT_FILTER: &str = "debug,tower_http=debug,mongodb=info,hyper=info";

/// Colored `eyre` reports with source locations; later calls are ignored
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Directives applied when `RUST_LOG` is unset
pub fn default_filter(environment: &Environment) -> &'static str {
    match environment {
        Environment::Production => PRODUCTION_FILTER,
        Environment::Development => DEVELOPMENT_FILTER,
    }
}

/// Global subscriber: flattened JSON lines in production, pretty output
/// otherwise, with span traces captured for `eyre` reports.
///
/// `RUST_LOG` replaces the default directives. Only the first call installs
/// anything.
pub fn init_tracing(environment: &Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(environment)));

    let output = if environment.is_production() {
        fmt::layer()
            .json()
            .with_target(false)
            .flatten_event(true)
            .boxed()
    } else {
        fmt::layer()
            .pretty()
            .with_file(false)
            .with_line_number(false)
            .boxed()
    };

    let installed = tracing_subscriber::registry()
        .with(output)
        .with(ErrorLayer::default())
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!(%environment, "Tracing initialized");
    } else {
        debug!("Tracing already initialized");
    }
}
