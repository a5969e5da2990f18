use std::sync::Arc;

use finsight_core::{SyncOrchestrator, SyncSettings};
use finsight_market_data::ProviderRegistry;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
    pub orchestrator: SyncOrchestrator,
}

impl AppState {
    pub fn new(registry: Arc<ProviderRegistry>, settings: SyncSettings) -> Arc<Self> {
        let orchestrator = SyncOrchestrator::new(registry.clone(), settings);
        Arc::new(Self {
            registry,
            orchestrator,
        })
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("FINSIGHT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Build the provider registry from configuration. Any configuration error
/// (unknown provider, bad rate limit, missing credential) fails startup.
pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let registry = config.sync.build_registry()?;

    for (asset_class, ids) in &config.sync.routes {
        tracing::info!("Route {}: {}", asset_class, ids.join(" -> "));
    }

    Ok(AppState::new(Arc::new(registry), config.sync.settings))
}
