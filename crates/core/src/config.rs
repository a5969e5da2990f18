//! Sync layer configuration.
//!
//! Read from `FINSIGHT_*` environment variables once at startup. Anything that
//! cannot be used (unknown provider id, malformed rate limit, non-positive
//! number, missing credential) is reported here so it never surfaces in the
//! middle of a sync cycle.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use finsight_market_data::{
    default_config, AssetClass, ProviderConfig, ProviderOptions, ProviderRegistry, RateLimit,
};

use crate::errors::{Error, Result};

pub const ENV_PREFIX: &str = "FINSIGHT_";

pub const DEFAULT_ITEM_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
pub const DEFAULT_CYCLE_DEADLINE: Duration = Duration::from_secs(120);
/// Upper bound for the per-item timeout and the cycle deadline.
pub const MAX_SYNC_DURATION: Duration = Duration::from_secs(24 * 3600);

/// Orchestrator limits for one sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    /// Upper bound for a single investment, rate-limit wait included.
    pub item_timeout: Duration,
    /// Investments fetched at the same time.
    pub max_concurrency: usize,
    /// Upper bound for the whole cycle.
    pub cycle_deadline: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            item_timeout: DEFAULT_ITEM_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            cycle_deadline: DEFAULT_CYCLE_DEADLINE,
        }
    }
}

/// Typed, validated configuration for the sync layer.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// One entry per provider named in a route, in first-seen order.
    pub providers: Vec<ProviderConfig>,
    /// Ordered provider ids per asset class.
    pub routes: Vec<(AssetClass, Vec<String>)>,
    pub provider_options: ProviderOptions,
    pub settings: SyncSettings,
}

fn route_var(asset_class: AssetClass) -> &'static str {
    match asset_class {
        AssetClass::Equity => "FINSIGHT_EQUITY_PROVIDERS",
        AssetClass::MutualFund => "FINSIGHT_MUTUAL_FUND_PROVIDERS",
        AssetClass::Crypto => "FINSIGHT_CRYPTO_PROVIDERS",
    }
}

fn default_route(asset_class: AssetClass) -> &'static str {
    match asset_class {
        AssetClass::Equity => "NSE",
        AssetClass::MutualFund => "MFAPI",
        AssetClass::Crypto => "COINGECKO",
    }
}

impl SyncConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from a map of variables; used by tests and embedders.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_vars(|key| vars.get(key).cloned())
    }

    /// Load through an arbitrary lookup. Blank values count as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut routes = Vec::with_capacity(AssetClass::ALL.len());
        for asset_class in AssetClass::ALL {
            let raw = get(route_var(asset_class)).unwrap_or_else(|| default_route(asset_class).to_string());
            let ids: Vec<String> = raw
                .split(',')
                .map(|id| id.trim().to_ascii_uppercase())
                .filter(|id| !id.is_empty())
                .collect();
            if ids.is_empty() {
                return Err(Error::invalid_config(route_var(asset_class), "no provider ids"));
            }
            routes.push((asset_class, ids));
        }

        let mut providers: Vec<ProviderConfig> = Vec::new();
        for id in routes.iter().flat_map(|(_, ids)| ids) {
            if providers.iter().any(|p| p.id == id.as_str()) {
                continue;
            }
            providers.push(provider_config(id, &get)?);
        }

        let mut provider_options = ProviderOptions::default();
        if let Some(currency) = get("FINSIGHT_COINGECKO_VS_CURRENCY") {
            provider_options.crypto_vs_currency = currency.to_ascii_lowercase();
        }

        let settings = SyncSettings {
            item_timeout: parse_secs(&get, "FINSIGHT_SYNC_ITEM_TIMEOUT_SECS", DEFAULT_ITEM_TIMEOUT)?,
            max_concurrency: parse_positive(&get, "FINSIGHT_SYNC_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY)?,
            cycle_deadline: parse_secs(&get, "FINSIGHT_SYNC_DEADLINE_SECS", DEFAULT_CYCLE_DEADLINE)?,
        };

        debug!(
            providers = providers.len(),
            max_concurrency = settings.max_concurrency,
            "Loaded sync configuration"
        );

        Ok(Self {
            providers,
            routes,
            provider_options,
            settings,
        })
    }

    /// Construct every routed adapter plus the shared rate limiter.
    pub fn build_registry(&self) -> Result<ProviderRegistry> {
        Ok(ProviderRegistry::from_configs(
            self.providers.clone(),
            &self.routes,
            &self.provider_options,
        )?)
    }
}

fn provider_config<G>(id: &str, get: &G) -> Result<ProviderConfig>
where
    G: Fn(&str) -> Option<String>,
{
    let mut config = default_config(id)?;
    let var = |suffix: &str| format!("{}{}_{}", ENV_PREFIX, id, suffix);

    if let Some(base_url) = get(&var("BASE_URL")) {
        config.base_url = base_url;
    }
    if let Some(raw) = get(&var("RATE_LIMIT")) {
        let rate_limit: RateLimit = raw
            .parse()
            .map_err(|message: String| Error::invalid_config(var("RATE_LIMIT"), message))?;
        rate_limit.min_interval(&config.id)?;
        config.rate_limit = rate_limit;
    }
    Ok(config.with_api_key(get(&var("API_KEY"))))
}

fn parse_positive<G>(get: &G, key: &str, default: usize) -> Result<usize>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => match raw.parse::<usize>() {
            Ok(0) | Err(_) => Err(Error::invalid_config(
                key,
                format!("expected a positive integer, got '{}'", raw),
            )),
            Ok(value) => Ok(value),
        },
    }
}

fn parse_secs<G>(get: &G, key: &str, default: Duration) -> Result<Duration>
where
    G: Fn(&str) -> Option<String>,
{
    let default_secs = usize::try_from(default.as_secs()).unwrap_or(usize::MAX);
    let secs = parse_positive(get, key, default_secs)?;
    let duration = Duration::from_secs(secs as u64);
    if duration > MAX_SYNC_DURATION {
        return Err(Error::invalid_config(
            key,
            format!(
                "expected at most {} seconds, got {}",
                MAX_SYNC_DURATION.as_secs(),
                secs
            ),
        ));
    }
    Ok(duration)
}
