//! Provider registry for orchestrating market data providers.
//!
//! The registry owns the constructed adapters and the per-asset-class routes
//! (ordered provider ids). A route of one provider is called directly; a
//! longer route goes through the [`FallbackResolver`].

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};

use super::{FallbackResolver, QuoteValidator, RateLimiter};
use crate::errors::MarketDataError;
use crate::models::{AssetClass, ProviderConfig, Quote};
use crate::provider::{build_provider, ProviderOptions, QuoteProvider};

/// Provider registry for routing quote requests.
pub struct ProviderRegistry {
    providers: HashMap<&'static str, Arc<dyn QuoteProvider>>,
    routes: HashMap<AssetClass, Vec<Arc<dyn QuoteProvider>>>,
    resolver: FallbackResolver,
}

impl ProviderRegistry {
    /// Create a registry over already-constructed adapters.
    ///
    /// Every adapter must have a slot in the rate limiter.
    pub fn new(
        providers: Vec<Arc<dyn QuoteProvider>>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Result<Self, MarketDataError> {
        let mut by_id = HashMap::with_capacity(providers.len());
        for provider in providers {
            if !rate_limiter.contains(provider.id()) {
                return Err(MarketDataError::InvalidConfig(format!(
                    "provider '{}' has no rate limit configured",
                    provider.id()
                )));
            }
            by_id.insert(provider.id(), provider);
        }

        Ok(Self {
            providers: by_id,
            routes: HashMap::new(),
            resolver: FallbackResolver::new(rate_limiter),
        })
    }

    /// Build adapters and the rate limiter from configuration, then install
    /// the routes. Fails fast on the first configuration problem.
    pub fn from_configs(
        configs: Vec<ProviderConfig>,
        routes: &[(AssetClass, Vec<String>)],
        options: &ProviderOptions,
    ) -> Result<Self, MarketDataError> {
        let providers = configs
            .iter()
            .map(|config| build_provider(config, options))
            .collect::<Result<Vec<_>, _>>()?;
        let rate_limiter = Arc::new(RateLimiter::from_configs(configs)?);

        let mut registry = Self::new(providers, rate_limiter)?;
        for (asset_class, ids) in routes {
            registry.set_route(*asset_class, ids)?;
        }
        Ok(registry)
    }

    pub fn with_validator(mut self, validator: QuoteValidator) -> Self {
        self.resolver = self.resolver.with_validator(validator);
        self
    }

    /// Install the ordered provider list for an asset class.
    ///
    /// Ids must be registered and able to price the class; the first id has
    /// the highest priority.
    pub fn set_route<S: AsRef<str>>(
        &mut self,
        asset_class: AssetClass,
        ids: &[S],
    ) -> Result<(), MarketDataError> {
        if ids.is_empty() {
            return Err(MarketDataError::InvalidConfig(format!(
                "route for {} is empty",
                asset_class
            )));
        }

        let mut chain = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            let provider = self
                .providers
                .get(id)
                .ok_or_else(|| MarketDataError::UnknownProvider(id.to_string()))?;
            if !provider.asset_classes().contains(&asset_class) {
                return Err(MarketDataError::InvalidConfig(format!(
                    "provider '{}' cannot price {}",
                    id, asset_class
                )));
            }
            chain.push(Arc::clone(provider));
        }

        info!(
            "Route for {}: {}",
            asset_class,
            chain.iter().map(|p| p.id()).collect::<Vec<_>>().join(" -> ")
        );
        self.routes.insert(asset_class, chain);
        Ok(())
    }

    /// Ordered adapters for an asset class, empty when unrouted.
    pub fn route(&self, asset_class: AssetClass) -> &[Arc<dyn QuoteProvider>] {
        self.routes.get(&asset_class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn route_ids(&self, asset_class: AssetClass) -> Vec<&'static str> {
        self.route(asset_class).iter().map(|p| p.id()).collect()
    }

    /// Fetch the latest quote for an identifier of the given class.
    ///
    /// A single-provider route returns that adapter's own error; a chain
    /// returns `AllProvidersExhausted` when every adapter fails.
    pub async fn fetch_quote(
        &self,
        asset_class: AssetClass,
        identifier: &str,
    ) -> Result<Quote, MarketDataError> {
        let route = self.route(asset_class);
        debug!(
            "Fetching {} quote for {} via {} provider(s)",
            asset_class,
            identifier,
            route.len()
        );

        match route {
            [single] => self.resolver.fetch_one(identifier, single.as_ref()).await,
            chain => self.resolver.resolve(identifier, chain).await,
        }
    }

    pub fn provider(&self, id: &str) -> Option<&Arc<dyn QuoteProvider>> {
        self.providers.get(id)
    }

    pub fn resolver(&self) -> &FallbackResolver {
        &self.resolver
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        self.resolver.rate_limiter()
    }
}
