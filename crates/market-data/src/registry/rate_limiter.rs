//! Minimum-interval rate limiter for market data providers.
//!
//! Each provider gets its own slot holding its [`ProviderConfig`] and the time
//! of the last granted request. Granting a request is a single operation under
//! that slot's mutex: wait out the remaining interval, then stamp the grant.
//! Callers for the same provider queue on the mutex in FIFO order; callers for
//! different providers never touch the same lock.

use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::errors::MarketDataError;
use crate::models::{ProviderConfig, ProviderId};

/// Per-provider limiter state.
#[derive(Debug)]
struct ProviderSlot {
    config: ProviderConfig,
    min_interval: Duration,
    last_request_at: Mutex<Option<Instant>>,
}

/// Rate limiter for multiple providers.
///
/// Built once at startup and shared by reference (usually behind an `Arc`)
/// with the resolver and the sync orchestrator.
#[derive(Debug, Default)]
pub struct RateLimiter {
    slots: HashMap<String, ProviderSlot>,
}

impl RateLimiter {
    /// Create an empty rate limiter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a rate limiter for the given providers.
    pub fn from_configs(
        configs: impl IntoIterator<Item = ProviderConfig>,
    ) -> Result<Self, MarketDataError> {
        let mut limiter = Self::new();
        for config in configs {
            limiter.register(config)?;
        }
        Ok(limiter)
    }

    /// Register a provider. A non-positive rate limit is rejected here so it
    /// can never turn into an endless wait during a sync.
    pub fn register(&mut self, config: ProviderConfig) -> Result<(), MarketDataError> {
        let min_interval = config.rate_limit.min_interval(&config.id)?;
        debug!(
            "Rate limiter: registered '{}' with min interval {:?}",
            config.id, min_interval
        );
        self.slots.insert(
            config.id.to_string(),
            ProviderSlot {
                config,
                min_interval,
                last_request_at: Mutex::new(None),
            },
        );
        Ok(())
    }

    fn slot(&self, provider: &str) -> Result<&ProviderSlot, MarketDataError> {
        self.slots
            .get(provider)
            .ok_or_else(|| MarketDataError::UnknownProvider(provider.to_string()))
    }

    /// Wait until the provider may be called again, then record the grant.
    ///
    /// The wait happens while holding the provider's slot, so two concurrent
    /// callers can never both observe an expired window.
    pub async fn acquire(&self, provider: &str) -> Result<(), MarketDataError> {
        let slot = self.slot(provider)?;
        let mut last_request_at = slot.last_request_at.lock().await;

        if let Some(last) = *last_request_at {
            let ready_at = last + slot.min_interval;
            if ready_at > Instant::now() {
                debug!(
                    "Rate limiter: waiting {:?} for provider '{}'",
                    ready_at - Instant::now(),
                    provider
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last_request_at = Some(Instant::now());
        debug!("Rate limiter: granted request for '{}'", provider);
        Ok(())
    }

    /// Time of the last granted request, `None` if the provider was never called.
    pub async fn last_request_at(&self, provider: &str) -> Result<Option<Instant>, MarketDataError> {
        Ok(*self.slot(provider)?.last_request_at.lock().await)
    }

    /// Configured spacing between two requests to the provider.
    pub fn min_interval(&self, provider: &str) -> Result<Duration, MarketDataError> {
        Ok(self.slot(provider)?.min_interval)
    }

    /// Configuration the provider was registered with.
    pub fn config(&self, provider: &str) -> Result<&ProviderConfig, MarketDataError> {
        Ok(&self.slot(provider)?.config)
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.slots.contains_key(provider)
    }

    pub fn providers(&self) -> Vec<ProviderId> {
        self.slots.values().map(|s| s.config.id.clone()).collect()
    }
}
