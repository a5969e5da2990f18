//! Ordered provider fallback.
//!
//! A chain is an ordered list of adapters that can price the same identifier.
//! The resolver walks it strictly in order, gating every attempt on the rate
//! limiter and stopping at the first quote that passes validation.

use std::borrow::Cow;
use std::sync::Arc;

use log::{debug, info, warn};

use super::{QuoteValidator, RateLimiter};
use crate::errors::{ErrorKind, MarketDataError, ProviderAttempt};
use crate::models::Quote;
use crate::provider::QuoteProvider;

/// Walks a provider chain until one adapter returns a valid quote.
#[derive(Clone)]
pub struct FallbackResolver {
    rate_limiter: Arc<RateLimiter>,
    validator: QuoteValidator,
}

impl FallbackResolver {
    pub fn new(rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            rate_limiter,
            validator: QuoteValidator::new(),
        }
    }

    pub fn with_validator(mut self, validator: QuoteValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Fetch from one adapter: acquire, call once, validate.
    ///
    /// The adapter's own error is returned unchanged.
    pub async fn fetch_one(
        &self,
        identifier: &str,
        provider: &dyn QuoteProvider,
    ) -> Result<Quote, MarketDataError> {
        self.rate_limiter.acquire(provider.id()).await?;
        let quote = provider.fetch_quote(identifier).await?;
        self.validator.validate(&quote)?;
        Ok(quote)
    }

    /// Resolve a quote through an ordered chain.
    ///
    /// Later adapters are never called once one succeeds. When every adapter
    /// fails the error carries each attempt in the order it was made. A
    /// configuration error (an adapter missing from the rate limiter) aborts
    /// the walk immediately.
    pub async fn resolve(
        &self,
        identifier: &str,
        chain: &[Arc<dyn QuoteProvider>],
    ) -> Result<Quote, MarketDataError> {
        let mut attempts: Vec<ProviderAttempt> = Vec::with_capacity(chain.len());

        for provider in chain {
            let provider_id = Cow::Borrowed(provider.id());

            debug!("Trying provider '{}' for {}", provider_id, identifier);

            match self.fetch_one(identifier, provider.as_ref()).await {
                Ok(quote) => {
                    if !attempts.is_empty() {
                        info!(
                            "Resolved {} from '{}' after {} failed attempt(s)",
                            identifier,
                            provider_id,
                            attempts.len()
                        );
                    }
                    return Ok(quote);
                }
                Err(e) if e.kind() == ErrorKind::Configuration => return Err(e),
                Err(e) => {
                    warn!(
                        "Provider '{}' failed for {} ({}): {}",
                        provider_id,
                        identifier,
                        e.kind(),
                        e
                    );
                    attempts.push(ProviderAttempt {
                        provider: provider_id,
                        error: e,
                    });
                }
            }
        }

        let error = MarketDataError::AllProvidersExhausted { attempts };
        warn!("No provider could price {}: {}", identifier, error);
        Err(error)
    }
}
