//! Provider registry module.
//!
//! This module provides orchestration for market data providers, including:
//! - Rate limiting per provider
//! - Ordered fallback across providers
//! - Per-asset-class routing
//! - Quote data validation

mod fallback;
mod rate_limiter;
mod registry;
mod validator;

pub use fallback::FallbackResolver;
pub use rate_limiter::RateLimiter;
pub use registry::ProviderRegistry;
pub use validator::{QuoteValidator, ValidationIssue, ValidationSeverity, ValidatorConfig};
