//! Quote data validation.
//!
//! Validates quote data from providers before it reaches an investment:
//! - Price must be positive
//! - High/low invariants (high >= low, price inside the range)
//! - Non-negative volume
//! - Reasonable value ranges

use log::warn;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::Quote;

/// Validation severity levels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationSeverity {
    /// Hard failure - reject quote, try next provider.
    Hard,
    /// Soft warning - accept quote but log warning.
    Soft,
}

/// A single problem found in a quote.
#[derive(Clone, Debug)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
}

/// Quote validator configuration.
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// Whether to reject quotes where high < low.
    pub reject_invalid_range: bool,
    /// Price above which a warning is logged.
    pub max_price: Option<Decimal>,
    /// Whether to warn on zero volume.
    pub warn_on_zero_volume: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            reject_invalid_range: true,
            max_price: Some(Decimal::from(1_000_000_000i64)),
            warn_on_zero_volume: true,
        }
    }
}

/// Quote data validator.
///
/// A rejected quote becomes a permanent `MalformedResponse` from the provider
/// that produced it, so a fallback chain moves on to the next adapter.
#[derive(Clone, Debug, Default)]
pub struct QuoteValidator {
    config: ValidatorConfig,
}

impl QuoteValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate a quote.
    ///
    /// Returns Ok(()) if the quote is usable. Warnings are logged but do not
    /// cause rejection.
    pub fn validate(&self, quote: &Quote) -> Result<(), MarketDataError> {
        let issues = self.issues(quote);

        let errors: Vec<&str> = issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Hard)
            .map(|i| i.message.as_str())
            .collect();

        if !errors.is_empty() {
            return Err(MarketDataError::MalformedResponse {
                provider: quote.provider.clone(),
                message: format!("Quote for {} failed validation: {}", quote.symbol, errors.join("; ")),
            });
        }

        for issue in issues.iter().filter(|i| i.severity == ValidationSeverity::Soft) {
            warn!(
                "Quote validation warning for {} from {}: {}",
                quote.symbol, quote.provider, issue.message
            );
        }

        Ok(())
    }

    /// Collect every issue without deciding on rejection.
    pub fn issues(&self, quote: &Quote) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        self.validate_price(quote, &mut issues);
        self.validate_range(quote, &mut issues);
        self.validate_volume(quote, &mut issues);
        issues
    }

    fn validate_price(&self, quote: &Quote, issues: &mut Vec<ValidationIssue>) {
        if quote.price <= Decimal::ZERO {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Hard,
                message: format!("Non-positive price: {}", quote.price),
            });
        }

        if let Some(max_price) = self.config.max_price {
            if quote.price > max_price {
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Soft,
                    message: format!("Price ({}) exceeds max threshold ({})", quote.price, max_price),
                });
            }
        }
    }

    fn validate_range(&self, quote: &Quote, issues: &mut Vec<ValidationIssue>) {
        let (Some(high), Some(low)) = (quote.high, quote.low) else {
            return;
        };

        if self.config.reject_invalid_range && high < low {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Hard,
                message: format!("High ({}) is less than Low ({})", high, low),
            });
            return;
        }

        // Intraday prints can land just outside a cached range.
        if quote.price < low || quote.price > high {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Soft,
                message: format!("Price ({}) is outside High/Low range ({}-{})", quote.price, low, high),
            });
        }
    }

    fn validate_volume(&self, quote: &Quote, issues: &mut Vec<ValidationIssue>) {
        if let Some(volume) = quote.volume {
            if volume < Decimal::ZERO {
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Hard,
                    message: format!("Negative volume: {}", volume),
                });
            }

            if self.config.warn_on_zero_volume && volume.is_zero() {
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Soft,
                    message: "Zero volume (market may be closed)".to_string(),
                });
            }
        }
    }
}
