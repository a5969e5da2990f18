//! Per-item outcomes and the aggregate sync report.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use finsight_market_data::{ErrorKind, MarketDataError};

use crate::investments::Investment;

/// Lifecycle of one investment inside a cycle.
///
/// `Pending -> Fetching -> {Updated | Failed}`; types without a market feed
/// go `Pending -> Skipped`. There are no retries within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemState {
    Pending,
    Fetching,
    Updated,
    Failed,
    Skipped,
}

impl ItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Fetching => "FETCHING",
            Self::Updated => "UPDATED",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One provider's contribution to an exhausted fallback chain.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSummary {
    pub provider: String,
    pub error_kind: ErrorKind,
    pub message: String,
}

/// Why an investment was not repriced. The investment itself is untouched.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub investment_id: String,
    pub error_kind: ErrorKind,
    pub message: String,
    /// Worth trying again next cycle.
    pub retryable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<AttemptSummary>,
    #[serde(skip)]
    pub error: MarketDataError,
}

impl SyncFailure {
    pub fn new(investment_id: impl Into<String>, error: MarketDataError) -> Self {
        let attempts = error
            .attempts()
            .iter()
            .map(|a| AttemptSummary {
                provider: a.provider.to_string(),
                error_kind: a.error.kind(),
                message: a.error.to_string(),
            })
            .collect();
        Self {
            investment_id: investment_id.into(),
            error_kind: error.kind(),
            message: error.to_string(),
            retryable: error.is_retryable(),
            attempts,
            error,
        }
    }
}

/// An investment whose type has no market price source.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedItem {
    pub investment_id: String,
    pub investment_type: String,
    pub reason: String,
}

/// Terminal outcome for one investment.
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    Updated(Investment),
    Failed(SyncFailure),
    Skipped(SkippedItem),
}

impl ItemOutcome {
    pub fn state(&self) -> ItemState {
        match self {
            Self::Updated(_) => ItemState::Updated,
            Self::Failed(_) => ItemState::Failed,
            Self::Skipped(_) => ItemState::Skipped,
        }
    }
}

/// Result of one sync cycle. Never an error as a whole: every investment
/// ends up in exactly one of the three lists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Repriced copies, in input order.
    pub updated: Vec<Investment>,
    pub failures: Vec<SyncFailure>,
    pub skipped: Vec<SkippedItem>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub(crate) fn from_outcomes(
        outcomes: impl IntoIterator<Item = ItemOutcome>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let mut report = Self {
            updated: Vec::new(),
            failures: Vec::new(),
            skipped: Vec::new(),
            started_at,
            finished_at: Utc::now(),
        };
        for outcome in outcomes {
            match outcome {
                ItemOutcome::Updated(investment) => report.updated.push(investment),
                ItemOutcome::Failed(failure) => report.failures.push(failure),
                ItemOutcome::Skipped(skipped) => report.skipped.push(skipped),
            }
        }
        report
    }

    pub fn total(&self) -> usize {
        self.updated.len() + self.failures.len() + self.skipped.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures worth retrying on the next cycle.
    pub fn retryable_failures(&self) -> impl Iterator<Item = &SyncFailure> {
        self.failures.iter().filter(|f| f.retryable)
    }

    /// Merge the repriced records into a full snapshot.
    ///
    /// Records that were not updated are returned exactly as given.
    pub fn apply_to(&self, investments: &[Investment]) -> Vec<Investment> {
        let updated: HashMap<&str, &Investment> =
            self.updated.iter().map(|i| (i.id.as_str(), i)).collect();
        investments
            .iter()
            .map(|inv| {
                updated
                    .get(inv.id.as_str())
                    .map(|u| (*u).clone())
                    .unwrap_or_else(|| inv.clone())
            })
            .collect()
    }

    /// Get a summary string.
    pub fn summary(&self) -> String {
        let elapsed = (self.finished_at - self.started_at).num_milliseconds();
        if self.is_success() {
            format!(
                "Updated {} of {} investments ({} skipped) in {}ms",
                self.updated.len(),
                self.total(),
                self.skipped.len(),
                elapsed
            )
        } else {
            format!(
                "Updated {} of {} investments with {} failures ({} skipped) in {}ms",
                self.updated.len(),
                self.total(),
                self.failures.len(),
                self.skipped.len(),
                elapsed
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::investments::InvestmentType;
    use finsight_market_data::ProviderAttempt;
    use rust_decimal_macros::dec;
    use std::borrow::Cow;

    #[test]
    fn test_failure_from_exhaustion() {
        let error = MarketDataError::AllProvidersExhausted {
            attempts: vec![
                ProviderAttempt {
                    provider: Cow::Borrowed("CAMS"),
                    error: MarketDataError::Timeout {
                        provider: Cow::Borrowed("CAMS"),
                    },
                },
                ProviderAttempt {
                    provider: Cow::Borrowed("MFAPI"),
                    error: MarketDataError::SymbolNotFound {
                        provider: Cow::Borrowed("MFAPI"),
                        symbol: "1".to_string(),
                    },
                },
            ],
        };
        let failure = SyncFailure::new("inv-1", error);

        assert_eq!(failure.error_kind, ErrorKind::AllProvidersExhausted);
        assert!(failure.retryable);
        assert_eq!(failure.attempts.len(), 2);
        assert_eq!(failure.attempts[0].provider, "CAMS");

        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["investmentId"], "inv-1");
        assert_eq!(json["errorKind"], "AllProvidersExhausted");
        assert_eq!(json["attempts"][1]["errorKind"], "PermanentProviderError");
    }

    #[test]
    fn test_apply_to_keeps_untouched_records() {
        let a = Investment::new("a", InvestmentType::Stock, dec!(100)).with_quantity(dec!(1));
        let b = Investment::new("b", InvestmentType::Stock, dec!(200)).with_quantity(dec!(2));
        let mut a_updated = a.clone();
        a_updated.current_price = Some(dec!(150));
        a_updated.current_value = Some(dec!(150));

        let report = SyncReport::from_outcomes([ItemOutcome::Updated(a_updated.clone())], Utc::now());
        let merged = report.apply_to(&[a, b.clone()]);

        assert_eq!(merged, vec![a_updated, b]);
    }

    #[test]
    fn test_summary() {
        let report = SyncReport::from_outcomes(
            [ItemOutcome::Skipped(SkippedItem {
                investment_id: "fd".to_string(),
                investment_type: "fixed-deposit".to_string(),
                reason: "no market price source".to_string(),
            })],
            Utc::now(),
        );
        assert!(report.is_success());
        assert!(report.summary().starts_with("Updated 0 of 1 investments (1 skipped)"));
    }
}
