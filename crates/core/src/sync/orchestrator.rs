//! Investment price synchronization.
//!
//! ```text
//! SyncOrchestrator
//!       │
//!       └─► ProviderRegistry (route per asset class)
//!                 ├─► RateLimiter (acquire before each call)
//!                 └─► FallbackResolver / single adapter
//! ```
//!
//! Each investment is an independent unit of work: it is routed by type,
//! fetched under a timeout and turned into an [`ItemOutcome`]. Nothing an
//! item does can fail the batch.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use finsight_market_data::{MarketDataError, ProviderRegistry};

use super::report::{ItemOutcome, ItemState, SkippedItem, SyncFailure, SyncReport};
use crate::config::SyncSettings;
use crate::investments::Investment;

/// Stand-in for "no deadline" when a duration does not fit on the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

fn deadline_after(start: Instant, duration: Duration) -> Instant {
    start
        .checked_add(duration)
        .unwrap_or_else(|| start + FAR_FUTURE)
}

/// Reprices investments from market data providers.
pub struct SyncOrchestrator {
    registry: Arc<ProviderRegistry>,
    settings: SyncSettings,
}

impl SyncOrchestrator {
    pub fn new(registry: Arc<ProviderRegistry>, settings: SyncSettings) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Run one cycle bounded by the configured cycle deadline.
    pub async fn sync(&self, investments: &[Investment]) -> SyncReport {
        self.sync_with_deadline(investments, self.settings.cycle_deadline)
            .await
    }

    /// Run one cycle that finishes within `deadline`.
    ///
    /// Each item gets `min(item_timeout, time left until the deadline)`; an
    /// item that runs out of time is a transient failure and keeps its old
    /// values.
    pub async fn sync_with_deadline(
        &self,
        investments: &[Investment],
        deadline: Duration,
    ) -> SyncReport {
        let started_at = Utc::now();
        let cycle_deadline = deadline_after(Instant::now(), deadline);

        info!(
            investments = investments.len(),
            max_concurrency = self.settings.max_concurrency,
            deadline_ms = deadline.as_millis() as u64,
            "Starting investment sync"
        );

        let items: Vec<_> = investments
            .iter()
            .enumerate()
            .map(|(index, investment)| async move {
                (index, self.sync_item(investment, cycle_deadline).await)
            })
            .collect();
        let mut outcomes: Vec<(usize, ItemOutcome)> = stream::iter(items)
            .buffer_unordered(self.settings.max_concurrency.max(1))
            .collect()
            .await;

        outcomes.sort_by_key(|(index, _)| *index);
        let report = SyncReport::from_outcomes(outcomes.into_iter().map(|(_, o)| o), started_at);

        info!(
            updated = report.updated.len(),
            failed = report.failures.len(),
            skipped = report.skipped.len(),
            "{}",
            report.summary()
        );
        report
    }

    /// Drive one investment from `Pending` to a terminal state.
    async fn sync_item(&self, investment: &Investment, cycle_deadline: Instant) -> ItemOutcome {
        debug!(investment_id = %investment.id, state = %ItemState::Pending, "Sync item");

        let Some(asset_class) = investment.asset_class() else {
            let skipped = SkippedItem {
                investment_id: investment.id.clone(),
                investment_type: investment.investment_type.to_string(),
                reason: format!("no market price source for '{}'", investment.investment_type),
            };
            debug!(investment_id = %investment.id, state = %ItemState::Skipped, reason = %skipped.reason, "Sync item");
            return ItemOutcome::Skipped(skipped);
        };

        let Some(identifier) = investment.lookup_identifier() else {
            return self.fail(
                investment,
                MarketDataError::MissingIdentifier(format!(
                    "investment {} ({}) has no symbol or scheme code",
                    investment.id, investment.investment_type
                )),
            );
        };

        debug!(
            investment_id = %investment.id,
            state = %ItemState::Fetching,
            asset_class = %asset_class,
            identifier,
            "Sync item"
        );

        let item_deadline = deadline_after(Instant::now(), self.settings.item_timeout).min(cycle_deadline);
        let fetch = self.registry.fetch_quote(asset_class, identifier);

        match timeout_at(item_deadline, fetch).await {
            Ok(Ok(quote)) => {
                let mut updated = investment.clone();
                if let Err(error) = updated.apply_quote(&quote) {
                    return self.fail(investment, error);
                }
                debug!(
                    investment_id = %investment.id,
                    state = %ItemState::Updated,
                    provider = %quote.provider,
                    price = %quote.price,
                    "Sync item"
                );
                ItemOutcome::Updated(updated)
            }
            Ok(Err(error)) => self.fail(investment, error),
            Err(_elapsed) => {
                let route = self.registry.route_ids(asset_class).join(",");
                self.fail(
                    investment,
                    MarketDataError::Timeout {
                        provider: Cow::Owned(route),
                    },
                )
            }
        }
    }

    fn fail(&self, investment: &Investment, error: MarketDataError) -> ItemOutcome {
        warn!(
            investment_id = %investment.id,
            state = %ItemState::Failed,
            error_kind = %error.kind(),
            "Sync item failed: {}",
            error
        );
        ItemOutcome::Failed(SyncFailure::new(investment.id.clone(), error))
    }
}
