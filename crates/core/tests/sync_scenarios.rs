//! End-to-end scenarios: sync a snapshot, merge it, value it.

use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use finsight_core::{valuate, Investment, SyncOrchestrator, SyncSettings};
use finsight_market_data::{
    AssetClass, ErrorKind, MarketDataError, ProviderConfig, ProviderRegistry, Quote, QuoteProvider,
    RateLimit, RateLimiter,
};

/// Prices every identifier at a fixed price unless it is listed as failing.
struct FixedPriceProvider {
    id: &'static str,
    classes: &'static [AssetClass],
    price: Decimal,
    failing: Vec<&'static str>,
    calls: AtomicUsize,
}

#[async_trait]
impl QuoteProvider for FixedPriceProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn asset_classes(&self) -> &'static [AssetClass] {
        self.classes
    }

    async fn fetch_quote(&self, identifier: &str) -> Result<Quote, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&identifier) {
            return Err(MarketDataError::SymbolNotFound {
                provider: Cow::Borrowed(self.id),
                symbol: identifier.to_string(),
            });
        }
        Ok(Quote::new(identifier, self.price, Utc::now(), Cow::Borrowed(self.id)))
    }
}

fn provider(
    id: &'static str,
    classes: &'static [AssetClass],
    price: Decimal,
    failing: Vec<&'static str>,
) -> Arc<FixedPriceProvider> {
    Arc::new(FixedPriceProvider {
        id,
        classes,
        price,
        failing,
        calls: AtomicUsize::new(0),
    })
}

fn orchestrator(
    providers: Vec<Arc<FixedPriceProvider>>,
    routes: Vec<(AssetClass, Vec<&'static str>)>,
) -> SyncOrchestrator {
    let limiter = RateLimiter::from_configs(
        providers
            .iter()
            .map(|p| ProviderConfig::new(p.id, "http://localhost", RateLimit::per_second(50.0))),
    )
    .unwrap();
    let mut registry = ProviderRegistry::new(
        providers
            .into_iter()
            .map(|p| p as Arc<dyn QuoteProvider>)
            .collect(),
        Arc::new(limiter),
    )
    .unwrap();
    for (class, ids) in routes {
        registry.set_route(class, &ids).unwrap();
    }
    SyncOrchestrator::new(Arc::new(registry), SyncSettings::default())
}

fn snapshot() -> Vec<Investment> {
    serde_json::from_str(
        r#"[
            {"id": "s1", "type": "stock", "symbol": "TCS", "quantity": 10, "invested_amount": 900},
            {"id": "s2", "type": "stock", "symbol": "GONE", "quantity": 4, "invested_amount": 400,
             "current_price": 95, "current_value": 380, "broker": "zerodha"},
            {"id": "m1", "type": "mutual-fund", "scheme_code": "119551", "quantity": 20, "invested_amount": 800},
            {"id": "f1", "type": "fixed-deposit", "quantity": null, "invested_amount": 5000}
        ]"#,
    )
    .unwrap()
}

#[tokio::test]
async fn test_sync_then_valuate() {
    const EQUITY: &[AssetClass] = &[AssetClass::Equity];
    const FUNDS: &[AssetClass] = &[AssetClass::MutualFund];

    let nse = provider("NSE", EQUITY, dec!(100), vec!["GONE"]);
    let cams = provider("CAMS", FUNDS, dec!(0), vec!["119551"]);
    let mfapi = provider("MFAPI", FUNDS, dec!(50), vec![]);
    let orchestrator = orchestrator(
        vec![nse.clone(), cams.clone(), mfapi.clone()],
        vec![
            (AssetClass::Equity, vec!["NSE"]),
            (AssetClass::MutualFund, vec!["CAMS", "MFAPI"]),
        ],
    );

    let investments = snapshot();
    let report = orchestrator.sync(&investments).await;

    assert_eq!(report.updated.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.failures[0].investment_id, "s2");
    assert_eq!(report.failures[0].error_kind, ErrorKind::Permanent);
    assert_eq!(cams.calls.load(Ordering::SeqCst), 1);
    assert_eq!(mfapi.calls.load(Ordering::SeqCst), 1);

    let merged = report.apply_to(&investments);
    assert_eq!(merged[1], investments[1]);
    assert_eq!(merged[0].current_value, Some(dec!(1000)));
    assert_eq!(merged[2].current_value, Some(dec!(1000)));

    // 1000 + 380 + 1000 + 5000 against 900 + 400 + 800 + 5000
    let totals = valuate(&merged).unwrap();
    assert_eq!(totals.total_value, dec!(7380));
    assert_eq!(totals.total_invested, dec!(7100));
    assert_eq!(totals.total_gain_loss, dec!(280));
    assert_eq!(totals.total_gain_loss_percent.round_dp(2), dec!(3.94));
}

#[tokio::test]
async fn test_report_serializes_for_collaborators() {
    const EQUITY: &[AssetClass] = &[AssetClass::Equity];
    let orchestrator = orchestrator(
        vec![provider("NSE", EQUITY, dec!(100), vec!["GONE"])],
        vec![(AssetClass::Equity, vec!["NSE"])],
    );

    let report = orchestrator.sync(&snapshot()[..2]).await;
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["updated"][0]["id"], "s1");
    assert_eq!(json["updated"][0]["current_price"], 100.0);
    assert_eq!(json["failures"][0]["investmentId"], "s2");
    assert_eq!(json["failures"][0]["errorKind"], "PermanentProviderError");
    assert_eq!(json["failures"][0]["retryable"], false);
    assert!(json["failures"][0]["message"]
        .as_str()
        .unwrap()
        .contains("GONE"));
}
