use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use finsight_core::{valuate, Investment, PortfolioTotals, SyncReport};
use serde::{Deserialize, Serialize};

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Debug, Deserialize)]
pub struct InvestmentsRequest {
    pub investments: Vec<Investment>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub report: SyncReport,
    /// Totals over the snapshot with the report's updates merged in.
    pub totals: PortfolioTotals,
}

/// Run one sync cycle over the posted snapshot. Individual failures are
/// reported, never turned into an error status.
async fn sync_investments(
    State(state): State<Arc<AppState>>,
    Json(body): Json<InvestmentsRequest>,
) -> ApiResult<Json<SyncResponse>> {
    let report = state.orchestrator.sync(&body.investments).await;
    let totals = valuate(&report.apply_to(&body.investments))?;
    Ok(Json(SyncResponse { report, totals }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/investments/sync", post(sync_investments))
}
