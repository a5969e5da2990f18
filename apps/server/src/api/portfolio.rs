use std::sync::Arc;

use axum::{routing::post, Json, Router};
use finsight_core::{allocation_by_type, valuate, PortfolioTotals, TypeAllocation};
use serde::Serialize;

use super::investments::InvestmentsRequest;
use crate::{error::ApiResult, main_lib::AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValuationResponse {
    #[serde(flatten)]
    totals: PortfolioTotals,
    allocation: Vec<TypeAllocation>,
}

async fn portfolio_valuation(
    Json(body): Json<InvestmentsRequest>,
) -> ApiResult<Json<ValuationResponse>> {
    Ok(Json(ValuationResponse {
        totals: valuate(&body.investments)?,
        allocation: allocation_by_type(&body.investments)?,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/portfolio/valuation", post(portfolio_valuation))
}
