use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use finsight_market_data::{AssetClass, Quote};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

/// Latest quote for one identifier through the asset class's configured route.
async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path((asset_class, identifier)): Path<(String, String)>,
) -> ApiResult<Json<Quote>> {
    let asset_class: AssetClass = asset_class.parse().map_err(ApiError::BadRequest)?;
    let quote = state.registry.fetch_quote(asset_class, &identifier).await?;
    Ok(Json(quote))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/quotes/{asset_class}/{identifier}", get(get_quote))
}
