use axum::{
    extract::{Query, State},
    response::Response,
    Json,
};
use infocache::models::ExchangeRate;
use serde::Deserialize;
use tracing::{error, info};

use super::{bad_request, internal_error};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ExchangeQuery {
    #[serde(default)]
    base: String,
    #[serde(default)]
    target: String,
}

/// GET /exchange?base=&target=
pub async fn get_exchange_rate(
    State(state): State<AppState>,
    Query(query): Query<ExchangeQuery>,
) -> Result<Json<ExchangeRate>, Response> {
    let base = query.base.trim();
    let target = query.target.trim();
    if base.is_empty() || target.is_empty() {
        return Err(bad_request(
            "query parameters 'base' and 'target' are required",
        ));
    }

    info!(%base, %target, "GET /exchange");

    match state.exchange.get(&[base, target]).await {
        Ok(rate) => Ok(Json(rate)),
        Err(e) => {
            error!(%base, %target, error = %e, "exchange lookup failed");
            Err(internal_error("failed to fetch exchange rate"))
        }
    }
}
