//! Currency endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::Money;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct CurrenciesResponse {
    pub currency_codes: Vec<String>,
}

#[derive(Deserialize)]
pub struct ConvertRequest {
    pub from: Money,
    pub to_code: String,
}

/// GET /currencies — supported currency codes, sorted.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<CurrenciesResponse> {
    Json(CurrenciesResponse {
        currency_codes: state.converter.supported_currencies(),
    })
}

/// POST /currencies/convert — converts an amount into another currency.
pub async fn convert(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ConvertRequest>,
) -> Result<Json<Money>, ApiError> {
    let converted = state.converter.convert(&body.from, &body.to_code)?;
    Ok(Json(converted))
}
