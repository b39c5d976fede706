//! Stock lookup handlers.
//!
//! Each handler validates the ticker, counts it, makes one provider call, and
//! reshapes the result into JSON. Provider failures surface as 4xx with the
//! provider's error text; nothing is retried.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use futures_util::future::join_all;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use mdgate_core::error::MdGateError;
use mdgate_core::model::{parse_symbol_list, validate_symbol, Frequency, Interval, Period};

use crate::api::ApiResult;
use crate::app_state::AppState;

/// Marker stored for a batch symbol whose lookup failed.
pub const BATCH_ITEM_ERROR: &str = "Failed to fetch data";

fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

/// Log a provider failure and hand it back unchanged.
fn provider_failed(op: &'static str, symbol: &str, e: MdGateError) -> MdGateError {
    tracing::warn!(op, symbol, error_type = e.kind(), error = %e, "provider lookup failed");
    e
}

/// Validate the path ticker and count it.
fn resolve_symbol(state: &AppState, raw: &str) -> ApiResult<String> {
    let symbol = validate_symbol(raw)?;
    state.metrics().track_symbol(&symbol);
    Ok(symbol)
}

fn parse_or_default<T>(raw: Option<&str>) -> ApiResult<T>
where
    T: std::str::FromStr<Err = MdGateError> + Default,
{
    match raw {
        Some(s) => Ok(s.parse()?),
        None => Ok(T::default()),
    }
}

pub async fn price(State(state): State<AppState>, Path(ticker): Path<String>) -> ApiResult<Json<Value>> {
    let symbol = resolve_symbol(&state, &ticker)?;
    let quote = state
        .provider()
        .latest_price(&symbol)
        .await
        .map_err(|e| provider_failed("price", &symbol, e))?;

    Ok(Json(json!({
        "ticker": symbol,
        "current_price": quote.price,
        "volume": quote.volume,
        "timestamp": now_iso(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub interval: Option<String>,
    pub period: Option<String>,
}

pub async fn historical(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(q): Query<HistoryQuery>,
) -> ApiResult<Json<Value>> {
    let symbol = resolve_symbol(&state, &ticker)?;
    let interval: Interval = parse_or_default(q.interval.as_deref())?;
    let period: Period = parse_or_default(q.period.as_deref())?;

    let history = state
        .provider()
        .history(&symbol, interval, period)
        .await
        .map_err(|e| provider_failed("history", &symbol, e))?;

    if history.is_empty() {
        return Err(MdGateError::NoData(symbol).into());
    }

    Ok(Json(json!({
        "ticker": symbol,
        "interval": interval,
        "period": period,
        "data_points": history.len(),
        "history": history,
    })))
}

pub async fn info(State(state): State<AppState>, Path(ticker): Path<String>) -> ApiResult<Json<Value>> {
    let symbol = resolve_symbol(&state, &ticker)?;
    let info = state
        .provider()
        .company_info(&symbol)
        .await
        .map_err(|e| provider_failed("info", &symbol, e))?;

    Ok(Json(json!({
        "ticker": symbol,
        "company_info": info,
    })))
}

pub async fn dividends(State(state): State<AppState>, Path(ticker): Path<String>) -> ApiResult<Json<Value>> {
    let symbol = resolve_symbol(&state, &ticker)?;
    let history = state
        .provider()
        .dividends(&symbol)
        .await
        .map_err(|e| provider_failed("dividends", &symbol, e))?;

    Ok(Json(json!({
        "ticker": symbol,
        "dividend_history": history,
    })))
}

#[derive(Debug, Deserialize)]
pub struct EarningsQuery {
    pub frequency: Option<String>,
}

pub async fn earnings(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(q): Query<EarningsQuery>,
) -> ApiResult<Json<Value>> {
    let symbol = resolve_symbol(&state, &ticker)?;
    let frequency: Frequency = parse_or_default(q.frequency.as_deref())?;

    let rows = state
        .provider()
        .earnings(&symbol, frequency)
        .await
        .map_err(|e| provider_failed("earnings", &symbol, e))?;

    Ok(Json(json!({
        "ticker": symbol,
        "frequency": frequency,
        "earnings_data": rows,
    })))
}

#[derive(Debug, Deserialize)]
pub struct BatchQuery {
    pub tickers: Option<String>,
}

/// Latest price for several symbols at once.
///
/// Per-symbol isolation: a symbol the provider does not know is left out, any
/// other failure becomes `{"error": "Failed to fetch data"}` for that symbol
/// only. The request fails as a whole only on invalid input.
pub async fn batch(State(state): State<AppState>, Query(q): Query<BatchQuery>) -> ApiResult<Json<Value>> {
    let raw = q
        .tickers
        .ok_or_else(|| MdGateError::BadRequest("tickers query parameter is required".into()))?;
    let symbols = parse_symbol_list(&raw)?;

    let max = state.cfg().gateway.max_batch_symbols;
    if symbols.len() > max {
        return Err(MdGateError::BadRequest(format!("at most {max} tickers per batch request")).into());
    }
    for s in &symbols {
        state.metrics().track_symbol(s);
    }

    let provider = state.provider();
    let lookups = symbols.iter().map(|s| {
        let provider = provider.clone();
        async move { provider.latest_price(s).await }
    });
    let results = join_all(lookups).await;

    let mut out = Map::new();
    for (symbol, res) in symbols.into_iter().zip(results) {
        match res {
            Ok(quote) => {
                out.insert(symbol, json!({ "current_price": quote.price, "volume": quote.volume }));
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(symbol = %symbol, "batch symbol has no data; omitted");
            }
            Err(e) => {
                provider_failed("batch", &symbol, e);
                out.insert(symbol, json!({ "error": BATCH_ITEM_ERROR }));
            }
        }
    }

    Ok(Json(Value::Object(out)))
}
