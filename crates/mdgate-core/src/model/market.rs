//! Provider result shapes.
//!
//! These are what a `MarketDataProvider` returns and what the gateway
//! serializes, so field names follow the JSON the HTTP surface exposes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Latest traded price and session volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: f64,
    pub volume: u64,
}

/// One OHLCV bar. Yahoo leaves gaps as `null`, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Bar {
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividends: Option<f64>,
}

/// Bars keyed by RFC 3339 UTC timestamp; lexical order is chronological.
pub type PriceHistory = BTreeMap<String, Bar>;

/// Dividend amounts keyed by RFC 3339 UTC payment timestamp.
pub type DividendHistory = BTreeMap<String, f64>;

/// Company profile subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub long_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub market_cap: Option<u64>,
    pub employees: Option<u64>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub summary: Option<String>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
}

/// One reporting period (`2023` or `3Q2023`) with revenue and net income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsPeriod {
    pub period: String,
    pub revenue: Option<f64>,
    pub earnings: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_serializes_like_a_dataframe_row() {
        let bar = Bar { open: Some(1.0), close: Some(2.0), volume: Some(10), ..Bar::default() };
        let v = serde_json::to_value(&bar).unwrap_or_default();
        assert_eq!(v["Open"], 1.0);
        assert_eq!(v["Close"], 2.0);
        assert!(v["High"].is_null());
        assert!(v.get("Dividends").is_none());
    }

    #[test]
    fn company_info_uses_camel_case() {
        let info = CompanyInfo { long_name: Some("Apple Inc.".into()), market_cap: Some(1), ..Default::default() };
        let v = serde_json::to_value(&info).unwrap_or_default();
        assert_eq!(v["longName"], "Apple Inc.");
        assert_eq!(v["marketCap"], 1);
    }
}
