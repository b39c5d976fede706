//! Yahoo quoteSummary response models.
//!
//! Only the fields the gateway reads are modelled; everything else is ignored
//! by serde. Yahoo fills gaps with `null` and missing modules with `{}`, hence
//! the `Option`s and `#[serde(default)]`s throughout.

use serde::Deserialize;

/// Error object Yahoo returns in place of a result.
#[derive(Debug, Deserialize)]
pub struct YahooApiError {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---- quoteSummary API (/v10/finance/quoteSummary/{symbol}) ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResponse {
    pub quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummary {
    #[serde(default)]
    pub result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    pub error: Option<YahooApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResult {
    pub asset_profile: Option<AssetProfile>,
    pub price: Option<PriceModule>,
    pub earnings: Option<EarningsModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProfile {
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub long_business_summary: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub full_time_employees: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModule {
    pub long_name: Option<String>,
    pub currency: Option<String>,
    pub exchange_name: Option<String>,
    pub market_cap: Option<RawValue>,
}

/// `{"raw": 123.45, "fmt": "123.45"}`, or `{}` when Yahoo has nothing.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawValue {
    pub raw: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsModule {
    pub financials_chart: Option<FinancialsChart>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FinancialsChart {
    #[serde(default)]
    pub yearly: Vec<FinancialsRow>,
    #[serde(default)]
    pub quarterly: Vec<FinancialsRow>,
}

#[derive(Debug, Deserialize)]
pub struct FinancialsRow {
    /// `2023` for yearly rows, `"3Q2023"` for quarterly ones.
    pub date: serde_json::Value,
    pub revenue: Option<RawValue>,
    pub earnings: Option<RawValue>,
}
