//! Yahoo Finance provider.
//!
//! Prices, history, and dividends come from the chart API through
//! `yahoo_finance_api`. Company profile and earnings come from quoteSummary,
//! which additionally needs a session cookie plus a "crumb" token; that pair
//! is cached on the provider and dropped on HTTP 401 so the next call fetches
//! a fresh one. Nothing is retried here.

mod models;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, TimeZone, Utc};
use reqwest::header;
use tokio::sync::RwLock;
use urlencoding::encode;
use yahoo_finance_api as yahoo;

use mdgate_core::error::{Result, MdGateError};
use mdgate_core::model::{
    Bar, CompanyInfo, DividendHistory, EarningsPeriod, Frequency, Interval, Period, PriceHistory, PriceQuote,
};

use crate::config::ProviderSection;
use crate::provider::MarketDataProvider;

use models::{QuoteSummaryResponse, QuoteSummaryResult, YahooApiError};

/// Cached quoteSummary authentication.
#[derive(Debug, Clone)]
struct Crumb {
    cookie: String,
    crumb: String,
}

pub struct YahooProvider {
    connector: yahoo::YahooConnector,
    client: reqwest::Client,
    base_url: String,
    cookie_url: String,
    crumb: RwLock<Option<Crumb>>,
}

impl YahooProvider {
    pub fn new(cfg: &ProviderSection) -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| MdGateError::Internal(format!("yahoo connector init failed: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| MdGateError::Internal(format!("http client init failed: {e}")))?;

        Ok(Self {
            connector,
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            cookie_url: cfg.cookie_url.clone(),
            crumb: RwLock::new(None),
        })
    }

    // --------------------
    // chart API
    // --------------------
    async fn chart_range(&self, symbol: &str, interval: &str, range: &str) -> Result<yahoo::YResponse> {
        self.connector
            .get_quote_range(symbol, interval, range)
            .await
            .map_err(|e| chart_err(symbol, e))
    }

    // --------------------
    // quoteSummary API
    // --------------------
    async fn crumb(&self) -> Result<Crumb> {
        if let Some(c) = self.crumb.read().await.as_ref() {
            return Ok(c.clone());
        }
        self.fetch_crumb().await
    }

    async fn fetch_crumb(&self) -> Result<Crumb> {
        // The cookie endpoint answers 404 but still sets the session cookie.
        let resp = self.client.get(&self.cookie_url).send().await.map_err(transport_err)?;
        let cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split(';').next())
            .map(|s| s.to_string())
            .ok_or_else(|| MdGateError::Upstream("yahoo did not set a session cookie".into()))?;

        let crumb = self
            .client
            .get(format!("{}/v1/test/getcrumb", self.base_url))
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .map_err(transport_err)?
            .text()
            .await
            .map_err(transport_err)?;

        if crumb.is_empty() || crumb.contains('<') || crumb.contains(' ') {
            return Err(MdGateError::Upstream("yahoo returned an invalid crumb".into()));
        }

        let c = Crumb { cookie, crumb };
        *self.crumb.write().await = Some(c.clone());
        tracing::debug!("yahoo crumb refreshed");
        Ok(c)
    }

    async fn quote_summary(&self, symbol: &str, modules: &str) -> Result<QuoteSummaryResult> {
        let crumb = self.crumb().await?;
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, encode(symbol));

        let resp = self
            .client
            .get(&url)
            .query(&[("modules", modules), ("crumb", crumb.crumb.as_str())])
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await
            .map_err(transport_err)?;

        let status = resp.status().as_u16();
        if status == 401 {
            *self.crumb.write().await = None;
            return Err(MdGateError::Upstream("yahoo authentication expired".into()));
        }
        let body = resp.text().await.map_err(transport_err)?;
        parse_quote_summary(symbol, status, &body)
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        "YAHOO"
    }

    async fn latest_price(&self, symbol: &str) -> Result<PriceQuote> {
        let response = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| chart_err(symbol, e))?;
        let quote = response.last_quote().map_err(|e| chart_err(symbol, e))?;
        Ok(PriceQuote {
            price: quote.close,
            volume: quote.volume,
        })
    }

    async fn history(&self, symbol: &str, interval: Interval, period: Period) -> Result<PriceHistory> {
        let response = self.chart_range(symbol, interval.as_str(), period.as_str()).await?;
        let quotes = match response.quotes() {
            Ok(q) => q,
            Err(yahoo::YahooError::NoQuotes) => Vec::new(),
            Err(e) => return Err(chart_err(symbol, e)),
        };
        // Missing dividend events only mean no payouts in range.
        let dividends = response.dividends().unwrap_or_default();

        Ok(bars(
            quotes.iter().map(|q| {
                (
                    q.timestamp as i64,
                    Bar {
                        open: Some(q.open),
                        high: Some(q.high),
                        low: Some(q.low),
                        close: Some(q.close),
                        volume: Some(q.volume),
                        dividends: None,
                    },
                )
            }),
            dividends.iter().map(|d| (d.date as i64, d.amount)),
        ))
    }

    async fn company_info(&self, symbol: &str) -> Result<CompanyInfo> {
        let result = self.quote_summary(symbol, "assetProfile,price").await?;
        Ok(company_info(result))
    }

    async fn dividends(&self, symbol: &str) -> Result<DividendHistory> {
        let response = self.chart_range(symbol, "1mo", "max").await?;
        let dividends = response.dividends().unwrap_or_default();
        Ok(dividend_history(dividends.iter().map(|d| (d.date as i64, d.amount))))
    }

    async fn earnings(&self, symbol: &str, frequency: Frequency) -> Result<Vec<EarningsPeriod>> {
        let result = self.quote_summary(symbol, "earnings").await?;
        Ok(earnings_rows(result, frequency))
    }
}

// --------------------
// Response mapping (pure, unit-tested below)
// --------------------
fn transport_err(e: reqwest::Error) -> MdGateError {
    if e.is_timeout() {
        MdGateError::Upstream("yahoo request timed out".into())
    } else {
        MdGateError::Upstream(format!("yahoo request failed: {e}"))
    }
}

/// Unknown tickers surface from the chart client as an HTTP 404 fetch failure.
fn reports_missing_symbol(detail: &str) -> bool {
    detail.contains("404") || detail.contains("Not Found")
}

fn chart_err(symbol: &str, e: yahoo::YahooError) -> MdGateError {
    match e {
        yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult => MdGateError::SymbolNotFound(symbol.to_string()),
        other if reports_missing_symbol(&format!("{other:?}")) => MdGateError::SymbolNotFound(symbol.to_string()),
        other => MdGateError::Upstream(format!("yahoo chart request failed: {other}")),
    }
}

fn api_error(symbol: &str, err: YahooApiError) -> MdGateError {
    if err.code == "Not Found" {
        MdGateError::SymbolNotFound(symbol.to_string())
    } else {
        MdGateError::Upstream(format!(
            "{}: {}",
            err.code,
            err.description.unwrap_or_default()
        ))
    }
}

/// Body decode with status awareness: a non-2xx answer that is not Yahoo's
/// JSON error shape is reported as an upstream failure, not a decode bug.
fn decode_body<T: serde::de::DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        if (200..300).contains(&status) {
            MdGateError::Decode(e.to_string())
        } else {
            MdGateError::Upstream(format!("yahoo answered HTTP {status}"))
        }
    })
}

fn parse_quote_summary(symbol: &str, status: u16, body: &str) -> Result<QuoteSummaryResult> {
    let parsed: QuoteSummaryResponse = decode_body(status, body)?;
    if let Some(err) = parsed.quote_summary.error {
        return Err(api_error(symbol, err));
    }
    parsed
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| MdGateError::SymbolNotFound(symbol.to_string()))
}

fn ts_key(ts: i64) -> Option<String> {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Keys bars by UTC timestamp and attaches a dividend paid on the same bar.
fn bars(
    rows: impl IntoIterator<Item = (i64, Bar)>,
    dividends: impl IntoIterator<Item = (i64, f64)>,
) -> PriceHistory {
    let paid: std::collections::HashMap<i64, f64> = dividends.into_iter().collect();
    rows.into_iter()
        .filter_map(|(ts, mut bar)| {
            let key = ts_key(ts)?;
            bar.dividends = paid.get(&ts).copied();
            Some((key, bar))
        })
        .collect()
}

fn dividend_history(events: impl IntoIterator<Item = (i64, f64)>) -> DividendHistory {
    events
        .into_iter()
        .filter_map(|(ts, amount)| ts_key(ts).map(|k| (k, amount)))
        .collect::<DividendHistory>()
}

fn company_info(r: QuoteSummaryResult) -> CompanyInfo {
    let profile = r.asset_profile.unwrap_or_default();
    let price = r.price.unwrap_or_default();
    CompanyInfo {
        long_name: price.long_name,
        sector: profile.sector,
        industry: profile.industry,
        website: profile.website,
        market_cap: price.market_cap.and_then(|m| m.raw).map(|v| v as u64),
        employees: profile.full_time_employees,
        country: profile.country,
        city: profile.city,
        summary: profile.long_business_summary,
        currency: price.currency,
        exchange: price.exchange_name,
    }
}

fn earnings_rows(r: QuoteSummaryResult, frequency: Frequency) -> Vec<EarningsPeriod> {
    let Some(chart) = r.earnings.and_then(|e| e.financials_chart) else { return Vec::new(); };
    let rows = match frequency {
        Frequency::Yearly => chart.yearly,
        Frequency::Quarterly => chart.quarterly,
    };
    rows.into_iter()
        .map(|row| EarningsPeriod {
            period: match row.date {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            },
            revenue: row.revenue.and_then(|v| v.raw),
            earnings: row.earnings.and_then(|v| v.raw),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(close: f64, volume: u64) -> Bar {
        Bar {
            open: Some(close),
            high: Some(close),
            low: Some(close),
            close: Some(close),
            volume: Some(volume),
            dividends: None,
        }
    }

    #[test]
    fn empty_chart_results_map_to_not_found() {
        let err = chart_err("ZZZZ", yahoo::YahooError::NoQuotes);
        assert!(matches!(err, MdGateError::SymbolNotFound(ref s) if s == "ZZZZ"));
        assert!(matches!(chart_err("ZZZZ", yahoo::YahooError::NoResult), MdGateError::SymbolNotFound(_)));
    }

    #[test]
    fn http_404_detail_is_a_missing_symbol() {
        assert!(reports_missing_symbol("FetchFailed(\"404 Not Found\")"));
        assert!(!reports_missing_symbol("FetchFailed(\"502 Bad Gateway\")"));
        assert!(!reports_missing_symbol("InvalidJson"));
    }

    #[test]
    fn bars_are_keyed_by_utc_timestamp_with_dividends_aligned() {
        let h = bars(
            vec![
                (1704205800, bar(185.64, 82_488_700)),
                (1704292200, bar(184.25, 58_414_500)),
            ],
            vec![(1704292200, 0.24), (1600000000, 0.2)],
        );
        assert_eq!(h.len(), 2);

        let first = h.get("2024-01-02T14:30:00Z").cloned().unwrap_or_default();
        assert_eq!(first.open, Some(185.64));
        assert_eq!(first.volume, Some(82_488_700));
        assert_eq!(first.dividends, None);

        let second = h.get("2024-01-03T14:30:00Z").cloned().unwrap_or_default();
        assert_eq!(second.dividends, Some(0.24));
    }

    #[test]
    fn dividend_history_uses_event_dates() {
        let d = dividend_history(vec![(1704292200, 0.24)]);
        assert_eq!(d.get("2024-01-03T14:30:00Z"), Some(&0.24));
        assert!(dividend_history(Vec::new()).is_empty());
    }

    const SUMMARY: &str = r#"{"quoteSummary":{"result":[{
        "assetProfile":{"sector":"Technology","industry":"Consumer Electronics","website":"https://www.apple.com",
            "country":"United States","city":"Cupertino","fullTimeEmployees":161000,
            "longBusinessSummary":"Apple Inc. designs phones."},
        "price":{"longName":"Apple Inc.","currency":"USD","exchangeName":"NasdaqGS","marketCap":{"raw":2.9e12,"fmt":"2.9T"}},
        "earnings":{"financialsChart":{
            "yearly":[{"date":2022,"revenue":{"raw":394328000000},"earnings":{"raw":99803000000}},
                      {"date":2023,"revenue":{"raw":383285000000},"earnings":{}}],
            "quarterly":[{"date":"4Q2023","revenue":{"raw":119575000000},"earnings":{"raw":33916000000}}]
        }}
    }],"error":null}}"#;

    #[test]
    fn company_info_flattens_modules() {
        let r = parse_quote_summary("AAPL", 200, SUMMARY).ok().unwrap_or_default();
        let info = company_info(r);
        assert_eq!(info.long_name.as_deref(), Some("Apple Inc."));
        assert_eq!(info.sector.as_deref(), Some("Technology"));
        assert_eq!(info.employees, Some(161_000));
        assert_eq!(info.market_cap, Some(2_900_000_000_000));
        assert_eq!(info.exchange.as_deref(), Some("NasdaqGS"));
        assert_eq!(info.city.as_deref(), Some("Cupertino"));
    }

    #[test]
    fn earnings_rows_follow_frequency() {
        let r = parse_quote_summary("AAPL", 200, SUMMARY).ok().unwrap_or_default();
        let yearly = earnings_rows(r, Frequency::Yearly);
        assert_eq!(yearly.len(), 2);
        assert_eq!(yearly[0].period, "2022");
        assert_eq!(yearly[1].earnings, None);

        let r = parse_quote_summary("AAPL", 200, SUMMARY).ok().unwrap_or_default();
        let quarterly = earnings_rows(r, Frequency::Quarterly);
        assert_eq!(quarterly.len(), 1);
        assert_eq!(quarterly[0].period, "4Q2023");
        assert_eq!(quarterly[0].revenue, Some(119_575_000_000.0));
    }

    #[test]
    fn quote_summary_not_found() {
        let body = r#"{"quoteSummary":{"result":null,"error":{"code":"Not Found","description":"Quote not found for symbol: ZZZZ"}}}"#;
        assert!(matches!(parse_quote_summary("ZZZZ", 404, body), Err(MdGateError::SymbolNotFound(_))));
    }
}
