//! Shared fixtures: an in-memory provider and a router wired around it.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use mdgate_core::error::{Result, MdGateError};
use mdgate_core::model::{
    Bar, CompanyInfo, DividendHistory, EarningsPeriod, Frequency, Interval, Period, PriceHistory, PriceQuote,
};
use mdgate_gateway::{
    app_state::AppState,
    config::GatewayConfig,
    obs::MarketDataMetrics,
    provider::{InstrumentedProvider, MarketDataProvider},
    router,
};

/// Canned answers:
/// - `AAPL`, `MSFT`: data everywhere
/// - `EMPTY`: known symbol with no history
/// - `DOWN`: provider outage
/// - anything else: not found
pub struct StubProvider;

fn lookup(symbol: &str) -> Result<()> {
    match symbol {
        "AAPL" | "MSFT" | "EMPTY" => Ok(()),
        "DOWN" => Err(MdGateError::Upstream("yahoo answered HTTP 503".into())),
        other => Err(MdGateError::SymbolNotFound(other.to_string())),
    }
}

#[async_trait]
impl MarketDataProvider for StubProvider {
    fn id(&self) -> &'static str {
        "STUB"
    }

    async fn latest_price(&self, symbol: &str) -> Result<PriceQuote> {
        lookup(symbol)?;
        match symbol {
            "AAPL" => Ok(PriceQuote { price: 190.5, volume: 1_000 }),
            "MSFT" => Ok(PriceQuote { price: 410.25, volume: 2_000 }),
            other => Err(MdGateError::SymbolNotFound(other.to_string())),
        }
    }

    async fn history(&self, symbol: &str, _interval: Interval, _period: Period) -> Result<PriceHistory> {
        lookup(symbol)?;
        let mut h = PriceHistory::new();
        if symbol != "EMPTY" {
            h.insert(
                "2024-01-02T14:30:00Z".into(),
                Bar { open: Some(187.15), close: Some(185.64), volume: Some(82_488_700), ..Bar::default() },
            );
            h.insert(
                "2024-01-03T14:30:00Z".into(),
                Bar { open: Some(184.22), close: Some(184.25), volume: Some(58_414_500), ..Bar::default() },
            );
        }
        Ok(h)
    }

    async fn company_info(&self, symbol: &str) -> Result<CompanyInfo> {
        lookup(symbol)?;
        Ok(CompanyInfo {
            long_name: Some("Apple Inc.".into()),
            sector: Some("Technology".into()),
            employees: Some(161_000),
            ..CompanyInfo::default()
        })
    }

    async fn dividends(&self, symbol: &str) -> Result<DividendHistory> {
        lookup(symbol)?;
        let mut d = DividendHistory::new();
        d.insert("2024-02-09T14:30:00Z".into(), 0.24);
        Ok(d)
    }

    async fn earnings(&self, symbol: &str, frequency: Frequency) -> Result<Vec<EarningsPeriod>> {
        lookup(symbol)?;
        let period = match frequency {
            Frequency::Yearly => "2023",
            Frequency::Quarterly => "4Q2023",
        };
        Ok(vec![EarningsPeriod { period: period.into(), revenue: Some(1.0), earnings: Some(0.5) }])
    }
}

pub struct TestApp {
    pub router: Router,
    pub metrics: Arc<MarketDataMetrics>,
    pub state: AppState,
}

pub fn app_with(cfg: GatewayConfig) -> TestApp {
    let metrics = Arc::new(MarketDataMetrics::new());
    let provider = Arc::new(InstrumentedProvider::new(StubProvider, Arc::clone(&metrics)));
    let state = AppState::with_provider(cfg, Arc::clone(&metrics), provider);
    TestApp { router: router::build_router(state.clone()), metrics, state }
}

pub fn app() -> TestApp {
    app_with(GatewayConfig::default())
}

pub async fn get(router: &Router, uri: &str) -> Response<Body> {
    router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_string(resp: Response<Body>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(resp).await).unwrap()
}
