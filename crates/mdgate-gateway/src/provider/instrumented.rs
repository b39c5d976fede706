//! Timing decorator for any [`MarketDataProvider`].

use std::sync::Arc;

use async_trait::async_trait;

use mdgate_core::error::Result;
use mdgate_core::model::{
    CompanyInfo, DividendHistory, EarningsPeriod, Frequency, Interval, Period, PriceHistory, PriceQuote,
};

use crate::obs::{time_operation, MarketDataMetrics};
use crate::provider::MarketDataProvider;

pub const OP_PRICE: &str = "get_price";
pub const OP_HISTORY: &str = "get_history";
pub const OP_INFO: &str = "get_info";
pub const OP_DIVIDENDS: &str = "get_dividends";
pub const OP_EARNINGS: &str = "get_earnings";

/// Wraps every provider call in a provider-duration observation, labeled by
/// operation. Results and errors pass through unchanged.
pub struct InstrumentedProvider<P> {
    inner: P,
    metrics: Arc<MarketDataMetrics>,
}

impl<P: MarketDataProvider> InstrumentedProvider<P> {
    pub fn new(inner: P, metrics: Arc<MarketDataMetrics>) -> Self {
        Self { inner, metrics }
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for InstrumentedProvider<P> {
    fn id(&self) -> &'static str {
        self.inner.id()
    }

    async fn latest_price(&self, symbol: &str) -> Result<PriceQuote> {
        time_operation(&self.metrics, OP_PRICE, self.inner.latest_price(symbol)).await
    }

    async fn history(&self, symbol: &str, interval: Interval, period: Period) -> Result<PriceHistory> {
        time_operation(&self.metrics, OP_HISTORY, self.inner.history(symbol, interval, period)).await
    }

    async fn company_info(&self, symbol: &str) -> Result<CompanyInfo> {
        time_operation(&self.metrics, OP_INFO, self.inner.company_info(symbol)).await
    }

    async fn dividends(&self, symbol: &str) -> Result<DividendHistory> {
        time_operation(&self.metrics, OP_DIVIDENDS, self.inner.dividends(symbol)).await
    }

    async fn earnings(&self, symbol: &str, frequency: Frequency) -> Result<Vec<EarningsPeriod>> {
        time_operation(&self.metrics, OP_EARNINGS, self.inner.earnings(symbol, frequency)).await
    }
}
