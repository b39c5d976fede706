//! Market-data provider boundary.
//!
//! The gateway treats the provider as an opaque async call: give it a symbol
//! and parameters, get structured data back or a `MdGateError`. Handlers only
//! ever see the trait object, so tests swap in a stub and production wraps
//! the Yahoo client in [`InstrumentedProvider`].

pub mod instrumented;
pub mod yahoo;

use async_trait::async_trait;

use mdgate_core::error::Result;
use mdgate_core::model::{
    CompanyInfo, DividendHistory, EarningsPeriod, Frequency, Interval, Period, PriceHistory, PriceQuote,
};

pub use instrumented::InstrumentedProvider;
pub use yahoo::YahooProvider;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short provider id for logs.
    fn id(&self) -> &'static str;

    /// Latest close and volume from the most recent session.
    async fn latest_price(&self, symbol: &str) -> Result<PriceQuote>;

    /// OHLCV bars for `period` at `interval` resolution.
    async fn history(&self, symbol: &str, interval: Interval, period: Period) -> Result<PriceHistory>;

    async fn company_info(&self, symbol: &str) -> Result<CompanyInfo>;

    /// Full dividend history; empty when the symbol never paid one.
    async fn dividends(&self, symbol: &str) -> Result<DividendHistory>;

    async fn earnings(&self, symbol: &str, frequency: Frequency) -> Result<Vec<EarningsPeriod>>;
}
