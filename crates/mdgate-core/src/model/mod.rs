//! Market-data request parameters and result shapes.
//!
//! - `params`: interval / period / frequency query parameters
//! - `symbol`: ticker validation and batch list parsing
//! - `market`: provider results (quotes, bars, profile, dividends, earnings)

pub mod market;
pub mod params;
pub mod symbol;

pub use market::{Bar, CompanyInfo, DividendHistory, EarningsPeriod, PriceHistory, PriceQuote};
pub use params::{Frequency, Interval, Period};
pub use symbol::{parse_symbol_list, validate_symbol};
