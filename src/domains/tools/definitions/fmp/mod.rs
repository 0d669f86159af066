//! Financial Modeling Prep tools module.
//!
//! One file per FMP API category:
//! - `company`: company profile
//! - `quote`: full/short quotes and multi-period price change
//! - `charts`: end-of-day price history and derived changes
//! - `search`: symbol and company-name search
//! - `analyst`: ratings snapshot
//! - `calendar`: dividend history and the dividends calendar
//! - `indices`: index list and index quotes
//! - `market_performers`: biggest gainers/losers, most active
//! - `market_hours`: exchange hours and holidays
//! - `etf`: sector/country weightings and holdings
//! - `commodities`, `crypto`, `forex`: listings and quotes
//! - `technical`: exponential moving average
//!
//! Each tool has handlers for both HTTP and STDIO/TCP transports.

pub mod analyst;
pub mod calendar;
pub mod charts;
pub mod commodities;
pub mod common;
pub mod company;
pub mod crypto;
pub mod etf;
pub mod forex;
pub mod indices;
pub mod market_hours;
pub mod market_performers;
pub mod quote;
pub mod search;
pub mod technical;

pub use analyst::RatingsSnapshotTool;
pub use calendar::{CompanyDividendsTool, DividendsCalendarTool};
pub use charts::{HistoricalPriceEodTool, PriceChangeTool};
pub use commodities::{CommoditiesListTool, CommoditiesPricesTool};
pub use company::CompanyProfileTool;
pub use crypto::{CryptoListTool, CryptoQuotesTool};
pub use etf::{EtfCountriesTool, EtfHoldingsTool, EtfSectorsTool};
pub use forex::{ForexListTool, ForexQuotesTool};
pub use indices::{IndexListTool, IndexQuoteTool};
pub use market_hours::{MarketHolidaysTool, MarketHoursTool};
pub use market_performers::{BiggestGainersTool, BiggestLosersTool, MostActiveTool};
pub use quote::{QuoteChangeTool, QuoteShortTool, QuoteTool};
pub use search::{SearchNameTool, SearchSymbolTool};
pub use technical::EmaTool;
