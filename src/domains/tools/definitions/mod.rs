//! Tool definitions module.
//!
//! This module exports all available tool definitions.
//! Tools are grouped by FMP API category, one file per category.

pub mod fmp;

pub use fmp::{
    BiggestGainersTool, BiggestLosersTool, CommoditiesListTool, CommoditiesPricesTool,
    CompanyDividendsTool, CompanyProfileTool, CryptoListTool, CryptoQuotesTool,
    DividendsCalendarTool, EmaTool, EtfCountriesTool, EtfHoldingsTool, EtfSectorsTool,
    ForexListTool, ForexQuotesTool, HistoricalPriceEodTool, IndexListTool, IndexQuoteTool,
    MarketHolidaysTool, MarketHoursTool,
    MostActiveTool, PriceChangeTool, QuoteChangeTool, QuoteShortTool, QuoteTool,
    RatingsSnapshotTool, SearchNameTool, SearchSymbolTool,
};
