//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry of all available tools
//! - HTTP dispatch for tool calls (when http feature is enabled)
//! - Tool metadata for listing

use std::sync::Arc;
#[cfg(feature = "http")]
use tracing::warn;

use rmcp::model::Tool;

use crate::core::FmpClient;

use super::definitions::{
    BiggestGainersTool, BiggestLosersTool, CommoditiesListTool, CommoditiesPricesTool,
    CompanyDividendsTool, CompanyProfileTool, CryptoListTool, CryptoQuotesTool,
    DividendsCalendarTool, EmaTool, EtfCountriesTool, EtfHoldingsTool, EtfSectorsTool,
    ForexListTool, ForexQuotesTool, HistoricalPriceEodTool, IndexListTool, IndexQuoteTool,
    MarketHolidaysTool, MarketHoursTool, MostActiveTool, PriceChangeTool, QuoteChangeTool,
    QuoteShortTool, QuoteTool, RatingsSnapshotTool, SearchNameTool, SearchSymbolTool,
};

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all available tools.
///
/// This struct provides a central point for:
/// - Listing all available tools
/// - Dispatching HTTP tool calls (when http feature is enabled)
pub struct ToolRegistry {
    #[cfg_attr(not(feature = "http"), allow(dead_code))]
    client: Arc<FmpClient>,
}

impl ToolRegistry {
    /// Create a new tool registry sharing the given gateway client.
    pub fn new(client: Arc<FmpClient>) -> Self {
        Self { client }
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![
            CompanyProfileTool::NAME,
            QuoteTool::NAME,
            QuoteShortTool::NAME,
            QuoteChangeTool::NAME,
            PriceChangeTool::NAME,
            HistoricalPriceEodTool::NAME,
            SearchSymbolTool::NAME,
            SearchNameTool::NAME,
            RatingsSnapshotTool::NAME,
            CompanyDividendsTool::NAME,
            DividendsCalendarTool::NAME,
            IndexListTool::NAME,
            IndexQuoteTool::NAME,
            BiggestGainersTool::NAME,
            BiggestLosersTool::NAME,
            MostActiveTool::NAME,
            MarketHoursTool::NAME,
            MarketHolidaysTool::NAME,
            EtfSectorsTool::NAME,
            EtfCountriesTool::NAME,
            EtfHoldingsTool::NAME,
            CommoditiesListTool::NAME,
            CommoditiesPricesTool::NAME,
            CryptoListTool::NAME,
            CryptoQuotesTool::NAME,
            ForexListTool::NAME,
            ForexQuotesTool::NAME,
            EmaTool::NAME,
        ]
    }

    /// Get all tools as Tool models (metadata).
    ///
    /// This is the single source of truth for all available tools.
    /// Both HTTP and STDIO/TCP transports use this to get tool metadata.
    pub fn get_all_tools() -> Vec<Tool> {
        vec![
            CompanyProfileTool::to_tool(),
            QuoteTool::to_tool(),
            QuoteShortTool::to_tool(),
            QuoteChangeTool::to_tool(),
            PriceChangeTool::to_tool(),
            HistoricalPriceEodTool::to_tool(),
            SearchSymbolTool::to_tool(),
            SearchNameTool::to_tool(),
            RatingsSnapshotTool::to_tool(),
            CompanyDividendsTool::to_tool(),
            DividendsCalendarTool::to_tool(),
            IndexListTool::to_tool(),
            IndexQuoteTool::to_tool(),
            BiggestGainersTool::to_tool(),
            BiggestLosersTool::to_tool(),
            MostActiveTool::to_tool(),
            MarketHoursTool::to_tool(),
            MarketHolidaysTool::to_tool(),
            EtfSectorsTool::to_tool(),
            EtfCountriesTool::to_tool(),
            EtfHoldingsTool::to_tool(),
            CommoditiesListTool::to_tool(),
            CommoditiesPricesTool::to_tool(),
            CryptoListTool::to_tool(),
            CryptoQuotesTool::to_tool(),
            ForexListTool::to_tool(),
            ForexQuotesTool::to_tool(),
            EmaTool::to_tool(),
        ]
    }

    /// Dispatch an HTTP tool call to the appropriate handler.
    ///
    /// This is used by the HTTP transport to call tools. Every handler is
    /// async; the call suspends on the gateway request only.
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        let client = self.client.clone();
        match name {
            CompanyProfileTool::NAME => CompanyProfileTool::http_handler(arguments, client).await,
            QuoteTool::NAME => QuoteTool::http_handler(arguments, client).await,
            QuoteShortTool::NAME => QuoteShortTool::http_handler(arguments, client).await,
            QuoteChangeTool::NAME => QuoteChangeTool::http_handler(arguments, client).await,
            PriceChangeTool::NAME => PriceChangeTool::http_handler(arguments, client).await,
            HistoricalPriceEodTool::NAME => {
                HistoricalPriceEodTool::http_handler(arguments, client).await
            }
            SearchSymbolTool::NAME => SearchSymbolTool::http_handler(arguments, client).await,
            SearchNameTool::NAME => SearchNameTool::http_handler(arguments, client).await,
            RatingsSnapshotTool::NAME => RatingsSnapshotTool::http_handler(arguments, client).await,
            CompanyDividendsTool::NAME => {
                CompanyDividendsTool::http_handler(arguments, client).await
            }
            DividendsCalendarTool::NAME => {
                DividendsCalendarTool::http_handler(arguments, client).await
            }
            IndexListTool::NAME => IndexListTool::http_handler(arguments, client).await,
            IndexQuoteTool::NAME => IndexQuoteTool::http_handler(arguments, client).await,
            BiggestGainersTool::NAME => BiggestGainersTool::http_handler(arguments, client).await,
            BiggestLosersTool::NAME => BiggestLosersTool::http_handler(arguments, client).await,
            MostActiveTool::NAME => MostActiveTool::http_handler(arguments, client).await,
            MarketHoursTool::NAME => MarketHoursTool::http_handler(arguments, client).await,
            MarketHolidaysTool::NAME => MarketHolidaysTool::http_handler(arguments, client).await,
            EtfSectorsTool::NAME => EtfSectorsTool::http_handler(arguments, client).await,
            EtfCountriesTool::NAME => EtfCountriesTool::http_handler(arguments, client).await,
            EtfHoldingsTool::NAME => EtfHoldingsTool::http_handler(arguments, client).await,
            CommoditiesListTool::NAME => CommoditiesListTool::http_handler(arguments, client).await,
            CommoditiesPricesTool::NAME => {
                CommoditiesPricesTool::http_handler(arguments, client).await
            }
            CryptoListTool::NAME => CryptoListTool::http_handler(arguments, client).await,
            CryptoQuotesTool::NAME => CryptoQuotesTool::http_handler(arguments, client).await,
            ForexListTool::NAME => ForexListTool::http_handler(arguments, client).await,
            ForexQuotesTool::NAME => ForexQuotesTool::http_handler(arguments, client).await,
            EmaTool::NAME => EmaTool::http_handler(arguments, client).await,
            _ => {
                warn!("Unknown tool requested: {}", name);
                Err(format!("Unknown tool: {}", name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::fmp::common::offline_client;

    fn test_client() -> Arc<FmpClient> {
        Arc::new(offline_client())
    }

    #[test]
    fn test_registry_tool_names() {
        let registry = ToolRegistry::new(test_client());
        let names = registry.tool_names();
        assert_eq!(names.len(), 28);
        assert!(names.contains(&"get_company_profile"));
        assert!(names.contains(&"get_quote"));
        assert!(names.contains(&"get_quote_short"));
        assert!(names.contains(&"get_price_change"));
        assert!(names.contains(&"search_by_name"));
        assert!(names.contains(&"get_ratings_snapshot"));
        assert!(names.contains(&"get_company_dividends"));
        assert!(names.contains(&"get_index_list"));
        assert!(names.contains(&"get_most_active"));
        assert!(names.contains(&"get_market_holidays"));
        assert!(names.contains(&"get_commodities_prices"));
        assert!(names.contains(&"get_crypto_quotes"));
        assert!(names.contains(&"get_forex_list"));
        assert!(names.contains(&"get_ema"));
    }

    #[test]
    fn test_tool_names_match_metadata() {
        let registry = ToolRegistry::new(test_client());
        let names = registry.tool_names();
        let tools = ToolRegistry::get_all_tools();

        assert_eq!(names.len(), tools.len());
        for tool in &tools {
            assert!(names.contains(&tool.name.as_ref()));
        }
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_registry_call_known_tool() {
        // Offline client: the call goes through dispatch and comes back as a
        // rendered gateway error, not a dispatch error.
        let registry = ToolRegistry::new(test_client());
        let result = registry
            .call_tool("get_crypto_list", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(result["isError"], true);
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_registry_call_unknown() {
        let registry = ToolRegistry::new(test_client());
        let result = registry.call_tool("unknown", serde_json::json!({})).await;
        assert!(result.is_err());
    }
}
