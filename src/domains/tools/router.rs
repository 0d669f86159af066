//! Tool Router - builds the rmcp ToolRouter from the tool definitions.
//!
//! This module builds the ToolRouter for STDIO/TCP transport by delegating
//! to the tool definitions themselves. Each tool knows how to create its own
//! route; every route shares the same gateway client.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use crate::core::FmpClient;

use super::definitions::{
    BiggestGainersTool, BiggestLosersTool, CommoditiesListTool, CommoditiesPricesTool,
    CompanyDividendsTool, CompanyProfileTool, CryptoListTool, CryptoQuotesTool,
    DividendsCalendarTool, EmaTool, EtfCountriesTool, EtfHoldingsTool, EtfSectorsTool,
    ForexListTool, ForexQuotesTool, HistoricalPriceEodTool, IndexListTool, IndexQuoteTool,
    MarketHolidaysTool, MarketHoursTool, MostActiveTool, PriceChangeTool, QuoteChangeTool,
    QuoteShortTool, QuoteTool, RatingsSnapshotTool, SearchNameTool, SearchSymbolTool,
};

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(client: Arc<FmpClient>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(CompanyProfileTool::create_route(client.clone()))
        .with_route(QuoteTool::create_route(client.clone()))
        .with_route(QuoteShortTool::create_route(client.clone()))
        .with_route(QuoteChangeTool::create_route(client.clone()))
        .with_route(PriceChangeTool::create_route(client.clone()))
        .with_route(HistoricalPriceEodTool::create_route(client.clone()))
        .with_route(SearchSymbolTool::create_route(client.clone()))
        .with_route(SearchNameTool::create_route(client.clone()))
        .with_route(RatingsSnapshotTool::create_route(client.clone()))
        .with_route(CompanyDividendsTool::create_route(client.clone()))
        .with_route(DividendsCalendarTool::create_route(client.clone()))
        .with_route(IndexListTool::create_route(client.clone()))
        .with_route(IndexQuoteTool::create_route(client.clone()))
        .with_route(BiggestGainersTool::create_route(client.clone()))
        .with_route(BiggestLosersTool::create_route(client.clone()))
        .with_route(MostActiveTool::create_route(client.clone()))
        .with_route(MarketHoursTool::create_route(client.clone()))
        .with_route(MarketHolidaysTool::create_route(client.clone()))
        .with_route(EtfSectorsTool::create_route(client.clone()))
        .with_route(EtfCountriesTool::create_route(client.clone()))
        .with_route(EtfHoldingsTool::create_route(client.clone()))
        .with_route(CommoditiesListTool::create_route(client.clone()))
        .with_route(CommoditiesPricesTool::create_route(client.clone()))
        .with_route(CryptoListTool::create_route(client.clone()))
        .with_route(CryptoQuotesTool::create_route(client.clone()))
        .with_route(ForexListTool::create_route(client.clone()))
        .with_route(ForexQuotesTool::create_route(client.clone()))
        .with_route(EmaTool::create_route(client))
}

#[cfg(test)]
mod tests {
    use super::super::registry::ToolRegistry;
    use super::*;
    use crate::domains::tools::definitions::fmp::common::offline_client;

    struct TestServer {}

    fn test_client() -> Arc<FmpClient> {
        Arc::new(offline_client())
    }

    #[test]
    fn test_build_router() {
        let router: ToolRouter<TestServer> = build_tool_router(test_client());
        let tools = router.list_all();
        assert_eq!(tools.len(), 28);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"get_company_profile"));
        assert!(names.contains(&"get_quote"));
        assert!(names.contains(&"get_historical_price_eod_light"));
        assert!(names.contains(&"search_by_symbol"));
        assert!(names.contains(&"get_dividends_calendar"));
        assert!(names.contains(&"get_biggest_gainers"));
        assert!(names.contains(&"get_market_hours"));
        assert!(names.contains(&"get_etf_holdings"));
        assert!(names.contains(&"get_forex_quotes"));
        assert!(names.contains(&"get_ema"));
    }

    #[test]
    fn test_router_schemas_have_descriptions() {
        let router: ToolRouter<TestServer> = build_tool_router(test_client());
        for tool in router.list_all() {
            assert!(
                tool.description.as_deref().is_some_and(|d| !d.is_empty()),
                "tool {} has no description",
                tool.name
            );
        }
    }

    #[test]
    fn test_registry_matches_router() {
        // Ensure registry and router have the same tools
        let registry = ToolRegistry::new(test_client());
        let registry_names = registry.tool_names();

        let router: ToolRouter<TestServer> = build_tool_router(test_client());
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

        assert_eq!(registry_names.len(), router_names.len());
        for name in registry_names {
            assert!(router_names.contains(&name));
        }
    }
}
