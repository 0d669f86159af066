//! Search tools.
//!
//! Covers the Search section of the Financial Modeling Prep API: lookup by
//! ticker symbol and by company name, each with an optional exchange filter.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::core::FmpClient;

use super::common::{
    default_limit, error_result, records, str_field, success_result, upstream_error_detail,
    validate_limit,
};

/// Parameters shared by the search tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// What to search for.
    #[schemars(description = "Search query (ticker symbol or company name)")]
    pub query: String,

    /// Maximum number of results.
    #[schemars(description = "Maximum number of results, 1-100 (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: i64,

    /// Restrict results to one exchange.
    #[schemars(description = "Filter by exchange (e.g., NASDAQ, NYSE); optional")]
    #[serde(default)]
    pub exchange: Option<String>,
}

impl SearchParams {
    /// Shared validation for both search tools.
    fn validate(&self) -> Result<(), String> {
        if self.query.trim().is_empty() {
            return Err("Error: query parameter is required".to_string());
        }
        validate_limit(self.limit, 1, 100)
    }

    /// Build the query-string pairs, omitting the unset exchange filter.
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("query", self.query.trim().to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(exchange) = self.exchange.as_deref() {
            query.push(("exchange", exchange.to_string()));
        }
        query
    }
}

// ============================================================================
// search_by_symbol
// ============================================================================

/// Ticker symbol search tool.
#[derive(Debug, Clone)]
pub struct SearchSymbolTool;

impl SearchSymbolTool {
    pub const NAME: &'static str = "search_by_symbol";

    pub const DESCRIPTION: &'static str = "Search for stocks by ticker symbol, optionally \
         filtered by exchange. Returns matching symbols with exchange and currency details \
         as Markdown.";

    pub async fn execute(params: &SearchParams, client: &FmpClient) -> CallToolResult {
        if let Err(msg) = params.validate() {
            return error_result(&msg);
        }
        let query = params.query.trim();

        info!("Searching symbols matching '{}'", query);

        let data = match client.get("search-symbol", &params.to_query()).await {
            Ok(data) => data,
            Err(e) => {
                return error_result(&format!("Error searching for symbol '{query}': {e}"));
            }
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!("Error searching for symbol '{query}': {detail}"));
        }

        let heading = match params.exchange.as_deref() {
            Some(exchange) => format!("# Symbol Search Results for '{query}' on {exchange}"),
            None => format!("# Symbol Search Results for '{query}'"),
        };

        let Some(matches) = records(&data) else {
            return success_result(format!("{heading}\nNo matching symbols found"));
        };

        success_result(Self::render(&heading, matches))
    }

    fn render(heading: &str, matches: &[Value]) -> String {
        let mut lines = vec![heading.to_string()];

        for item in matches {
            let exchange = str_field(item, "exchange");
            let exchange_full = item
                .get("exchangeFullName")
                .and_then(|v| v.as_str())
                .unwrap_or(&exchange)
                .to_string();

            lines.push(format!(
                "## {} - {}",
                str_field(item, "symbol"),
                str_field(item, "name")
            ));
            lines.push(format!("**Exchange**: {exchange_full} ({exchange})"));
            lines.push(format!("**Currency**: {}", str_field(item, "currency")));
            lines.push(String::new());
        }

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: SearchParams =
            serde_json::from_value(arguments).map_err(|e| format!("Invalid parameters: {e}"))?;

        let result = Self::execute(&params, &client).await;

        Ok(serde_json::json!({
            "content": result.content,
            "isError": result.is_error.unwrap_or(false)
        }))
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<SearchParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    pub fn create_route<S>(client: Arc<FmpClient>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let client = client.clone();
            async move {
                let params: SearchParams = serde_json::from_value(serde_json::Value::Object(args))
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                Ok(Self::execute(&params, &client).await)
            }
            .boxed()
        })
    }
}

// ============================================================================
// search_by_name
// ============================================================================

/// Company name search tool.
#[derive(Debug, Clone)]
pub struct SearchNameTool;

impl SearchNameTool {
    pub const NAME: &'static str = "search_by_name";

    pub const DESCRIPTION: &'static str = "Search for stocks by company name, optionally \
         filtered by exchange. Returns matching companies with exchange, currency, and type \
         details as Markdown.";

    pub async fn execute(params: &SearchParams, client: &FmpClient) -> CallToolResult {
        if let Err(msg) = params.validate() {
            return error_result(&msg);
        }
        let query = params.query.trim();

        info!("Searching companies matching '{}'", query);

        let data = match client.get("search-name", &params.to_query()).await {
            Ok(data) => data,
            Err(e) => {
                return error_result(&format!("Error searching for company '{query}': {e}"));
            }
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!("Error searching for company '{query}': {detail}"));
        }

        let heading = match params.exchange.as_deref() {
            Some(exchange) => format!("# Company Name Search Results for '{query}' on {exchange}"),
            None => format!("# Company Name Search Results for '{query}'"),
        };

        let Some(matches) = records(&data) else {
            return success_result(format!("{heading}\nNo matching companies found"));
        };

        success_result(Self::render(&heading, matches))
    }

    fn render(heading: &str, matches: &[Value]) -> String {
        let mut lines = vec![heading.to_string()];

        for item in matches {
            let exchange = item
                .get("exchangeShortName")
                .or_else(|| item.get("exchange"))
                .and_then(|v| v.as_str())
                .unwrap_or("N/A");
            let stock_type = item
                .get("stockType")
                .or_else(|| item.get("type"))
                .and_then(|v| v.as_str())
                .unwrap_or("N/A");

            lines.push(format!(
                "## {} ({})",
                str_field(item, "name"),
                str_field(item, "symbol")
            ));
            lines.push(format!("**Exchange**: {exchange}"));
            lines.push(format!("**Currency**: {}", str_field(item, "currency")));
            lines.push(format!("**Type**: {stock_type}"));
            lines.push(String::new());
        }

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: SearchParams =
            serde_json::from_value(arguments).map_err(|e| format!("Invalid parameters: {e}"))?;

        let result = Self::execute(&params, &client).await;

        Ok(serde_json::json!({
            "content": result.content,
            "isError": result.is_error.unwrap_or(false)
        }))
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<SearchParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    pub fn create_route<S>(client: Arc<FmpClient>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let client = client.clone();
            async move {
                let params: SearchParams = serde_json::from_value(serde_json::Value::Object(args))
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                Ok(Self::execute(&params, &client).await)
            }
            .boxed()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::fmp::common::{offline_client, result_text};
    use serde_json::json;

    #[test]
    fn test_search_params_default_limit() {
        let params: SearchParams = serde_json::from_str(r#"{"query": "AAPL"}"#).unwrap();
        assert_eq!(params.limit, 10);
        assert!(params.exchange.is_none());
    }

    #[test]
    fn test_to_query_omits_unset_exchange() {
        let params: SearchParams = serde_json::from_str(r#"{"query": "AAPL"}"#).unwrap();
        let query = params.to_query();
        assert!(query.iter().all(|(name, _)| *name != "exchange"));

        let params: SearchParams =
            serde_json::from_str(r#"{"query": "AAPL", "exchange": "NASDAQ"}"#).unwrap();
        assert!(
            params
                .to_query()
                .contains(&("exchange", "NASDAQ".to_string()))
        );
    }

    #[test]
    fn test_render_symbol_results() {
        let matches = vec![json!({
            "symbol": "AAPL",
            "name": "Apple Inc.",
            "exchange": "NASDAQ",
            "exchangeFullName": "NASDAQ Global Select",
            "currency": "USD"
        })];

        let text = SearchSymbolTool::render("# Symbol Search Results for 'AAPL'", &matches);
        assert!(text.contains("## AAPL - Apple Inc."));
        assert!(text.contains("**Exchange**: NASDAQ Global Select (NASDAQ)"));
        assert!(text.contains("**Currency**: USD"));
    }

    #[test]
    fn test_render_name_results_field_fallbacks() {
        let matches = vec![json!({
            "symbol": "MSFT",
            "name": "Microsoft Corporation",
            "exchange": "NASDAQ",
            "currency": "USD",
            "type": "stock"
        })];

        let text = SearchNameTool::render("# Company Name Search Results for 'Microsoft'", &matches);
        assert!(text.contains("## Microsoft Corporation (MSFT)"));
        // exchangeShortName missing, falls back to exchange; stockType to type
        assert!(text.contains("**Exchange**: NASDAQ"));
        assert!(text.contains("**Type**: stock"));
    }

    #[tokio::test]
    async fn test_empty_query_fails_before_network() {
        let client = offline_client();
        let params = SearchParams {
            query: String::new(),
            limit: 10,
            exchange: None,
        };
        let result = SearchSymbolTool::execute(&params, &client).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("query parameter is required"));
    }

    #[tokio::test]
    async fn test_out_of_range_limit_fails_before_network() {
        let client = offline_client();
        let params = SearchParams {
            query: "AAPL".to_string(),
            limit: 0,
            exchange: None,
        };
        let result = SearchNameTool::execute(&params, &client).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("limit must be between 1 and 100"));
    }
}
