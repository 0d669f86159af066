//! Market indices tools.
//!
//! Covers the Market Indices section of the Financial Modeling Prep API.

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
    change_marker, error_result, f64_field, no_data_result, now_stamp, num_field, records,
    str_field, success_result, upstream_error_detail,
};

/// Readable names for indices whose API names are missing or cryptic.
const INDEX_NAMES: &[(&str, &str)] = &[
    ("^GSPC", "S&P 500"),
    ("^DJI", "Dow Jones Industrial Average"),
    ("^IXIC", "NASDAQ Composite"),
    ("^RUT", "Russell 2000"),
    ("^VIX", "CBOE Volatility Index"),
    ("^FTSE", "FTSE 100"),
    ("^N225", "Nikkei 225"),
    ("^HSI", "Hang Seng Index"),
    ("^GDAXI", "DAX"),
];

// ============================================================================
// get_index_list
// ============================================================================

/// Parameters for the index list tool (none).
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct IndexListParams {}

/// Market index list tool.
#[derive(Debug, Clone)]
pub struct IndexListTool;

impl IndexListTool {
    pub const NAME: &'static str = "get_index_list";

    pub const DESCRIPTION: &'static str =
        "Get the list of available market indices with their symbols, names, and exchanges. \
         Returns a Markdown table.";

    pub async fn execute(_params: &IndexListParams, client: &FmpClient) -> CallToolResult {
        info!("Fetching index list");

        let data = match client.get("index-list", &[]).await {
            Ok(data) => data,
            Err(e) => return error_result(&format!("Error fetching index list: {e}")),
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!("Error fetching index list: {detail}"));
        }

        let Some(indices) = records(&data) else {
            return no_data_result("No index data found");
        };

        success_result(Self::render(indices, &now_stamp()))
    }

    fn render(indices: &[Value], generated_at: &str) -> String {
        let mut lines = vec![
            "# Market Indices List".to_string(),
            format!("*Data as of {generated_at}*"),
            String::new(),
            "| Symbol | Name | Exchange | Currency |".to_string(),
            "|--------|------|----------|----------|".to_string(),
        ];

        for index in indices {
            let currency = index
                .get("currency")
                .and_then(|v| v.as_str())
                .unwrap_or("USD");
            lines.push(format!(
                "| {} | {} | {} | {} |",
                str_field(index, "symbol"),
                str_field(index, "name"),
                str_field(index, "exchange"),
                currency
            ));
        }

        lines.push(String::new());
        lines.push(
            "*Note: Use these symbols with the get_index_quote tool to get current values.*"
                .to_string(),
        );

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: IndexListParams =
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
            input_schema: cached_schema_for_type::<IndexListParams>(),
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
                let params: IndexListParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                Ok(Self::execute(&params, &client).await)
            }
            .boxed()
        })
    }
}

// ============================================================================
// get_index_quote
// ============================================================================

/// Parameters for the index quote tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct IndexQuoteParams {
    /// The index symbol.
    #[schemars(description = "Index symbol (e.g., ^GSPC for S&P 500, ^DJI for Dow Jones)")]
    pub symbol: String,
}

/// Market index quote tool.
#[derive(Debug, Clone)]
pub struct IndexQuoteTool;

impl IndexQuoteTool {
    pub const NAME: &'static str = "get_index_quote";

    pub const DESCRIPTION: &'static str =
        "Get the current value and daily change for a market index. Returns Markdown.";

    pub async fn execute(params: &IndexQuoteParams, client: &FmpClient) -> CallToolResult {
        let symbol = params.symbol.trim();
        if symbol.is_empty() {
            return error_result("Error: symbol parameter is required");
        }

        info!("Fetching index quote for {}", symbol);

        let data = match client.get("quote", &[("symbol", symbol.to_string())]).await {
            Ok(data) => data,
            Err(e) => {
                return error_result(&format!("Error fetching index quote for {symbol}: {e}"));
            }
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!(
                "Error fetching index quote for {symbol}: {detail}"
            ));
        }

        let Some(quotes) = records(&data) else {
            return no_data_result(&format!("No quote data found for index {symbol}"));
        };

        success_result(Self::render(symbol, &quotes[0], &now_stamp()))
    }

    fn render(symbol: &str, quote: &Value, generated_at: &str) -> String {
        let change_percent = f64_field(quote, "changesPercentage").unwrap_or(0.0);

        // Some indices come back without a usable name
        let name = match quote.get("name").and_then(|v| v.as_str()) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => INDEX_NAMES
                .iter()
                .find(|(sym, _)| *sym == symbol)
                .map(|(_, name)| name.to_string())
                .unwrap_or_else(|| format!("Index {symbol}")),
        };

        let lines = vec![
            format!("# {name} ({symbol})"),
            format!("**Value**: {}", num_field(quote, "price")),
            format!(
                "**Change**: {} {} ({}%)",
                change_marker(change_percent),
                num_field(quote, "change"),
                num_field(quote, "changesPercentage")
            ),
            String::new(),
            "## Trading Information".to_string(),
            format!("**Previous Close**: {}", num_field(quote, "previousClose")),
            format!(
                "**Day Range**: {} - {}",
                num_field(quote, "dayLow"),
                num_field(quote, "dayHigh")
            ),
            format!(
                "**Year Range**: {} - {}",
                num_field(quote, "yearLow"),
                num_field(quote, "yearHigh")
            ),
            String::new(),
            format!("*Data as of {generated_at}*"),
        ];

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: IndexQuoteParams =
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
            input_schema: cached_schema_for_type::<IndexQuoteParams>(),
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
                let params: IndexQuoteParams =
                    serde_json::from_value(serde_json::Value::Object(args))
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
    use serde_json::json;

    const STAMP: &str = "2025-06-01 12:00:00";

    #[test]
    fn test_render_index_list() {
        let indices = vec![
            json!({"symbol": "^GSPC", "name": "S&P 500", "exchange": "INDEX"}),
            json!({"symbol": "^FTSE", "name": "FTSE 100", "exchange": "LSE", "currency": "GBP"}),
        ];

        let text = IndexListTool::render(&indices, STAMP);
        assert!(text.starts_with("# Market Indices List"));
        // Missing currency defaults to USD
        assert!(text.contains("| ^GSPC | S&P 500 | INDEX | USD |"));
        assert!(text.contains("| ^FTSE | FTSE 100 | LSE | GBP |"));
    }

    #[test]
    fn test_render_index_quote_name_fallback() {
        let quote = json!({
            "symbol": "^GSPC",
            "price": 5954.5,
            "change": -12.4,
            "changesPercentage": -0.21,
            "previousClose": 5966.9
        });

        let text = IndexQuoteTool::render("^GSPC", &quote, STAMP);
        assert!(text.starts_with("# S&P 500 (^GSPC)"));
        assert!(text.contains("**Value**: 5,954.5"));
        assert!(text.contains("**Change**: 🔻 -12.4 (-0.21%)"));
    }

    #[test]
    fn test_render_index_quote_unknown_symbol() {
        let quote = json!({"symbol": "^XYZ", "price": 100.0});
        let text = IndexQuoteTool::render("^XYZ", &quote, STAMP);
        assert!(text.starts_with("# Index ^XYZ (^XYZ)"));
    }
}
