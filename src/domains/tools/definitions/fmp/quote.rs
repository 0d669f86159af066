//! Quote tools.
//!
//! Covers the Quote section of the Financial Modeling Prep API: the full
//! quote, the short quote, and the multi-period price change summary.

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

/// Parameters shared by the quote tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QuoteParams {
    /// The ticker to quote.
    #[schemars(description = "Stock ticker symbol (e.g., AAPL, MSFT, TSLA)")]
    pub symbol: String,
}

// ============================================================================
// get_quote
// ============================================================================

/// Full stock quote tool.
#[derive(Debug, Clone)]
pub struct QuoteTool;

impl QuoteTool {
    pub const NAME: &'static str = "get_quote";

    pub const DESCRIPTION: &'static str = "Get the current stock quote for a company: price, \
         change, day/year ranges, market cap, and volume. Returns a Markdown document.";

    pub async fn execute(params: &QuoteParams, client: &FmpClient) -> CallToolResult {
        let symbol = params.symbol.trim();
        if symbol.is_empty() {
            return error_result("Error: symbol parameter is required");
        }

        info!("Fetching quote for {}", symbol);

        let data = match client.get("quote", &[("symbol", symbol.to_string())]).await {
            Ok(data) => data,
            Err(e) => return error_result(&format!("Error fetching quote for {symbol}: {e}")),
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!("Error fetching quote for {symbol}: {detail}"));
        }

        let Some(quotes) = records(&data) else {
            return no_data_result(&format!("No quote data found for symbol {symbol}"));
        };

        success_result(Self::render(&quotes[0], &now_stamp()))
    }

    /// Render one quote record as Markdown.
    fn render(quote: &Value, generated_at: &str) -> String {
        let change_percent = f64_field(quote, "changesPercentage").unwrap_or(0.0);
        let marker = change_marker(change_percent);

        let lines = vec![
            format!(
                "# {} ({})",
                str_field(quote, "name"),
                str_field(quote, "symbol")
            ),
            format!("**Price**: ${}", num_field(quote, "price")),
            format!(
                "**Change**: {} ${} ({}%)",
                marker,
                num_field(quote, "change"),
                num_field(quote, "changesPercentage")
            ),
            String::new(),
            "## Trading Information".to_string(),
            format!("**Previous Close**: ${}", num_field(quote, "previousClose")),
            format!(
                "**Day Range**: ${} - ${}",
                num_field(quote, "dayLow"),
                num_field(quote, "dayHigh")
            ),
            format!(
                "**Year Range**: ${} - ${}",
                num_field(quote, "yearLow"),
                num_field(quote, "yearHigh")
            ),
            format!("**Market Cap**: ${}", num_field(quote, "marketCap")),
            format!("**Volume**: {}", num_field(quote, "volume")),
            format!("**Average Volume**: {}", num_field(quote, "avgVolume")),
            format!("**Open**: ${}", num_field(quote, "open")),
            format!("**PE Ratio**: {}", num_field(quote, "pe")),
            format!("**EPS**: ${}", num_field(quote, "eps")),
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
        let params: QuoteParams =
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
            input_schema: cached_schema_for_type::<QuoteParams>(),
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
                let params: QuoteParams = serde_json::from_value(serde_json::Value::Object(args))
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                Ok(Self::execute(&params, &client).await)
            }
            .boxed()
        })
    }
}

// ============================================================================
// get_quote_short
// ============================================================================

/// Simplified stock quote tool.
#[derive(Debug, Clone)]
pub struct QuoteShortTool;

impl QuoteShortTool {
    pub const NAME: &'static str = "get_quote_short";

    pub const DESCRIPTION: &'static str =
        "Get a simplified stock quote with just price, change, and volume. \
         Returns a short Markdown document.";

    pub async fn execute(params: &QuoteParams, client: &FmpClient) -> CallToolResult {
        let symbol = params.symbol.trim();
        if symbol.is_empty() {
            return error_result("Error: symbol parameter is required");
        }

        info!("Fetching simplified quote for {}", symbol);

        let data = match client
            .get("quote-short", &[("symbol", symbol.to_string())])
            .await
        {
            Ok(data) => data,
            Err(e) => {
                return error_result(&format!(
                    "Error fetching simplified quote for {symbol}: {e}"
                ));
            }
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!(
                "Error fetching simplified quote for {symbol}: {detail}"
            ));
        }

        let Some(quotes) = records(&data) else {
            return no_data_result(&format!(
                "No simplified quote data found for symbol {symbol}"
            ));
        };

        success_result(Self::render(&quotes[0], &now_stamp()))
    }

    fn render(quote: &Value, generated_at: &str) -> String {
        let change = f64_field(quote, "change").unwrap_or(0.0);

        let lines = vec![
            format!("# Stock Quote: {}", str_field(quote, "symbol")),
            format!("**Price**: ${}", num_field(quote, "price")),
            format!(
                "**Change**: {} ${} ({}%)",
                change_marker(change),
                num_field(quote, "change"),
                num_field(quote, "changesPercentage")
            ),
            format!("**Volume**: {}", num_field(quote, "volume")),
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
        let params: QuoteParams =
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
            input_schema: cached_schema_for_type::<QuoteParams>(),
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
                let params: QuoteParams = serde_json::from_value(serde_json::Value::Object(args))
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                Ok(Self::execute(&params, &client).await)
            }
            .boxed()
        })
    }
}

// ============================================================================
// get_quote_change
// ============================================================================

/// Periods reported by the `stock-price-change` endpoint, in display order.
const CHANGE_PERIODS: &[(&str, &str)] = &[
    ("1D", "1 Day"),
    ("5D", "5 Days"),
    ("1M", "1 Month"),
    ("3M", "3 Months"),
    ("6M", "6 Months"),
    ("ytd", "Year to Date"),
    ("1Y", "1 Year"),
    ("3Y", "3 Years"),
    ("5Y", "5 Years"),
    ("10Y", "10 Years"),
    ("max", "Maximum"),
];

/// Multi-period price change tool.
#[derive(Debug, Clone)]
pub struct QuoteChangeTool;

impl QuoteChangeTool {
    pub const NAME: &'static str = "get_quote_change";

    pub const DESCRIPTION: &'static str =
        "Get percentage price changes for a stock over standard periods \
         (1 day through maximum history). Returns a Markdown table.";

    pub async fn execute(params: &QuoteParams, client: &FmpClient) -> CallToolResult {
        let symbol = params.symbol.trim();
        if symbol.is_empty() {
            return error_result("Error: symbol parameter is required");
        }

        info!("Fetching price change for {}", symbol);

        let data = match client
            .get("stock-price-change", &[("symbol", symbol.to_string())])
            .await
        {
            Ok(data) => data,
            Err(e) => {
                return error_result(&format!("Error fetching price change for {symbol}: {e}"));
            }
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!(
                "Error fetching price change for {symbol}: {detail}"
            ));
        }

        let Some(changes) = records(&data) else {
            return no_data_result(&format!("No price change data found for symbol {symbol}"));
        };

        success_result(Self::render(symbol, &changes[0], &now_stamp()))
    }

    fn render(symbol: &str, change: &Value, generated_at: &str) -> String {
        let mut lines = vec![
            format!("# Price Change for {symbol}"),
            format!("*Data as of {generated_at}*"),
            String::new(),
            "| Time Period | Change (%) |".to_string(),
            "|-------------|------------|".to_string(),
        ];

        for (key, label) in CHANGE_PERIODS {
            if let Some(value) = f64_field(change, key) {
                lines.push(format!(
                    "| {} | {} {:.2}% |",
                    label,
                    change_marker(value),
                    value
                ));
            }
        }

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: QuoteParams =
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
            input_schema: cached_schema_for_type::<QuoteParams>(),
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
                let params: QuoteParams = serde_json::from_value(serde_json::Value::Object(args))
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

    const STAMP: &str = "2025-06-01 12:00:00";

    fn sample_quote() -> Value {
        json!({
            "symbol": "AAPL",
            "name": "Apple Inc.",
            "price": 190.5,
            "change": 2.5,
            "changesPercentage": 1.25,
            "previousClose": 188.0,
            "dayLow": 187.24,
            "dayHigh": 191.1,
            "yearLow": 124.17,
            "yearHigh": 198.23,
            "marketCap": 2840000000000i64,
            "volume": 58000000,
            "avgVolume": 59000000,
            "open": 188.5
        })
    }

    #[test]
    fn test_render_quote() {
        let text = QuoteTool::render(&sample_quote(), STAMP);

        assert!(text.starts_with("# Apple Inc. (AAPL)"));
        assert!(text.contains("**Price**: $190.5"));
        assert!(text.contains("**Change**: 🔺 $2.5 (1.25%)"));
        assert!(text.contains("**Market Cap**: $2,840,000,000,000"));
        assert!(text.contains("**PE Ratio**: N/A"));
        assert!(text.contains("*Data as of 2025-06-01 12:00:00*"));
    }

    #[test]
    fn test_render_quote_negative_change_marker() {
        let mut quote = sample_quote();
        quote["change"] = json!(-3.1);
        quote["changesPercentage"] = json!(-1.6);

        let text = QuoteTool::render(&quote, STAMP);
        assert!(text.contains("**Change**: 🔻 $-3.1 (-1.6%)"));
    }

    #[test]
    fn test_render_quote_short() {
        let text = QuoteShortTool::render(
            &json!({"symbol": "AAPL", "price": 190.5, "change": 0.0, "changesPercentage": 0.0, "volume": 1234567}),
            STAMP,
        );

        assert!(text.starts_with("# Stock Quote: AAPL"));
        assert!(text.contains("**Change**: ➖ $0 (0%)"));
        assert!(text.contains("**Volume**: 1,234,567"));
    }

    #[test]
    fn test_render_quote_change_periods() {
        let change = json!({
            "symbol": "AAPL",
            "1D": 4.05945,
            "5D": 11.8228,
            "1M": -5.49886,
            "1Y": 14.74318,
            "5Y": 190.07466
        });

        let text = QuoteChangeTool::render("AAPL", &change, STAMP);

        assert!(text.starts_with("# Price Change for AAPL"));
        assert!(text.contains("| Time Period | Change (%) |"));
        assert!(text.contains("| 1 Day | 🔺 4.06% |"));
        assert!(text.contains("| 1 Month | 🔻 -5.50% |"));
        assert!(text.contains("| 1 Year | 🔺 14.74% |"));
        assert!(text.contains("| 5 Years | 🔺 190.07% |"));
        // Periods missing from the payload are omitted entirely
        assert!(!text.contains("10 Years"));
    }

    #[tokio::test]
    async fn test_quote_change_empty_symbol_fails_before_network() {
        let client = offline_client();
        let params = QuoteParams {
            symbol: String::new(),
        };
        let result = QuoteChangeTool::execute(&params, &client).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("symbol parameter is required"));
    }
}
