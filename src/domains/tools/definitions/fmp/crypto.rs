//! Cryptocurrency tools.
//!
//! Covers the Cryptocurrency section of the Financial Modeling Prep API.

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
    change_marker, error_result, f64_field, group_number, no_data_result, now_stamp, num_field,
    records, str_field, success_result, upstream_error_detail,
};

/// Compact rendering for large market caps: billions/millions suffixes.
fn market_cap_cell(record: &Value) -> String {
    match f64_field(record, "marketCap") {
        Some(cap) if cap >= 1_000_000_000.0 => {
            format!("${}B", group_number((cap / 1_000_000_000.0 * 100.0).round() / 100.0))
        }
        Some(cap) if cap >= 1_000_000.0 => {
            format!("${}M", group_number((cap / 1_000_000.0 * 100.0).round() / 100.0))
        }
        Some(cap) => format!("${}", group_number(cap)),
        None => "N/A".to_string(),
    }
}

// ============================================================================
// get_crypto_list
// ============================================================================

/// Parameters for the cryptocurrency list tool (none).
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CryptoListParams {}

/// Cryptocurrency catalog tool.
#[derive(Debug, Clone)]
pub struct CryptoListTool;

impl CryptoListTool {
    pub const NAME: &'static str = "get_crypto_list";

    pub const DESCRIPTION: &'static str =
        "Get the list of available cryptocurrencies with their symbols. Returns a Markdown table.";

    pub async fn execute(_params: &CryptoListParams, client: &FmpClient) -> CallToolResult {
        info!("Fetching cryptocurrency list");

        let data = match client.get("cryptocurrency-list", &[]).await {
            Ok(data) => data,
            Err(e) => return error_result(&format!("Error fetching cryptocurrency list: {e}")),
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!("Error fetching cryptocurrency list: {detail}"));
        }

        let Some(cryptos) = records(&data) else {
            return no_data_result("No cryptocurrency data found");
        };

        success_result(Self::render(cryptos, &now_stamp()))
    }

    fn render(cryptos: &[Value], generated_at: &str) -> String {
        let mut lines = vec![
            "# Available Cryptocurrencies".to_string(),
            format!("*Data as of {generated_at}*"),
            String::new(),
            "| Symbol | Name | Currency |".to_string(),
            "|--------|------|----------|".to_string(),
        ];

        for crypto in cryptos {
            let currency = crypto
                .get("currency")
                .and_then(|v| v.as_str())
                .unwrap_or("USD");
            lines.push(format!(
                "| {} | {} | {} |",
                str_field(crypto, "symbol"),
                str_field(crypto, "name"),
                currency
            ));
        }

        lines.push(String::new());
        lines.push(
            "*Note: Use these symbols with the get_crypto_quotes tool to get current values.*"
                .to_string(),
        );

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: CryptoListParams =
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
            input_schema: cached_schema_for_type::<CryptoListParams>(),
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
                let params: CryptoListParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                Ok(Self::execute(&params, &client).await)
            }
            .boxed()
        })
    }
}

// ============================================================================
// get_crypto_quotes
// ============================================================================

/// Parameters for the cryptocurrency quotes tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CryptoQuotesParams {
    /// Restrict to specific pairs.
    #[schemars(
        description = "Comma-separated cryptocurrency symbols (e.g., \"BTCUSD,ETHUSD\"); \
                       top cryptocurrencies when omitted"
    )]
    #[serde(default)]
    pub symbols: Option<String>,
}

/// Cryptocurrency quotes tool.
#[derive(Debug, Clone)]
pub struct CryptoQuotesTool;

impl CryptoQuotesTool {
    pub const NAME: &'static str = "get_crypto_quotes";

    pub const DESCRIPTION: &'static str = "Get current cryptocurrency quotes with price, change, \
         market cap, and 24h volume. Returns a Markdown table.";

    pub async fn execute(params: &CryptoQuotesParams, client: &FmpClient) -> CallToolResult {
        let symbols = params
            .symbols
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        info!(
            "Fetching cryptocurrency quotes for {}",
            symbols.unwrap_or("top cryptocurrencies")
        );

        let query: Vec<(&str, String)> = match symbols {
            Some(symbols) => vec![("symbols", symbols.to_string())],
            None => Vec::new(),
        };

        let data = match client.get("cryptocurrency-quotes", &query).await {
            Ok(data) => data,
            Err(e) => return error_result(&format!("Error fetching cryptocurrency quotes: {e}")),
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!("Error fetching cryptocurrency quotes: {detail}"));
        }

        let Some(cryptos) = records(&data) else {
            return no_data_result(&format!(
                "No quote data found for cryptocurrencies: {}",
                symbols.unwrap_or("top cryptocurrencies")
            ));
        };

        success_result(Self::render(cryptos, &now_stamp()))
    }

    fn render(cryptos: &[Value], generated_at: &str) -> String {
        let mut lines = vec![
            "# Cryptocurrency Quotes".to_string(),
            format!("*Data as of {generated_at}*"),
            String::new(),
            "| Symbol | Name | Price | Change | Change % | Market Cap | Volume (24h) |"
                .to_string(),
            "|--------|------|-------|--------|----------|------------|--------------|"
                .to_string(),
        ];

        for crypto in cryptos {
            let change = f64_field(crypto, "change").unwrap_or(0.0);

            lines.push(format!(
                "| {} | {} | {} | {} {} | {}% | {} | {} |",
                str_field(crypto, "symbol"),
                str_field(crypto, "name"),
                num_field(crypto, "price"),
                change_marker(change),
                group_number(change.abs()),
                num_field(crypto, "changesPercentage"),
                market_cap_cell(crypto),
                num_field(crypto, "volume24h"),
            ));
        }

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: CryptoQuotesParams =
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
            input_schema: cached_schema_for_type::<CryptoQuotesParams>(),
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
                let params: CryptoQuotesParams =
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
    fn test_market_cap_cell_scaling() {
        assert_eq!(market_cap_cell(&json!({"marketCap": 1234000000000.0})), "$1,234B");
        assert_eq!(market_cap_cell(&json!({"marketCap": 52500000.0})), "$52.5M");
        assert_eq!(market_cap_cell(&json!({"marketCap": 900000.0})), "$900,000");
        assert_eq!(market_cap_cell(&json!({})), "N/A");
    }

    #[test]
    fn test_render_quotes() {
        let cryptos = vec![json!({
            "symbol": "BTCUSD",
            "name": "Bitcoin",
            "price": 67250.5,
            "change": -1250.3,
            "changesPercentage": -1.83,
            "marketCap": 1325000000000.0,
            "volume24h": 28500000000i64
        })];

        let text = CryptoQuotesTool::render(&cryptos, STAMP);
        assert!(text.starts_with("# Cryptocurrency Quotes"));
        assert!(text.contains(
            "| BTCUSD | Bitcoin | 67,250.5 | 🔻 1,250.3 | -1.83% | $1,325B | 28,500,000,000 |"
        ));
    }

    #[test]
    fn test_render_list() {
        let cryptos = vec![json!({"symbol": "ETHUSD", "name": "Ethereum"})];
        let text = CryptoListTool::render(&cryptos, STAMP);
        assert!(text.contains("| ETHUSD | Ethereum | USD |"));
    }
}
