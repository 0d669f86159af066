//! Forex tools.
//!
//! Covers the Forex section of the Financial Modeling Prep API: the pair
//! catalog and current exchange-rate quotes grouped by base currency.

use std::collections::BTreeMap;
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

/// Base currencies listed before everything else in quote output.
const MAJOR_CURRENCIES: [&str; 7] = ["EUR", "USD", "GBP", "JPY", "AUD", "CAD", "CHF"];

/// Split a six-letter pair symbol like `EURUSD` into base and quote legs.
fn currency_legs(symbol: &str) -> (&str, &str) {
    if symbol.len() >= 6 && symbol.is_char_boundary(3) && symbol.is_char_boundary(6) {
        (&symbol[..3], &symbol[3..6])
    } else {
        ("N/A", "N/A")
    }
}

// ============================================================================
// get_forex_list
// ============================================================================

/// Parameters for the forex pair list tool (none).
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ForexListParams {}

/// Forex pair catalog tool.
#[derive(Debug, Clone)]
pub struct ForexListTool;

impl ForexListTool {
    pub const NAME: &'static str = "get_forex_list";

    pub const DESCRIPTION: &'static str =
        "Get the list of available forex pairs with their base and quote currencies. \
         Returns a Markdown table.";

    pub async fn execute(_params: &ForexListParams, client: &FmpClient) -> CallToolResult {
        info!("Fetching forex pair list");

        let data = match client.get("forex-list", &[]).await {
            Ok(data) => data,
            Err(e) => return error_result(&format!("Error fetching forex list: {e}")),
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!("Error fetching forex list: {detail}"));
        }

        let Some(pairs) = records(&data) else {
            return no_data_result("No forex pair data found");
        };

        success_result(Self::render(pairs, &now_stamp()))
    }

    fn render(pairs: &[Value], generated_at: &str) -> String {
        let mut lines = vec![
            "# Available Forex Pairs".to_string(),
            format!("*Data as of {generated_at}*"),
            String::new(),
            "| Symbol | Name | Base Currency | Quote Currency |".to_string(),
            "|--------|------|---------------|----------------|".to_string(),
        ];

        for pair in pairs {
            let symbol = str_field(pair, "symbol");
            let (base, quote) = currency_legs(&symbol);
            lines.push(format!(
                "| {} | {} | {} | {} |",
                symbol,
                str_field(pair, "name"),
                base,
                quote
            ));
        }

        lines.push(String::new());
        lines.push(
            "*Note: Use these symbols with the get_forex_quotes tool to get current values.*"
                .to_string(),
        );

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: ForexListParams =
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
            input_schema: cached_schema_for_type::<ForexListParams>(),
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
                let params: ForexListParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                Ok(Self::execute(&params, &client).await)
            }
            .boxed()
        })
    }
}

// ============================================================================
// get_forex_quotes
// ============================================================================

/// Parameters for the forex quotes tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ForexQuotesParams {
    /// Restrict to specific pairs.
    #[schemars(
        description = "Comma-separated forex pair symbols (e.g., \"EURUSD,GBPUSD\"); \
                       major pairs when omitted"
    )]
    #[serde(default)]
    pub symbols: Option<String>,
}

/// Forex quotes tool.
#[derive(Debug, Clone)]
pub struct ForexQuotesTool;

impl ForexQuotesTool {
    pub const NAME: &'static str = "get_forex_quotes";

    pub const DESCRIPTION: &'static str = "Get current forex exchange rates with change, bid/ask, \
         and day range, grouped by base currency. Returns Markdown tables.";

    pub async fn execute(params: &ForexQuotesParams, client: &FmpClient) -> CallToolResult {
        let symbols = params
            .symbols
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        info!(
            "Fetching forex quotes for {}",
            symbols.unwrap_or("major pairs")
        );

        let query: Vec<(&str, String)> = match symbols {
            Some(symbols) => vec![("symbols", symbols.to_string())],
            None => Vec::new(),
        };

        let data = match client.get("forex-quotes", &query).await {
            Ok(data) => data,
            Err(e) => return error_result(&format!("Error fetching forex quotes: {e}")),
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!("Error fetching forex quotes: {detail}"));
        }

        let Some(pairs) = records(&data) else {
            return no_data_result(&format!(
                "No quote data found for forex pairs: {}",
                symbols.unwrap_or("major pairs")
            ));
        };

        success_result(Self::render(pairs, &now_stamp()))
    }

    fn quote_row(pair: &Value) -> String {
        let change = f64_field(pair, "change").unwrap_or(0.0);
        let day_range = format!(
            "{} - {}",
            num_field(pair, "dayLow"),
            num_field(pair, "dayHigh")
        );

        format!(
            "| {} | {} | {} {} | {}% | {} | {} | {} |",
            str_field(pair, "symbol"),
            num_field(pair, "price"),
            change_marker(change),
            group_number(change.abs()),
            num_field(pair, "changesPercentage"),
            num_field(pair, "bid"),
            num_field(pair, "ask"),
            day_range,
        )
    }

    fn render(pairs: &[Value], generated_at: &str) -> String {
        let mut lines = vec![
            "# Forex Quotes".to_string(),
            format!("*Data as of {generated_at}*"),
            String::new(),
            "| Symbol | Exchange Rate | Change | Change % | Bid | Ask | Day Range |".to_string(),
            "|--------|---------------|--------|----------|-----|-----|-----------|".to_string(),
        ];

        // Bucket rows by base currency; BTreeMap keeps the leftover groups
        // alphabetical after the majors are pulled out.
        let mut by_base: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for pair in pairs {
            let symbol = str_field(pair, "symbol");
            let base = match currency_legs(&symbol) {
                ("N/A", _) => "Other".to_string(),
                (base, _) => base.to_string(),
            };
            by_base.entry(base).or_default().push(Self::quote_row(pair));
        }

        for base in MAJOR_CURRENCIES {
            if let Some(rows) = by_base.remove(base) {
                lines.push(format!("### {base} Pairs"));
                lines.extend(rows);
                lines.push(String::new());
            }
        }

        for (base, rows) in by_base {
            lines.push(format!("### {base} Pairs"));
            lines.extend(rows);
            lines.push(String::new());
        }

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: ForexQuotesParams =
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
            input_schema: cached_schema_for_type::<ForexQuotesParams>(),
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
                let params: ForexQuotesParams =
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
    fn test_currency_legs() {
        assert_eq!(currency_legs("EURUSD"), ("EUR", "USD"));
        assert_eq!(currency_legs("GBPJPY"), ("GBP", "JPY"));
        assert_eq!(currency_legs("BAD"), ("N/A", "N/A"));
        assert_eq!(currency_legs(""), ("N/A", "N/A"));
    }

    #[test]
    fn test_render_list() {
        let pairs = vec![json!({"symbol": "EURUSD", "name": "EUR/USD"})];
        let text = ForexListTool::render(&pairs, STAMP);
        assert!(text.starts_with("# Available Forex Pairs"));
        assert!(text.contains("| EURUSD | EUR/USD | EUR | USD |"));
        assert!(text.contains("get_forex_quotes"));
    }

    #[test]
    fn test_render_quotes_groups_majors_first() {
        let pairs = vec![
            json!({
                "symbol": "NZDUSD",
                "price": 0.6123,
                "change": 0.0012,
                "changesPercentage": 0.2,
                "bid": 0.6122,
                "ask": 0.6124,
                "dayLow": 0.6101,
                "dayHigh": 0.6145
            }),
            json!({
                "symbol": "EURUSD",
                "price": 1.0842,
                "change": -0.0035,
                "changesPercentage": -0.32,
                "bid": 1.0841,
                "ask": 1.0843,
                "dayLow": 1.0822,
                "dayHigh": 1.0889
            }),
        ];

        let text = ForexQuotesTool::render(&pairs, STAMP);
        let eur = text.find("### EUR Pairs").expect("EUR section");
        let nzd = text.find("### NZD Pairs").expect("NZD section");
        assert!(eur < nzd);
        assert!(text.contains(
            "| EURUSD | 1.0842 | 🔻 0.0035 | -0.32% | 1.0841 | 1.0843 | 1.0822 - 1.0889 |"
        ));
    }

    #[test]
    fn test_render_quotes_flat_change() {
        let pairs = vec![json!({
            "symbol": "USDCAD",
            "price": 1.35,
            "change": 0.0,
            "changesPercentage": 0.0,
            "bid": 1.3499,
            "ask": 1.3501,
            "dayLow": 1.349,
            "dayHigh": 1.351
        })];

        let text = ForexQuotesTool::render(&pairs, STAMP);
        assert!(text.contains("| USDCAD | 1.35 | ➖ 0 | 0.0% |"));
    }
}
