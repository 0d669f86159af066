//! Technical indicator tools.
//!
//! Covers the Technical Indicators section of the Financial Modeling Prep
//! API. Only the exponential moving average is exposed.

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
    error_result, no_data_result, now_stamp, num_field, records, success_result,
    upstream_error_detail, validate_date,
};

/// Timeframes accepted by the EMA endpoint.
const VALID_TIMEFRAMES: [&str; 7] = ["1min", "5min", "15min", "30min", "1hour", "4hour", "1day"];

/// Only the most recent data points are tabulated.
const MAX_EMA_ROWS: usize = 10;

fn default_period_length() -> i64 {
    10
}

fn default_timeframe() -> String {
    "1day".to_string()
}

/// Parameters for the EMA tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EmaParams {
    /// The symbol to compute the EMA for.
    #[schemars(description = "Ticker symbol (e.g., AAPL, MSFT)")]
    pub symbol: String,

    /// EMA lookback window.
    #[schemars(description = "Period length for the EMA calculation (default: 10)")]
    #[serde(default = "default_period_length")]
    pub period_length: i64,

    /// Candle width.
    #[schemars(
        description = "Time frame: 1min, 5min, 15min, 30min, 1hour, 4hour, or 1day (default: 1day)"
    )]
    #[serde(default = "default_timeframe")]
    pub timeframe: String,

    /// Start of the date range.
    #[schemars(description = "Start date in YYYY-MM-DD format (optional)")]
    #[serde(default)]
    pub from_date: Option<String>,

    /// End of the date range.
    #[schemars(description = "End date in YYYY-MM-DD format (optional)")]
    #[serde(default)]
    pub to_date: Option<String>,
}

/// Exponential moving average tool.
#[derive(Debug, Clone)]
pub struct EmaTool;

impl EmaTool {
    pub const NAME: &'static str = "get_ema";

    pub const DESCRIPTION: &'static str = "Get Exponential Moving Average (EMA) values for a \
         stock alongside closing prices, with an interpretation guide. Returns a Markdown table.";

    pub async fn execute(params: &EmaParams, client: &FmpClient) -> CallToolResult {
        let symbol = params.symbol.trim();
        if symbol.is_empty() {
            return error_result("Error: symbol parameter is required");
        }

        let timeframe = params.timeframe.as_str();
        if !VALID_TIMEFRAMES.contains(&timeframe) {
            let valid = VALID_TIMEFRAMES
                .iter()
                .map(|tf| format!("'{tf}'"))
                .collect::<Vec<_>>()
                .join(", ");
            return error_result(&format!(
                "Error: '{timeframe}' is not a valid timeframe. Valid options are: {valid}"
            ));
        }

        if params.period_length <= 0 {
            return error_result("Error: period_length must be a positive integer");
        }

        for (name, value) in [("from_date", &params.from_date), ("to_date", &params.to_date)] {
            if let Some(value) = value.as_deref() {
                if let Err(msg) = validate_date(name, value) {
                    return error_result(&msg);
                }
            }
        }

        info!(
            "Fetching EMA for {} (period {}, timeframe {})",
            symbol, params.period_length, timeframe
        );

        let mut query: Vec<(&str, String)> = vec![
            ("symbol", symbol.to_string()),
            ("periodLength", params.period_length.to_string()),
            ("timeframe", timeframe.to_string()),
        ];
        if let Some(from) = params.from_date.as_deref() {
            query.push(("from", from.to_string()));
        }
        if let Some(to) = params.to_date.as_deref() {
            query.push(("to", to.to_string()));
        }

        let data = match client.get("technical-indicators/ema", &query).await {
            Ok(data) => data,
            Err(e) => return error_result(&format!("Error fetching EMA data for {symbol}: {e}")),
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!("Error fetching EMA data for {symbol}: {detail}"));
        }

        let Some(entries) = records(&data) else {
            return no_data_result(&format!("No EMA data found for symbol {symbol}"));
        };

        success_result(Self::render(entries, params, symbol, &now_stamp()))
    }

    fn render(entries: &[Value], params: &EmaParams, symbol: &str, generated_at: &str) -> String {
        let subtitle = match (params.from_date.as_deref(), params.to_date.as_deref()) {
            (Some(from), Some(to)) => format!(
                "*Period: {}, Time Frame: {}, Date Range: {from} to {to}, Data as of {generated_at}*",
                params.period_length, params.timeframe
            ),
            _ => format!(
                "*Period: {}, Time Frame: {}, Data as of {generated_at}*",
                params.period_length, params.timeframe
            ),
        };

        let mut lines = vec![
            format!("# Exponential Moving Average (EMA) for {symbol}"),
            subtitle,
            String::new(),
            "| Date | Close | EMA |".to_string(),
            "|------|-------|-----|".to_string(),
        ];

        for entry in entries.iter().take(MAX_EMA_ROWS) {
            // Intraday timeframes carry a time suffix; keep the date part only
            let date = entry
                .get("date")
                .and_then(|v| v.as_str())
                .unwrap_or("N/A")
                .split(' ')
                .next()
                .unwrap_or("N/A");

            lines.push(format!(
                "| {} | {} | {} |",
                date,
                num_field(entry, "close"),
                num_field(entry, "ema"),
            ));
        }

        lines.push(String::new());
        lines.push("## Indicator Interpretation".to_string());
        lines.push("* The Exponential Moving Average is a trend-following indicator.".to_string());
        lines.push("* When the price is above the EMA, it typically signals an uptrend.".to_string());
        lines.push("* When the price is below the EMA, it typically signals a downtrend.".to_string());
        lines.push(
            "* EMA gives more weight to recent prices, making it more responsive to new information."
                .to_string(),
        );
        lines.push(
            "* EMA responds more quickly to price changes than Simple Moving Average (SMA)."
                .to_string(),
        );
        lines.push(
            "* Crossovers between different period EMAs are often used as trading signals."
                .to_string(),
        );
        lines.push("* Common EMA periods for analysis are 12, 26, 50, and 200 days.".to_string());

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: EmaParams =
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
            input_schema: cached_schema_for_type::<EmaParams>(),
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
                let params: EmaParams = serde_json::from_value(serde_json::Value::Object(args))
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

    fn params(symbol: &str) -> EmaParams {
        serde_json::from_value(json!({ "symbol": symbol })).unwrap()
    }

    #[test]
    fn test_params_defaults() {
        let p = params("AAPL");
        assert_eq!(p.period_length, 10);
        assert_eq!(p.timeframe, "1day");
        assert!(p.from_date.is_none());
    }

    #[tokio::test]
    async fn test_invalid_timeframe_fails_before_network() {
        let mut p = params("AAPL");
        p.timeframe = "2day".to_string();

        let result = EmaTool::execute(&p, &offline_client()).await;
        let text = result_text(&result);
        assert!(text.contains("'2day' is not a valid timeframe"));
        assert!(text.contains("'1day'"));
    }

    #[tokio::test]
    async fn test_nonpositive_period_fails_before_network() {
        let mut p = params("AAPL");
        p.period_length = 0;

        let result = EmaTool::execute(&p, &offline_client()).await;
        assert!(result_text(&result).contains("period_length must be a positive integer"));
    }

    #[tokio::test]
    async fn test_bad_date_fails_before_network() {
        let mut p = params("AAPL");
        p.from_date = Some("06/01/2025".to_string());

        let result = EmaTool::execute(&p, &offline_client()).await;
        assert!(result_text(&result).contains("from_date must be in YYYY-MM-DD format"));
    }

    #[test]
    fn test_render_caps_rows_and_trims_dates() {
        let entries: Vec<Value> = (0..15)
            .map(|i| {
                json!({
                    "date": format!("2025-05-{:02} 16:00:00", 30 - i),
                    "close": 100.0 + i as f64,
                    "ema": 99.5 + i as f64
                })
            })
            .collect();

        let text = EmaTool::render(&entries, &params("AAPL"), "AAPL", STAMP);
        assert!(text.starts_with("# Exponential Moving Average (EMA) for AAPL"));
        assert!(text.contains("| 2025-05-30 | 100.0 | 99.5 |"));
        // 15 entries in, 10 rows out
        assert_eq!(text.matches("| 2025-05-").count(), 10);
        assert!(text.contains("## Indicator Interpretation"));
    }

    #[test]
    fn test_render_subtitle_with_date_range() {
        let mut p = params("MSFT");
        p.from_date = Some("2025-01-01".to_string());
        p.to_date = Some("2025-02-01".to_string());

        let entries = vec![json!({"date": "2025-01-31", "close": 420.1, "ema": 418.9})];
        let text = EmaTool::render(&entries, &p, "MSFT", STAMP);
        assert!(text.contains("Date Range: 2025-01-01 to 2025-02-01"));
    }
}
