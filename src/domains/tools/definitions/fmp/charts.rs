//! Chart tools.
//!
//! Covers the Chart section of the Financial Modeling Prep API: end-of-day
//! price history with day-over-day changes, and the derived multi-period
//! price change summary.

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
    change_marker, error_result, group_number, group_number_2dp, no_data_result, now_stamp,
    num_field, success_result, upstream_error_detail, validate_date, validate_limit,
};

/// Pull the per-day entries out of either response shape the endpoint uses:
/// a bare array of records, or an object with a `historical` array.
fn historical_entries(data: &Value) -> Vec<Value> {
    match data {
        Value::Array(items) => items.clone(),
        Value::Object(obj) => obj
            .get("historical")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Closing price of one entry (`close`, falling back to `price`).
fn entry_close(entry: &Value) -> Option<f64> {
    entry
        .get("close")
        .or_else(|| entry.get("price"))
        .and_then(|v| v.as_f64())
}

/// Sort entries by date descending (ISO dates sort lexicographically).
fn sort_newest_first(entries: &mut [Value]) {
    entries.sort_by(|a, b| {
        let da = a.get("date").and_then(|v| v.as_str()).unwrap_or("");
        let db = b.get("date").and_then(|v| v.as_str()).unwrap_or("");
        db.cmp(da)
    });
}

// ============================================================================
// get_historical_price_eod_light
// ============================================================================

/// Parameters for the end-of-day history tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct HistoricalPriceEodParams {
    /// The symbol to fetch history for.
    #[schemars(description = "Ticker symbol (e.g., AAPL, GCUSD, EURUSD)")]
    pub symbol: String,

    /// Start of the date range.
    #[schemars(description = "Start date in YYYY-MM-DD format (optional)")]
    #[serde(default)]
    pub from_date: Option<String>,

    /// End of the date range.
    #[schemars(description = "End date in YYYY-MM-DD format (optional)")]
    #[serde(default)]
    pub to_date: Option<String>,

    /// Cap on the number of rows returned (newest first).
    #[schemars(description = "Maximum number of rows to return, 1-1000 (optional)")]
    #[serde(default)]
    pub limit: Option<i64>,
}

/// End-of-day light price history tool.
#[derive(Debug, Clone)]
pub struct HistoricalPriceEodTool;

impl HistoricalPriceEodTool {
    pub const NAME: &'static str = "get_historical_price_eod_light";

    pub const DESCRIPTION: &'static str = "Get end-of-day price history for a symbol, newest \
         first, with day-over-day change columns. Accepts an optional date range and row limit. \
         Returns a Markdown table.";

    pub async fn execute(params: &HistoricalPriceEodParams, client: &FmpClient) -> CallToolResult {
        let symbol = params.symbol.trim();
        if symbol.is_empty() {
            return error_result("Error: symbol parameter is required");
        }

        // All validation happens before the gateway is touched
        let from_date = match params.from_date.as_deref() {
            Some(value) => match validate_date("from_date", value) {
                Ok(date) => Some(date),
                Err(msg) => return error_result(&msg),
            },
            None => None,
        };
        let to_date = match params.to_date.as_deref() {
            Some(value) => match validate_date("to_date", value) {
                Ok(date) => Some(date),
                Err(msg) => return error_result(&msg),
            },
            None => None,
        };
        if let (Some(from), Some(to)) = (from_date, to_date) {
            if to < from {
                return error_result("Error: 'to_date' must be after 'from_date'");
            }
        }
        if let Some(limit) = params.limit {
            if let Err(msg) = validate_limit(limit, 1, 1000) {
                return error_result(&msg);
            }
        }

        info!("Fetching EOD price history for {}", symbol);

        // Missing date bounds mean unfiltered history, capped only by limit
        let mut query = vec![("symbol", symbol.to_string())];
        if let Some(from) = params.from_date.as_deref() {
            query.push(("from", from.to_string()));
        }
        if let Some(to) = params.to_date.as_deref() {
            query.push(("to", to.to_string()));
        }

        let data = match client.get("historical-price-eod/light", &query).await {
            Ok(data) => data,
            Err(e) => {
                return error_result(&format!(
                    "Error fetching historical prices for {symbol}: {e}"
                ));
            }
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!(
                "Error fetching historical prices for {symbol}: {detail}"
            ));
        }

        let entries = historical_entries(&data);
        if entries.is_empty() {
            return no_data_result(&format!(
                "No historical price data found for symbol {symbol}"
            ));
        }

        success_result(Self::render(
            symbol,
            entries,
            params.from_date.as_deref(),
            params.to_date.as_deref(),
            params.limit,
            &now_stamp(),
        ))
    }

    /// Render the history table, newest first.
    ///
    /// The change columns compare each day against the previous trading day;
    /// the oldest row in the series has no prior point, so both of its change
    /// columns render as `N/A` rather than zero.
    fn render(
        symbol: &str,
        mut entries: Vec<Value>,
        from_date: Option<&str>,
        to_date: Option<&str>,
        limit: Option<i64>,
        generated_at: &str,
    ) -> String {
        sort_newest_first(&mut entries);
        if let Some(limit) = limit {
            entries.truncate(limit as usize);
        }

        let period = match (from_date, to_date) {
            (Some(from), Some(to)) => format!("Period: {from} to {to}, "),
            (Some(from), None) => format!("Period: from {from}, "),
            (None, Some(to)) => format!("Period: until {to}, "),
            (None, None) => String::new(),
        };

        let mut lines = vec![
            format!("# Historical Prices for {symbol}"),
            format!("*{period}Data as of {generated_at}*"),
            String::new(),
            "| Date | Price | Change | Change % | Volume |".to_string(),
            "|------|-------|--------|----------|--------|".to_string(),
        ];

        for (idx, entry) in entries.iter().enumerate() {
            let date = num_field(entry, "date");
            let price = entry_close(entry)
                .map(group_number)
                .unwrap_or_else(|| "N/A".to_string());
            let volume = num_field(entry, "volume");

            // entries[idx + 1] is the previous trading day (list is newest first)
            let change_cells = match (entry_close(entry), entries.get(idx + 1).and_then(entry_close))
            {
                (Some(today), Some(prev)) => {
                    let change = today - prev;
                    let percent = if prev != 0.0 {
                        format!("{:.2}%", change / prev * 100.0)
                    } else {
                        "N/A".to_string()
                    };
                    (
                        format!("{} {}", change_marker(change), group_number_2dp(change.abs())),
                        percent,
                    )
                }
                _ => ("N/A".to_string(), "N/A".to_string()),
            };

            lines.push(format!(
                "| {} | {} | {} | {} | {} |",
                date, price, change_cells.0, change_cells.1, volume
            ));
        }

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: HistoricalPriceEodParams =
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
            input_schema: cached_schema_for_type::<HistoricalPriceEodParams>(),
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
                let params: HistoricalPriceEodParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                Ok(Self::execute(&params, &client).await)
            }
            .boxed()
        })
    }
}

// ============================================================================
// get_price_change
// ============================================================================

/// Parameters for the derived price change tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PriceChangeParams {
    /// The symbol to summarize.
    #[schemars(description = "Stock ticker symbol (e.g., AAPL, MSFT)")]
    pub symbol: String,
}

/// Offsets into a newest-first daily series for the summary periods.
/// A week is ~5 trading days, a month ~21.
const SUMMARY_PERIODS: &[(usize, &str)] = &[(1, "1 Day"), (5, "1 Week"), (21, "1 Month")];

/// Price change summary derived from end-of-day history.
#[derive(Debug, Clone)]
pub struct PriceChangeTool;

impl PriceChangeTool {
    pub const NAME: &'static str = "get_price_change";

    pub const DESCRIPTION: &'static str = "Get recent price changes for a stock derived from its \
         end-of-day history: latest price plus 1-day, 1-week, and 1-month moves. \
         Returns a Markdown document.";

    pub async fn execute(params: &PriceChangeParams, client: &FmpClient) -> CallToolResult {
        let symbol = params.symbol.trim();
        if symbol.is_empty() {
            return error_result("Error: symbol parameter is required");
        }

        info!("Fetching price change for {}", symbol);

        let data = match client
            .get("historical-price-eod/light", &[("symbol", symbol.to_string())])
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

        let entries = historical_entries(&data);
        if entries.is_empty() {
            return no_data_result(&format!(
                "No historical price data found for symbol {symbol}"
            ));
        }

        success_result(Self::render(symbol, entries, &now_stamp()))
    }

    fn render(symbol: &str, mut entries: Vec<Value>, generated_at: &str) -> String {
        sort_newest_first(&mut entries);

        let mut lines = vec![
            format!("# Price History for {symbol}"),
            format!("*Data as of {generated_at}*"),
            String::new(),
        ];

        let Some(latest_price) = entries.first().and_then(entry_close) else {
            return format!("Price data not available for {symbol}");
        };
        let latest_date = num_field(&entries[0], "date");

        lines.push(format!(
            "**Latest Price**: ${} on {}",
            group_number(latest_price),
            latest_date
        ));
        lines.push(String::new());

        if entries.len() >= 30 {
            for (offset, label) in SUMMARY_PERIODS {
                if let Some(past) = entries.get(*offset).and_then(entry_close) {
                    if past != 0.0 {
                        let percent = (latest_price - past) / past * 100.0;
                        lines.push(format!(
                            "**{} Change**: {} {:.2}%",
                            label,
                            change_marker(percent),
                            percent
                        ));
                    }
                }
            }
        } else {
            lines.push("*Insufficient historical data for price change calculations*".to_string());
        }

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: PriceChangeParams =
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
            input_schema: cached_schema_for_type::<PriceChangeParams>(),
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
                let params: PriceChangeParams =
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
    use crate::domains::tools::definitions::fmp::common::{offline_client, result_text};
    use serde_json::json;

    const STAMP: &str = "2025-06-01 12:00:00";

    /// Five trading days of gold futures, deliberately unsorted.
    fn gcusd_series() -> Vec<Value> {
        vec![
            json!({"date": "2025-02-03", "close": 2862.5, "volume": 167000}),
            json!({"date": "2025-01-31", "close": 2835.0, "volume": 181000}),
            json!({"date": "2025-02-04", "close": 2873.7, "volume": 154000}),
            json!({"date": "2025-02-01", "close": 2840.2, "volume": 142000}),
            json!({"date": "2025-02-02", "close": 2851.9, "volume": 139000}),
        ]
    }

    #[test]
    fn test_eod_render_sorted_descending_with_na_oldest() {
        let text = HistoricalPriceEodTool::render(
            "GCUSD",
            gcusd_series(),
            Some("2025-01-31"),
            Some("2025-02-04"),
            None,
            STAMP,
        );

        let rows: Vec<&str> = text.lines().filter(|l| l.starts_with("| 2")).collect();
        assert_eq!(rows.len(), 5);

        // Newest first
        assert!(rows[0].starts_with("| 2025-02-04 | 2,873.7 |"));
        assert!(rows[4].starts_with("| 2025-01-31 |"));

        // 2873.7 - 2862.5 = 11.2 up; 11.2 / 2862.5 = 0.39%
        assert!(rows[0].contains("🔺 11.2"));
        assert!(rows[0].contains("0.39%"));

        // The oldest record has no prior point: both change columns are N/A
        assert_eq!(rows[4], "| 2025-01-31 | 2,835 | N/A | N/A | 181,000 |");

        assert!(text.contains("Period: 2025-01-31 to 2025-02-04"));
    }

    #[test]
    fn test_eod_render_flat_change_is_flat_marker() {
        let entries = vec![
            json!({"date": "2025-02-02", "close": 100.0, "volume": 10}),
            json!({"date": "2025-02-01", "close": 100.0, "volume": 10}),
        ];
        let text = HistoricalPriceEodTool::render("X", entries, None, None, None, STAMP);
        assert!(text.contains("| 2025-02-02 | 100 | ➖ 0.00 | 0.00% |"));
    }

    #[test]
    fn test_eod_render_limit_caps_newest_rows() {
        let text =
            HistoricalPriceEodTool::render("GCUSD", gcusd_series(), None, None, Some(2), STAMP);
        let rows: Vec<&str> = text.lines().filter(|l| l.starts_with("| 2")).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("| 2025-02-04 |"));
        assert!(rows[1].starts_with("| 2025-02-03 |"));
    }

    #[test]
    fn test_eod_render_is_deterministic() {
        let a = HistoricalPriceEodTool::render("GCUSD", gcusd_series(), None, None, None, STAMP);
        let b = HistoricalPriceEodTool::render("GCUSD", gcusd_series(), None, None, None, STAMP);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_eod_zero_limit_fails_before_network() {
        let client = offline_client();
        let params = HistoricalPriceEodParams {
            symbol: "GCUSD".to_string(),
            from_date: None,
            to_date: None,
            limit: Some(0),
        };
        let result = HistoricalPriceEodTool::execute(&params, &client).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("limit must be between 1 and 1000"));
    }

    #[tokio::test]
    async fn test_eod_bad_date_fails_before_network() {
        let client = offline_client();
        let params = HistoricalPriceEodParams {
            symbol: "GCUSD".to_string(),
            from_date: Some("31-01-2025".to_string()),
            to_date: None,
            limit: None,
        };
        let result = HistoricalPriceEodTool::execute(&params, &client).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("from_date must be in YYYY-MM-DD format"));
    }

    #[tokio::test]
    async fn test_eod_inverted_range_fails_before_network() {
        let client = offline_client();
        let params = HistoricalPriceEodParams {
            symbol: "GCUSD".to_string(),
            from_date: Some("2025-02-04".to_string()),
            to_date: Some("2025-01-31".to_string()),
            limit: None,
        };
        let result = HistoricalPriceEodTool::execute(&params, &client).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("'to_date' must be after 'from_date'"));
    }

    #[test]
    fn test_price_change_render_with_enough_history() {
        // 31 days of strictly increasing closes, newest last before sorting
        let entries: Vec<Value> = (0..31)
            .map(|i| {
                json!({
                    "date": format!("2025-01-{:02}", i + 1),
                    "close": 100.0 + i as f64,
                })
            })
            .collect();

        let text = PriceChangeTool::render("AAPL", entries, STAMP);

        assert!(text.contains("# Price History for AAPL"));
        assert!(text.contains("**Latest Price**: $130 on 2025-01-31"));
        // latest 130 vs previous day 129: +0.78%
        assert!(text.contains("**1 Day Change**: 🔺 0.78%"));
        assert!(text.contains("**1 Week Change**:"));
        assert!(text.contains("**1 Month Change**:"));
    }

    #[test]
    fn test_price_change_render_insufficient_history() {
        let text = PriceChangeTool::render("AAPL", gcusd_series(), STAMP);
        assert!(text.contains("*Insufficient historical data for price change calculations*"));
    }

    #[test]
    fn test_historical_entries_both_shapes() {
        let wrapped = json!({"symbol": "AAPL", "historical": [{"date": "2025-01-01", "close": 1.0}]});
        assert_eq!(historical_entries(&wrapped).len(), 1);

        let bare = json!([{"date": "2025-01-01", "price": 1.0}]);
        assert_eq!(historical_entries(&bare).len(), 1);

        assert!(historical_entries(&json!({"symbol": "AAPL"})).is_empty());
    }
}
