//! Calendar tools.
//!
//! Covers the Calendar section of the Financial Modeling Prep API:
//! per-company dividend history and the market-wide dividends calendar.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};
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
    default_limit, error_result, f64_field, no_data_result, now_stamp, records, str_field,
    success_result, upstream_error_detail, validate_date, validate_limit,
};

/// Render a dividend amount with four decimal places, or N/A.
fn dividend_cell(record: &Value, key: &str) -> String {
    match f64_field(record, key) {
        Some(amount) => format!("${amount:.4}"),
        None => "N/A".to_string(),
    }
}

// ============================================================================
// get_company_dividends
// ============================================================================

/// Parameters for the company dividend history tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CompanyDividendsParams {
    /// The ticker to look up.
    #[schemars(description = "Stock ticker symbol (e.g., AAPL, MSFT, JNJ)")]
    pub symbol: String,

    /// Number of dividend records.
    #[schemars(description = "Number of dividend records to return, 1-1000 (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// Company dividend history tool.
#[derive(Debug, Clone)]
pub struct CompanyDividendsTool;

impl CompanyDividendsTool {
    pub const NAME: &'static str = "get_company_dividends";

    pub const DESCRIPTION: &'static str = "Get the dividend payment history for a company, with \
         an estimated annual dividend and payout frequency. Returns a Markdown table.";

    pub async fn execute(params: &CompanyDividendsParams, client: &FmpClient) -> CallToolResult {
        let symbol = params.symbol.trim();
        if symbol.is_empty() {
            return error_result("Error: symbol parameter is required");
        }
        if let Err(msg) = validate_limit(params.limit, 1, 1000) {
            return error_result(&msg);
        }

        info!("Fetching dividend history for {}", symbol);

        let query = [
            ("symbol", symbol.to_string()),
            ("limit", params.limit.to_string()),
        ];
        let data = match client.get("dividends", &query).await {
            Ok(data) => data,
            Err(e) => {
                return error_result(&format!("Error fetching dividend data for {symbol}: {e}"));
            }
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!(
                "Error fetching dividend data for {symbol}: {detail}"
            ));
        }

        let Some(dividends) = records(&data) else {
            return no_data_result(&format!("No dividend data found for symbol {symbol}"));
        };

        success_result(Self::render(symbol, dividends, &now_stamp()))
    }

    fn render(symbol: &str, dividends: &[Value], generated_at: &str) -> String {
        let mut lines = vec![
            format!("# Dividend History for {symbol}"),
            format!("*Data as of {generated_at}*"),
            String::new(),
        ];

        // Headline metrics from the most recent payments
        if dividends.len() >= 4 {
            let annual: f64 = dividends
                .iter()
                .take(4)
                .filter_map(|d| f64_field(d, "dividend"))
                .sum();
            if annual > 0.0 {
                lines.push(format!("**Estimated Annual Dividend**: ${annual:.4}"));
            }
        }
        if let Some(frequency) = Self::payout_frequency(dividends) {
            lines.push(format!("**Dividend Frequency**: {frequency}"));
        }
        if lines.len() > 3 {
            lines.push(String::new());
        }

        lines.push("## Dividend History".to_string());
        lines.push(
            "| Date | Dividend | Adjusted Dividend | Record Date | Payment Date | Declaration Date |"
                .to_string(),
        );
        lines.push(
            "|------|----------|-------------------|-------------|--------------|------------------|"
                .to_string(),
        );

        for div in dividends {
            lines.push(format!(
                "| {} | {} | {} | {} | {} | {} |",
                str_field(div, "date"),
                dividend_cell(div, "dividend"),
                dividend_cell(div, "adjDividend"),
                str_field(div, "recordDate"),
                str_field(div, "paymentDate"),
                str_field(div, "declarationDate"),
            ));
        }

        lines.join("\n")
    }

    /// Classify the payout cadence from the average gap between ex-dates.
    fn payout_frequency(dividends: &[Value]) -> Option<String> {
        let dates: Vec<NaiveDate> = dividends
            .iter()
            .filter_map(|d| d.get("date").and_then(|v| v.as_str()))
            .filter_map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .collect();
        if dates.len() < 2 {
            return None;
        }

        let total_days: i64 = dates
            .windows(2)
            .map(|pair| (pair[0] - pair[1]).num_days().abs())
            .sum();
        let avg = total_days / (dates.len() as i64 - 1);

        let frequency = match avg {
            25..=35 => "Monthly".to_string(),
            80..=100 => "Quarterly".to_string(),
            170..=190 => "Semi-annually".to_string(),
            350..=380 => "Annually".to_string(),
            days => format!("Approximately every {days} days"),
        };
        Some(frequency)
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: CompanyDividendsParams =
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
            input_schema: cached_schema_for_type::<CompanyDividendsParams>(),
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
                let params: CompanyDividendsParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                Ok(Self::execute(&params, &client).await)
            }
            .boxed()
        })
    }
}

// ============================================================================
// get_dividends_calendar
// ============================================================================

fn default_calendar_limit() -> i64 {
    50
}

/// Parameters for the dividends calendar tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DividendsCalendarParams {
    /// Start of the window.
    #[schemars(description = "Start date in YYYY-MM-DD format (default: today)")]
    #[serde(default)]
    pub from_date: Option<String>,

    /// End of the window.
    #[schemars(description = "End date in YYYY-MM-DD format (default: 30 days out; max range 90 days)")]
    #[serde(default)]
    pub to_date: Option<String>,

    /// Number of events.
    #[schemars(description = "Number of events to return, 1-3000 (default: 50)")]
    #[serde(default = "default_calendar_limit")]
    pub limit: i64,
}

/// Market-wide dividends calendar tool.
#[derive(Debug, Clone)]
pub struct DividendsCalendarTool;

impl DividendsCalendarTool {
    pub const NAME: &'static str = "get_dividends_calendar";

    pub const DESCRIPTION: &'static str = "Get upcoming dividend events across the market for a \
         date window (at most 90 days). Returns Markdown tables grouped by date.";

    pub async fn execute(params: &DividendsCalendarParams, client: &FmpClient) -> CallToolResult {
        if let Err(msg) = validate_limit(params.limit, 1, 3000) {
            return error_result(&msg);
        }

        // Default to a 30-day window starting today
        let today = Local::now().date_naive();
        let from_date = match params.from_date.as_deref() {
            Some(value) => match validate_date("from_date", value) {
                Ok(date) => date,
                Err(msg) => return error_result(&msg),
            },
            None => today,
        };
        let to_date = match params.to_date.as_deref() {
            Some(value) => match validate_date("to_date", value) {
                Ok(date) => date,
                Err(msg) => return error_result(&msg),
            },
            None => today + Duration::days(30),
        };

        let span = (to_date - from_date).num_days();
        if span < 0 {
            return error_result("Error: 'to_date' must be after 'from_date'");
        }
        if span > 90 {
            return error_result("Error: Maximum date range is 90 days");
        }

        let from = from_date.format("%Y-%m-%d").to_string();
        let to = to_date.format("%Y-%m-%d").to_string();

        info!("Fetching dividends calendar {} to {}", from, to);

        let query = [
            ("from", from.clone()),
            ("to", to.clone()),
            ("limit", params.limit.to_string()),
        ];
        let data = match client.get("dividends-calendar", &query).await {
            Ok(data) => data,
            Err(e) => return error_result(&format!("Error fetching dividends calendar: {e}")),
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!("Error fetching dividends calendar: {detail}"));
        }

        let Some(events) = records(&data) else {
            return no_data_result(&format!("No dividend events found between {from} and {to}"));
        };

        success_result(Self::render(&from, &to, events, params.limit, &now_stamp()))
    }

    fn render(from: &str, to: &str, events: &[Value], limit: i64, generated_at: &str) -> String {
        let shown = events.len().min(limit as usize);

        let mut lines = vec![
            format!("# Dividend Calendar: {from} to {to}"),
            format!("*Data as of {generated_at}*"),
            format!("*Showing {shown} dividend events*"),
            String::new(),
        ];

        // Group events by ex-date, chronologically
        let mut by_date: BTreeMap<String, Vec<&Value>> = BTreeMap::new();
        for event in events.iter().take(shown) {
            by_date
                .entry(str_field(event, "date"))
                .or_default()
                .push(event);
        }

        for (date, day_events) in &by_date {
            lines.push(format!("## {date}"));
            lines.push(
                "| Symbol | Company | Dividend | Yield | Payment Date | Record Date |".to_string(),
            );
            lines.push(
                "|--------|---------|----------|-------|--------------|-------------|".to_string(),
            );

            for event in day_events {
                let yield_cell = match f64_field(event, "yield") {
                    Some(value) => format!("{value:.2}%"),
                    None => "N/A".to_string(),
                };

                lines.push(format!(
                    "| {} | {} | {} | {} | {} | {} |",
                    str_field(event, "symbol"),
                    str_field(event, "name"),
                    dividend_cell(event, "dividend"),
                    yield_cell,
                    str_field(event, "paymentDate"),
                    str_field(event, "recordDate"),
                ));
            }

            lines.push(String::new());
        }

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: DividendsCalendarParams =
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
            input_schema: cached_schema_for_type::<DividendsCalendarParams>(),
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
                let params: DividendsCalendarParams =
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

    fn quarterly_dividends() -> Vec<Value> {
        vec![
            json!({"date": "2025-05-09", "dividend": 0.25, "adjDividend": 0.25,
                   "recordDate": "2025-05-12", "paymentDate": "2025-05-15",
                   "declarationDate": "2025-05-01"}),
            json!({"date": "2025-02-07", "dividend": 0.25, "adjDividend": 0.25}),
            json!({"date": "2024-11-08", "dividend": 0.24, "adjDividend": 0.24}),
            json!({"date": "2024-08-09", "dividend": 0.24, "adjDividend": 0.24}),
        ]
    }

    #[test]
    fn test_render_dividend_history() {
        let dividends = quarterly_dividends();
        let text = CompanyDividendsTool::render("AAPL", &dividends, STAMP);

        assert!(text.starts_with("# Dividend History for AAPL"));
        assert!(text.contains("**Estimated Annual Dividend**: $0.9800"));
        assert!(text.contains("**Dividend Frequency**: Quarterly"));
        assert!(text.contains("| 2025-05-09 | $0.2500 | $0.2500 | 2025-05-12 | 2025-05-15 | 2025-05-01 |"));
        // Missing optional dates fall back to N/A
        assert!(text.contains("| 2025-02-07 | $0.2500 | $0.2500 | N/A | N/A | N/A |"));
    }

    #[test]
    fn test_payout_frequency_needs_two_dates() {
        let single = vec![json!({"date": "2025-05-09", "dividend": 0.25})];
        assert!(CompanyDividendsTool::payout_frequency(&single).is_none());
    }

    #[test]
    fn test_render_calendar_groups_by_date() {
        let events = vec![
            json!({"date": "2025-06-10", "symbol": "AAPL", "name": "Apple Inc.",
                   "dividend": 0.25, "yield": 0.55, "paymentDate": "2025-06-20",
                   "recordDate": "2025-06-12"}),
            json!({"date": "2025-06-09", "symbol": "JNJ", "name": "Johnson & Johnson",
                   "dividend": 1.24, "yield": 3.12}),
            json!({"date": "2025-06-10", "symbol": "MSFT", "name": "Microsoft",
                   "dividend": 0.75, "yield": 0.80}),
        ];

        let text =
            DividendsCalendarTool::render("2025-06-01", "2025-06-30", &events, 50, STAMP);

        assert!(text.starts_with("# Dividend Calendar: 2025-06-01 to 2025-06-30"));
        assert!(text.contains("*Showing 3 dividend events*"));

        // Dates appear chronologically, each with its own section
        let june9 = text.find("## 2025-06-09").unwrap();
        let june10 = text.find("## 2025-06-10").unwrap();
        assert!(june9 < june10);

        assert!(text.contains("| AAPL | Apple Inc. | $0.2500 | 0.55% | 2025-06-20 | 2025-06-12 |"));
        assert!(text.contains("| JNJ | Johnson & Johnson | $1.2400 | 3.12% | N/A | N/A |"));
    }

    #[tokio::test]
    async fn test_dividends_zero_limit_fails_before_network() {
        let client = offline_client();
        let params = CompanyDividendsParams {
            symbol: "AAPL".to_string(),
            limit: 0,
        };
        let result = CompanyDividendsTool::execute(&params, &client).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("limit must be between 1 and 1000"));
    }

    #[tokio::test]
    async fn test_calendar_range_too_wide_fails_before_network() {
        let client = offline_client();
        let params = DividendsCalendarParams {
            from_date: Some("2025-01-01".to_string()),
            to_date: Some("2025-06-01".to_string()),
            limit: 50,
        };
        let result = DividendsCalendarTool::execute(&params, &client).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("Maximum date range is 90 days"));
    }
}
