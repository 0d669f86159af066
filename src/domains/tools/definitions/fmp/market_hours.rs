//! Market hours tools.
//!
//! Covers the Market Hours section of the Financial Modeling Prep API:
//! current exchange open/closed status and the holiday calendar.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
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
    error_result, no_data_result, now_stamp, records, str_field, success_result,
    upstream_error_detail,
};

// ============================================================================
// get_market_hours
// ============================================================================

/// Parameters for the market hours tool (none).
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct MarketHoursParams {}

/// Exchange open/closed status tool.
#[derive(Debug, Clone)]
pub struct MarketHoursTool;

impl MarketHoursTool {
    pub const NAME: &'static str = "get_market_hours";

    pub const DESCRIPTION: &'static str = "Get the current open/closed status and trading hours \
         for major stock exchanges. Returns Markdown.";

    pub async fn execute(_params: &MarketHoursParams, client: &FmpClient) -> CallToolResult {
        info!("Fetching market hours");

        let data = match client.get("market-hours", &[]).await {
            Ok(data) => data,
            Err(e) => return error_result(&format!("Error fetching market hours: {e}")),
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!("Error fetching market hours: {detail}"));
        }

        let Some(exchanges) = records(&data) else {
            return no_data_result("No market hours data found");
        };

        success_result(Self::render(exchanges, &now_stamp()))
    }

    fn render(exchanges: &[Value], generated_at: &str) -> String {
        let mut lines = vec![
            "# Market Hours Status".to_string(),
            format!("*Data as of {generated_at}*"),
            String::new(),
        ];

        // Split exchanges by open/closed status
        let mut open = Vec::new();
        let mut closed = Vec::new();
        for exchange in exchanges {
            let name = str_field(exchange, "stockExchangeName");
            let is_open = exchange
                .get("isTheStockMarketOpen")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            if is_open {
                open.push(name);
            } else {
                closed.push(name);
            }
        }

        for (marker, heading, names) in [
            ("🟢", "Open Markets", &mut open),
            ("🔴", "Closed Markets", &mut closed),
        ] {
            if names.is_empty() {
                continue;
            }
            names.sort();

            lines.push(format!("## {marker} {heading}"));
            lines.push(String::new());
            for name in names.iter() {
                lines.push(format!("- {name}"));
            }
            lines.push(String::new());
        }

        // Trading hours table, only for exchanges that report them
        let mut wrote_header = false;
        for exchange in exchanges {
            let opening = str_field(exchange, "openingHour");
            let closing = str_field(exchange, "closingHour");
            if opening == "N/A" || closing == "N/A" {
                continue;
            }

            if !wrote_header {
                lines.push("## Market Trading Hours".to_string());
                lines.push(String::new());
                lines.push("| Exchange | Opens | Closes | Timezone |".to_string());
                lines.push("|----------|-------|--------|----------|".to_string());
                wrote_header = true;
            }

            lines.push(format!(
                "| {} | {} | {} | {} |",
                str_field(exchange, "stockExchangeName"),
                opening,
                closing,
                str_field(exchange, "timezone"),
            ));
        }

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: MarketHoursParams =
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
            input_schema: cached_schema_for_type::<MarketHoursParams>(),
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
                let params: MarketHoursParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                Ok(Self::execute(&params, &client).await)
            }
            .boxed()
        })
    }
}

// ============================================================================
// get_market_holidays
// ============================================================================

fn default_exchange() -> String {
    "US".to_string()
}

/// Parameters for the market holidays tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MarketHolidaysParams {
    /// The exchange to list holidays for.
    #[schemars(description = "Exchange code (default: US)")]
    #[serde(default = "default_exchange")]
    pub exchange: String,
}

/// Market holiday calendar tool.
#[derive(Debug, Clone)]
pub struct MarketHolidaysTool;

impl MarketHolidaysTool {
    pub const NAME: &'static str = "get_market_holidays";

    pub const DESCRIPTION: &'static str =
        "Get the market holiday calendar for an exchange, grouped by year. Returns Markdown.";

    pub async fn execute(params: &MarketHolidaysParams, client: &FmpClient) -> CallToolResult {
        let exchange = params.exchange.trim();
        if exchange.is_empty() {
            return error_result("Error: exchange parameter is required");
        }

        info!("Fetching market holidays for {}", exchange);

        let data = match client
            .get("market-holidays", &[("exchange", exchange.to_string())])
            .await
        {
            Ok(data) => data,
            Err(e) => return error_result(&format!("Error fetching market holidays: {e}")),
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!("Error fetching market holidays: {detail}"));
        }

        let Some(holidays) = records(&data) else {
            return no_data_result(&format!(
                "No market holiday data found for exchange: {exchange}"
            ));
        };

        success_result(Self::render(exchange, holidays))
    }

    fn render(exchange: &str, holidays: &[Value]) -> String {
        let mut lines = vec![
            format!("# Market Holidays for {exchange} Exchange"),
            String::new(),
        ];

        // Group holidays by year, chronologically
        let mut by_year: BTreeMap<i32, Vec<(String, &Value)>> = BTreeMap::new();
        for holiday in holidays {
            let date_str = str_field(holiday, "date");
            let (year, formatted) = match NaiveDate::parse_from_str(&date_str, "%Y-%m-%d") {
                Ok(date) => (date.year(), date.format("%B %d, %Y").to_string()),
                Err(_) => (0, date_str.clone()),
            };
            by_year.entry(year).or_default().push((formatted, holiday));
        }

        for (year, entries) in &by_year {
            if *year > 0 {
                lines.push(format!("### {year} Holidays"));
            } else {
                lines.push("### Undated".to_string());
            }
            lines.push("| Date | Holiday | Status | Exchange |".to_string());
            lines.push("|------|---------|--------|----------|".to_string());

            for (date, holiday) in entries {
                let status = str_field(holiday, "status");
                let status_cell = match status.to_lowercase().as_str() {
                    "closed" => "🔴 Closed".to_string(),
                    "early close" | "early closing" => "🟠 Early Close".to_string(),
                    _ => status,
                };

                lines.push(format!(
                    "| {} | {} | {} | {} |",
                    date,
                    str_field(holiday, "name"),
                    status_cell,
                    str_field(holiday, "exchange"),
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
        let params: MarketHolidaysParams =
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
            input_schema: cached_schema_for_type::<MarketHolidaysParams>(),
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
                let params: MarketHolidaysParams =
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
    fn test_render_market_hours_groups_status() {
        let exchanges = vec![
            json!({"stockExchangeName": "NYSE", "isTheStockMarketOpen": true,
                   "openingHour": "09:30 AM", "closingHour": "04:00 PM",
                   "timezone": "America/New_York"}),
            json!({"stockExchangeName": "LSE", "isTheStockMarketOpen": false}),
            json!({"stockExchangeName": "ASX", "isTheStockMarketOpen": false}),
        ];

        let text = MarketHoursTool::render(&exchanges, STAMP);

        assert!(text.contains("## 🟢 Open Markets"));
        assert!(text.contains("- NYSE"));
        assert!(text.contains("## 🔴 Closed Markets"));
        // Closed exchanges listed alphabetically
        let asx = text.find("- ASX").unwrap();
        let lse = text.find("- LSE").unwrap();
        assert!(asx < lse);

        // Only NYSE reports hours, so the table has one row
        assert!(text.contains("## Market Trading Hours"));
        assert!(text.contains("| NYSE | 09:30 AM | 04:00 PM | America/New_York |"));
        assert!(!text.contains("| LSE |"));
    }

    #[test]
    fn test_render_holidays_grouped_by_year() {
        let holidays = vec![
            json!({"date": "2026-01-01", "name": "New Year's Day", "status": "closed",
                   "exchange": "NYSE"}),
            json!({"date": "2025-11-28", "name": "Day After Thanksgiving",
                   "status": "early close", "exchange": "NYSE"}),
            json!({"date": "2025-12-25", "name": "Christmas", "status": "closed",
                   "exchange": "NYSE"}),
        ];

        let text = MarketHolidaysTool::render("US", &holidays);

        assert!(text.starts_with("# Market Holidays for US Exchange"));
        let y2025 = text.find("### 2025 Holidays").unwrap();
        let y2026 = text.find("### 2026 Holidays").unwrap();
        assert!(y2025 < y2026);

        assert!(text.contains("| December 25, 2025 | Christmas | 🔴 Closed | NYSE |"));
        assert!(text.contains("| November 28, 2025 | Day After Thanksgiving | 🟠 Early Close | NYSE |"));
    }
}
