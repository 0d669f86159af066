//! Market performers tools.
//!
//! Covers the biggest gainers, biggest losers, and most active sections of
//! the Financial Modeling Prep API. All three share a parameter shape and a
//! ranked-table rendering; only the endpoint and heading differ.

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
    change_marker, default_limit, error_result, f64_field, group_number, no_data_result,
    now_stamp, num_field, records, str_field, success_result, upstream_error_detail,
    validate_limit,
};

/// Parameters shared by the market performer tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MarketPerformersParams {
    /// Number of rows.
    #[schemars(description = "Number of stocks to return, 1-100 (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// Shared fetch-and-render path for the three performer tools.
async fn performers(
    client: &FmpClient,
    endpoint: &str,
    label: &str,
    heading: &str,
    limit: i64,
) -> CallToolResult {
    if let Err(msg) = validate_limit(limit, 1, 100) {
        return error_result(&msg);
    }

    info!("Fetching {}", label);

    let data = match client.get(endpoint, &[]).await {
        Ok(data) => data,
        Err(e) => return error_result(&format!("Error fetching {label}: {e}")),
    };

    if let Some(detail) = upstream_error_detail(&data) {
        return error_result(&format!("Error fetching {label}: {detail}"));
    }

    let Some(stocks) = records(&data) else {
        return no_data_result(&format!("No data found for {label}"));
    };

    success_result(render_table(heading, stocks, limit, &now_stamp()))
}

/// Ranked Markdown table of stocks, capped at `limit` rows.
fn render_table(heading: &str, stocks: &[Value], limit: i64, generated_at: &str) -> String {
    let mut lines = vec![
        format!("# Top {limit} {heading}"),
        format!("*Data as of {generated_at}*"),
        String::new(),
        "| Rank | Symbol | Company | Price | Change | Change % | Volume |".to_string(),
        "|------|--------|---------|-------|--------|----------|--------|".to_string(),
    ];

    for (rank, stock) in stocks.iter().take(limit as usize).enumerate() {
        let change = f64_field(stock, "change").unwrap_or(0.0);

        lines.push(format!(
            "| {} | {} | {} | ${} | {} ${} | {}% | {} |",
            rank + 1,
            str_field(stock, "symbol"),
            str_field(stock, "name"),
            num_field(stock, "price"),
            change_marker(change),
            group_number(change.abs()),
            num_field(stock, "changesPercentage"),
            num_field(stock, "volume"),
        ));
    }

    lines.join("\n")
}

/// Declare one performer tool struct; the three differ only in name,
/// endpoint, and heading text.
macro_rules! performer_tool {
    ($tool:ident, $name:literal, $endpoint:literal, $label:literal, $heading:literal, $description:literal) => {
        #[derive(Debug, Clone)]
        pub struct $tool;

        impl $tool {
            pub const NAME: &'static str = $name;

            pub const DESCRIPTION: &'static str = $description;

            pub async fn execute(
                params: &MarketPerformersParams,
                client: &FmpClient,
            ) -> CallToolResult {
                performers(client, $endpoint, $label, $heading, params.limit).await
            }

            #[cfg(feature = "http")]
            pub async fn http_handler(
                arguments: serde_json::Value,
                client: Arc<FmpClient>,
            ) -> Result<serde_json::Value, String> {
                let params: MarketPerformersParams = serde_json::from_value(arguments)
                    .map_err(|e| format!("Invalid parameters: {e}"))?;

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
                    input_schema: cached_schema_for_type::<MarketPerformersParams>(),
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
                        let params: MarketPerformersParams =
                            serde_json::from_value(serde_json::Value::Object(args))
                                .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                        Ok(Self::execute(&params, &client).await)
                    }
                    .boxed()
                })
            }
        }
    };
}

performer_tool!(
    BiggestGainersTool,
    "get_biggest_gainers",
    "biggest-gainers",
    "biggest gainers",
    "Biggest Gainers",
    "Get the stocks with the biggest percentage gains today. Returns a ranked Markdown table."
);

performer_tool!(
    BiggestLosersTool,
    "get_biggest_losers",
    "biggest-losers",
    "biggest losers",
    "Biggest Losers",
    "Get the stocks with the biggest percentage losses today. Returns a ranked Markdown table."
);

performer_tool!(
    MostActiveTool,
    "get_most_active",
    "most-actives",
    "most active stocks",
    "Most Active Stocks",
    "Get the most actively traded stocks by volume. Returns a ranked Markdown table."
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::fmp::common::{offline_client, result_text};
    use serde_json::json;

    const STAMP: &str = "2025-06-01 12:00:00";

    fn sample_stocks() -> Vec<Value> {
        vec![
            json!({"symbol": "NVDA", "name": "NVIDIA Corporation", "price": 950.02,
                   "change": 87.15, "changesPercentage": 10.1, "volume": 64000000}),
            json!({"symbol": "AMD", "name": "Advanced Micro Devices", "price": 160.5,
                   "change": -8.2, "changesPercentage": -4.86, "volume": 51000000}),
            json!({"symbol": "F", "name": "Ford Motor Company", "price": 12.1,
                   "change": 0.0, "changesPercentage": 0.0, "volume": 41000000}),
        ]
    }

    #[test]
    fn test_render_table_ranks_and_markers() {
        let text = render_table("Biggest Gainers", &sample_stocks(), 10, STAMP);

        assert!(text.starts_with("# Top 10 Biggest Gainers"));
        assert!(text.contains("| 1 | NVDA | NVIDIA Corporation | $950.02 | 🔺 $87.15 | 10.1% | 64,000,000 |"));
        assert!(text.contains("| 2 | AMD | Advanced Micro Devices | $160.5 | 🔻 $8.2 | -4.86% |"));
        // Exactly zero change is flat, not up or down
        assert!(text.contains("| 3 | F | Ford Motor Company | $12.1 | ➖ $0 | 0% |"));
    }

    #[test]
    fn test_render_table_caps_at_limit() {
        let text = render_table("Most Active Stocks", &sample_stocks(), 2, STAMP);
        assert!(text.contains("| 2 | AMD |"));
        assert!(!text.contains("| 3 | F |"));
    }

    #[test]
    fn test_params_default_limit() {
        let params: MarketPerformersParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.limit, 10);
    }

    #[tokio::test]
    async fn test_negative_limit_fails_before_network() {
        let client = offline_client();
        let params = MarketPerformersParams { limit: -1 };
        let result = BiggestGainersTool::execute(&params, &client).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("limit must be between 1 and 100"));
    }
}
