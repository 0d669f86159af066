//! Analyst tools.
//!
//! Covers the Analyst section of the Financial Modeling Prep API.

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
    error_result, no_data_result, now_stamp, num_field, records, str_field, success_result,
    upstream_error_detail,
};

/// Parameters for the ratings snapshot tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RatingsSnapshotParams {
    /// The ticker to look up.
    #[schemars(description = "Stock ticker symbol (e.g., AAPL, MSFT, TSLA)")]
    pub symbol: String,
}

/// Analyst ratings snapshot tool.
#[derive(Debug, Clone)]
pub struct RatingsSnapshotTool;

impl RatingsSnapshotTool {
    pub const NAME: &'static str = "get_ratings_snapshot";

    pub const DESCRIPTION: &'static str = "Get the current analyst ratings snapshot for a \
         company: overall rating, component scores, and consensus counts. Returns Markdown.";

    pub async fn execute(params: &RatingsSnapshotParams, client: &FmpClient) -> CallToolResult {
        let symbol = params.symbol.trim();
        if symbol.is_empty() {
            return error_result("Error: symbol parameter is required");
        }

        info!("Fetching ratings snapshot for {}", symbol);

        let data = match client
            .get("ratings-snapshot", &[("symbol", symbol.to_string())])
            .await
        {
            Ok(data) => data,
            Err(e) => return error_result(&format!("Error fetching ratings for {symbol}: {e}")),
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!("Error fetching ratings for {symbol}: {detail}"));
        }

        let Some(ratings) = records(&data) else {
            return no_data_result(&format!("No ratings data found for symbol {symbol}"));
        };

        success_result(Self::render(symbol, &ratings[0], &now_stamp()))
    }

    fn render(symbol: &str, ratings: &Value, generated_at: &str) -> String {
        let lines = vec![
            format!("# Analyst Ratings for {symbol}"),
            format!("*Data as of {generated_at}*"),
            String::new(),
            "## Rating Summary".to_string(),
            format!("**Rating Score**: {}", str_field(ratings, "rating")),
            format!(
                "**Recommendation**: {}",
                str_field(ratings, "ratingRecommendation")
            ),
            format!(
                "**DCF Score**: {}",
                num_field(ratings, "ratingDetailsDCFScore")
            ),
            format!(
                "**ROE Score**: {}",
                num_field(ratings, "ratingDetailsROEScore")
            ),
            format!(
                "**ROA Score**: {}",
                num_field(ratings, "ratingDetailsROAScore")
            ),
            format!(
                "**DE Score**: {}",
                num_field(ratings, "ratingDetailsDEScore")
            ),
            format!(
                "**P/E Score**: {}",
                num_field(ratings, "ratingDetailsPEScore")
            ),
            format!(
                "**PB Score**: {}",
                num_field(ratings, "ratingDetailsPBScore")
            ),
            String::new(),
            "## Consensus Ratings".to_string(),
            format!(
                "**Strong Buy**: {}",
                num_field(ratings, "ratingDetailsStrongBuy")
            ),
            format!("**Buy**: {}", num_field(ratings, "ratingDetailsBuy")),
            format!("**Hold**: {}", num_field(ratings, "ratingDetailsHold")),
            format!("**Sell**: {}", num_field(ratings, "ratingDetailsSell")),
            format!(
                "**Strong Sell**: {}",
                num_field(ratings, "ratingDetailsStrongSell")
            ),
        ];

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: RatingsSnapshotParams =
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
            input_schema: cached_schema_for_type::<RatingsSnapshotParams>(),
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
                let params: RatingsSnapshotParams =
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

    #[test]
    fn test_render_ratings() {
        let ratings = json!({
            "symbol": "AAPL",
            "rating": "A-",
            "ratingRecommendation": "Buy",
            "ratingDetailsDCFScore": 4,
            "ratingDetailsROEScore": 5,
            "ratingDetailsStrongBuy": 12,
            "ratingDetailsBuy": 20,
            "ratingDetailsHold": 8
        });

        let text = RatingsSnapshotTool::render("AAPL", &ratings, "2025-06-01 12:00:00");

        assert!(text.starts_with("# Analyst Ratings for AAPL"));
        assert!(text.contains("**Rating Score**: A-"));
        assert!(text.contains("**Recommendation**: Buy"));
        assert!(text.contains("**Strong Buy**: 12"));
        // Missing consensus counts render as N/A, not zero
        assert!(text.contains("**Sell**: N/A"));
    }
}
