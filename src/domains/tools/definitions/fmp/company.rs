//! Company profile tool.
//!
//! Covers the Company Profile section of the Financial Modeling Prep API.

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

/// Parameters for the company profile tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CompanyProfileParams {
    /// The ticker to look up.
    #[schemars(description = "Stock ticker symbol (e.g., AAPL, MSFT, TSLA)")]
    pub symbol: String,
}

/// Company profile tool implementation.
#[derive(Debug, Clone)]
pub struct CompanyProfileTool;

impl CompanyProfileTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_company_profile";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Get a detailed company profile: sector, industry, CEO, \
         description, market cap, valuation metrics, and exchange information. \
         Returns a Markdown document.";

    /// Execute the tool logic.
    pub async fn execute(params: &CompanyProfileParams, client: &FmpClient) -> CallToolResult {
        let symbol = params.symbol.trim();
        if symbol.is_empty() {
            return error_result("Error: symbol parameter is required");
        }

        info!("Fetching company profile for {}", symbol);

        let data = match client.get("profile", &[("symbol", symbol.to_string())]).await {
            Ok(data) => data,
            Err(e) => return error_result(&format!("Error fetching profile for {symbol}: {e}")),
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!("Error fetching profile for {symbol}: {detail}"));
        }

        let Some(profiles) = records(&data) else {
            return no_data_result(&format!("No profile data found for symbol {symbol}"));
        };

        success_result(Self::render(&profiles[0], &now_stamp()))
    }

    /// Render one profile record as Markdown.
    fn render(profile: &Value, generated_at: &str) -> String {
        let lines = vec![
            format!(
                "# {} ({})",
                str_field(profile, "companyName"),
                str_field(profile, "symbol")
            ),
            format!("**Sector**: {}", str_field(profile, "sector")),
            format!("**Industry**: {}", str_field(profile, "industry")),
            format!("**CEO**: {}", str_field(profile, "ceo")),
            format!("**Description**: {}", str_field(profile, "description")),
            String::new(),
            "## Financial Overview".to_string(),
            format!("**Market Cap**: ${}", num_field(profile, "mktCap")),
            format!("**Price**: ${}", num_field(profile, "price")),
            format!("**Beta**: {}", num_field(profile, "beta")),
            format!("**Volume Average**: {}", num_field(profile, "volAvg")),
            format!("**DCF**: ${}", num_field(profile, "dcf")),
            String::new(),
            "## Key Metrics".to_string(),
            format!("**P/E Ratio**: {}", num_field(profile, "pe")),
            format!("**EPS**: ${}", num_field(profile, "eps")),
            format!("**ROE**: {}", num_field(profile, "roe")),
            format!("**ROA**: {}", num_field(profile, "roa")),
            format!(
                "**Revenue Per Share**: ${}",
                num_field(profile, "revenuePerShare")
            ),
            String::new(),
            "## Additional Information".to_string(),
            format!("**Website**: {}", str_field(profile, "website")),
            format!("**Exchange**: {}", str_field(profile, "exchange")),
            format!("**Founded**: {}", str_field(profile, "ipoDate")),
            String::new(),
            format!("*Data as of {generated_at}*"),
        ];

        lines.join("\n")
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: CompanyProfileParams =
            serde_json::from_value(arguments).map_err(|e| format!("Invalid parameters: {e}"))?;

        let result = Self::execute(&params, &client).await;

        Ok(serde_json::json!({
            "content": result.content,
            "isError": result.is_error.unwrap_or(false)
        }))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<CompanyProfileParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for STDIO/TCP transport.
    pub fn create_route<S>(client: Arc<FmpClient>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let client = client.clone();
            async move {
                let params: CompanyProfileParams =
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

    fn sample_profile() -> Value {
        json!({
            "symbol": "AAPL",
            "companyName": "Apple Inc.",
            "sector": "Technology",
            "industry": "Consumer Electronics",
            "ceo": "Tim Cook",
            "description": "Apple Inc. designs smartphones and personal computers.",
            "mktCap": 2840000000000i64,
            "price": 190.5,
            "beta": 1.28,
            "volAvg": 58000000,
            "dcf": 195.36,
            "pe": 31.25,
            "eps": 6.01,
            "website": "https://www.apple.com",
            "exchange": "NASDAQ",
            "ipoDate": "1980-12-12"
        })
    }

    #[test]
    fn test_render_profile() {
        let text = CompanyProfileTool::render(&sample_profile(), "2025-06-01 12:00:00");

        assert!(text.starts_with("# Apple Inc. (AAPL)"));
        assert!(text.contains("**Sector**: Technology"));
        assert!(text.contains("**Market Cap**: $2,840,000,000,000"));
        assert!(text.contains("**Price**: $190.5"));
        // Fields absent from the payload fall back to N/A
        assert!(text.contains("**ROE**: N/A"));
        assert!(text.contains("*Data as of 2025-06-01 12:00:00*"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let a = CompanyProfileTool::render(&sample_profile(), "2025-06-01 12:00:00");
        let b = CompanyProfileTool::render(&sample_profile(), "2025-06-01 12:00:00");
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_empty_symbol_fails_before_network() {
        let client = offline_client();
        let params = CompanyProfileParams {
            symbol: "  ".to_string(),
        };
        let result = CompanyProfileTool::execute(&params, &client).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("symbol parameter is required"));
    }
}
