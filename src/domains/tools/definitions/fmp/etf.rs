//! ETF tools.
//!
//! Covers the ETF section of the Financial Modeling Prep API: sector
//! weightings, country weightings, and top holdings.

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
    default_limit, error_result, f64_field, no_data_result, now_stamp, num_field, records,
    str_field, success_result, upstream_error_detail, validate_limit,
};

/// Render a weighting, scaling fractional values (<= 1) to percent.
fn weight_cell(record: &Value, key: &str) -> String {
    match record.get(key) {
        Some(Value::Number(n)) => {
            let value = n.as_f64().unwrap_or(0.0);
            if value <= 1.0 {
                format!("{:.2}%", value * 100.0)
            } else {
                format!("{value}%")
            }
        }
        Some(Value::String(s)) => format!("{s}%"),
        _ => "N/A".to_string(),
    }
}

/// Parameters for the weighting tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EtfSymbolParams {
    /// The ETF to inspect.
    #[schemars(description = "ETF symbol (e.g., SPY, QQQ, VTI)")]
    pub symbol: String,
}

/// Shared fetch path for the two weighting tools.
async fn fetch_weightings(
    client: &FmpClient,
    endpoint: &str,
    kind: &str,
    symbol: &str,
) -> Result<Vec<Value>, CallToolResult> {
    info!("Fetching ETF {} weightings for {}", kind, symbol);

    let data = match client.get(endpoint, &[("symbol", symbol.to_string())]).await {
        Ok(data) => data,
        Err(e) => {
            return Err(error_result(&format!(
                "Error fetching ETF {kind} weightings for {symbol}: {e}"
            )));
        }
    };

    if let Some(detail) = upstream_error_detail(&data) {
        return Err(error_result(&format!(
            "Error fetching ETF {kind} weightings for {symbol}: {detail}"
        )));
    }

    match records(&data) {
        Some(items) => Ok(items.clone()),
        None => Err(no_data_result(&format!(
            "No {kind} weightings data found for ETF {symbol}"
        ))),
    }
}

// ============================================================================
// get_etf_sectors
// ============================================================================

/// ETF sector weightings tool.
#[derive(Debug, Clone)]
pub struct EtfSectorsTool;

impl EtfSectorsTool {
    pub const NAME: &'static str = "get_etf_sectors";

    pub const DESCRIPTION: &'static str =
        "Get the sector weightings for an ETF. Returns a Markdown table.";

    pub async fn execute(params: &EtfSymbolParams, client: &FmpClient) -> CallToolResult {
        let symbol = params.symbol.trim();
        if symbol.is_empty() {
            return error_result("Error: symbol parameter is required");
        }

        let sectors =
            match fetch_weightings(client, "etf-sector-weightings", "sector", symbol).await {
                Ok(items) => items,
                Err(result) => return result,
            };

        success_result(Self::render(symbol, &sectors, &now_stamp()))
    }

    fn render(symbol: &str, sectors: &[Value], generated_at: &str) -> String {
        let mut lines = vec![
            format!("# {symbol} ETF Sector Weightings"),
            format!("*Data as of {generated_at}*"),
            String::new(),
            "| Sector | Weight |".to_string(),
            "|--------|--------|".to_string(),
        ];

        for sector in sectors {
            lines.push(format!(
                "| {} | {} |",
                str_field(sector, "sector"),
                weight_cell(sector, "weightPercentage"),
            ));
        }

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: EtfSymbolParams =
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
            input_schema: cached_schema_for_type::<EtfSymbolParams>(),
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
                let params: EtfSymbolParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                Ok(Self::execute(&params, &client).await)
            }
            .boxed()
        })
    }
}

// ============================================================================
// get_etf_countries
// ============================================================================

/// ETF country weightings tool.
#[derive(Debug, Clone)]
pub struct EtfCountriesTool;

impl EtfCountriesTool {
    pub const NAME: &'static str = "get_etf_countries";

    pub const DESCRIPTION: &'static str =
        "Get the country weightings for an ETF. Returns a Markdown table.";

    pub async fn execute(params: &EtfSymbolParams, client: &FmpClient) -> CallToolResult {
        let symbol = params.symbol.trim();
        if symbol.is_empty() {
            return error_result("Error: symbol parameter is required");
        }

        let countries =
            match fetch_weightings(client, "etf-country-weightings", "country", symbol).await {
                Ok(items) => items,
                Err(result) => return result,
            };

        success_result(Self::render(symbol, &countries, &now_stamp()))
    }

    fn render(symbol: &str, countries: &[Value], generated_at: &str) -> String {
        let mut lines = vec![
            format!("# {symbol} ETF Country Weightings"),
            format!("*Data as of {generated_at}*"),
            String::new(),
            "| Country | Weight |".to_string(),
            "|---------|--------|".to_string(),
        ];

        for country in countries {
            lines.push(format!(
                "| {} | {} |",
                str_field(country, "country"),
                weight_cell(country, "weightPercentage"),
            ));
        }

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: EtfSymbolParams =
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
            input_schema: cached_schema_for_type::<EtfSymbolParams>(),
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
                let params: EtfSymbolParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                Ok(Self::execute(&params, &client).await)
            }
            .boxed()
        })
    }
}

// ============================================================================
// get_etf_holdings
// ============================================================================

/// Parameters for the ETF holdings tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EtfHoldingsParams {
    /// The ETF to inspect.
    #[schemars(description = "ETF symbol (e.g., SPY, QQQ, VTI)")]
    pub symbol: String,

    /// Number of holdings.
    #[schemars(description = "Number of holdings to return, 1-100 (default: 10)")]
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// ETF top holdings tool.
#[derive(Debug, Clone)]
pub struct EtfHoldingsTool;

impl EtfHoldingsTool {
    pub const NAME: &'static str = "get_etf_holdings";

    pub const DESCRIPTION: &'static str =
        "Get the top holdings of an ETF with weights, share counts, and market values. \
         Returns a ranked Markdown table.";

    pub async fn execute(params: &EtfHoldingsParams, client: &FmpClient) -> CallToolResult {
        let symbol = params.symbol.trim();
        if symbol.is_empty() {
            return error_result("Error: symbol parameter is required");
        }
        if let Err(msg) = validate_limit(params.limit, 1, 100) {
            return error_result(&msg);
        }

        info!("Fetching ETF holdings for {}", symbol);

        let data = match client
            .get("etf-holdings", &[("symbol", symbol.to_string())])
            .await
        {
            Ok(data) => data,
            Err(e) => {
                return error_result(&format!("Error fetching ETF holdings for {symbol}: {e}"));
            }
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!(
                "Error fetching ETF holdings for {symbol}: {detail}"
            ));
        }

        let Some(holdings) = records(&data) else {
            return no_data_result(&format!("No holdings data found for ETF {symbol}"));
        };

        success_result(Self::render(symbol, holdings, params.limit, &now_stamp()))
    }

    fn render(symbol: &str, holdings: &[Value], limit: i64, generated_at: &str) -> String {
        let mut lines = vec![
            format!("# {symbol} ETF Top {limit} Holdings"),
            format!("*Data as of {generated_at}*"),
            String::new(),
            "| Rank | Asset | Name | Weight | Shares | Market Value |".to_string(),
            "|------|-------|------|--------|--------|--------------|".to_string(),
        ];

        for (rank, holding) in holdings.iter().take(limit as usize).enumerate() {
            lines.push(format!(
                "| {} | {} | {} | {} | {} | ${} |",
                rank + 1,
                str_field(holding, "asset"),
                str_field(holding, "name"),
                weight_cell(holding, "weightPercentage"),
                num_field(holding, "shares"),
                num_field(holding, "marketValue"),
            ));
        }

        // Fund-level summary when the payload carries it
        if let Some(info) = holdings.first().and_then(|h| h.get("etfInfo")) {
            lines.push(String::new());
            lines.push("## ETF Information".to_string());
            lines.push(format!("**Name**: {}", str_field(info, "etfName")));
            lines.push(format!("**Asset Class**: {}", str_field(info, "assetClass")));
            lines.push(format!("**AUM**: ${}", num_field(info, "aum")));

            let expense_ratio = match f64_field(info, "expenseRatio") {
                Some(ratio) if ratio <= 1.0 => format!("{:.2}%", ratio * 100.0),
                Some(ratio) => format!("{ratio}"),
                None => "N/A".to_string(),
            };
            lines.push(format!("**Expense Ratio**: {expense_ratio}"));
        }

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: EtfHoldingsParams =
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
            input_schema: cached_schema_for_type::<EtfHoldingsParams>(),
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
                let params: EtfHoldingsParams =
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

    #[test]
    fn test_weight_cell_scales_fractions() {
        assert_eq!(weight_cell(&json!({"w": 0.2815}), "w"), "28.15%");
        assert_eq!(weight_cell(&json!({"w": 28.15}), "w"), "28.15%");
        assert_eq!(weight_cell(&json!({}), "w"), "N/A");
    }

    #[test]
    fn test_render_sectors() {
        let sectors = vec![
            json!({"sector": "Technology", "weightPercentage": 0.3121}),
            json!({"sector": "Financials", "weightPercentage": 0.1302}),
        ];

        let text = EtfSectorsTool::render("SPY", &sectors, STAMP);
        assert!(text.starts_with("# SPY ETF Sector Weightings"));
        assert!(text.contains("| Technology | 31.21% |"));
        assert!(text.contains("| Financials | 13.02% |"));
    }

    #[test]
    fn test_render_holdings_with_fund_info() {
        let holdings = vec![json!({
            "asset": "AAPL",
            "name": "Apple Inc.",
            "weightPercentage": 0.071,
            "shares": 169000000,
            "marketValue": 32000000000i64,
            "etfInfo": {
                "etfName": "SPDR S&P 500 ETF Trust",
                "assetClass": "Equity",
                "aum": 500000000000i64,
                "expenseRatio": 0.0009
            }
        })];

        let text = EtfHoldingsTool::render("SPY", &holdings, 10, STAMP);
        assert!(text.contains("| 1 | AAPL | Apple Inc. | 7.10% | 169,000,000 | $32,000,000,000 |"));
        assert!(text.contains("**Name**: SPDR S&P 500 ETF Trust"));
        assert!(text.contains("**Expense Ratio**: 0.09%"));
    }

    #[tokio::test]
    async fn test_holdings_limit_validation_before_network() {
        let client = offline_client();
        let params = EtfHoldingsParams {
            symbol: "SPY".to_string(),
            limit: 101,
        };
        let result = EtfHoldingsTool::execute(&params, &client).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("limit must be between 1 and 100"));
    }
}
