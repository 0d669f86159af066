//! Commodities tools.
//!
//! Covers the Commodities section of the Financial Modeling Prep API:
//! the commodity catalog and current prices, grouped by commodity family.

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

const METALS: &[&str] = &["gold", "silver", "platinum", "palladium", "copper"];
const ENERGY: &[&str] = &["oil", "gas", "gasoline", "diesel", "propane", "ethanol"];
const AGRICULTURAL: &[&str] = &[
    "corn", "wheat", "soybean", "sugar", "coffee", "cotton", "rice",
];

/// Group display order.
const GROUPS: &[&str] = &["Energy", "Metals", "Agricultural", "Other"];

/// Classify a commodity into a family by its name.
fn commodity_group(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    if METALS.iter().any(|m| lower.contains(m)) {
        "Metals"
    } else if ENERGY.iter().any(|e| lower.contains(e)) {
        "Energy"
    } else if AGRICULTURAL.iter().any(|a| lower.contains(a)) {
        "Agricultural"
    } else {
        "Other"
    }
}

// ============================================================================
// get_commodities_list
// ============================================================================

/// Parameters for the commodities list tool (none).
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CommoditiesListParams {}

/// Commodity catalog tool.
#[derive(Debug, Clone)]
pub struct CommoditiesListTool;

impl CommoditiesListTool {
    pub const NAME: &'static str = "get_commodities_list";

    pub const DESCRIPTION: &'static str = "Get the list of available commodities with their \
         symbols, currencies, and families (metals, energy, agricultural). \
         Returns a Markdown table.";

    pub async fn execute(_params: &CommoditiesListParams, client: &FmpClient) -> CallToolResult {
        info!("Fetching commodities list");

        let data = match client.get("commodities-list", &[]).await {
            Ok(data) => data,
            Err(e) => return error_result(&format!("Error fetching commodities list: {e}")),
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!("Error fetching commodities list: {detail}"));
        }

        let Some(commodities) = records(&data) else {
            return no_data_result("No commodities data found");
        };

        success_result(Self::render(commodities, &now_stamp()))
    }

    fn render(commodities: &[Value], generated_at: &str) -> String {
        let mut lines = vec![
            "# Available Commodities".to_string(),
            format!("*Data as of {generated_at}*"),
            String::new(),
            "| Symbol | Name | Currency | Group |".to_string(),
            "|--------|------|----------|-------|".to_string(),
        ];

        for commodity in commodities {
            let name = str_field(commodity, "name");
            let currency = commodity
                .get("currency")
                .and_then(|v| v.as_str())
                .unwrap_or("USD");

            lines.push(format!(
                "| {} | {} | {} | {} |",
                str_field(commodity, "symbol"),
                name,
                currency,
                commodity_group(&name),
            ));
        }

        lines.push(String::new());
        lines.push(
            "*Note: Use these symbols with the get_commodities_prices tool to get current values.*"
                .to_string(),
        );

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: CommoditiesListParams =
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
            input_schema: cached_schema_for_type::<CommoditiesListParams>(),
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
                let params: CommoditiesListParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

                Ok(Self::execute(&params, &client).await)
            }
            .boxed()
        })
    }
}

// ============================================================================
// get_commodities_prices
// ============================================================================

/// Parameters for the commodities prices tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CommoditiesPricesParams {
    /// Restrict to specific symbols.
    #[schemars(
        description = "Comma-separated commodity symbols (e.g., \"GCUSD,OUSX\"); \
                       all commodities when omitted"
    )]
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Commodity prices tool.
#[derive(Debug, Clone)]
pub struct CommoditiesPricesTool;

impl CommoditiesPricesTool {
    pub const NAME: &'static str = "get_commodities_prices";

    pub const DESCRIPTION: &'static str = "Get current prices for commodities, grouped by family \
         (energy, metals, agricultural). Returns Markdown tables with change markers.";

    pub async fn execute(params: &CommoditiesPricesParams, client: &FmpClient) -> CallToolResult {
        let symbol = params
            .symbol
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        info!(
            "Fetching commodities prices for {}",
            symbol.unwrap_or("all")
        );

        let query: Vec<(&str, String)> = match symbol {
            Some(symbol) => vec![("symbol", symbol.to_string())],
            None => Vec::new(),
        };

        let data = match client.get("quote", &query).await {
            Ok(data) => data,
            Err(e) => return error_result(&format!("Error fetching commodities prices: {e}")),
        };

        if let Some(detail) = upstream_error_detail(&data) {
            return error_result(&format!("Error fetching commodities prices: {detail}"));
        }

        let Some(commodities) = records(&data) else {
            return no_data_result(&format!(
                "No price data found for commodities: {}",
                symbol.unwrap_or("all")
            ));
        };

        success_result(Self::render(commodities, &now_stamp()))
    }

    fn render(commodities: &[Value], generated_at: &str) -> String {
        let mut lines = vec![
            "# Commodities Prices".to_string(),
            format!("*Data as of {generated_at}*"),
            String::new(),
            "| Symbol | Name | Price | Change | Change % | Day Range | Year Range |".to_string(),
            "|--------|------|-------|--------|----------|-----------|------------|".to_string(),
        ];

        // Group rows by commodity family, rendered in a fixed order
        let mut by_group: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        for commodity in commodities {
            let name = str_field(commodity, "name");
            let change = f64_field(commodity, "change").unwrap_or(0.0);

            let row = format!(
                "| {} | {} | {} | {} {} | {}% | {} - {} | {} - {} |",
                str_field(commodity, "symbol"),
                name,
                num_field(commodity, "price"),
                change_marker(change),
                group_number(change.abs()),
                num_field(commodity, "changesPercentage"),
                num_field(commodity, "dayLow"),
                num_field(commodity, "dayHigh"),
                num_field(commodity, "yearLow"),
                num_field(commodity, "yearHigh"),
            );

            by_group.entry(commodity_group(&name)).or_default().push(row);
        }

        for group in GROUPS {
            if let Some(rows) = by_group.get(group) {
                lines.push(format!("### {group}"));
                lines.extend(rows.iter().cloned());
                lines.push(String::new());
            }
        }

        lines.join("\n")
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        client: Arc<FmpClient>,
    ) -> Result<serde_json::Value, String> {
        let params: CommoditiesPricesParams =
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
            input_schema: cached_schema_for_type::<CommoditiesPricesParams>(),
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
                let params: CommoditiesPricesParams =
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
    fn test_commodity_group_classification() {
        assert_eq!(commodity_group("Gold"), "Metals");
        assert_eq!(commodity_group("Brent Crude Oil"), "Energy");
        assert_eq!(commodity_group("Soybean Meal"), "Agricultural");
        assert_eq!(commodity_group("Lumber"), "Other");
    }

    #[test]
    fn test_render_list() {
        let commodities = vec![
            json!({"symbol": "GCUSD", "name": "Gold", "currency": "USD"}),
            json!({"symbol": "OUSX", "name": "Crude Oil WTI"}),
        ];

        let text = CommoditiesListTool::render(&commodities, STAMP);
        assert!(text.starts_with("# Available Commodities"));
        assert!(text.contains("| GCUSD | Gold | USD | Metals |"));
        // Missing currency defaults to USD
        assert!(text.contains("| OUSX | Crude Oil WTI | USD | Energy |"));
    }

    #[test]
    fn test_render_prices_grouped() {
        let commodities = vec![
            json!({"symbol": "GCUSD", "name": "Gold", "price": 2362.45, "change": 24.75,
                   "changesPercentage": 1.06, "dayLow": 2335.25, "dayHigh": 2365.80,
                   "yearLow": 1825.30, "yearHigh": 2400.15}),
            json!({"symbol": "BUSD", "name": "Brent Crude Oil", "price": 82.4,
                   "change": -1.3, "changesPercentage": -1.55, "dayLow": 81.9,
                   "dayHigh": 84.0, "yearLow": 70.1, "yearHigh": 95.2}),
        ];

        let text = CommoditiesPricesTool::render(&commodities, STAMP);

        assert!(text.starts_with("# Commodities Prices"));
        assert!(text.contains(
            "| GCUSD | Gold | 2,362.45 | 🔺 24.75 | 1.06% | 2,335.25 - 2,365.8 | 1,825.3 - 2,400.15 |"
        ));
        assert!(text.contains("| BUSD | Brent Crude Oil | 82.4 | 🔻 1.3 | -1.55% |"));

        // Energy family renders before Metals
        let energy = text.find("### Energy").unwrap();
        let metals = text.find("### Metals").unwrap();
        assert!(energy < metals);
    }
}
