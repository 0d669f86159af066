//! Resource service implementation.
//!
//! The ResourceService resolves resource URIs to JSON documents fetched live
//! through the FMP gateway. Upstream failures resolve to a JSON body with an
//! `error` key rather than a protocol fault, mirroring the tool layer's
//! errors-as-text convention; only an unknown URI is a hard error.

use std::sync::Arc;

use rmcp::model::{ReadResourceResult, Resource, ResourceContents, ResourceTemplate};
use serde_json::{Value, json};
use tracing::info;

use super::error::ResourceError;
use super::registry::{
    MARKET_SNAPSHOT_URI, STOCK_INFO_PREFIX, get_all_resource_templates, get_all_resources,
};
use crate::core::{FmpClient, GatewayError};

/// Major indexes included in the market snapshot.
const SNAPSHOT_INDEXES: [(&str, &str); 3] = [
    ("^GSPC", "S&P 500"),
    ("^DJI", "Dow Jones"),
    ("^IXIC", "NASDAQ"),
];

/// Sector ETFs included in the market snapshot.
const SNAPSHOT_SECTORS: [(&str, &str); 10] = [
    ("XLF", "Financials"),
    ("XLK", "Technology"),
    ("XLV", "Healthcare"),
    ("XLE", "Energy"),
    ("XLU", "Utilities"),
    ("XLI", "Industrials"),
    ("XLP", "Consumer Staples"),
    ("XLY", "Consumer Discretionary"),
    ("XLB", "Materials"),
    ("XLRE", "Real Estate"),
];

/// First record of an array payload, if any.
fn first_record(data: &Value) -> Option<&Value> {
    data.as_array().and_then(|items| items.first())
}

/// Field passthrough with an `"N/A"` JSON string fallback.
fn field_or_na(record: &Value, key: &str) -> Value {
    record.get(key).cloned().unwrap_or_else(|| json!("N/A"))
}

/// Merge a profile record and a quote record into the stock-info document.
fn build_stock_info(symbol: &str, profile: &Value, quote: &Value) -> Value {
    json!({
        "symbol": symbol,
        "name": profile.get("companyName").cloned().unwrap_or_else(|| json!("Unknown")),
        "sector": field_or_na(profile, "sector"),
        "industry": field_or_na(profile, "industry"),
        "price": field_or_na(quote, "price"),
        "change": field_or_na(quote, "change"),
        "changePercent": field_or_na(quote, "changesPercentage"),
        "marketCap": field_or_na(profile, "mktCap"),
        "website": field_or_na(profile, "website"),
        "description": field_or_na(profile, "description"),
    })
}

/// Assemble the market snapshot from two quote payloads.
///
/// Records whose symbol is not in the respective catalog are dropped, so a
/// partially recognized payload still yields a usable document.
fn build_market_snapshot(index_data: &Value, sector_data: &Value, timestamp: &str) -> Value {
    let pick = |data: &Value, catalog: &[(&str, &str)], price_key: &str| -> Vec<Value> {
        let Some(items) = data.as_array() else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|record| {
                let symbol = record.get("symbol")?.as_str()?;
                let (_, name) = catalog.iter().find(|(s, _)| *s == symbol)?;
                Some(json!({
                    "name": name,
                    price_key: record.get("price").cloned().unwrap_or(json!(0)),
                    "change": record.get("change").cloned().unwrap_or(json!(0)),
                    "changePercent": record.get("changesPercentage").cloned().unwrap_or(json!(0)),
                }))
            })
            .collect()
    };

    json!({
        "timestamp": timestamp,
        "indexes": pick(index_data, &SNAPSHOT_INDEXES, "value"),
        "sectors": pick(sector_data, &SNAPSHOT_SECTORS, "price"),
    })
}

/// Service for managing and accessing resources.
pub struct ResourceService {
    /// Shared gateway client for the FMP API.
    client: Arc<FmpClient>,
}

impl ResourceService {
    /// Create a new ResourceService sharing the given gateway client.
    pub fn new(client: Arc<FmpClient>) -> Self {
        info!("Initializing ResourceService");
        Self { client }
    }

    /// List all available static resources.
    pub async fn list_resources(&self) -> Vec<Resource> {
        get_all_resources()
    }

    /// List all available resource templates.
    pub async fn list_resource_templates(&self) -> Vec<ResourceTemplate> {
        get_all_resource_templates()
    }

    /// Read a resource by URI.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ResourceError> {
        let text = if uri == MARKET_SNAPSHOT_URI {
            self.market_snapshot().await?
        } else if let Some(symbol) = uri.strip_prefix(STOCK_INFO_PREFIX) {
            let symbol = symbol.trim();
            if symbol.is_empty() {
                return Err(ResourceError::invalid_uri(uri));
            }
            self.stock_info(symbol).await?
        } else {
            return Err(ResourceError::not_found(uri));
        };

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }

    /// Fetch and merge profile and quote data for one symbol.
    async fn stock_info(&self, symbol: &str) -> Result<String, ResourceError> {
        let query = [("symbol", symbol.to_string())];

        let profile_data = match self.client.get("profile", &query).await {
            Ok(data) => data,
            Err(e) => return error_document(&e),
        };
        let Some(profile) = first_record(&profile_data) else {
            return pretty(&json!({
                "error": format!("No profile data found for symbol {symbol}")
            }));
        };

        let quote_data = match self.client.get("quote", &query).await {
            Ok(data) => data,
            Err(e) => return error_document(&e),
        };
        let Some(quote) = first_record(&quote_data) else {
            return pretty(&json!({
                "error": format!("No quote data found for symbol {symbol}")
            }));
        };

        pretty(&build_stock_info(symbol, profile, quote))
    }

    /// Fetch index and sector quotes and assemble the snapshot document.
    async fn market_snapshot(&self) -> Result<String, ResourceError> {
        let index_symbols = SNAPSHOT_INDEXES.map(|(s, _)| s).join(",");
        let index_data = match self.client.get("quote", &[("symbol", index_symbols)]).await {
            Ok(data) => data,
            Err(e) => return error_document(&e),
        };

        let sector_symbols = SNAPSHOT_SECTORS.map(|(s, _)| s).join(",");
        let sector_data = match self.client.get("quote", &[("symbol", sector_symbols)]).await {
            Ok(data) => data,
            Err(e) => return error_document(&e),
        };

        let timestamp = chrono::Local::now().to_rfc3339();
        pretty(&build_market_snapshot(&index_data, &sector_data, &timestamp))
    }
}

/// Render a gateway failure as a JSON error document.
fn error_document(e: &GatewayError) -> Result<String, ResourceError> {
    pretty(&json!({ "error": format!("Error fetching data: {e}") }))
}

/// Pretty-print a JSON document.
fn pretty(value: &Value) -> Result<String, ResourceError> {
    serde_json::to_string_pretty(value).map_err(|e| ResourceError::internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::fmp::common::offline_client;

    fn test_service() -> ResourceService {
        ResourceService::new(Arc::new(offline_client()))
    }

    #[test]
    fn test_build_stock_info_merges_fields() {
        let profile = json!({
            "companyName": "Apple Inc.",
            "sector": "Technology",
            "industry": "Consumer Electronics",
            "mktCap": 2840000000000i64,
            "website": "https://www.apple.com",
            "description": "Designs smartphones."
        });
        let quote = json!({
            "price": 190.5,
            "change": -1.2,
            "changesPercentage": -0.63
        });

        let info = build_stock_info("AAPL", &profile, &quote);
        assert_eq!(info["symbol"], "AAPL");
        assert_eq!(info["name"], "Apple Inc.");
        assert_eq!(info["price"], 190.5);
        assert_eq!(info["changePercent"], -0.63);
        assert_eq!(info["marketCap"], 2840000000000i64);
    }

    #[test]
    fn test_build_stock_info_missing_fields_fall_back() {
        let info = build_stock_info("XYZ", &json!({}), &json!({}));
        assert_eq!(info["name"], "Unknown");
        assert_eq!(info["sector"], "N/A");
        assert_eq!(info["price"], "N/A");
    }

    #[test]
    fn test_build_market_snapshot_filters_unknown_symbols() {
        let index_data = json!([
            {"symbol": "^GSPC", "price": 5300.1, "change": 12.4, "changesPercentage": 0.23},
            {"symbol": "UNKNOWN", "price": 1.0}
        ]);
        let sector_data = json!([
            {"symbol": "XLK", "price": 228.9, "change": -0.8, "changesPercentage": -0.35}
        ]);

        let snapshot = build_market_snapshot(&index_data, &sector_data, "2025-06-01T12:00:00Z");
        assert_eq!(snapshot["timestamp"], "2025-06-01T12:00:00Z");
        assert_eq!(snapshot["indexes"].as_array().unwrap().len(), 1);
        assert_eq!(snapshot["indexes"][0]["name"], "S&P 500");
        assert_eq!(snapshot["indexes"][0]["value"], 5300.1);
        assert_eq!(snapshot["sectors"][0]["name"], "Technology");
        assert_eq!(snapshot["sectors"][0]["price"], 228.9);
    }

    #[test]
    fn test_build_market_snapshot_empty_payloads() {
        let snapshot = build_market_snapshot(&json!(null), &json!([]), "t");
        assert_eq!(snapshot["indexes"].as_array().unwrap().len(), 0);
        assert_eq!(snapshot["sectors"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_read_unknown_uri() {
        let service = test_service();
        let result = service.read_resource("mystery://thing").await;
        assert!(matches!(result, Err(ResourceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_read_stock_info_empty_symbol() {
        let service = test_service();
        let result = service.read_resource("stock-info://").await;
        assert!(matches!(result, Err(ResourceError::InvalidUri(_))));
    }

    #[tokio::test]
    async fn test_read_unreachable_upstream_resolves_to_error_document() {
        // Gateway failures become JSON error bodies, not resource errors
        let service = test_service();
        let result = service.read_resource("stock-info://AAPL").await.unwrap();

        let text = match &result.contents[0] {
            ResourceContents::TextResourceContents { text, .. } => text.clone(),
            other => panic!("expected text contents, got {other:?}"),
        };
        assert!(text.contains("\"error\""));
    }

    #[tokio::test]
    async fn test_list_resources_and_templates() {
        let service = test_service();
        assert_eq!(service.list_resources().await.len(), 1);
        assert_eq!(service.list_resource_templates().await.len(), 1);
    }
}
