//! Resource Registry - central registration of all resources.
//!
//! This module declares the resource metadata without touching service.rs.
//! When adding a new resource:
//! 1. Add its URI constant and metadata here
//! 2. Resolve its content in `service.rs::read_resource`

use rmcp::model::{AnnotateAble, RawResource, RawResourceTemplate, Resource, ResourceTemplate};

/// URI of the static market snapshot resource.
pub const MARKET_SNAPSHOT_URI: &str = "market-snapshot://current";

/// URI scheme prefix of the per-symbol stock information template.
pub const STOCK_INFO_PREFIX: &str = "stock-info://";

/// Get all registered static resources.
///
/// This is the central place where all resources are registered.
/// When adding a new resource, add it here.
pub fn get_all_resources() -> Vec<Resource> {
    let mut snapshot = RawResource::new(MARKET_SNAPSHOT_URI, "Market Snapshot");
    snapshot.description = Some(
        "Current market snapshot: major index quotes and sector ETF performance as JSON"
            .to_string(),
    );
    snapshot.mime_type = Some("application/json".to_string());

    vec![snapshot.no_annotation()]
}

/// Get all registered resource templates.
///
/// Resource templates use URI templates (RFC 6570) to describe
/// parameterized resources that clients can fill in.
pub fn get_all_resource_templates() -> Vec<ResourceTemplate> {
    vec![
        RawResourceTemplate {
            uri_template: format!("{STOCK_INFO_PREFIX}{{symbol}}"),
            name: "Stock Information".to_string(),
            title: Some("Company Profile and Quote".to_string()),
            description: Some(
                "Company profile merged with the current quote for a ticker symbol, as JSON"
                    .to_string(),
            ),
            mime_type: Some("application/json".to_string()),
        }
        .no_annotation(),
    ]
}

/// Get the list of all static resource URIs.
pub fn resource_uris() -> Vec<&'static str> {
    vec![MARKET_SNAPSHOT_URI]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_all_resources() {
        let resources = get_all_resources();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].raw.uri, MARKET_SNAPSHOT_URI);
        assert_eq!(resources[0].raw.mime_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn test_get_all_resource_templates() {
        let templates = get_all_resource_templates();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].raw.uri_template, "stock-info://{symbol}");
    }

    #[test]
    fn test_resource_uris() {
        let uris = resource_uris();
        assert_eq!(uris, vec![MARKET_SNAPSHOT_URI]);
    }
}
