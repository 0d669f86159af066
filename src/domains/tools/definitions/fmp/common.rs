//! Common utilities shared across FMP tools.
//!
//! This module provides the Markdown rendering conventions (thousands
//! grouping, directional markers, N/A fallbacks) and the parameter
//! validation helpers used by every tool.

use chrono::NaiveDate;
use rmcp::model::{CallToolResult, Content};
use serde_json::Value;
use tracing::warn;

/// Directional marker for a change value, with exactly zero treated as flat.
pub fn change_marker(change: f64) -> &'static str {
    if change > 0.0 {
        "🔺"
    } else if change < 0.0 {
        "🔻"
    } else {
        "➖"
    }
}

/// Group the integer part of a decimal string with thousands separators.
///
/// `"2873.7"` becomes `"2,873.7"`, `"-1234567"` becomes `"-1,234,567"`.
fn group_decimal_string(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };

    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Render an `f64` with thousands separators, fractional digits preserved
/// as Rust's shortest representation prints them (`2873.7` -> `2,873.7`).
pub fn group_number(value: f64) -> String {
    group_decimal_string(&format!("{}", value))
}

/// Thousands-grouped rendering with exactly two decimal places, for values
/// computed locally (raw f64 arithmetic would otherwise leak float noise).
pub fn group_number_2dp(value: f64) -> String {
    group_decimal_string(&format!("{:.2}", value))
}

/// Render a JSON value as display text, grouping numbers with thousands
/// separators. Missing and null values render as `N/A`.
pub fn format_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(n)) => group_decimal_string(&n.to_string()),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => "N/A".to_string(),
    }
}

/// Numeric field of a record, grouped, with `N/A` fallback.
pub fn num_field(record: &Value, key: &str) -> String {
    format_value(record.get(key))
}

/// String field of a record with `N/A` fallback.
pub fn str_field(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("N/A")
        .to_string()
}

/// Raw numeric field of a record, when present.
pub fn f64_field(record: &Value, key: &str) -> Option<f64> {
    record.get(key).and_then(|v| v.as_f64())
}

/// Default result limit shared by most listing tools.
pub fn default_limit() -> i64 {
    10
}

/// Reject an out-of-range limit before any network call is made.
///
/// Zero and negative limits are validation failures, never silently clamped.
pub fn validate_limit(limit: i64, min: i64, max: i64) -> Result<(), String> {
    if limit < min || limit > max {
        Err(format!("Error: limit must be between {min} and {max}"))
    } else {
        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` parameter or produce a validation message naming it.
pub fn validate_date(name: &str, value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("Error: {name} must be in YYYY-MM-DD format"))
}

/// Wall-clock stamp for "Data as of" lines.
///
/// Render functions take the stamp as an argument so their output is a pure
/// function of their inputs; `execute` passes this in.
pub fn now_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// FMP signals some failures in-band: a 2xx response whose body is an object
/// with an `error` or `Error Message` key. Returns the human detail if so.
pub fn upstream_error_detail(data: &Value) -> Option<String> {
    let obj = data.as_object()?;
    if !obj.contains_key("error") && !obj.contains_key("Error Message") {
        return None;
    }
    let detail = obj
        .get("message")
        .or_else(|| obj.get("Error Message"))
        .or_else(|| obj.get("error"))
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown error");
    Some(detail.to_string())
}

/// The payload's records, when it is a non-empty array.
///
/// An empty array and a symbol the API does not know are indistinguishable
/// here; both end up as a "no data" result.
pub fn records(data: &Value) -> Option<&Vec<Value>> {
    match data.as_array() {
        Some(items) if !items.is_empty() => Some(items),
        _ => None,
    }
}

/// Markdown error result with an explicit error heading.
pub fn error_result(message: &str) -> CallToolResult {
    warn!("{}", message);
    CallToolResult::error(vec![Content::text(format!("## Error\n\n{message}"))])
}

/// Success result with Markdown text content.
pub fn success_result(content: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(content)])
}

/// "No data" result: a successful call that matched nothing, distinct from
/// an error.
pub fn no_data_result(message: &str) -> CallToolResult {
    CallToolResult::success(vec![Content::text(message.to_string())])
}

/// Client whose base URL points at a closed loopback port (test helper).
///
/// Used to prove validation runs before the gateway: a validation failure
/// message can only appear if no connection attempt was made, since any
/// attempt against this client yields a network error instead.
#[cfg(test)]
pub fn offline_client() -> crate::core::FmpClient {
    use crate::core::config::{ApiConfig, CredentialsConfig};
    let api = ApiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_secs: 1,
    };
    crate::core::FmpClient::new(&api, &CredentialsConfig::default()).expect("client should build")
}

/// Extract the Markdown text of a result (test helper for tool modules).
#[cfg(test)]
pub fn result_text(result: &CallToolResult) -> String {
    use rmcp::model::RawContent;
    result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(text) => Some(text.text.clone()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_group_number_preserves_fraction() {
        assert_eq!(group_number(2873.7), "2,873.7");
        assert_eq!(group_number(2365.8), "2,365.8");
        assert_eq!(group_number(190.5), "190.5");
        assert_eq!(group_number(0.0), "0");
    }

    #[test]
    fn test_group_number_integers() {
        assert_eq!(format_value(Some(&json!(2840000000000i64))), "2,840,000,000,000");
        assert_eq!(format_value(Some(&json!(999))), "999");
        assert_eq!(format_value(Some(&json!(1000))), "1,000");
    }

    #[test]
    fn test_group_number_negative() {
        assert_eq!(group_number(-123456.78), "-123,456.78");
        assert_eq!(format_value(Some(&json!(-1234567))), "-1,234,567");
    }

    #[test]
    fn test_format_value_fallbacks() {
        assert_eq!(format_value(None), "N/A");
        assert_eq!(format_value(Some(&Value::Null)), "N/A");
        assert_eq!(format_value(Some(&json!("NYSE"))), "NYSE");
    }

    #[test]
    fn test_change_marker_sign() {
        assert_eq!(change_marker(2.5), "🔺");
        assert_eq!(change_marker(-0.01), "🔻");
        assert_eq!(change_marker(0.0), "➖");
    }

    #[test]
    fn test_validate_limit_bounds() {
        assert!(validate_limit(10, 1, 100).is_ok());
        assert!(validate_limit(1, 1, 100).is_ok());
        assert!(validate_limit(100, 1, 100).is_ok());
        assert!(validate_limit(0, 1, 100).is_err());
        assert!(validate_limit(-5, 1, 100).is_err());
        assert!(validate_limit(101, 1, 100).is_err());
    }

    #[test]
    fn test_validate_date_format() {
        assert!(validate_date("from_date", "2025-01-31").is_ok());
        assert!(validate_date("from_date", "01/31/2025").is_err());
        assert!(validate_date("from_date", "2025-13-01").is_err());
        let err = validate_date("to_date", "garbage").unwrap_err();
        assert!(err.contains("to_date"));
    }

    #[test]
    fn test_upstream_error_detail() {
        let payload = json!({"error": "HTTP error", "message": "Symbol not found"});
        assert_eq!(
            upstream_error_detail(&payload).as_deref(),
            Some("Symbol not found")
        );

        let fmp_style = json!({"Error Message": "Invalid API KEY"});
        assert_eq!(
            upstream_error_detail(&fmp_style).as_deref(),
            Some("Invalid API KEY")
        );

        assert!(upstream_error_detail(&json!([{"symbol": "AAPL"}])).is_none());
        assert!(upstream_error_detail(&json!({"symbol": "AAPL"})).is_none());
    }

    #[test]
    fn test_records_empty_and_nonarray() {
        assert!(records(&json!([])).is_none());
        assert!(records(&json!({"a": 1})).is_none());
        assert_eq!(records(&json!([1, 2])).map(|r| r.len()), Some(2));
    }

    #[test]
    fn test_error_result_has_heading() {
        let result = error_result("Error fetching quote for AAPL: HTTP error 404: Not Found");
        assert_eq!(result.is_error, Some(true));
        let text = result_text(&result);
        assert!(text.starts_with("## Error"));
        assert!(text.contains("404"));
    }
}
