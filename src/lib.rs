//! FMP MCP Server Library
//!
//! This crate exposes Financial Modeling Prep (FMP) market-data lookups as
//! MCP (Model Context Protocol) tools, resources, and prompts. Every tool
//! fetches one FMP endpoint and renders the JSON response as Markdown text
//! for an LLM client.
//!
//! # Architecture
//!
//! - **core**: configuration, the FMP gateway client, the main server, and
//!   the transport layer (STDIO by default, TCP/HTTP behind features)
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: one request/format tool per FMP data category
//!   - **resources**: JSON resources (stock info, market snapshot)
//!   - **prompts**: financial-analysis prompt templates
//!
//! # Example
//!
//! ```rust,no_run
//! use fmp_mcp_server::core::{Config, McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config)?;
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, FmpClient, GatewayError, McpServer};
