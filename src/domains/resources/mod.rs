//! Resources domain module.
//!
//! This module handles all resource-related functionality for the MCP server.
//! Resources expose FMP data as raw JSON documents (rather than the Markdown
//! the tools produce), so clients can attach them as structured context.
//!
//! ## Architecture
//!
//! - `registry.rs` - Central resource and template registration
//! - `service.rs` - Resource service for listing and reading
//!
//! Two resources are served: a static market snapshot and a per-symbol stock
//! information template, both resolved live through the FMP gateway.

mod error;
mod registry;
mod service;

pub use error::ResourceError;
pub use registry::{get_all_resource_templates, get_all_resources, resource_uris};
pub use service::ResourceService;
