//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Every tool follows the same request/format contract: validate the
//! caller-supplied parameters, make one call through the FMP gateway, and
//! render the JSON response as a Markdown string.
//!
//! ## Architecture
//!
//! - `definitions/fmp/` - Individual tool implementations (one file per FMP category)
//! - `router.rs` - Dynamic ToolRouter builder for STDIO/TCP transport
//! - `registry.rs` - Central tool registry and HTTP dispatch
//!
//! ## Adding a New Tool
//!
//! 1. Create the tool in `definitions/fmp/` (or extend a category file)
//! 2. Define params, execute(), and http_handler()
//! 3. Export in `definitions/mod.rs`
//! 4. Add route in `router.rs` using `with_route()`
//! 5. Register in `registry.rs` for HTTP support
//!
//! **No need to modify `server.rs`!** The router is built dynamically.

pub mod definitions;
mod registry;
pub mod router;

pub use registry::ToolRegistry;
pub use router::build_tool_router;
