//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the server:
//! configuration, the Financial Modeling Prep gateway client, server
//! lifecycle management, and transport layer abstractions.

pub mod config;
pub mod fmp;
pub mod server;
pub mod transport;

pub use config::Config;
pub use fmp::{FmpClient, GatewayError};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
