//! MCP protocol module
//!
//! JSON-RPC types, the tool registry, and the HTTP transport.

pub mod server;
pub mod tools;
pub mod types;
