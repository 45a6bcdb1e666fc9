//! Gmail MCP HTTP Server Library
//!
//! A Model Context Protocol (MCP) server exposing Gmail operations as tools
//! behind an authenticated HTTP endpoint. Callers supply a Google access
//! token per request; nothing is persisted server-side.

pub mod auth;
pub mod config;
pub mod error;
pub mod gmail;
pub mod mcp;

pub use config::{AuthMode, Config};
pub use error::{Result, ServerError};
