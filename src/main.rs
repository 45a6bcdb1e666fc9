//! Gmail MCP HTTP Server
//!
//! Exposes Gmail tools (send, search, read, draft, delete, labels, profile)
//! over an authenticated HTTP MCP endpoint.

use std::sync::Arc;

use clap::Parser;

use gmail_mcp_http::auth::AuthGate;
use gmail_mcp_http::config::{AuthMode, Config};
use gmail_mcp_http::error::Result;
use gmail_mcp_http::gmail::client::GmailClient;
use gmail_mcp_http::mcp::server::McpServer;

/// Gmail MCP HTTP Server
#[derive(Parser)]
#[command(name = "gmail-mcp-http")]
#[command(author, version, about = "Gmail MCP Server - Gmail tools over authenticated HTTP")]
struct Cli {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    match &config.auth_mode {
        AuthMode::HeaderToken => {
            tracing::info!("authentication: x-google-access-token header (passthrough)");
        }
        AuthMode::GoogleIdToken { .. } => {
            tracing::info!("authentication: Google ID token (Authorization: Bearer)");
        }
    }

    let gate = Arc::new(AuthGate::from_mode(&config.auth_mode)?);
    let gmail_client = Arc::new(GmailClient::new());

    let server = McpServer::new(gate, gmail_client);
    server.run(config.port).await
}
