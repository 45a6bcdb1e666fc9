//! HTTP transport for the MCP server
//!
//! A single `/mcp` endpoint accepting JSON-RPC over POST. The AuthGate runs
//! before any dispatch: a denied request gets the verifier's (status, message)
//! pair as its HTTP response and never reaches tool logic. Requests are
//! independent and share nothing mutable, so axum is free to run them
//! concurrently.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::auth::{AuthContext, AuthDecision, AuthGate};
use crate::error::Result;
use crate::gmail::client::GmailClient;
use crate::mcp::tools::ToolHandler;
use crate::mcp::types::*;

/// MCP Server info
const SERVER_NAME: &str = "gmail";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP server over HTTP
pub struct McpServer {
    state: AppState,
}

#[derive(Clone)]
struct AppState {
    gate: Arc<AuthGate>,
    tool_handler: Arc<ToolHandler>,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(gate: Arc<AuthGate>, gmail_client: Arc<GmailClient>) -> Self {
        Self {
            state: AppState {
                gate,
                tool_handler: Arc::new(ToolHandler::new(gmail_client)),
            },
        }
    }

    /// The axum application serving the `/mcp` endpoint
    pub fn router(&self) -> Router {
        Router::new()
            .route("/mcp", post(handle_request))
            .with_state(self.state.clone())
    }

    /// Serve on the given port until shutdown
    pub async fn run(&self, port: u16) -> Result<()> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!("Gmail MCP server listening on http://{}/mcp", addr);
        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

/// Handle one inbound JSON-RPC request
async fn handle_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    // Authorize before touching the payload
    let ctx = match state.gate.authorize(&headers).await {
        AuthDecision::Accepted(ctx) => ctx,
        AuthDecision::Rejected(err) => {
            tracing::debug!("request rejected: {}", err);
            let code = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::UNAUTHORIZED);
            let message = err.to_string();
            return (code, Json(json!({ "status": err.status(), "message": message })))
                .into_response();
        }
    };

    let request: JsonRpcRequest = match serde_json::from_str(&body) {
        Ok(req) => req,
        Err(e) => {
            let response = JsonRpcResponse::error(
                RequestId::Number(0),
                JsonRpcError::parse_error(e.to_string()),
            );
            return Json(response).into_response();
        }
    };

    // Notifications carry no id and expect no response body
    let id = match request.id.clone() {
        Some(id) => id,
        None => return StatusCode::ACCEPTED.into_response(),
    };

    match request.method.as_str() {
        methods::INITIALIZE => {
            Json(JsonRpcResponse::success(id, initialize_result())).into_response()
        }
        methods::INITIALIZED => StatusCode::ACCEPTED.into_response(),
        methods::PING => Json(JsonRpcResponse::success(id, json!({}))).into_response(),
        methods::LIST_TOOLS => {
            let result = ListToolsResult {
                tools: state.tool_handler.list_tools(),
            };
            let value = serde_json::to_value(result).unwrap_or_default();
            Json(JsonRpcResponse::success(id, value)).into_response()
        }
        methods::CALL_TOOL => {
            let result = handle_call_tool(&state, &request, &ctx).await;
            Json(JsonRpcResponse::success(id, result)).into_response()
        }
        other => Json(JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)))
            .into_response(),
    }
}

fn initialize_result() -> Value {
    let result = InitializeResult {
        protocol_version: MCP_VERSION.to_string(),
        server_info: ServerInfo {
            name: SERVER_NAME.to_string(),
            version: SERVER_VERSION.to_string(),
        },
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
    };

    serde_json::to_value(result).unwrap_or_default()
}

async fn handle_call_tool(state: &AppState, request: &JsonRpcRequest, ctx: &AuthContext) -> Value {
    let params: CallToolParams = match request.params.clone() {
        Some(p) => match serde_json::from_value(p) {
            Ok(params) => params,
            Err(e) => {
                return to_value_or_error(CallToolResult::error(format!(
                    "Invalid tool parameters: {}",
                    e
                )))
            }
        },
        None => return to_value_or_error(CallToolResult::error("Missing tool parameters")),
    };

    let result = state
        .tool_handler
        .call_tool(&params.name, params.arguments, ctx)
        .await;

    to_value_or_error(result)
}

fn to_value_or_error(result: CallToolResult) -> Value {
    serde_json::to_value(&result).unwrap_or_else(|e| {
        json!({
            "content": [{"type": "text", "text": format!("Error: {}", e)}],
            "isError": true,
        })
    })
}
