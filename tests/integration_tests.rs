//! Integration tests for the Gmail MCP HTTP server
//!
//! These tests run the real axum app and a fake in-process Gmail API; no
//! external network calls are made.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde_json::{json, Value};

use gmail_mcp_http::auth::AuthGate;
use gmail_mcp_http::config::AuthMode;
use gmail_mcp_http::gmail::client::GmailClient;
use gmail_mcp_http::mcp::server::McpServer;

/// Raw payloads captured by the fake Gmail API
#[derive(Clone, Default)]
struct Captured {
    raw: Arc<Mutex<Vec<String>>>,
}

/// A fake Gmail REST surface
///
/// Lists five message ids; metadata for "m3" always fails with a 500.
fn fake_gmail(captured: Captured) -> Router {
    async fn list_messages() -> Json<Value> {
        Json(json!({
            "messages": [
                {"id": "m1", "threadId": "t1"},
                {"id": "m2", "threadId": "t2"},
                {"id": "m3", "threadId": "t3"},
                {"id": "m4", "threadId": "t4"},
                {"id": "m5", "threadId": "t5"}
            ],
            "resultSizeEstimate": 5
        }))
    }

    async fn get_message(Path(id): Path<String>) -> axum::response::Response {
        if id == "m3" {
            return (StatusCode::INTERNAL_SERVER_ERROR, "backend exploded").into_response();
        }
        Json(json!({
            "id": id,
            "threadId": format!("t{}", &id[1..]),
            "snippet": format!("snippet {}", id),
            "payload": {
                "headers": [
                    {"name": "From", "value": format!("{}@example.com", id)},
                    {"name": "Subject", "value": format!("subject {}", id)},
                    {"name": "Date", "value": "Mon, 1 Jan 2024 00:00:00 +0000"}
                ]
            }
        }))
        .into_response()
    }

    async fn send_message(
        State(captured): State<Captured>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let raw = body["raw"].as_str().unwrap_or_default().to_string();
        captured.raw.lock().unwrap().push(raw);
        Json(json!({"id": "sent-1", "threadId": "t-sent"}))
    }

    async fn create_draft(
        State(captured): State<Captured>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let raw = body["message"]["raw"].as_str().unwrap_or_default().to_string();
        captured.raw.lock().unwrap().push(raw);
        Json(json!({"id": "draft-1", "message": {"id": "m-draft"}}))
    }

    async fn trash_message(Path(_id): Path<String>) -> Json<Value> {
        Json(json!({"id": "m1", "labelIds": ["TRASH"]}))
    }

    async fn list_labels() -> Json<Value> {
        Json(json!({
            "labels": [
                {"id": "INBOX", "name": "INBOX", "type": "system", "messagesTotal": 12},
                {"id": "Label_7", "name": "Receipts", "type": "user"}
            ]
        }))
    }

    async fn get_profile() -> Json<Value> {
        Json(json!({
            "emailAddress": "me@example.com",
            "messagesTotal": 42,
            "threadsTotal": 40,
            "historyId": "12345"
        }))
    }

    Router::new()
        .route("/users/me/messages", get(list_messages))
        .route("/users/me/messages/send", post(send_message))
        .route("/users/me/messages/:id", get(get_message))
        .route("/users/me/messages/:id/trash", post(trash_message))
        .route("/users/me/drafts", post(create_draft))
        .route("/users/me/labels", get(list_labels))
        .route("/users/me/profile", get(get_profile))
        .with_state(captured)
}

/// Bind an app to an ephemeral port and return its base URL
async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Spawn the MCP server wired to a fake Gmail API
async fn spawn_mcp() -> (String, Captured) {
    let captured = Captured::default();
    let gmail_base = spawn(fake_gmail(captured.clone())).await;

    let gate = Arc::new(AuthGate::from_mode(&AuthMode::HeaderToken).unwrap());
    let client = Arc::new(GmailClient::new().with_base_url(gmail_base));
    let server = McpServer::new(gate, client);

    let base = spawn(server.router()).await;
    (base, captured)
}

async fn call_mcp(base: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    let client = reqwest::Client::new();
    let mut req = client.post(format!("{}/mcp", base)).json(&body);
    if let Some(t) = token {
        req = req.header("x-google-access-token", t);
    }
    let response = req.send().await.unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    let value = response.json().await.unwrap_or(Value::Null);
    (status, value)
}

fn rpc(id: i64, method: &str, params: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params})
}

fn tool_text(result: &Value) -> &str {
    result["result"]["content"][0]["text"].as_str().unwrap()
}

mod auth_gate_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_rejected_with_documented_shape() {
        let (base, _) = spawn_mcp().await;

        let (status, body) = call_mcp(&base, None, rpc(1, "tools/list", json!({}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], 401);
        assert_eq!(
            body["message"],
            "Missing or invalid x-google-access-token header"
        );
    }

    #[tokio::test]
    async fn test_duplicated_token_header_rejected() {
        let (base, _) = spawn_mcp().await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("{}/mcp", base))
            .header("x-google-access-token", "one")
            .header("x-google-access-token", "two")
            .json(&rpc(1, "tools/list", json!({})))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 401);
    }

    #[tokio::test]
    async fn test_authorized_request_reaches_dispatch() {
        let (base, _) = spawn_mcp().await;

        let (status, body) = call_mcp(&base, Some("tok"), rpc(1, "tools/list", json!({}))).await;
        assert_eq!(status, StatusCode::OK);

        let tools = body["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 7);
        assert!(tools.iter().any(|t| t["name"] == "gmail.sendEmail"));
    }

    #[tokio::test]
    async fn test_notification_without_id_gets_no_response_body() {
        let (base, _) = spawn_mcp().await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("{}/mcp", base))
            .header("x-google-access-token", "tok")
            .json(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 202);
        assert!(response.text().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_method_is_jsonrpc_error() {
        let (base, _) = spawn_mcp().await;

        let (status, body) = call_mcp(&base, Some("tok"), rpc(1, "bogus/method", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], -32601);
    }
}

mod tool_call_tests {
    use super::*;

    #[tokio::test]
    async fn test_send_email_builds_bare_raw_payload() {
        let (base, captured) = spawn_mcp().await;

        let params = json!({
            "name": "gmail.sendEmail",
            "arguments": {"to": "a@b.com", "subj": "Hi", "body": "Hello"}
        });
        let (_, body) = call_mcp(&base, Some("tok"), rpc(1, "tools/call", params)).await;

        let text = tool_text(&body);
        assert!(text.contains("\"status\": \"sent\""));
        assert!(text.contains("sent-1"));

        let raws = captured.raw.lock().unwrap();
        let decoded =
            String::from_utf8(URL_SAFE_NO_PAD.decode(raws[0].as_str()).unwrap()).unwrap();
        assert_eq!(decoded, "To: a@b.com\r\nSubject: Hi\r\n\r\nHello");
    }

    #[tokio::test]
    async fn test_create_draft_builds_mime_raw_payload() {
        let (base, captured) = spawn_mcp().await;

        let params = json!({
            "name": "gmail.createDraft",
            "arguments": {"to": "a@b.com", "subject": "Hi", "body": "Hello"}
        });
        let (_, body) = call_mcp(&base, Some("tok"), rpc(1, "tools/call", params)).await;

        let text = tool_text(&body);
        assert!(text.contains("draft_created"));
        assert!(text.contains("draft-1"));

        let raws = captured.raw.lock().unwrap();
        let decoded = String::from_utf8(URL_SAFE.decode(raws[0].as_str()).unwrap()).unwrap();
        assert!(decoded.contains("Content-Type: text/plain; charset=\"UTF-8\"\r\n"));
        assert!(decoded.contains("MIME-Version: 1.0\r\n"));
        assert!(decoded.ends_with("\r\n\r\nHello"));
    }

    #[tokio::test]
    async fn test_search_skips_failed_lookup_and_keeps_order() {
        let (base, _) = spawn_mcp().await;

        let params = json!({
            "name": "gmail.searchEmails",
            "arguments": {"query": "from:someone@example.com"}
        });
        let (_, body) = call_mcp(&base, Some("tok"), rpc(1, "tools/call", params)).await;

        let result: Value = serde_json::from_str(tool_text(&body)).unwrap();
        assert_eq!(result["totalResults"], 5);

        let ids: Vec<&str> = result["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["id"].as_str().unwrap())
            .collect();
        // m3 fails server-side: skipped, original relative order kept
        assert_eq!(ids, vec!["m1", "m2", "m4", "m5"]);
    }

    #[tokio::test]
    async fn test_search_respects_max_results() {
        let (base, _) = spawn_mcp().await;

        let params = json!({
            "name": "gmail.searchEmails",
            "arguments": {"query": "anything", "maxResults": 2}
        });
        let (_, body) = call_mcp(&base, Some("tok"), rpc(1, "tools/call", params)).await;

        let result: Value = serde_json::from_str(tool_text(&body)).unwrap();
        assert_eq!(result["messages"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_read_email_normalizes_headers() {
        let (base, _) = spawn_mcp().await;

        let params = json!({
            "name": "gmail.readEmail",
            "arguments": {"messageId": "m1"}
        });
        let (_, body) = call_mcp(&base, Some("tok"), rpc(1, "tools/call", params)).await;

        let result: Value = serde_json::from_str(tool_text(&body)).unwrap();
        assert_eq!(result["id"], "m1");
        assert_eq!(result["from"], "m1@example.com");
        assert_eq!(result["subject"], "subject m1");
        assert_eq!(result["hasHtml"], false);
        // No body parts in the fake metadata payload
        assert_eq!(result["body"], "");
    }

    #[tokio::test]
    async fn test_delete_email_defaults_to_trash() {
        let (base, _) = spawn_mcp().await;

        let params = json!({
            "name": "gmail.deleteEmail",
            "arguments": {"messageId": "m1"}
        });
        let (_, body) = call_mcp(&base, Some("tok"), rpc(1, "tools/call", params)).await;

        let result: Value = serde_json::from_str(tool_text(&body)).unwrap();
        assert_eq!(result["status"], "moved_to_trash");
        assert_eq!(result["messageId"], "m1");
    }

    #[tokio::test]
    async fn test_list_labels_and_profile() {
        let (base, _) = spawn_mcp().await;

        let params = json!({"name": "gmail.listLabels", "arguments": {}});
        let (_, body) = call_mcp(&base, Some("tok"), rpc(1, "tools/call", params)).await;
        let labels: Value = serde_json::from_str(tool_text(&body)).unwrap();
        assert_eq!(labels["totalLabels"], 2);
        assert_eq!(labels["labels"][0]["id"], "INBOX");

        let params = json!({"name": "gmail.getUserProfile", "arguments": {}});
        let (_, body) = call_mcp(&base, Some("tok"), rpc(2, "tools/call", params)).await;
        let profile: Value = serde_json::from_str(tool_text(&body)).unwrap();
        assert_eq!(profile["emailAddress"], "me@example.com");
        assert_eq!(profile["messagesTotal"], 42);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_tool_error() {
        let (base, _) = spawn_mcp().await;

        let params = json!({"name": "gmail.nope", "arguments": {}});
        let (_, body) = call_mcp(&base, Some("tok"), rpc(1, "tools/call", params)).await;

        assert_eq!(body["result"]["isError"], true);
        assert!(tool_text(&body).contains("Unknown tool"));
    }
}

mod client_tests {
    use super::*;

    #[tokio::test]
    async fn test_search_fanout_over_raw_client() {
        let captured = Captured::default();
        let base = spawn(fake_gmail(captured)).await;
        let client = GmailClient::new().with_base_url(base);

        let result = client.search_messages("tok", "q", 10).await.unwrap();
        assert_eq!(result.total_results, 5);

        let ids: Vec<&str> = result.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m4", "m5"]);
        assert_eq!(result.entries[0].from, "m1@example.com");
        assert_eq!(result.entries[0].snippet, "snippet m1");
    }

    #[tokio::test]
    async fn test_operation_failed_wraps_downstream_error() {
        let captured = Captured::default();
        let base = spawn(fake_gmail(captured)).await;
        let client = GmailClient::new().with_base_url(base);

        let err = client.get_message_metadata("tok", "m3").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("get message metadata"));
        assert!(message.contains("backend exploded"));
    }
}
