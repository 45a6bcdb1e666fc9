//! MCP Tool definitions and handlers
//!
//! Declares the gmail.* tools and maps each call onto the Gmail client. Every
//! handler reads the access token from the request's auth context before
//! touching the network and wraps downstream failures with its operation
//! name. No handler retries.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthContext;
use crate::error::ToolError;
use crate::gmail::client::GmailClient;
use crate::gmail::mime::{self, OutgoingMessage};
use crate::mcp::types::{CallToolResult, Tool};

/// Tool handler
pub struct ToolHandler {
    gmail_client: Arc<GmailClient>,
}

impl ToolHandler {
    /// Create a new tool handler
    pub fn new(gmail_client: Arc<GmailClient>) -> Self {
        Self { gmail_client }
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        vec![
            tool_def("gmail.sendEmail", "Send plain-text mail via Gmail", send_email_schema()),
            tool_def("gmail.searchEmails", "Search emails in Gmail using query syntax", search_emails_schema()),
            tool_def("gmail.readEmail", "Read the full content of a specific email by ID", read_email_schema()),
            tool_def("gmail.createDraft", "Create a draft email in Gmail", create_draft_schema()),
            tool_def("gmail.deleteEmail", "Delete or trash an email message", delete_email_schema()),
            tool_def("gmail.listLabels", "List all Gmail labels (folders) available to the user", empty_schema()),
            tool_def("gmail.getUserProfile", "Get the Gmail user's profile information", empty_schema()),
        ]
    }

    /// Call a tool by name with the request's auth context
    pub async fn call_tool(&self, name: &str, args: Value, ctx: &AuthContext) -> CallToolResult {
        let token = match ctx.access_token() {
            Some(t) => t.to_string(),
            None => return CallToolResult::error(ToolError::MissingCredential.to_string()),
        };

        match name {
            "gmail.sendEmail" => self.handle_send_email(args, &token).await,
            "gmail.searchEmails" => self.handle_search_emails(args, &token).await,
            "gmail.readEmail" => self.handle_read_email(args, &token).await,
            "gmail.createDraft" => self.handle_create_draft(args, &token).await,
            "gmail.deleteEmail" => self.handle_delete_email(args, &token).await,
            "gmail.listLabels" => self.handle_list_labels(&token).await,
            "gmail.getUserProfile" => self.handle_get_profile(&token).await,
            _ => CallToolResult::error(format!("Unknown tool: {}", name)),
        }
    }

    // ==================== Tool Handlers ====================

    async fn handle_send_email(&self, args: Value, token: &str) -> CallToolResult {
        #[derive(Deserialize)]
        struct Args {
            to: String,
            subj: String,
            body: String,
        }

        let args: Args = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(format!("Invalid arguments: {}", e)),
        };

        let raw = mime::encode_send(&args.to, &args.subj, &args.body);

        match self.gmail_client.send_message(token, raw).await {
            Ok(message) => CallToolResult::json(&json!({
                "status": "sent",
                "messageId": message.id,
            })),
            Err(e) => CallToolResult::error(ToolError::operation("send email", e).to_string()),
        }
    }

    async fn handle_create_draft(&self, args: Value, token: &str) -> CallToolResult {
        #[derive(Deserialize, Default)]
        struct Args {
            to: Option<String>,
            subject: Option<String>,
            body: Option<String>,
            cc: Option<String>,
            bcc: Option<String>,
        }

        let args: Args = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(format!("Invalid arguments: {}", e)),
        };

        let message = OutgoingMessage {
            to: args.to.clone(),
            subject: args.subject.clone(),
            body: args.body.clone().unwrap_or_default(),
            cc: args.cc,
            bcc: args.bcc,
        };

        let raw = mime::encode_draft(&message);

        match self.gmail_client.create_draft(token, raw).await {
            Ok(draft) => CallToolResult::json(&json!({
                "status": "draft_created",
                "draftId": draft.id,
                "messageId": draft.message.map(|m| m.id),
                "to": args.to.unwrap_or_default(),
                "subject": args.subject.unwrap_or_default(),
                "preview": preview(&message.body),
            })),
            Err(e) => CallToolResult::error(ToolError::operation("create draft", e).to_string()),
        }
    }

    async fn handle_read_email(&self, args: Value, token: &str) -> CallToolResult {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            message_id: String,
        }

        let args: Args = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(format!("Invalid arguments: {}", e)),
        };

        let message = match self.gmail_client.get_message(token, &args.message_id).await {
            Ok(m) => m,
            Err(e) => {
                return CallToolResult::error(ToolError::operation("read email", e).to_string())
            }
        };

        let payload = message.payload.as_ref();
        let header = |name: &str| {
            payload
                .and_then(|p| mime::find_header(p, name))
                .unwrap_or("")
                .to_string()
        };

        let view = payload.map(mime::extract_content).unwrap_or_default();

        CallToolResult::json(&json!({
            "id": args.message_id,
            "threadId": message.thread_id.clone().unwrap_or_default(),
            "subject": header("subject"),
            "from": header("from"),
            "to": header("to"),
            "cc": header("cc"),
            "date": header("date"),
            "snippet": message.snippet.clone().unwrap_or_default(),
            "body": view.body(),
            "hasHtml": view.has_html(),
            "labelIds": message.label_ids,
        }))
    }

    async fn handle_search_emails(&self, args: Value, token: &str) -> CallToolResult {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            query: String,
            max_results: Option<u32>,
        }

        let args: Args = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(format!("Invalid arguments: {}", e)),
        };

        let max_results = args.max_results.unwrap_or(10);

        match self
            .gmail_client
            .search_messages(token, &args.query, max_results)
            .await
        {
            Ok(result) => {
                let messages: Vec<Value> = result
                    .entries
                    .iter()
                    .map(|e| {
                        json!({
                            "id": e.id,
                            "threadId": e.thread_id,
                            "snippet": e.snippet,
                            "from": e.from,
                            "subject": e.subject,
                            "date": e.date,
                        })
                    })
                    .collect();

                CallToolResult::json(&json!({
                    "query": args.query,
                    "totalResults": result.total_results,
                    "messages": messages,
                }))
            }
            Err(e) => CallToolResult::error(ToolError::operation("search emails", e).to_string()),
        }
    }

    async fn handle_delete_email(&self, args: Value, token: &str) -> CallToolResult {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Args {
            message_id: String,
            #[serde(default)]
            permanent: bool,
        }

        let args: Args = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(format!("Invalid arguments: {}", e)),
        };

        let result = if args.permanent {
            self.gmail_client
                .delete_message(token, &args.message_id)
                .await
                .map(|_| json!({
                    "status": "permanently_deleted",
                    "messageId": args.message_id,
                    "action": "The email has been permanently deleted and cannot be recovered.",
                }))
        } else {
            self.gmail_client
                .trash_message(token, &args.message_id)
                .await
                .map(|_| json!({
                    "status": "moved_to_trash",
                    "messageId": args.message_id,
                    "action": "The email has been moved to trash and can be restored if needed.",
                }))
        };

        match result {
            Ok(value) => CallToolResult::json(&value),
            Err(e) => CallToolResult::error(ToolError::operation("delete email", e).to_string()),
        }
    }

    async fn handle_list_labels(&self, token: &str) -> CallToolResult {
        match self.gmail_client.list_labels(token).await {
            Ok(list) => {
                let labels: Vec<Value> = list
                    .labels
                    .iter()
                    .map(|l| {
                        json!({
                            "id": l.id,
                            "name": l.name,
                            "type": l.label_type,
                            "messagesTotal": l.messages_total,
                            "messagesUnread": l.messages_unread,
                            "threadsTotal": l.threads_total,
                            "threadsUnread": l.threads_unread,
                        })
                    })
                    .collect();

                CallToolResult::json(&json!({
                    "totalLabels": labels.len(),
                    "labels": labels,
                }))
            }
            Err(e) => CallToolResult::error(ToolError::operation("list labels", e).to_string()),
        }
    }

    async fn handle_get_profile(&self, token: &str) -> CallToolResult {
        match self.gmail_client.get_profile(token).await {
            Ok(profile) => CallToolResult::json(&json!({
                "emailAddress": profile.email_address,
                "messagesTotal": profile.messages_total,
                "threadsTotal": profile.threads_total,
                "historyId": profile.history_id,
            })),
            Err(e) => {
                CallToolResult::error(ToolError::operation("get user profile", e).to_string())
            }
        }
    }
}

/// First 100 characters of the body, ellipsized when truncated
fn preview(body: &str) -> String {
    let truncated: String = body.chars().take(100).collect();
    if body.chars().count() > 100 {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

// ==================== Schema Definitions ====================

fn tool_def(name: &str, description: &str, input_schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
    }
}

fn empty_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

fn send_email_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "to": {
                "type": "string",
                "format": "email",
                "description": "Recipient"
            },
            "subj": {
                "type": "string",
                "description": "Subject line"
            },
            "body": {
                "type": "string",
                "description": "Email body"
            }
        },
        "required": ["to", "subj", "body"]
    })
}

fn create_draft_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "to": {
                "type": "string",
                "description": "Recipient email address"
            },
            "subject": {
                "type": "string",
                "description": "Email subject"
            },
            "body": {
                "type": "string",
                "description": "Email body content"
            },
            "cc": {
                "type": "string",
                "description": "CC recipients (comma-separated)"
            },
            "bcc": {
                "type": "string",
                "description": "BCC recipients (comma-separated)"
            }
        }
    })
}

fn read_email_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "messageId": {
                "type": "string",
                "description": "The ID of the email message to read"
            }
        },
        "required": ["messageId"]
    })
}

fn search_emails_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "Gmail search query (e.g., 'from:someone@example.com', 'subject:urgent')"
            },
            "maxResults": {
                "type": "number",
                "description": "Maximum number of results to return",
                "default": 10
            }
        },
        "required": ["query"]
    })
}

fn delete_email_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "messageId": {
                "type": "string",
                "description": "The ID of the email message to delete"
            },
            "permanent": {
                "type": "boolean",
                "description": "If true, permanently delete the email. If false, move to trash.",
                "default": false
            }
        },
        "required": ["messageId"]
    })
}
