//! Gmail API client
//!
//! Thin wrapper over the Gmail REST surface. Every call takes the caller's
//! access token explicitly; the client holds no credentials of its own, so a
//! single instance serves concurrent requests for different identities.

use crate::config::gmail::{API_BASE_URL, USER_ID};
use crate::error::{GmailApiError, Result, ServerError};
use crate::gmail::mime::find_header;
use crate::gmail::types::*;

/// Metadata headers requested for search enrichment
const METADATA_HEADERS: &str = "metadataHeaders=From&metadataHeaders=Subject&metadataHeaders=Date";

/// Hard cap on per-message metadata lookups per search
const SEARCH_ENRICH_LIMIT: u32 = 20;

/// Gmail API client
pub struct GmailClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl Default for GmailClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GmailClient {
    /// Create a new Gmail client
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: API_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API endpoint (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Base URL for messages
    fn messages_url(&self) -> String {
        format!("{}/users/{}/messages", self.base_url, USER_ID)
    }

    /// Base URL for drafts
    fn drafts_url(&self) -> String {
        format!("{}/users/{}/drafts", self.base_url, USER_ID)
    }

    // ==================== Message Operations ====================

    /// Send a raw, already-encoded message
    pub async fn send_message(&self, token: &str, raw: String) -> Result<Message> {
        let url = format!("{}/send", self.messages_url());
        let request = SendMessageRequest { raw };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(request_failed("send message", response).await)
        }
    }

    /// Create a draft from a raw, already-encoded message
    pub async fn create_draft(&self, token: &str, raw: String) -> Result<Draft> {
        let request = CreateDraftRequest {
            message: SendMessageRequest { raw },
        };

        let response = self
            .http_client
            .post(self.drafts_url())
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(request_failed("create draft", response).await)
        }
    }

    /// Get a full message by ID
    pub async fn get_message(&self, token: &str, message_id: &str) -> Result<Message> {
        let url = format!("{}/{}?format=full", self.messages_url(), message_id);

        let response = self.http_client.get(&url).bearer_auth(token).send().await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else if response.status().as_u16() == 404 {
            Err(ServerError::Gmail(GmailApiError::MessageNotFound {
                message_id: message_id.to_string(),
            }))
        } else {
            Err(request_failed("get message", response).await)
        }
    }

    /// Get metadata (From/Subject/Date headers and snippet) for a message
    pub async fn get_message_metadata(&self, token: &str, message_id: &str) -> Result<Message> {
        let url = format!(
            "{}/{}?format=metadata&{}",
            self.messages_url(),
            message_id,
            METADATA_HEADERS
        );

        let response = self.http_client.get(&url).bearer_auth(token).send().await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(request_failed("get message metadata", response).await)
        }
    }

    /// List message ids matching a Gmail search query
    pub async fn list_messages(
        &self,
        token: &str,
        query: &str,
        max_results: u32,
    ) -> Result<MessageList> {
        let url = format!(
            "{}?q={}&maxResults={}",
            self.messages_url(),
            urlencoding::encode(query),
            max_results
        );

        let response = self.http_client.get(&url).bearer_auth(token).send().await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(request_failed("list messages", response).await)
        }
    }

    /// Search for messages and enrich each hit with its metadata
    ///
    /// Fetches metadata for at most `min(max_results, 20)` ids. Results keep
    /// the order of the id list; a failed per-message lookup is logged and
    /// skipped without aborting the batch.
    pub async fn search_messages(
        &self,
        token: &str,
        query: &str,
        max_results: u32,
    ) -> Result<SearchResult> {
        let list = self.list_messages(token, query, max_results).await?;
        let total = list.messages.len();

        let limit = max_results.min(SEARCH_ENRICH_LIMIT) as usize;
        let mut entries = Vec::new();

        for msg_ref in list.messages.into_iter().take(limit) {
            match self.get_message_metadata(token, &msg_ref.id).await {
                Ok(message) => {
                    let payload = message.payload.as_ref();
                    entries.push(SearchEntry {
                        id: msg_ref.id,
                        thread_id: msg_ref.thread_id,
                        snippet: message.snippet.clone().unwrap_or_default(),
                        from: header_or_empty(payload, "from"),
                        subject: header_or_empty(payload, "subject"),
                        date: header_or_empty(payload, "date"),
                    });
                }
                Err(e) => {
                    tracing::warn!("skipping metadata for message {}: {}", msg_ref.id, e);
                }
            }
        }

        Ok(SearchResult {
            total_results: total,
            entries,
        })
    }

    /// Move a message to trash
    pub async fn trash_message(&self, token: &str, message_id: &str) -> Result<()> {
        let url = format!("{}/{}/trash", self.messages_url(), message_id);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .header("Content-Length", "0")
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else if response.status().as_u16() == 404 {
            Err(ServerError::Gmail(GmailApiError::MessageNotFound {
                message_id: message_id.to_string(),
            }))
        } else {
            Err(request_failed("trash message", response).await)
        }
    }

    /// Permanently delete a message
    pub async fn delete_message(&self, token: &str, message_id: &str) -> Result<()> {
        let url = format!("{}/{}", self.messages_url(), message_id);

        let response = self
            .http_client
            .delete(&url)
            .bearer_auth(token)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else if response.status().as_u16() == 404 {
            Err(ServerError::Gmail(GmailApiError::MessageNotFound {
                message_id: message_id.to_string(),
            }))
        } else {
            Err(request_failed("delete message", response).await)
        }
    }

    // ==================== Label and Profile Operations ====================

    /// List all labels
    pub async fn list_labels(&self, token: &str) -> Result<LabelList> {
        let url = format!("{}/users/{}/labels", self.base_url, USER_ID);

        let response = self.http_client.get(&url).bearer_auth(token).send().await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(request_failed("list labels", response).await)
        }
    }

    /// Get the authenticated user's mailbox profile
    pub async fn get_profile(&self, token: &str) -> Result<Profile> {
        let url = format!("{}/users/{}/profile", self.base_url, USER_ID);

        let response = self.http_client.get(&url).bearer_auth(token).send().await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(request_failed("get profile", response).await)
        }
    }
}

/// One enriched search hit
#[derive(Debug, Clone)]
pub struct SearchEntry {
    pub id: String,
    pub thread_id: String,
    pub snippet: String,
    pub from: String,
    pub subject: String,
    pub date: String,
}

/// Result of a search-and-enrich pass
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Number of ids the query matched (before enrichment)
    pub total_results: usize,

    /// Enriched entries, in the order the query returned them
    pub entries: Vec<SearchEntry>,
}

fn header_or_empty(payload: Option<&MessagePart>, name: &str) -> String {
    payload
        .and_then(|p| find_header(p, name))
        .unwrap_or("")
        .to_string()
}

async fn request_failed(what: &str, response: reqwest::Response) -> ServerError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    ServerError::Gmail(GmailApiError::RequestFailed {
        message: format!("Failed to {} ({}): {}", what, status, text),
    })
}
