//! The gate between the HTTP transport and tool execution

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::auth::verifier::{AuthDecision, CredentialVerifier};
use crate::config::AuthMode;
use crate::error::Result;

/// Authorizes inbound requests with the one verifier configured at startup
///
/// A rejection passes the verifier's (status, message) pair through untouched;
/// an acceptance yields the context that is handed to every tool call made by
/// the request. Auth failures never reach tool logic.
pub struct AuthGate {
    verifier: Arc<dyn CredentialVerifier>,
}

impl AuthGate {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    /// Build the gate for a configured auth mode
    pub fn from_mode(mode: &AuthMode) -> Result<Self> {
        use crate::auth::{BearerIdTokenVerifier, HeaderPassthroughVerifier};

        let verifier: Arc<dyn CredentialVerifier> = match mode {
            AuthMode::HeaderToken => Arc::new(HeaderPassthroughVerifier::new()),
            AuthMode::GoogleIdToken { client_id } => {
                Arc::new(BearerIdTokenVerifier::new(client_id.clone())?)
            }
        };

        Ok(Self::new(verifier))
    }

    pub async fn authorize(&self, headers: &HeaderMap) -> AuthDecision {
        self.verifier.verify(headers).await
    }
}
