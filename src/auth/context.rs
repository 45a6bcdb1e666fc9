//! Per-request identity context produced by a successful verification

use std::collections::HashMap;

/// Well-known context keys
///
/// Tools read these by name without knowing which verifier populated them.
pub mod keys {
    /// Bearer access token used to call the Gmail API
    pub const ACCESS_TOKEN: &str = "accessToken";

    /// Subject id from a verified ID token
    pub const SUBJECT: &str = "sub";

    /// Email address from a verified ID token
    pub const EMAIL: &str = "email";

    /// Provenance tag for credentials that skipped cryptographic checks
    pub const SOURCE: &str = "source";
}

/// Verified identity and credential fields for one request
///
/// Built once by the verifier, read-only afterwards, and dropped with the
/// request. Nothing here is cached or persisted across requests.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    values: HashMap<String, String>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field during verification
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Read a field by name
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The Gmail access token, if the verifier attached one
    pub fn access_token(&self) -> Option<&str> {
        self.get(keys::ACCESS_TOKEN).filter(|t| !t.is_empty())
    }
}
