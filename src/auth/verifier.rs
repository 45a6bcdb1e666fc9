//! The verifier seam: one capability, two implementations

use async_trait::async_trait;
use axum::http::HeaderMap;

use crate::auth::context::AuthContext;
use crate::error::AuthError;

/// Outcome of verifying one inbound request
///
/// Exactly one variant holds. A rejection carries the [`AuthError`] whose
/// (status, message) pair is returned to the caller unchanged.
#[derive(Debug, Clone)]
pub enum AuthDecision {
    Accepted(AuthContext),
    Rejected(AuthError),
}

impl AuthDecision {
    /// A 401 rejection with the given message
    pub fn rejected(message: impl Into<String>) -> Self {
        AuthDecision::Rejected(AuthError::unauthorized(message))
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, AuthDecision::Accepted(_))
    }
}

/// Decides whether an inbound request is authorized and what identity context
/// downstream tool logic receives.
///
/// Implementations are chosen at deployment time, never per request. They
/// must not panic on malformed input: every bad credential is a `Rejected`.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, headers: &HeaderMap) -> AuthDecision;
}

/// Extract a header that must appear exactly once
///
/// A duplicated header is ambiguous input and yields `None`, the same as an
/// absent or non-UTF-8 value. Callers reject rather than pick a value.
pub(crate) fn single_header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let mut values = headers.get_all(name).iter();
    let first = values.next()?;
    if values.next().is_some() {
        return None;
    }
    first.to_str().ok()
}
