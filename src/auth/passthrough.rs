//! Trust-the-caller verification via the access-token header

use async_trait::async_trait;
use axum::http::HeaderMap;

use crate::auth::context::{keys, AuthContext};
use crate::auth::verifier::{single_header_value, AuthDecision, CredentialVerifier};
use crate::config::headers;

const REJECTION_MESSAGE: &str = "Missing or invalid x-google-access-token header";

/// Accepts a Google access token supplied in the `x-google-access-token`
/// header without cryptographic validation.
///
/// For deployments where a parent application owns the OAuth flow and hands
/// an already-valid token to this server; the trust boundary is the caller's.
#[derive(Debug, Default)]
pub struct HeaderPassthroughVerifier;

impl HeaderPassthroughVerifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CredentialVerifier for HeaderPassthroughVerifier {
    async fn verify(&self, headers: &HeaderMap) -> AuthDecision {
        let token = match single_header_value(headers, headers::ACCESS_TOKEN) {
            Some(t) if !t.is_empty() => t,
            _ => return AuthDecision::rejected(REJECTION_MESSAGE),
        };

        let mut ctx = AuthContext::new();
        ctx.insert(keys::ACCESS_TOKEN, token);
        ctx.insert(keys::SOURCE, "header");
        AuthDecision::Accepted(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn verify(headers: &HeaderMap) -> AuthDecision {
        tokio_test::block_on(HeaderPassthroughVerifier::new().verify(headers))
    }

    #[test]
    fn test_missing_header_rejected() {
        let decision = verify(&HeaderMap::new());
        match decision {
            AuthDecision::Rejected(err) => {
                assert_eq!(err.status(), 401);
                assert_eq!(err.to_string(), REJECTION_MESSAGE);
            }
            _ => panic!("expected rejection"),
        }
    }

    #[test]
    fn test_duplicated_header_rejected() {
        let mut headers = HeaderMap::new();
        headers.append("x-google-access-token", HeaderValue::from_static("a"));
        headers.append("x-google-access-token", HeaderValue::from_static("b"));
        assert!(!verify(&headers).is_accepted());
    }

    #[test]
    fn test_valid_header_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-google-access-token",
            HeaderValue::from_static("ya29.valid"),
        );

        match verify(&headers) {
            AuthDecision::Accepted(ctx) => {
                assert_eq!(ctx.access_token(), Some("ya29.valid"));
                assert_eq!(ctx.get(keys::SOURCE), Some("header"));
            }
            _ => panic!("expected acceptance"),
        }
    }
}
