//! Credential verification for inbound tool requests
//!
//! A request is authorized by exactly one [`CredentialVerifier`], selected at
//! startup, and the resulting [`AuthContext`] is threaded explicitly into
//! every tool invocation for that request.

pub mod context;
pub mod gate;
pub mod google;
pub mod passthrough;
pub mod verifier;

pub use context::AuthContext;
pub use gate::AuthGate;
pub use google::BearerIdTokenVerifier;
pub use passthrough::HeaderPassthroughVerifier;
pub use verifier::{AuthDecision, CredentialVerifier};
