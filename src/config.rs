//! Configuration management for the Gmail MCP HTTP server
//!
//! Handles environment variables and deployment-time settings.

use crate::error::{ConfigError, Result, ServerError};

/// How inbound requests are authenticated
///
/// Selected once at startup; the server never negotiates between modes per
/// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Trust a pre-validated access token in the `x-google-access-token`
    /// header. The OAuth flow happens in a parent application.
    HeaderToken,

    /// Verify a Google ID token from the `Authorization` header against the
    /// given OAuth client id.
    GoogleIdToken { client_id: String },
}

/// Configuration for the Gmail MCP HTTP server
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP transport listens on
    pub port: u16,

    /// Configured authentication mode
    pub auth_mode: AuthMode,
}

impl Config {
    /// Build configuration from the environment
    ///
    /// `PORT` defaults to 8080. `GMAIL_AUTH_MODE` is `header` (default) or
    /// `google-id-token`; the latter requires `GOOGLE_CLIENT_ID`.
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let mode = std::env::var("GMAIL_AUTH_MODE").unwrap_or_else(|_| "header".to_string());

        let auth_mode = match mode.as_str() {
            "header" => AuthMode::HeaderToken,
            "google-id-token" => {
                let client_id = std::env::var("GOOGLE_CLIENT_ID").map_err(|_| {
                    ServerError::Config(ConfigError::MissingEnvVar {
                        var: "GOOGLE_CLIENT_ID".to_string(),
                    })
                })?;
                AuthMode::GoogleIdToken { client_id }
            }
            other => {
                return Err(ServerError::Config(ConfigError::InvalidConfig {
                    message: format!("unknown GMAIL_AUTH_MODE: {}", other),
                }))
            }
        };

        Ok(Self { port, auth_mode })
    }
}

/// Gmail API constants
pub mod gmail {
    /// Base URL for Gmail API
    pub const API_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

    /// User ID for the authenticated user
    pub const USER_ID: &str = "me";
}

/// Inbound header names consumed by the credential verifiers
pub mod headers {
    /// Carries the Google ID token as `Bearer <jwt>`
    pub const AUTHORIZATION: &str = "authorization";

    /// Carries the Google access token used to call the Gmail API
    pub const ACCESS_TOKEN: &str = "x-google-access-token";
}

/// Google identity provider endpoints
pub mod google {
    /// Current RSA signing keys for Google-issued ID tokens
    pub const JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

    /// Accepted `iss` claim values
    pub const ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_header_mode() {
        // Runs without GMAIL_AUTH_MODE set in the test environment
        if std::env::var("GMAIL_AUTH_MODE").is_err() {
            let config = Config::from_env().unwrap();
            assert_eq!(config.auth_mode, AuthMode::HeaderToken);
        }
    }

    #[test]
    fn test_header_names_are_lowercase() {
        assert_eq!(headers::ACCESS_TOKEN, "x-google-access-token");
        assert!(headers::AUTHORIZATION.chars().all(|c| !c.is_uppercase()));
    }
}
