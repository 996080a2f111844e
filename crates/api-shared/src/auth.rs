//! Request authentication.
//!
//! The server asks an [`Authenticator`] whether the caller's [`Credentials`] are acceptable
//! before serving any `/patients` route. [`ApiKeyAuthenticator`] checks a shared key sent in
//! the `x-api-key` header.

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing x-api-key header")]
    MissingKey,
    #[error("invalid API key")]
    InvalidKey,
}

/// What a caller presented with a request.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub api_key: Option<String>,
}

impl Credentials {
    pub fn api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
        }
    }
}

pub trait Authenticator: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`AuthError`] describing why the credentials were refused.
    fn authenticate(&self, credentials: &Credentials) -> Result<(), AuthError>;
}

/// Accepts requests carrying the configured key.
#[derive(Clone)]
pub struct ApiKeyAuthenticator {
    expected: String,
}

impl ApiKeyAuthenticator {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl std::fmt::Debug for ApiKeyAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuthenticator")
            .field("expected", &"<redacted>")
            .finish()
    }
}

impl Authenticator for ApiKeyAuthenticator {
    fn authenticate(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let provided = credentials.api_key.as_deref().ok_or(AuthError::MissingKey)?;
        if keys_match(provided.as_bytes(), self.expected.as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::InvalidKey)
        }
    }
}

/// Compares every byte regardless of where the first difference is.
fn keys_match(provided: &[u8], expected: &[u8]) -> bool {
    let mut diff = provided.len() ^ expected.len();
    for (i, &byte) in expected.iter().enumerate() {
        let other = provided.get(i).copied().unwrap_or(0);
        diff |= usize::from(byte ^ other);
    }
    diff == 0
}
