//! Authentication error types.

use thiserror::Error;

/// Errors produced while encoding or validating tokens.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The signing secret was rejected by the JWT library.
    #[error("Invalid signing key")]
    InvalidKey,

    /// The token failed signature or structural validation.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The token is past its expiration time.
    #[error("Token expired")]
    TokenExpired,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            ErrorKind::InvalidKeyFormat | ErrorKind::InvalidRsaKey(_) => Self::InvalidKey,
            _ => Self::InvalidToken(err.to_string()),
        }
    }
}
