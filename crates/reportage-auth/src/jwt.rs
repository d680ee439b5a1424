//! JWT encoding and decoding with the HS256 algorithm.
//!
//! Tokens are issued by the upstream SSO using a secret shared with this
//! service; this module signs tokens only for tests and local tooling.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::JwtClaims;
use crate::error::AuthError;

/// Clock skew tolerance in seconds for exp validation.
const LEEWAY_SECS: u64 = 60;

/// Encode JWT claims into a signed token string.
///
/// # Errors
///
/// Returns [`AuthError::InvalidKey`] if the secret is rejected.
pub fn encode_token(claims: &JwtClaims, secret: &[u8]) -> Result<String, AuthError> {
    let token = encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )?;
    Ok(token)
}

/// Decode and validate a token string into [`JwtClaims`].
///
/// Validates the signature and expiration (with a small leeway for clock
/// skew).
///
/// # Errors
///
/// Returns [`AuthError::TokenExpired`] for expired tokens and
/// [`AuthError::InvalidToken`] for any other validation failure.
pub fn decode_token(token: &str, secret: &[u8]) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = LEEWAY_SECS;
    // Audience is not used by this service.
    validation.validate_aud = false;

    let data = decode::<JwtClaims>(token, &DecodingKey::from_secret(secret), &validation)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-not-for-production";

    #[test]
    fn test_encode_decode_round_trip() {
        let claims = JwtClaims::builder()
            .subject("2b1e8a30-7a69-4f2c-9a0f-0f3a2a3f9b11")
            .roles(vec!["manager"])
            .expires_in_secs(3600)
            .build();

        let token = encode_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();

        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.roles, claims.roles);
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let claims = JwtClaims::builder()
            .subject("user-1")
            .expires_in_secs(3600)
            .build();
        let token = encode_token(&claims, SECRET).unwrap();

        let result = decode_token(&token, b"other-secret");
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_rejects_expired() {
        let claims = JwtClaims::builder()
            .subject("user-1")
            .expires_in_secs(-3600)
            .build();
        let token = encode_token(&claims, SECRET).unwrap();

        match decode_token(&token, SECRET) {
            Err(AuthError::TokenExpired) => {}
            other => panic!("expected TokenExpired, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_token("not.a.token", SECRET).is_err());
    }
}
