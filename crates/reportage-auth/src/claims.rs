//! JWT claims structure with standard and custom claims.
//!
//! Provides the [`JwtClaims`] struct containing RFC 7519 standard claims and
//! the reportage-specific custom claims (role names, display name).

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

/// JWT claims containing standard and custom claims.
///
/// # Standard claims (RFC 7519)
///
/// - `sub`: subject (the user ID)
/// - `iss`: issuer
/// - `exp`: expiration time (Unix timestamp)
/// - `iat`: issued at (Unix timestamp)
///
/// # Custom claims
///
/// - `roles`: role names for authorization checks
/// - `name`: display name, carried for audit logging
///
/// # Example
///
/// ```
/// use reportage_auth::JwtClaims;
///
/// let claims = JwtClaims::builder()
///     .subject("8c5f9e9e-0000-0000-0000-000000000001")
///     .issuer("reportage")
///     .roles(vec!["manager"])
///     .expires_in_secs(3600)
///     .build();
///
/// assert!(claims.has_role("manager"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JwtClaims {
    /// Subject - the user ID.
    pub sub: String,

    /// Issuer - who created the token.
    pub iss: String,

    /// Expiration time as Unix timestamp.
    pub exp: i64,

    /// Issued at as Unix timestamp.
    pub iat: i64,

    /// Role names for authorization.
    #[serde(default)]
    pub roles: Vec<String>,

    /// User display name (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// User email address (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl JwtClaims {
    /// Create a new builder for constructing JWT claims.
    #[must_use]
    pub fn builder() -> JwtClaimsBuilder {
        JwtClaimsBuilder::default()
    }

    /// Check if the token is expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Check if the claims contain a specific role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Builder for [`JwtClaims`].
#[derive(Debug, Default)]
pub struct JwtClaimsBuilder {
    sub: Option<String>,
    iss: Option<String>,
    exp: Option<i64>,
    roles: Vec<String>,
    name: Option<String>,
    email: Option<String>,
}

impl JwtClaimsBuilder {
    /// Set the subject (user ID).
    #[must_use]
    pub fn subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Set the issuer.
    #[must_use]
    pub fn issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Set the role names.
    #[must_use]
    pub fn roles(mut self, roles: Vec<impl Into<String>>) -> Self {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Set the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the email address.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set expiration relative to now.
    #[must_use]
    pub fn expires_in_secs(mut self, secs: i64) -> Self {
        self.exp = Some((Utc::now() + Duration::seconds(secs)).timestamp());
        self
    }

    /// Build the claims. Missing fields default to empty values and a
    /// one-hour expiration.
    #[must_use]
    pub fn build(self) -> JwtClaims {
        let now = Utc::now();
        JwtClaims {
            sub: self.sub.unwrap_or_default(),
            iss: self.iss.unwrap_or_else(|| "reportage".to_string()),
            exp: self
                .exp
                .unwrap_or_else(|| (now + Duration::hours(1)).timestamp()),
            iat: now.timestamp(),
            roles: self.roles,
            name: self.name,
            email: self.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let claims = JwtClaims::builder().subject("user-1").build();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.iss, "reportage");
        assert!(!claims.is_expired());
        assert!(claims.roles.is_empty());
    }

    #[test]
    fn test_has_role() {
        let claims = JwtClaims::builder()
            .subject("user-1")
            .roles(vec!["manager", "admin"])
            .build();
        assert!(claims.has_role("manager"));
        assert!(claims.has_role("admin"));
        assert!(!claims.has_role("viewer"));
    }

    #[test]
    fn test_expired_claims() {
        let claims = JwtClaims::builder()
            .subject("user-1")
            .expires_in_secs(-10)
            .build();
        assert!(claims.is_expired());
    }

    #[test]
    fn test_serde_round_trip() {
        let claims = JwtClaims::builder()
            .subject("user-1")
            .roles(vec!["manager"])
            .email("a@example.com")
            .build();
        let json = serde_json::to_string(&claims).unwrap();
        let back: JwtClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(back, claims);
    }
}
