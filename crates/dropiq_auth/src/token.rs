//! Bearer tokens (HS256 JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AuthResult;

/// Claims carried by a DropIQ bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Role at issue time. Handlers re-read the user, so this is informational.
    pub role: String,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
}

/// Issues and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a token for a user.
    pub fn issue(&self, user_id: &str, role: &str) -> AuthResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        self.encode(&claims)
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .inspect_err(|e| tracing::debug!("Rejected bearer token: {}", e))?;
        Ok(data.claims)
    }

    fn encode(&self, claims: &Claims) -> AuthResult<String> {
        Ok(encode(&Header::default(), claims, &self.encoding_key)?)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;

    #[test]
    fn test_issue_and_verify() {
        let service = TokenService::new("test-secret", 24);
        let token = service.issue("user-1", "admin").unwrap();
        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenService::new("one", 1).issue("u", "user").unwrap();
        let err = TokenService::new("two", 1).verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::Token(_)));
    }

    #[test]
    fn test_expired_rejected() {
        let service = TokenService::new("secret", 1);
        let past = Utc::now() - Duration::hours(2);
        let token = service
            .encode(&Claims {
                sub: "u".into(),
                role: "user".into(),
                exp: past.timestamp(),
                iat: (past - Duration::hours(1)).timestamp(),
            })
            .unwrap();
        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let service = TokenService::new("secret", 1);
        assert!(service.verify("not.a.token").is_err());
    }
}
