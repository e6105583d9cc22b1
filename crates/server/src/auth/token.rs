//! HS256 session tokens carried in the session cookie (or a Bearer header).

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// The pilot's id.
    pub sub: String,
    /// The pilot's username, for log lines and display.
    pub username: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Signing configuration for session tokens.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub token_secret: String,
    /// Session lifetime in hours.
    pub session_ttl_hours: i64,
}

pub fn generate_session_token(
    pilot_id: &str,
    username: &str,
    config: &AuthConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: pilot_id.to_string(),
        username: username.to_string(),
        exp: now + config.session_ttl_hours * 3600,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.token_secret.as_bytes()),
    )
}

pub fn validate_session_token(
    token: &str,
    config: &AuthConfig,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.token_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            token_secret: "test-secret-not-for-production".to_string(),
            session_ttl_hours: 12,
        }
    }

    #[test]
    fn token_round_trip() {
        let config = test_config();
        let token = generate_session_token("pilot-id-1", "alice", &config)
            .expect("token should generate");

        let claims = validate_session_token(&token, &config).expect("token should validate");

        assert_eq!(claims.sub, "pilot-id-1");
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let config = test_config();
        let other = AuthConfig {
            token_secret: "a-different-secret".to_string(),
            session_ttl_hours: 12,
        };

        let token =
            generate_session_token("pilot-id-1", "alice", &other).expect("token should generate");

        assert!(validate_session_token(&token, &config).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(validate_session_token("not-a-token", &test_config()).is_err());
    }
}
