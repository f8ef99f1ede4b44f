use darzi_core::{DarziError, DarziResult};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Access-token lifetime. Kept short; clients are expected to rotate via the
/// refresh cookie.
const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Claims for a stateless access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Create an HS256 access token for an account, expiring in 15 minutes.
pub fn create_access_token(account_id: &str, secret: &str) -> DarziResult<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = AccessTokenClaims {
        sub: account_id.to_string(),
        iat: now,
        exp: now + ACCESS_TOKEN_TTL_SECS,
    };
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| DarziError::Auth(e.to_string()))
}

/// Validate an access token and return its claims.
pub fn validate_access_token(token: &str, secret: &str) -> DarziResult<AccessTokenClaims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();
    let token_data = decode::<AccessTokenClaims>(token, &key, &validation)
        .map_err(|e| DarziError::Auth(e.to_string()))?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-jwt-tests";
    const OTHER_SECRET: &str = "different-secret-key-for-jwt";
    const ACCOUNT_ID: &str = "b9c2e0c4-4f6a-4dc8-9e2e-1f2a3b4c5d6e";

    #[test]
    fn access_token_roundtrip() {
        let token = create_access_token(ACCOUNT_ID, SECRET).unwrap();
        let claims = validate_access_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, ACCOUNT_ID);
    }

    #[test]
    fn wrong_secret_fails() {
        let token = create_access_token(ACCOUNT_ID, SECRET).unwrap();
        assert!(validate_access_token(&token, OTHER_SECRET).is_err());
    }

    #[test]
    fn access_token_has_15_minute_expiry() {
        let token = create_access_token(ACCOUNT_ID, SECRET).unwrap();
        let claims = validate_access_token(&token, SECRET).unwrap();
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn expired_token_fails_validation() {
        let now = chrono::Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: ACCOUNT_ID.to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let key = EncodingKey::from_secret(SECRET.as_bytes());
        let token = encode(&Header::default(), &claims, &key).unwrap();

        assert!(validate_access_token(&token, SECRET).is_err());
    }
}
