use crate::config::AuthConfig;
use crate::error::ServiceError;
use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use codevault_common::models::auth::{AuthResponse, Claims};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Hash a password using argon2id
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Issues and verifies HS256 JWTs. Keys are derived once from the configured
/// secret; access and refresh tokens differ only by TTL.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked exactly in `verify`
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            config.access_ttl_secs(),
            config.refresh_ttl_secs(),
        )
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }

    /// Sign a token for `subject` expiring `ttl_secs` from now
    pub fn issue(&self, subject: &str, ttl_secs: i64) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let exp = now
            .checked_add(ttl_secs)
            .context("Token expiry out of range")?;
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to sign token")
    }

    /// Fresh access + refresh pair for `subject`
    pub fn issue_pair(&self, subject: &str) -> Result<AuthResponse> {
        Ok(AuthResponse {
            access_token: self.issue(subject, self.access_ttl_secs)?,
            refresh_token: self.issue(subject, self.refresh_ttl_secs)?,
            expires_in: self.access_ttl_secs,
        })
    }

    /// Check signature, shape and expiry and return the claims.
    /// A token is expired once the current time reaches `exp`.
    pub fn claims(&self, token: &str) -> Result<Claims, ServiceError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                ServiceError::InvalidToken
            })?;

        if chrono::Utc::now().timestamp() >= data.claims.exp {
            tracing::debug!("Token rejected: expired");
            return Err(ServiceError::InvalidToken);
        }

        Ok(data.claims)
    }

    /// Subject of a valid token
    pub fn verify(&self, token: &str) -> Result<String, ServiceError> {
        self.claims(token).map(|claims| claims.sub)
    }

    pub fn is_valid(&self, token: &str) -> bool {
        self.verify(token).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-jwt-secret-that-is-long-enough!!";

    fn service() -> TokenService {
        TokenService::new(SECRET, 900, 30 * 24 * 3600)
    }

    #[test]
    fn test_password_hash_and_verify_correct() {
        let password = "my-secure-password";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_password_verify_wrong() {
        let hash = hash_password("correct-password").unwrap();
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_password_different_salts() {
        let password = "same-password";
        let hash1 = hash_password(password).unwrap();
        let hash2 = hash_password(password).unwrap();
        assert_ne!(hash1, hash2);
        assert!(verify_password(password, &hash1).unwrap());
        assert!(verify_password(password, &hash2).unwrap());
    }

    #[test]
    fn test_password_hash_is_not_plaintext() {
        let hash = hash_password("plain-password").unwrap();
        assert!(!hash.contains("plain-password"));
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service();
        let token = tokens.issue("ada@example.com", 60).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), "ada@example.com");
        assert!(tokens.is_valid(&token));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        let token = tokens.issue("ada@example.com", -10).unwrap();
        assert!(matches!(
            tokens.verify(&token),
            Err(ServiceError::InvalidToken)
        ));
        assert!(!tokens.is_valid(&token));
    }

    #[test]
    fn test_token_expiring_now_is_rejected() {
        let tokens = service();
        let token = tokens.issue("ada@example.com", 0).unwrap();
        assert!(!tokens.is_valid(&token));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let token = service().issue("ada@example.com", 60).unwrap();
        let other = TokenService::new("another-secret-that-is-long-enough!!!", 900, 900);
        assert!(!other.is_valid(&token));
    }

    #[test]
    fn test_tampered_payload_fails() {
        let tokens = service();
        let token = tokens.issue("ada@example.com", 60).unwrap();
        let forged_claims = tokens.issue("eve@example.com", 60).unwrap();

        // Header and signature from one token, payload from another
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged_claims.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);
        assert!(!tokens.is_valid(&spliced));
    }

    #[test]
    fn test_claims_rejects_expired() {
        let tokens = service();
        let token = tokens.issue("ada@example.com", -1).unwrap();
        assert!(matches!(
            tokens.claims(&token),
            Err(ServiceError::InvalidToken)
        ));
    }

    #[test]
    fn test_issue_rejects_overflowing_ttl() {
        assert!(service().issue("ada@example.com", i64::MAX).is_err());
    }

    #[test]
    fn test_malformed_token_fails() {
        let tokens = service();
        assert!(!tokens.is_valid("not-a-jwt"));
        assert!(!tokens.is_valid(""));
    }

    #[test]
    fn test_issue_pair_ttls() {
        let tokens = service();
        let pair = tokens.issue_pair("ada@example.com").unwrap();
        assert_eq!(pair.expires_in, 900);
        assert_ne!(pair.access_token, pair.refresh_token);

        let access = tokens.claims(&pair.access_token).unwrap();
        let refresh = tokens.claims(&pair.refresh_token).unwrap();
        assert_eq!(access.exp - access.iat, 900);
        assert_eq!(refresh.exp - refresh.iat, 30 * 24 * 3600);
        assert_eq!(refresh.sub, "ada@example.com");
    }
}
