//! Access token issuing and validation (HS256)

use anyhow::Result;
use domain::{Role, User};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    get_current_timestamp,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtSettings;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a string per RFC 7519
    pub sub: String,
    pub login: String,
    pub role: Role,
    /// Token id, used for revocation
    pub jti: String,
    pub iat: u64,
    pub exp: u64,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    /// Seconds until the token expires
    pub fn remaining_lifetime(&self) -> u64 {
        self.exp.saturating_sub(get_current_timestamp())
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_expiry: u64,
}

impl JwtService {
    pub fn new(settings: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
            access_token_expiry: settings.access_token_expiry,
        }
    }

    /// Issue an access token for `user`
    pub fn issue(&self, user: &User) -> Result<(String, Claims)> {
        let now = get_current_timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            login: user.login.clone(),
            role: user.role,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.access_token_expiry,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok((token, claims))
    }

    /// Validate signature and expiry and return the claims
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn service(secret: &str, expiry: u64) -> JwtService {
        JwtService::new(&JwtSettings {
            secret: secret.to_string(),
            access_token_expiry: expiry,
        })
    }

    fn user() -> User {
        User {
            id: 42,
            login: "ann".to_string(),
            role: Role::Manager,
            full_name: "Ann Lee".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_validates() {
        let jwt = service("a-very-long-test-secret", 3600);
        let (token, issued) = jwt.issue(&user()).unwrap();
        let claims = jwt.validate(&token).unwrap();

        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.login, "ann");
        assert_eq!(claims.jti, issued.jti);
        assert!(claims.remaining_lifetime() <= 3600);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let (token, _) = service("a-very-long-test-secret", 3600)
            .issue(&user())
            .unwrap();
        assert!(service("another-long-test-secret", 3600).validate(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = service("a-very-long-test-secret", 0);
        let (token, _) = jwt.issue(&user()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(jwt.validate(&token).is_err());
    }

    #[test]
    fn each_token_has_a_fresh_id() {
        let jwt = service("a-very-long-test-secret", 60);
        let (_, a) = jwt.issue(&user()).unwrap();
        let (_, b) = jwt.issue(&user()).unwrap();
        assert_ne!(a.jti, b.jti);
    }
}
