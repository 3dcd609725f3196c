pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::database::models::Account;
use crate::types::UserType;

pub use password::{PasswordError, PasswordHashing};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "accountID")]
    pub account_id: i32,
    #[serde(rename = "userType")]
    pub user_type: UserType,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    Encode(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// Signs and validates session tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    expiry: Duration,
}

impl TokenIssuer {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            secret: security.jwt_secret.clone(),
            expiry: Duration::hours(security.jwt_expiry_hours as i64),
        }
    }

    /// Token lifetime in seconds, used for the cookie `Max-Age`
    pub fn lifetime_secs(&self) -> i64 {
        self.expiry.num_seconds()
    }

    pub fn issue(&self, account: &Account) -> Result<String, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::MissingSecret);
        }

        let now = Utc::now();
        let claims = Claims {
            account_id: account.id,
            user_type: account.user_type,
            exp: (now + self.expiry).timestamp(),
            iat: now.timestamp(),
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
            .map_err(|e| JwtError::Encode(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        decode::<Claims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn security(secret: &str) -> SecurityConfig {
        SecurityConfig {
            jwt_secret: secret.to_string(),
            jwt_expiry_hours: 24,
            cookie_secure: false,
            enable_cors: false,
            cors_origins: vec![],
        }
    }

    fn account(user_type: UserType) -> Account {
        Account {
            id: 42,
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@navy.mil".into(),
            encrypted_password: String::new(),
            user_type,
        }
    }

    fn sign(secret: &str, algorithm: Algorithm, claims: serde_json::Value) -> String {
        encode(
            &Header::new(algorithm),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issued_token_round_trips() {
        let issuer = TokenIssuer::new(&security("test-secret"));
        let token = issuer.issue(&account(UserType::Admin)).unwrap();
        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.account_id, 42);
        assert_eq!(claims.user_type, UserType::Admin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn empty_secret_fails_closed() {
        let issuer = TokenIssuer::new(&security(""));
        assert!(matches!(
            issuer.issue(&account(UserType::Regular)),
            Err(JwtError::MissingSecret)
        ));
        assert!(matches!(issuer.validate("a.b.c"), Err(JwtError::MissingSecret)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = TokenIssuer::new(&security("one"))
            .issue(&account(UserType::Regular))
            .unwrap();
        let err = TokenIssuer::new(&security("two")).validate(&token).unwrap_err();
        assert!(matches!(err, JwtError::InvalidToken(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let past = Utc::now().timestamp() - 3600;
        let token = sign(
            "s",
            Algorithm::HS256,
            json!({"accountID": 1, "userType": "Regular", "exp": past, "iat": past - 60}),
        );
        assert!(TokenIssuer::new(&security("s")).validate(&token).is_err());
    }

    #[test]
    fn any_hmac_algorithm_is_accepted() {
        let exp = Utc::now().timestamp() + 600;
        let token = sign(
            "s",
            Algorithm::HS512,
            json!({"accountID": 3, "userType": "Regular", "exp": exp, "iat": exp - 600}),
        );
        let claims = TokenIssuer::new(&security("s")).validate(&token).unwrap();
        assert_eq!(claims.account_id, 3);
    }

    #[test]
    fn unknown_user_type_is_rejected() {
        let exp = Utc::now().timestamp() + 600;
        let token = sign(
            "s",
            Algorithm::HS256,
            json!({"accountID": 1, "userType": "Root", "exp": exp, "iat": exp - 600}),
        );
        assert!(matches!(
            TokenIssuer::new(&security("s")).validate(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(TokenIssuer::new(&security("s")).validate("not-a-token").is_err());
    }
}
