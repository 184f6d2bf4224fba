use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use supplyline_core::{DomainError, DomainResult, UserId};

use crate::role::Role;
use crate::user::User;

pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Claims carried in access tokens. `sub` is the user id; email and role
/// ride along so the middleware can build request context without a user
/// lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 encoder/decoder around a shared secret.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> DomainResult<String> {
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::storage(format!("token encoding failed: {e}")))
    }

    pub fn verify(&self, token: &str) -> DomainResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| DomainError::unauthorized("invalid or expired token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::NewUser;

    fn test_user() -> User {
        User::register(
            NewUser {
                email: "ops@supplyline.example".to_string(),
                password: "hunter22".to_string(),
                first_name: "Sam".to_string(),
                last_name: "Ito".to_string(),
                role: Some(Role::Manager),
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let codec = TokenCodec::new("test-secret");
        let user = test_user();
        let token = codec.issue(&user, Utc::now()).unwrap();
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, Role::Manager);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let user = test_user();
        let token = TokenCodec::new("secret-a")
            .issue(&user, Utc::now())
            .unwrap();
        let err = TokenCodec::new("secret-b").verify(&token).unwrap_err();
        match err {
            DomainError::Unauthorized(_) => {}
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[test]
    fn expired_token_is_rejected() {
        let user = test_user();
        let codec = TokenCodec::new("test-secret").with_ttl(Duration::hours(1));
        // Issued far enough back that the default leeway cannot save it.
        let issued = Utc::now() - Duration::hours(3);
        let token = codec.issue(&user, issued).unwrap();
        assert!(codec.verify(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let codec = TokenCodec::new("test-secret");
        assert!(codec.verify("not.a.jwt").is_err());
    }
}
