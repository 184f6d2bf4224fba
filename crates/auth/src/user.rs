use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use supplyline_core::{DomainError, DomainResult, UserId};

use crate::password;
use crate::role::Role;

/// A registered account. The password hash never leaves this crate's
/// verification path; API responses use [`UserProfile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<Role>,
}

/// Hash-free projection of a user, safe to serialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl User {
    pub fn register(input: NewUser, now: DateTime<Utc>) -> DomainResult<Self> {
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation(
                "please provide a valid email address",
            ));
        }
        if input.password.len() < 6 {
            return Err(DomainError::validation(
                "password must be at least 6 characters",
            ));
        }
        let first_name = input.first_name.trim();
        let last_name = input.last_name.trim();
        if first_name.is_empty() {
            return Err(DomainError::validation("firstName cannot be empty"));
        }
        if last_name.is_empty() {
            return Err(DomainError::validation("lastName cannot be empty"));
        }
        Ok(Self {
            id: UserId::new(),
            email,
            password_hash: password::hash(&input.password),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role: input.role.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn verify_password(&self, candidate: &str) -> bool {
        password::verify(candidate, &self.password_hash)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            email: "ops@supplyline.example".to_string(),
            password: "hunter22".to_string(),
            first_name: "Sam".to_string(),
            last_name: "Ito".to_string(),
            role: None,
        }
    }

    #[test]
    fn register_normalizes_email_and_defaults_role() {
        let mut input = new_user();
        input.email = " Ops@Supplyline.Example ".to_string();
        let user = User::register(input, Utc::now()).unwrap();
        assert_eq!(user.email, "ops@supplyline.example");
        assert_eq!(user.role, Role::WarehouseOp);
        assert_eq!(user.full_name(), "Sam Ito");
    }

    #[test]
    fn register_hashes_and_verifies_password() {
        let user = User::register(new_user(), Utc::now()).unwrap();
        assert_ne!(user.password_hash, "hunter22");
        assert!(user.verify_password("hunter22"));
        assert!(!user.verify_password("hunter23"));
    }

    #[test]
    fn register_rejects_short_password() {
        let mut input = new_user();
        input.password = "12345".to_string();
        let err = User::register(input, Utc::now()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn register_rejects_bad_email() {
        let mut input = new_user();
        input.email = "not-an-email".to_string();
        assert!(User::register(input, Utc::now()).is_err());
    }

    #[test]
    fn profile_carries_no_hash() {
        let user = User::register(new_user(), Utc::now()).unwrap();
        let json = serde_json::to_value(user.profile()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "WAREHOUSE_OP");
    }
}
