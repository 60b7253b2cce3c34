//! User accounts and password hashing.

use crate::error::{BookingError, BookingResult};
use crate::record_id::RecordId;
use chrono::{DateTime, Utc};
use medibook_types::EmailAddress;
use pbkdf2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Pbkdf2,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role attached to an account and carried in issued bearer tokens.
///
/// `Admin` gates doctor-catalog mutation only; appointment endpoints require authentication
/// but no specific role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// A stored user account.
///
/// The password hash is a PBKDF2 PHC string; it is stored alongside the account document
/// and never serialized into API responses (see [`UserAccount::public`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: RecordId,
    pub name: String,
    pub email: EmailAddress,
    pub phone: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The API-visible subset of an account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    #[schema(value_type = String)]
    pub id: RecordId,
    pub name: String,
    #[schema(value_type = String)]
    pub email: EmailAddress,
    pub role: Role,
}

impl UserAccount {
    /// Returns the account stripped to its API-visible fields.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Hashes a password into a PBKDF2 PHC string with a fresh random salt.
pub(crate) fn hash_password(password: &str) -> BookingResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Pbkdf2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| BookingError::PasswordHash(e.to_string()))
}

/// Verifies a candidate password against a stored PHC string.
///
/// Unparsable stored hashes verify as false rather than erroring, so a corrupted account
/// document cannot be logged into.
pub(crate) fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("secret123").unwrap();
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("secret124", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("secret123").unwrap();
        let second = hash_password("secret123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("secret123", "not-a-phc-string"));
    }

    #[test]
    fn test_public_view_has_no_password_hash() {
        let now = Utc::now();
        let account = UserAccount {
            id: RecordId::new(),
            name: "Pat".into(),
            email: EmailAddress::parse("pat@example.com").unwrap(),
            phone: "5550100".into(),
            password_hash: hash_password("secret123").unwrap(),
            role: Role::User,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(account.public()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "user");
    }
}
