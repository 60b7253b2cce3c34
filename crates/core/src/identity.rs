//! Identity store: registration, credential verification, admin seeding.

use crate::account::{hash_password, verify_password, Role, UserAccount};
use crate::config::CoreConfig;
use crate::constants::USER_FILE_NAME;
use crate::error::{BookingError, BookingResult};
use crate::record_id::RecordId;
use crate::store;
use chrono::Utc;
use medibook_types::{EmailAddress, NonEmptyText};
use serde::Deserialize;
use std::fs;
use std::sync::Arc;
use utoipa::ToSchema;

/// Registration payload as submitted by the caller.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn required_text(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Pure identity data operations - no API concerns
#[derive(Clone)]
pub struct IdentityService {
    cfg: Arc<CoreConfig>,
}

impl IdentityService {
    /// Creates a new instance of IdentityService.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Registers a new account with the `user` role.
    ///
    /// The email is normalised to lowercase and must not already be taken; the password is
    /// stored only as a PBKDF2 hash.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidInput` when a field is missing or the email is not
    /// plausible, `BookingError::DuplicateEmail` when an account with the same email
    /// already exists, or a storage error if the document write fails.
    pub fn register(&self, input: NewAccount) -> BookingResult<UserAccount> {
        let missing = || BookingError::InvalidInput("All fields are required".into());

        let name =
            NonEmptyText::new(input.name.unwrap_or_default()).map_err(|_| missing())?;
        let phone =
            NonEmptyText::new(input.phone.unwrap_or_default()).map_err(|_| missing())?;
        let email_raw = required_text(input.email).ok_or_else(missing)?;
        let password = required_text(input.password).ok_or_else(missing)?;

        let email = EmailAddress::parse(&email_raw)
            .map_err(|_| BookingError::InvalidInput("Please enter a valid email".into()))?;

        self.insert_account(
            name.as_str().to_owned(),
            email,
            phone.as_str().to_owned(),
            &password,
            Role::User,
        )
    }

    /// Looks up an account by email, case-insensitively.
    pub fn find_by_email(&self, email: &EmailAddress) -> Option<UserAccount> {
        store::scan_collection::<UserAccount>(&self.cfg.users_dir(), USER_FILE_NAME)
            .into_iter()
            .find(|account| account.email == *email)
    }

    /// Verifies a login attempt and returns the matching account.
    ///
    /// Unknown emails and wrong passwords fail identically so that the response does not
    /// reveal which accounts exist.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidCredentials` on any mismatch.
    pub fn verify_login(&self, email: &str, password: &str) -> BookingResult<UserAccount> {
        let email = EmailAddress::parse(email)
            .map_err(|_| BookingError::InvalidCredentials)?;

        let account = self
            .find_by_email(&email)
            .ok_or(BookingError::InvalidCredentials)?;

        if !verify_password(password, &account.password_hash) {
            return Err(BookingError::InvalidCredentials);
        }

        Ok(account)
    }

    /// Creates an `admin` account unless one with the given email already exists.
    ///
    /// Returns `true` when an account was created and `false` when the email was already
    /// taken. Used at startup to seed the administrator from the environment.
    pub fn ensure_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> BookingResult<bool> {
        let email = EmailAddress::parse(email)
            .map_err(|_| BookingError::InvalidInput("Please enter a valid email".into()))?;

        if self.find_by_email(&email).is_some() {
            return Ok(false);
        }

        self.insert_account(
            name.to_string(),
            email,
            "0000000000".to_string(),
            password,
            Role::Admin,
        )?;
        Ok(true)
    }

    fn insert_account(
        &self,
        name: String,
        email: EmailAddress,
        phone: String,
        password: &str,
        role: Role,
    ) -> BookingResult<UserAccount> {
        if self.find_by_email(&email).is_some() {
            return Err(BookingError::DuplicateEmail);
        }

        let password_hash = hash_password(password)?;

        let users_dir = self.cfg.users_dir();
        let (id, record_dir) = store::allocate_record_dir(&users_dir, RecordId::new)?;

        let now = Utc::now();
        let account = UserAccount {
            id,
            name,
            email,
            phone,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = store::write_document(&record_dir.join(USER_FILE_NAME), &account) {
            let _ = fs::remove_dir_all(&record_dir);
            return Err(e);
        }

        Ok(account)
    }
}
