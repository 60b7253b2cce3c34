//! # API Shared
//!
//! Shared API-layer utilities for MediBook.
//!
//! Contains:
//! - Bearer-token issue/verify and the `AuthUser`/`AdminUser` extractors (the auth gate)
//! - The `ApiError` type mapping domain failures to HTTP responses
//! - Shared services like `HealthService`
//!
//! Used by the REST server binary for everything that is an API concern rather than a data
//! operation.

pub mod auth;
pub mod error;
pub mod health;

pub use auth::{AdminUser, AuthUser, CallerIdentity, Claims, TokenService};
pub use error::ApiError;
pub use health::{HealthRes, HealthService};
