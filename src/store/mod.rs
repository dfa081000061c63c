//! Persistence boundary: plain entity structs and repository traits.
//!
//! Repositories operate on aggregates as units; a custom field and its
//! options are found, inserted, and returned together. The `memory` module
//! provides the in-memory backend used by the server state and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::fields::{CustomField, CustomFieldValue, NewCustomField};

pub mod memory;

/// Storage collaborator failure. Fatal to the running request; never
/// retried here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("unique constraint violated on '{0}'")]
    UniqueViolation(String),
}

/// A registered helpdesk user.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub signup_date: DateTime<Utc>,
    pub tickets: u32,
    /// Set when an invitation mail went out; consumed by email verification.
    pub verification_token: Option<String>,
    /// Lets the invited user set their first password.
    pub invitation_token: Option<String>,
    pub custom_field_values: Vec<CustomFieldValue>,
}

/// A user record before persistence. Invited users start with zero tickets
/// and no password; they set one through their invitation token.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub signup_date: DateTime<Utc>,
    pub verification_token: Option<String>,
    pub invitation_token: Option<String>,
    pub custom_field_values: Vec<CustomFieldValue>,
}

/// A signup API key, allowing invitations while public registration is
/// disabled.
#[derive(Debug, Clone, Serialize)]
pub struct ApiKey {
    pub name: String,
    pub token: String,
}

#[async_trait]
pub trait CustomFieldRepository: Send + Sync {
    /// Case-sensitive lookup by field name.
    async fn find_by_name(&self, name: &str) -> Result<Option<CustomField>, StoreError>;

    /// Persist the aggregate as a single unit, assigning its identity.
    async fn insert(&self, field: NewCustomField) -> Result<CustomField, StoreError>;

    async fn list(&self) -> Result<Vec<CustomField>, StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
}

#[async_trait]
pub trait BanRepository: Send + Sync {
    async fn is_banned(&self, email: &str) -> Result<bool, StoreError>;

    async fn insert(&self, email: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    async fn find_by_token(&self, token: &str) -> Result<Option<ApiKey>, StoreError>;

    async fn insert(&self, key: ApiKey) -> Result<(), StoreError>;
}
