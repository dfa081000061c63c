//! In-memory repository backend.
//!
//! Backed by `DashMap` keyed the same way the lookups run (field name, user
//! email, key token), with a monotonic id sequence per entity kind. The
//! unique-name index on custom fields is enforced at insert time as the
//! backstop for two requests racing past the manager's lookup.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::fields::{CustomField, NewCustomField};
use crate::store::{
    ApiKey, ApiKeyRepository, BanRepository, CustomFieldRepository, NewUser, StoreError, User,
    UserRepository,
};

#[derive(Default)]
pub struct MemoryCustomFields {
    fields: DashMap<String, CustomField>,
    next_id: AtomicU64,
}

impl MemoryCustomFields {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl CustomFieldRepository for MemoryCustomFields {
    async fn find_by_name(&self, name: &str) -> Result<Option<CustomField>, StoreError> {
        Ok(self.fields.get(name).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, field: NewCustomField) -> Result<CustomField, StoreError> {
        let stored = CustomField {
            id: self.next_id(),
            name: field.name,
            field_type: field.field_type,
            description: field.description,
            options: field.options,
        };
        match self.fields.entry(stored.name.clone()) {
            Entry::Occupied(_) => Err(StoreError::UniqueViolation(stored.name)),
            Entry::Vacant(slot) => {
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn list(&self) -> Result<Vec<CustomField>, StoreError> {
        let mut fields: Vec<CustomField> = self
            .fields
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        fields.sort_by_key(|field| field.id);
        Ok(fields)
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    users: DashMap<String, User>,
    next_id: AtomicU64,
}

impl MemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(email).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let stored = User {
            id: self.next_id(),
            name: user.name,
            email: user.email,
            signup_date: user.signup_date,
            tickets: 0,
            verification_token: user.verification_token,
            invitation_token: user.invitation_token,
            custom_field_values: user.custom_field_values,
        };
        match self.users.entry(stored.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::UniqueViolation(stored.email)),
            Entry::Vacant(slot) => {
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }
}

#[derive(Default)]
pub struct MemoryBans {
    emails: DashMap<String, ()>,
}

impl MemoryBans {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BanRepository for MemoryBans {
    async fn is_banned(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.emails.contains_key(email))
    }

    async fn insert(&self, email: &str) -> Result<(), StoreError> {
        self.emails.insert(email.to_string(), ());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryApiKeys {
    keys: DashMap<String, ApiKey>,
}

impl MemoryApiKeys {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyRepository for MemoryApiKeys {
    async fn find_by_token(&self, token: &str) -> Result<Option<ApiKey>, StoreError> {
        Ok(self.keys.get(token).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, key: ApiKey) -> Result<(), StoreError> {
        self.keys.insert(key.token.clone(), key);
        Ok(())
    }
}
