//! Core library for the OpenDesk helpdesk backend.
//!
//! This crate carries the domain model and the managers that drive the two
//! administrative flows: creating custom fields and inviting users. External
//! collaborators (storage, mail delivery, captcha, settings) are expressed as
//! traits with in-memory or logging implementations; the HTTP surface lives
//! in the `opendesk-server` crate under `crates/server`.

pub mod captcha;
pub mod error;
pub mod fields;
pub mod invite;
pub mod mail;
pub mod permission;
pub mod settings;
pub mod store;
pub mod validation;

pub use error::DomainError;
pub use fields::{
    CreateCustomField, CustomField, CustomFieldManager, CustomFieldOption, CustomFieldType,
    CustomFieldValue, parse_options,
};
pub use invite::{InviteManager, InviteOutcome, InviteRequest};
pub use mail::{MailSender, MailTemplate, OutgoingMail};
pub use permission::{STAFF_ADMIN, StaffContext};
pub use settings::{Settings, StaticSettings};
pub use store::{StoreError, User};
