use thiserror::Error;

use crate::mail::MailError;
use crate::store::StoreError;

/// Domain error taxonomy.
///
/// Each variant maps to one stable error code via [`DomainError::code`]; the
/// calling layer translates codes into HTTP responses and the UI into
/// localized messages. Validation failures abort the operation before any
/// persistence happens; collaborator failures propagate unchanged.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("name length is out of range")]
    InvalidName,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("captcha verification failed")]
    InvalidCaptcha,

    #[error("custom field type must be 'text' or 'select'")]
    InvalidCustomFieldType,

    #[error("invalid custom field options payload")]
    InvalidCustomFieldOptions,

    #[error("value is not a valid option of custom field '{0}'")]
    InvalidCustomFieldOption(String),

    #[error("a custom field with that name already exists")]
    CustomFieldAlreadyExists,

    #[error("a user with that email already exists")]
    UserExists,

    #[error("email address is banned")]
    AlreadyBanned,

    #[error("the user system is disabled")]
    UserSystemDisabled,

    #[error("caller lacks the required staff privilege")]
    NoPermission,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("mail error: {0}")]
    Mail(#[from] MailError),
}

impl DomainError {
    /// Stable error code surfaced to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InvalidName => "INVALID_NAME",
            DomainError::InvalidEmail => "INVALID_EMAIL",
            DomainError::InvalidCaptcha => "INVALID_CAPTCHA",
            DomainError::InvalidCustomFieldType => "INVALID_CUSTOM_FIELD_TYPE",
            DomainError::InvalidCustomFieldOptions => "INVALID_CUSTOM_FIELD_OPTIONS",
            DomainError::InvalidCustomFieldOption(_) => "INVALID_CUSTOM_FIELD_OPTION",
            DomainError::CustomFieldAlreadyExists => "CUSTOM_FIELD_ALREADY_EXISTS",
            DomainError::UserExists => "USER_EXISTS",
            DomainError::AlreadyBanned => "ALREADY_BANNED",
            DomainError::UserSystemDisabled => "USER_SYSTEM_DISABLED",
            DomainError::NoPermission => "NO_PERMISSION",
            DomainError::Store(_) => "STORAGE_ERROR",
            DomainError::Mail(_) => "MAIL_ERROR",
        }
    }
}
