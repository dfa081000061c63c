//! Custom fields: user-defined attributes attachable to user records, either
//! free-text or a closed set of selectable options.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DomainError;
use crate::store::CustomFieldRepository;
use crate::validation;

/// Maximum number of options a select field may carry.
pub const MAX_OPTIONS: usize = 20;
/// Maximum character length of a single option name.
pub const MAX_OPTION_LEN: usize = 50;

/// Kind of a custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomFieldType {
    /// Free-form text value.
    Text,
    /// Closed set of selectable options.
    Select,
}

impl CustomFieldType {
    /// Parse the wire representation, exactly `"text"` or `"select"`.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw {
            "text" => Ok(CustomFieldType::Text),
            "select" => Ok(CustomFieldType::Select),
            _ => Err(DomainError::InvalidCustomFieldType),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CustomFieldType::Text => "text",
            CustomFieldType::Select => "select",
        }
    }
}

/// One selectable value of a select-type field. Owned exclusively by its
/// parent field; it has no identity outside that relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldOption {
    pub name: String,
}

/// A persisted custom field together with its options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomField {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: CustomFieldType,
    pub description: String,
    pub options: Vec<CustomFieldOption>,
}

/// A custom field aggregate before persistence assigned it an id.
#[derive(Debug, Clone)]
pub struct NewCustomField {
    pub name: String,
    pub field_type: CustomFieldType,
    pub description: String,
    pub options: Vec<CustomFieldOption>,
}

/// Inbound payload of the add-custom-field operation. `options` stays a raw
/// JSON-encoded string on the wire; [`parse_options`] turns it into names.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: Option<String>,
}

/// A value a user supplied for a custom field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldValue {
    pub field_id: u64,
    pub field_name: String,
    pub value: String,
}

/// Parse an options payload into an ordered list of option names.
///
/// Pure function, independent of the field type: an absent or empty payload
/// yields no options; anything else must be a JSON array of at most
/// [`MAX_OPTIONS`] strings, each at most [`MAX_OPTION_LEN`] characters.
pub fn parse_options(payload: Option<&str>) -> Result<Vec<String>, DomainError> {
    let Some(raw) = payload.filter(|raw| !raw.is_empty()) else {
        return Ok(Vec::new());
    };

    let parsed: Value =
        serde_json::from_str(raw).map_err(|_| DomainError::InvalidCustomFieldOptions)?;
    let Value::Array(items) = parsed else {
        return Err(DomainError::InvalidCustomFieldOptions);
    };
    if items.len() > MAX_OPTIONS {
        return Err(DomainError::InvalidCustomFieldOptions);
    }

    let mut names = Vec::with_capacity(items.len());
    for item in items {
        let Value::String(name) = item else {
            return Err(DomainError::InvalidCustomFieldOptions);
        };
        if name.chars().count() > MAX_OPTION_LEN {
            return Err(DomainError::InvalidCustomFieldOptions);
        }
        names.push(name);
    }
    Ok(names)
}

/// Validates and persists custom field aggregates.
pub struct CustomFieldManager {
    repo: Arc<dyn CustomFieldRepository>,
}

impl CustomFieldManager {
    pub fn new(repo: Arc<dyn CustomFieldRepository>) -> Self {
        CustomFieldManager { repo }
    }

    /// Create a custom field from a request payload.
    ///
    /// Field name and type are validated before the options payload is
    /// parsed, and parsing happens before any storage lookup so a malformed
    /// request never touches the store. The name-uniqueness check is
    /// byte-for-byte case-sensitive; the store's unique index is the
    /// backstop for two concurrent requests racing on the same name.
    pub async fn create_custom_field(
        &self,
        request: CreateCustomField,
    ) -> Result<CustomField, DomainError> {
        validation::length(2, 100).require(&request.name, DomainError::InvalidName)?;
        validation::one_of([validation::equals("text"), validation::equals("select")])
            .require(&request.field_type, DomainError::InvalidCustomFieldType)?;
        let field_type = CustomFieldType::parse(&request.field_type)?;
        let option_names = parse_options(request.options.as_deref())?;

        if self.repo.find_by_name(&request.name).await?.is_some() {
            return Err(DomainError::CustomFieldAlreadyExists);
        }

        // A select field needs at least one option; a text field takes none.
        let empty = option_names.is_empty();
        match field_type {
            CustomFieldType::Select if empty => {
                return Err(DomainError::InvalidCustomFieldOptions);
            }
            CustomFieldType::Text if !empty => {
                return Err(DomainError::InvalidCustomFieldOptions);
            }
            _ => {}
        }

        let field = NewCustomField {
            name: request.name,
            field_type,
            description: request.description,
            options: option_names
                .into_iter()
                .map(|name| CustomFieldOption { name })
                .collect(),
        };
        let stored = self.repo.insert(field).await?;
        tracing::info!(
            id = stored.id,
            name = %stored.name,
            r#type = stored.field_type.as_str(),
            "custom field created"
        );
        Ok(stored)
    }

    /// All persisted custom fields.
    pub async fn list_custom_fields(&self) -> Result<Vec<CustomField>, DomainError> {
        Ok(self.repo.list().await?)
    }

    /// Resolve user-supplied field-name → value pairs against the persisted
    /// fields. A value for a select field must be one of the field's
    /// options; unknown field names are rejected.
    pub async fn custom_field_values(
        &self,
        values: &BTreeMap<String, String>,
    ) -> Result<Vec<CustomFieldValue>, DomainError> {
        let mut resolved = Vec::with_capacity(values.len());
        for (field_name, value) in values {
            let Some(field) = self.repo.find_by_name(field_name).await? else {
                return Err(DomainError::InvalidCustomFieldOption(field_name.clone()));
            };
            if field.field_type == CustomFieldType::Select
                && !field.options.iter().any(|option| option.name == *value)
            {
                return Err(DomainError::InvalidCustomFieldOption(field_name.clone()));
            }
            resolved.push(CustomFieldValue {
                field_id: field.id,
                field_name: field.name,
                value: value.clone(),
            });
        }
        Ok(resolved)
    }
}
