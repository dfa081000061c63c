//! End-to-end flows over the domain managers with the in-memory backend:
//! the custom-field creation scenarios and the invitation path that consumes
//! the created fields.

use std::collections::BTreeMap;
use std::sync::Arc;

use opendesk::captcha::NoCaptcha;
use opendesk::error::DomainError;
use opendesk::fields::{CreateCustomField, CustomFieldManager, CustomFieldType};
use opendesk::invite::{InviteManager, InviteRequest};
use opendesk::mail::RecordingMailSender;
use opendesk::permission::StaffContext;
use opendesk::settings::StaticSettings;
use opendesk::store::memory::{MemoryApiKeys, MemoryBans, MemoryCustomFields, MemoryUsers};
use opendesk::store::UserRepository;

fn field_manager() -> CustomFieldManager {
    CustomFieldManager::new(Arc::new(MemoryCustomFields::new()))
}

fn create(name: &str, field_type: &str, options: Option<&str>) -> CreateCustomField {
    CreateCustomField {
        name: name.to_string(),
        field_type: field_type.to_string(),
        description: "set by an administrator".to_string(),
        options: options.map(str::to_string),
    }
}

#[tokio::test]
async fn select_field_round_trip() {
    let manager = field_manager();
    let field = manager
        .create_custom_field(create("Priority", "select", Some(r#"["Low","High"]"#)))
        .await
        .unwrap();

    assert_eq!(field.name, "Priority");
    assert_eq!(field.field_type, CustomFieldType::Select);
    let names: Vec<&str> = field.options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Low", "High"]);

    let listed = manager.list_custom_fields().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, field.id);
}

#[tokio::test]
async fn text_field_without_options_round_trip() {
    let manager = field_manager();
    let field = manager
        .create_custom_field(create("Notes", "text", None))
        .await
        .unwrap();
    assert_eq!(field.field_type, CustomFieldType::Text);
    assert!(field.options.is_empty());
}

#[tokio::test]
async fn text_field_with_options_is_rejected() {
    let manager = field_manager();
    let err = manager
        .create_custom_field(create("Notes", "text", Some(r#"["x"]"#)))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidCustomFieldOptions));
}

#[tokio::test]
async fn select_field_with_empty_options_is_rejected() {
    let manager = field_manager();
    let err = manager
        .create_custom_field(create("Priority", "select", Some("[]")))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidCustomFieldOptions));
}

#[tokio::test]
async fn recreating_a_field_fails_and_keeps_the_original() {
    let manager = field_manager();
    manager
        .create_custom_field(create("Priority", "select", Some(r#"["Low","High"]"#)))
        .await
        .unwrap();
    let err = manager
        .create_custom_field(create("Priority", "select", Some(r#"["Low","High"]"#)))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::CustomFieldAlreadyExists));

    let listed = manager.list_custom_fields().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].options.len(), 2);
}

#[tokio::test]
async fn invited_user_carries_validated_custom_field_values() {
    let fields = Arc::new(CustomFieldManager::new(Arc::new(MemoryCustomFields::new())));
    fields
        .create_custom_field(create("Priority", "select", Some(r#"["Low","High"]"#)))
        .await
        .unwrap();

    let users = Arc::new(MemoryUsers::new());
    let mail = Arc::new(RecordingMailSender::new());
    let invites = InviteManager::new(
        users.clone(),
        Arc::new(MemoryBans::new()),
        Arc::new(MemoryApiKeys::new()),
        fields,
        Arc::new(StaticSettings::default()),
        Arc::new(NoCaptcha),
        mail.clone(),
    );

    let outcome = invites
        .invite(
            InviteRequest {
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                captcha: None,
                api_key: None,
                custom_fields: Some(BTreeMap::from([(
                    "Priority".to_string(),
                    "High".to_string(),
                )])),
            },
            StaffContext::staff(2),
        )
        .await
        .unwrap();

    let user = users
        .find_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.id, outcome.user_id);
    assert_eq!(user.custom_field_values.len(), 1);
    assert_eq!(user.custom_field_values[0].field_name, "Priority");
    assert_eq!(user.custom_field_values[0].value, "High");

    let sent = mail.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains(user.invitation_token.as_deref().unwrap()));
}
