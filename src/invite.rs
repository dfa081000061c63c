//! User invitation flow: a staff member (or an open deployment) creates an
//! account for somebody and mails them a link to claim it.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::captcha::CaptchaVerifier;
use crate::error::DomainError;
use crate::fields::CustomFieldManager;
use crate::mail::{MailSender, MailTemplate, OutgoingMail};
use crate::permission::{STAFF_ADMIN, StaffContext};
use crate::settings::Settings;
use crate::store::{ApiKeyRepository, BanRepository, NewUser, UserRepository};
use crate::validation;

/// Inbound payload of the invite operation.
#[derive(Debug, Clone, Deserialize)]
pub struct InviteRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub captcha: Option<String>,
    /// Signup API key, honored while public registration is closed.
    #[serde(default, rename = "apiKey")]
    pub api_key: Option<String>,
    /// Custom field values for the new user, keyed by field name.
    #[serde(default, rename = "customFields")]
    pub custom_fields: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InviteOutcome {
    #[serde(rename = "userId")]
    pub user_id: u64,
    #[serde(rename = "userEmail")]
    pub user_email: String,
}

/// Orchestrates the invitation checks and the user write.
pub struct InviteManager {
    users: Arc<dyn UserRepository>,
    bans: Arc<dyn BanRepository>,
    api_keys: Arc<dyn ApiKeyRepository>,
    fields: Arc<CustomFieldManager>,
    settings: Arc<dyn Settings>,
    captcha: Arc<dyn CaptchaVerifier>,
    mail: Arc<dyn MailSender>,
}

impl InviteManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserRepository>,
        bans: Arc<dyn BanRepository>,
        api_keys: Arc<dyn ApiKeyRepository>,
        fields: Arc<CustomFieldManager>,
        settings: Arc<dyn Settings>,
        captcha: Arc<dyn CaptchaVerifier>,
        mail: Arc<dyn MailSender>,
    ) -> Self {
        InviteManager {
            users,
            bans,
            api_keys,
            fields,
            settings,
            captcha,
            mail,
        }
    }

    /// Invite a user by email.
    ///
    /// All checks run before the write: field validation and captcha, the
    /// user-system switch, existing-account and ban lookups, then the
    /// registration gate (closed registration admits only signup API keys
    /// and staff level ≥ [`STAFF_ADMIN`]). The verification token is only
    /// minted when mail can actually go out.
    pub async fn invite(
        &self,
        request: InviteRequest,
        caller: StaffContext,
    ) -> Result<InviteOutcome, DomainError> {
        validation::length(2, 55).require(&request.name, DomainError::InvalidName)?;
        validation::email().require(&request.email, DomainError::InvalidEmail)?;
        if !self.captcha.verify(request.captcha.as_deref()) {
            return Err(DomainError::InvalidCaptcha);
        }

        if !self.settings.user_system_enabled() {
            return Err(DomainError::UserSystemDisabled);
        }

        let api_key = match request.api_key.as_deref() {
            Some(token) => self.api_keys.find_by_token(token).await?,
            None => None,
        };

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(DomainError::UserExists);
        }
        if self.bans.is_banned(&request.email).await? {
            return Err(DomainError::AlreadyBanned);
        }

        if !self.settings.registration_enabled()
            && api_key.is_none()
            && !caller.allows(STAFF_ADMIN)
        {
            return Err(DomainError::NoPermission);
        }

        let custom_field_values = match &request.custom_fields {
            Some(values) => self.fields.custom_field_values(values).await?,
            None => Vec::new(),
        };

        let invitation_token = generate_token();
        let verification_token = self.mail.is_connected().then(generate_token);

        let user = self
            .users
            .insert(NewUser {
                name: request.name,
                email: request.email,
                signup_date: Utc::now(),
                verification_token,
                invitation_token: Some(invitation_token.clone()),
                custom_field_values,
            })
            .await?;

        if self.mail.is_connected() {
            let template = MailTemplate::UserInvite {
                name: user.name.clone(),
                base_url: self.settings.base_url(),
                invitation_token,
            };
            self.mail
                .send(OutgoingMail::from_template(&user.email, &template))
                .await?;
        }

        tracing::info!(event = "SIGNUP", user_id = user.id, email = %user.email, "user invited");

        Ok(InviteOutcome {
            user_id: user.id,
            user_email: user.email,
        })
    }
}

fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captcha::{NoCaptcha, StaticCaptcha};
    use crate::mail::RecordingMailSender;
    use crate::settings::StaticSettings;
    use crate::store::ApiKey;
    use crate::store::memory::{MemoryApiKeys, MemoryBans, MemoryCustomFields, MemoryUsers};

    struct Fixture {
        users: Arc<MemoryUsers>,
        bans: Arc<MemoryBans>,
        api_keys: Arc<MemoryApiKeys>,
        fields: Arc<CustomFieldManager>,
        mail: Arc<RecordingMailSender>,
        manager: InviteManager,
    }

    fn fixture(settings: StaticSettings) -> Fixture {
        fixture_with(settings, Arc::new(NoCaptcha), Arc::new(RecordingMailSender::new()))
    }

    fn fixture_with(
        settings: StaticSettings,
        captcha: Arc<dyn CaptchaVerifier>,
        mail: Arc<RecordingMailSender>,
    ) -> Fixture {
        let users = Arc::new(MemoryUsers::new());
        let bans = Arc::new(MemoryBans::new());
        let api_keys = Arc::new(MemoryApiKeys::new());
        let fields = Arc::new(CustomFieldManager::new(Arc::new(MemoryCustomFields::new())));
        let manager = InviteManager::new(
            users.clone(),
            bans.clone(),
            api_keys.clone(),
            fields.clone(),
            Arc::new(settings),
            captcha,
            mail.clone(),
        );
        Fixture {
            users,
            bans,
            api_keys,
            fields,
            mail,
            manager,
        }
    }

    fn request(email: &str) -> InviteRequest {
        InviteRequest {
            name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            captcha: None,
            api_key: None,
            custom_fields: None,
        }
    }

    #[tokio::test]
    async fn invite_creates_user_and_sends_mail() {
        let fx = fixture(StaticSettings::default());
        let outcome = fx
            .manager
            .invite(request("ada@example.com"), StaffContext::anonymous())
            .await
            .unwrap();
        assert_eq!(outcome.user_email, "ada@example.com");

        let user = fx
            .users
            .find_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, outcome.user_id);
        assert_eq!(user.tickets, 0);
        assert!(user.verification_token.is_some());
        let token = user.invitation_token.clone().unwrap();

        let sent = fx.mail.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ada@example.com");
        assert!(sent[0].body.contains(&token));
    }

    #[tokio::test]
    async fn invalid_name_and_email_are_rejected_first() {
        let fx = fixture(StaticSettings::default());
        let mut short = request("ada@example.com");
        short.name = "a".to_string();
        assert!(matches!(
            fx.manager.invite(short, StaffContext::anonymous()).await,
            Err(DomainError::InvalidName)
        ));

        let err = fx
            .manager
            .invite(request("not-an-email"), StaffContext::anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidEmail));
        assert_eq!(fx.mail.sent().len(), 0);
    }

    #[tokio::test]
    async fn wrong_captcha_is_rejected() {
        let fx = fixture_with(
            StaticSettings::default(),
            Arc::new(StaticCaptcha::new("4242")),
            Arc::new(RecordingMailSender::new()),
        );
        let err = fx
            .manager
            .invite(request("ada@example.com"), StaffContext::anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidCaptcha));

        let mut with_code = request("ada@example.com");
        with_code.captcha = Some("4242".to_string());
        fx.manager
            .invite(with_code, StaffContext::anonymous())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn disabled_user_system_blocks_invites() {
        let fx = fixture(StaticSettings {
            user_system_enabled: false,
            ..StaticSettings::default()
        });
        let err = fx
            .manager
            .invite(request("ada@example.com"), StaffContext::staff(3))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UserSystemDisabled));
    }

    #[tokio::test]
    async fn existing_user_wins_over_ban() {
        let fx = fixture(StaticSettings::default());
        fx.manager
            .invite(request("ada@example.com"), StaffContext::anonymous())
            .await
            .unwrap();
        fx.bans.insert("ada@example.com").await.unwrap();

        let err = fx
            .manager
            .invite(request("ada@example.com"), StaffContext::anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UserExists));
    }

    #[tokio::test]
    async fn banned_email_is_rejected() {
        let fx = fixture(StaticSettings::default());
        fx.bans.insert("spam@example.com").await.unwrap();
        let err = fx
            .manager
            .invite(request("spam@example.com"), StaffContext::anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyBanned));
    }

    #[tokio::test]
    async fn closed_registration_requires_key_or_staff() {
        let settings = StaticSettings {
            registration_enabled: false,
            ..StaticSettings::default()
        };

        let fx = fixture(settings.clone());
        let err = fx
            .manager
            .invite(request("ada@example.com"), StaffContext::anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NoPermission));

        // Staff level 1 is not enough.
        let err = fx
            .manager
            .invite(request("ada@example.com"), StaffContext::staff(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NoPermission));

        // Staff level 2 passes.
        fx.manager
            .invite(request("ada@example.com"), StaffContext::staff(2))
            .await
            .unwrap();

        // A valid signup API key passes without staff.
        let fx = fixture(settings);
        fx.api_keys
            .insert(ApiKey {
                name: "ci".to_string(),
                token: "signup-token".to_string(),
            })
            .await
            .unwrap();
        let mut keyed = request("bob@example.com");
        keyed.api_key = Some("signup-token".to_string());
        fx.manager
            .invite(keyed, StaffContext::anonymous())
            .await
            .unwrap();

        // An unknown key does not.
        let mut bad = request("eve@example.com");
        bad.api_key = Some("wrong".to_string());
        let err = fx
            .manager
            .invite(bad, StaffContext::anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NoPermission));
    }

    #[tokio::test]
    async fn disconnected_mail_skips_delivery_and_verification_token() {
        let users = Arc::new(MemoryUsers::new());
        let manager = InviteManager::new(
            users.clone(),
            Arc::new(MemoryBans::new()),
            Arc::new(MemoryApiKeys::new()),
            Arc::new(CustomFieldManager::new(Arc::new(MemoryCustomFields::new()))),
            Arc::new(StaticSettings::default()),
            Arc::new(NoCaptcha),
            Arc::new(crate::mail::LogMailSender::new(false)),
        );
        manager
            .invite(request("ada@example.com"), StaffContext::anonymous())
            .await
            .unwrap();
        let user = users
            .find_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(user.verification_token.is_none());
        assert!(user.invitation_token.is_some());
    }

    #[tokio::test]
    async fn custom_field_values_are_validated_and_stored() {
        let fx = fixture(StaticSettings::default());
        fx.fields
            .create_custom_field(crate::fields::CreateCustomField {
                name: "Priority".to_string(),
                field_type: "select".to_string(),
                description: String::new(),
                options: Some(r#"["Low","High"]"#.to_string()),
            })
            .await
            .unwrap();

        let mut bad = request("ada@example.com");
        bad.custom_fields = Some(BTreeMap::from([(
            "Priority".to_string(),
            "Urgent".to_string(),
        )]));
        let err = fx
            .manager
            .invite(bad, StaffContext::anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidCustomFieldOption(_)));
        assert!(
            fx.users
                .find_by_email("ada@example.com")
                .await
                .unwrap()
                .is_none()
        );

        let mut good = request("ada@example.com");
        good.custom_fields = Some(BTreeMap::from([(
            "Priority".to_string(),
            "High".to_string(),
        )]));
        fx.manager
            .invite(good, StaffContext::anonymous())
            .await
            .unwrap();
        let user = fx
            .users
            .find_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.custom_field_values.len(), 1);
        assert_eq!(user.custom_field_values[0].value, "High");
    }
}
