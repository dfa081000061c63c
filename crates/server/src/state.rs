use crate::config::ServerConfig;
use dashmap::DashMap;
use opendesk::captcha::{CaptchaVerifier, NoCaptcha, StaticCaptcha};
use opendesk::fields::CustomFieldManager;
use opendesk::invite::InviteManager;
use opendesk::mail::{LogMailSender, MailSender};
use opendesk::settings::StaticSettings;
use opendesk::store::memory::{MemoryApiKeys, MemoryBans, MemoryCustomFields, MemoryUsers};
use std::sync::Arc;

/// Shared application state
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Rate limit tracking: staff key -> (count, window_start)
    pub rate_limiter: DashMap<String, (u32, std::time::Instant)>,

    /// Custom field manager (shared across requests)
    pub custom_fields: Arc<CustomFieldManager>,

    /// Invite manager (shared across requests)
    pub invites: Arc<InviteManager>,

    /// In-memory stores, exposed for seeding in tests and tooling
    pub users: Arc<MemoryUsers>,
    pub bans: Arc<MemoryBans>,
    pub api_keys: Arc<MemoryApiKeys>,
}

impl ServerState {
    /// Create new server state
    pub fn new(config: ServerConfig) -> Self {
        let field_store = Arc::new(MemoryCustomFields::new());
        let users = Arc::new(MemoryUsers::new());
        let bans = Arc::new(MemoryBans::new());
        let api_keys = Arc::new(MemoryApiKeys::new());

        let custom_fields = Arc::new(CustomFieldManager::new(field_store));
        let settings = Arc::new(StaticSettings {
            user_system_enabled: config.user_system_enabled,
            registration_enabled: config.registration_enabled,
            base_url: config.base_url.clone(),
        });
        let captcha: Arc<dyn CaptchaVerifier> = match &config.captcha_code {
            Some(code) => Arc::new(StaticCaptcha::new(code.clone())),
            None => Arc::new(NoCaptcha),
        };
        let mail: Arc<dyn MailSender> = Arc::new(LogMailSender::new(config.mail_connected));

        let invites = Arc::new(InviteManager::new(
            users.clone(),
            bans.clone(),
            api_keys.clone(),
            custom_fields.clone(),
            settings,
            captcha,
            mail,
        ));

        Self {
            config: Arc::new(config),
            rate_limiter: DashMap::new(),
            custom_fields,
            invites,
            users,
            bans,
            api_keys,
        }
    }

    /// Staff privilege level for an API key, if the key is known
    pub fn staff_level(&self, key: &str) -> Option<u8> {
        self.config.staff_keys.get(key).copied()
    }

    /// Check rate limit for a staff API key
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = std::time::Instant::now();
        let window = std::time::Duration::from_secs(60);
        let limit = self.config.rate_limit_per_minute;

        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        // Check limit
        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}

/// Server metadata for the authenticated metadata endpoint
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub version: String,
    pub uptime_seconds: u64,
}
