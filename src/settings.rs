//! General settings collaborator, pinned at its interface boundary.

/// Read access to the deployment-level settings the invite flow consults.
pub trait Settings: Send + Sync {
    /// Whether the user system accepts signups and invitations at all.
    fn user_system_enabled(&self) -> bool;

    /// Whether public registration is open. When closed, invitations need a
    /// signup API key or a staff caller.
    fn registration_enabled(&self) -> bool;

    /// Public base URL of the deployment, used in outbound mail links.
    fn base_url(&self) -> String;
}

/// Fixed settings resolved once at startup.
#[derive(Debug, Clone)]
pub struct StaticSettings {
    pub user_system_enabled: bool,
    pub registration_enabled: bool,
    pub base_url: String,
}

impl Default for StaticSettings {
    fn default() -> Self {
        StaticSettings {
            user_system_enabled: true,
            registration_enabled: true,
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl Settings for StaticSettings {
    fn user_system_enabled(&self) -> bool {
        self.user_system_enabled
    }

    fn registration_enabled(&self) -> bool {
        self.registration_enabled
    }

    fn base_url(&self) -> String {
        self.base_url.clone()
    }
}
