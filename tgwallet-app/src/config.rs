use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use tgwallet_api::domain::{Language, UserId, UserRef, DEFAULT_ADMIN_ID};

use crate::error::Result;

pub const CONFIG_FILE: &str = "Tgwallet.toml";
pub const ENV_PREFIX: &str = "TGWALLET_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base url of the wallet backend
    pub api_url: String,
    pub admin_id: UserId,
    pub language: Language,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_url: "http://127.0.0.1:8000".to_owned(),
            admin_id: DEFAULT_ADMIN_ID,
            language: Language::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, then `Tgwallet.toml`, then `TGWALLET_*` variables
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn extract(figment: &Figment) -> Result<Self> {
        Ok(figment.extract()?)
    }

    pub fn admin_gate(&self) -> AdminGate {
        AdminGate {
            admin_id: self.admin_id,
        }
    }
}

/// Decides whether the admin entry point is shown. Display only: the backend
/// checks the admin id on every admin call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminGate {
    admin_id: UserId,
}

impl AdminGate {
    pub fn new(admin_id: UserId) -> Self {
        AdminGate { admin_id }
    }

    pub fn admin_id(&self) -> UserId {
        self.admin_id
    }

    pub fn is_visible_for(&self, user: UserRef) -> bool {
        user.id() == Some(self.admin_id)
    }
}
