pub mod currency;
pub mod error;

pub use currency::*;
pub use error::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Telegram user identifier
pub type UserId = i64;

/// Administrator of the production deployment
pub const DEFAULT_ADMIN_ID: UserId = 5815294733;

/// Label shown when the host gives no username
pub const ANONYMOUS_LABEL: &str = "Telegram user";

/// Languages used for alerts and panel captions
#[derive(
    Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Copy,
)]
pub enum Language {
    #[default]
    #[serde(rename = "uz")]
    Uzbek,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn to_alpha(&self) -> &str {
        match self {
            Language::Uzbek => "uz",
            Language::English => "en",
        }
    }
}

impl FromStr for Language {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uz" => Ok(Language::Uzbek),
            "en" => Ok(Language::English),
            lang => Err(LanguageError::ParseLanguageError(lang.to_owned())),
        }
    }
}

/// User as the host environment reports it
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct TgUser {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
}

impl TgUser {
    pub fn display_name(&self) -> String {
        match self.username.as_deref() {
            Some(name) if !name.is_empty() => format!("@{name}"),
            _ => ANONYMOUS_LABEL.to_owned(),
        }
    }
}

/// Data injected by the host at launch. Not verified on the client.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct InitData {
    #[serde(default)]
    pub user: Option<TgUser>,
}

impl InitData {
    pub fn user_ref(&self) -> UserRef {
        UserRef(self.user.as_ref().map(|u| u.id))
    }

    pub fn display_name(&self) -> String {
        self.user
            .as_ref()
            .map(TgUser::display_name)
            .unwrap_or_else(|| ANONYMOUS_LABEL.to_owned())
    }
}

/// Identity embedded into backend URLs. An unresolved identity is still sent,
/// as the literal `undefined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserRef(pub Option<UserId>);

impl UserRef {
    pub fn id(&self) -> Option<UserId> {
        self.0
    }

    pub fn is_resolved(&self) -> bool {
        self.0.is_some()
    }
}

impl From<UserId> for UserRef {
    fn from(id: UserId) -> Self {
        UserRef(Some(id))
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{id}"),
            None => write!(f, "undefined"),
        }
    }
}
