//! Settings for gates and the notification queue.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration. Environment overrides are read through
//! [`Settings::from_lookup`], which [`Settings::from_env`] feeds from the
//! process environment.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::messages::Level;

/// Environment variable overriding [`GateConfig::login_url`].
pub const ENV_LOGIN_URL: &str = "AUTHGATE_LOGIN_URL";
/// Environment variable overriding [`GateConfig::redirect_field_name`].
pub const ENV_REDIRECT_FIELD: &str = "AUTHGATE_REDIRECT_FIELD";

/// Where denied-but-recoverable requests are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Login entry point.
    pub login_url: String,
    /// Query parameter carrying the originally requested path.
    pub redirect_field_name: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            login_url: "/accounts/login/".to_string(),
            redirect_field_name: "next".to_string(),
        }
    }
}

impl GateConfig {
    /// Default configuration with a different login URL.
    pub fn with_login_url(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.login_url.is_empty() {
            return Err(Error::config("gate.login_url must not be empty"));
        }
        if self.redirect_field_name.is_empty() {
            return Err(Error::config("gate.redirect_field_name must not be empty"));
        }
        Ok(())
    }
}

/// Per-level overrides of the rendering tag.
///
/// Unset levels keep their default tag (`debug`, `info`, `success`,
/// `warning`, `error`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagOverrides {
    /// Tag for [`Level::Debug`]
    pub debug: Option<String>,
    /// Tag for [`Level::Info`]
    pub info: Option<String>,
    /// Tag for [`Level::Success`]
    pub success: Option<String>,
    /// Tag for [`Level::Warning`]
    pub warning: Option<String>,
    /// Tag for [`Level::Error`]
    pub error: Option<String>,
}

impl TagOverrides {
    /// Rendering tag for `level`.
    pub fn tag_for(&self, level: Level) -> &str {
        let custom = match level {
            Level::Debug => &self.debug,
            Level::Info => &self.info,
            Level::Success => &self.success,
            Level::Warning => &self.warning,
            Level::Error => &self.error,
        };
        custom.as_deref().unwrap_or(level.default_tag())
    }
}

/// Notification queue settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    /// Rendering tag overrides.
    pub tags: TagOverrides,
    /// Session field the queue is stored under.
    pub session_field: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            tags: TagOverrides::default(),
            session_field: "_messages".to_string(),
        }
    }
}

/// Top-level settings.
///
/// # Examples
///
/// ```
/// use authgate::Settings;
///
/// let settings = Settings::from_json_str(r#"{
///     "gate": { "login_url": "/login/" },
///     "messages": { "tags": { "error": "danger" } }
/// }"#).unwrap();
///
/// assert_eq!(settings.gate.login_url, "/login/");
/// assert_eq!(settings.gate.redirect_field_name, "next");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gate settings.
    pub gate: GateConfig,
    /// Notification queue settings.
    pub messages: MessageConfig,
}

impl Settings {
    /// Parses and validates settings from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed JSON or invalid values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults overlaid with `AUTHGATE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();
        if let Some(url) = lookup(ENV_LOGIN_URL) {
            settings.gate.login_url = url;
        }
        if let Some(field) = lookup(ENV_REDIRECT_FIELD) {
            settings.gate.redirect_field_name = field;
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.gate.validate()?;
        if self.messages.session_field.is_empty() {
            return Err(Error::config("messages.session_field must not be empty"));
        }
        Ok(())
    }
}
