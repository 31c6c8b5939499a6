//! A single pending notification.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Level;
use crate::config::TagOverrides;

/// A message waiting to be shown to the user.
///
/// Only `level`, `text` and `extra_tags` are persisted and compared; the
/// level tag is derived from configuration when the notification is drained.
///
/// # Examples
///
/// ```
/// use authgate::messages::{Level, Notification};
///
/// let n = Notification::new(Level::Warning, "DANGER").with_extra_tags("sticky");
/// assert_eq!(n.tags(), "sticky warning");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    level: Level,
    text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    extra_tags: String,
    #[serde(skip)]
    level_tag: Option<String>,
}

impl Notification {
    /// Creates a notification with no extra tags.
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            extra_tags: String::new(),
            level_tag: None,
        }
    }

    /// Adds space-separated extra rendering tags.
    pub fn with_extra_tags(mut self, extra_tags: impl Into<String>) -> Self {
        self.extra_tags = extra_tags.into();
        self
    }

    /// Resolves the level tag against `overrides`.
    pub(crate) fn tagged(mut self, overrides: &TagOverrides) -> Self {
        self.level_tag = Some(overrides.tag_for(self.level).to_string());
        self
    }

    /// Severity.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Message body.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Caller-supplied extra tags.
    pub fn extra_tags(&self) -> &str {
        &self.extra_tags
    }

    /// Tag derived from the level.
    pub fn level_tag(&self) -> &str {
        self.level_tag
            .as_deref()
            .unwrap_or_else(|| self.level.default_tag())
    }

    /// Full rendering hint: extra tags then the level tag.
    pub fn tags(&self) -> String {
        let level_tag = self.level_tag();
        match (self.extra_tags.is_empty(), level_tag.is_empty()) {
            (true, _) => level_tag.to_string(),
            (false, true) => self.extra_tags.clone(),
            (false, false) => format!("{} {}", self.extra_tags, level_tag),
        }
    }
}

impl PartialEq for Notification {
    fn eq(&self, other: &Self) -> bool {
        self.level == other.level && self.text == other.text && self.extra_tags == other.extra_tags
    }
}

impl Eq for Notification {}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_default_to_level() {
        let n = Notification::new(Level::Info, "Hello bob");
        assert_eq!(n.tags(), "info");
        assert_eq!(n.to_string(), "Hello bob");
    }

    #[test]
    fn overrides_replace_level_tag() {
        let overrides = TagOverrides {
            error: Some("danger".to_string()),
            ..TagOverrides::default()
        };
        let n = Notification::new(Level::Error, "failed").tagged(&overrides);
        assert_eq!(n.level_tag(), "danger");
        assert_eq!(n.tags(), "danger");
    }

    #[test]
    fn empty_override_leaves_extra_tags_only() {
        let overrides = TagOverrides {
            info: Some(String::new()),
            ..TagOverrides::default()
        };
        let n = Notification::new(Level::Info, "x")
            .with_extra_tags("pinned")
            .tagged(&overrides);
        assert_eq!(n.tags(), "pinned");
    }

    #[test]
    fn stored_form_omits_derived_tag() {
        let n = Notification::new(Level::Success, "saved").tagged(&TagOverrides::default());
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, r#"{"level":"success","text":"saved"}"#);
    }
}
