//! Notification severity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a notification.
///
/// Levels are ordered `Debug < Info < Success < Warning < Error`. The level
/// picks the rendering tag only; it never filters or reorders the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Development-only detail
    Debug,
    /// Informational
    Info,
    /// An action succeeded
    Success,
    /// Something needs attention
    Warning,
    /// An action failed
    Error,
}

impl Level {
    /// All levels in ascending order.
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Success,
        Level::Warning,
        Level::Error,
    ];

    /// Numeric severity (10, 20, 25, 30, 40).
    pub const fn value(self) -> u8 {
        match self {
            Level::Debug => 10,
            Level::Info => 20,
            Level::Success => 25,
            Level::Warning => 30,
            Level::Error => 40,
        }
    }

    /// Rendering tag used when no override is configured.
    pub const fn default_tag(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn levels_are_ordered() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Success);
        assert!(Level::Success < Level::Warning);
        assert!(Level::Warning < Level::Error);
        assert!(Level::ALL.windows(2).all(|w| w[0].value() < w[1].value()));
    }

    #[test]
    fn default_tags_are_distinct() {
        let tags: BTreeSet<_> = Level::ALL.iter().map(|l| l.default_tag()).collect();
        assert_eq!(tags.len(), Level::ALL.len());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Level::Warning).unwrap(), "\"warning\"");
        let level: Level = serde_json::from_str("\"success\"").unwrap();
        assert_eq!(level, Level::Success);
    }
}
