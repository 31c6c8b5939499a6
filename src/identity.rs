use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known role flag names.
///
/// Flags are plain strings so providers can attach any attribute they like;
/// these are the ones the built-in predicates read.
pub mod flags {
    /// Staff members may reach the content-editing areas.
    pub const STAFF: &str = "is_staff";
    /// Superusers hold every permission while active.
    pub const SUPERUSER: &str = "is_superuser";
    /// Inactive accounts hold no permissions.
    pub const ACTIVE: &str = "is_active";
}

/// Opaque key of the session a request belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey(String);

impl SessionKey {
    /// Wraps a session key issued by the session transport.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-request snapshot of who is making the request.
///
/// An `Identity` is built by the identity provider before any gate runs and
/// is passed explicitly to gates and handlers. Nothing in this crate mutates
/// it once built.
///
/// # Examples
///
/// ```
/// use authgate::{Identity, flags};
///
/// let anon = Identity::anonymous();
/// assert!(!anon.is_authenticated());
/// assert_eq!(anon.username(), "");
///
/// let bob = Identity::authenticated("bob").with_flag(flags::STAFF);
/// assert!(bob.is_staff());
/// assert!(bob.is_active());
/// assert!(!bob.is_superuser());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    is_authenticated: bool,
    username: String,
    flags: BTreeSet<String>,
    permissions: BTreeSet<String>,
    session: Option<SessionKey>,
}

impl Identity {
    /// The anonymous identity: unauthenticated, no flags, no permissions.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated, active user.
    ///
    /// Accounts start active; use [`without_flag`](Self::without_flag) with
    /// [`flags::ACTIVE`] for a deactivated account.
    pub fn authenticated(username: impl Into<String>) -> Self {
        let mut set = BTreeSet::new();
        set.insert(flags::ACTIVE.to_string());
        Self {
            is_authenticated: true,
            username: username.into(),
            flags: set,
            permissions: BTreeSet::new(),
            session: None,
        }
    }

    /// Sets a role flag.
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    /// Clears a role flag.
    pub fn without_flag(mut self, flag: &str) -> Self {
        self.flags.remove(flag);
        self
    }

    /// Grants a permission, written `"<app>.<codename>"`.
    pub fn with_permission(mut self, perm: impl Into<String>) -> Self {
        self.permissions.insert(perm.into());
        self
    }

    /// Binds the identity to a session.
    pub fn with_session(mut self, session: SessionKey) -> Self {
        self.session = Some(session);
        self
    }

    /// Whether the request carries a logged-in user.
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// Whether the request is anonymous.
    pub fn is_anonymous(&self) -> bool {
        !self.is_authenticated
    }

    /// Username, empty for anonymous requests.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether the named role flag is set.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Shorthand for the [`flags::STAFF`] flag.
    pub fn is_staff(&self) -> bool {
        self.has_flag(flags::STAFF)
    }

    /// Shorthand for the [`flags::SUPERUSER`] flag.
    pub fn is_superuser(&self) -> bool {
        self.has_flag(flags::SUPERUSER)
    }

    /// Shorthand for the [`flags::ACTIVE`] flag.
    pub fn is_active(&self) -> bool {
        self.has_flag(flags::ACTIVE)
    }

    /// Iterates over the set role flags in name order.
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }

    /// Session this request belongs to, if the transport established one.
    pub fn session(&self) -> Option<&SessionKey> {
        self.session.as_ref()
    }

    /// Whether the user holds `perm`.
    ///
    /// Inactive users hold nothing; active superusers hold everything;
    /// everyone else holds exactly what was granted.
    pub fn has_perm(&self, perm: &str) -> bool {
        if !self.is_active() {
            return false;
        }
        if self.is_superuser() {
            return true;
        }
        self.permissions.contains(perm)
    }

    /// Whether the user holds every permission in `perms`.
    pub fn has_perms<I, S>(&self, perms: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        perms.into_iter().all(|p| self.has_perm(p.as_ref()))
    }
}
