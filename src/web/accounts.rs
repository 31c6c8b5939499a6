//! In-process account directory and login sessions.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::identity::{Identity, SessionKey};
use crate::request::Request;

use super::IdentityProvider;

/// Registered users plus which session is logged in as whom.
///
/// Suitable for tests and demos. As an [`IdentityProvider`] it answers:
/// the logged-in user for a known session, an anonymous identity for an
/// unknown one, and `None` for a request without any session.
///
/// # Examples
///
/// ```
/// use authgate::web::{Accounts, IdentityProvider};
/// use authgate::{Identity, Request, SessionKey};
///
/// let accounts = Accounts::new();
/// accounts.register(Identity::authenticated("bob"));
///
/// let session = SessionKey::new("s1");
/// assert!(accounts.login(&session, "bob"));
///
/// let request = Request::get("req-1", "/").with_session(session);
/// assert_eq!(accounts.identity(&request).unwrap().username(), "bob");
/// ```
#[derive(Debug, Default)]
pub struct Accounts {
    users: RwLock<HashMap<String, Identity>>,
    sessions: RwLock<HashMap<SessionKey, String>>,
}

impl Accounts {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user. Anonymous identities are ignored.
    pub fn register(&self, identity: Identity) {
        if identity.is_anonymous() {
            return;
        }
        let username = identity.username().to_string();
        self.users.write().insert(username, identity);
    }

    /// Binds `session` to `username`. Returns `false` for unknown users.
    pub fn login(&self, session: &SessionKey, username: &str) -> bool {
        if !self.users.read().contains_key(username) {
            tracing::debug!(session = %session, username, "login for unknown user");
            return false;
        }
        self.sessions
            .write()
            .insert(session.clone(), username.to_string());
        tracing::debug!(session = %session, username, "logged in");
        true
    }

    /// Unbinds `session`. Returns whether anyone was logged in.
    pub fn logout(&self, session: &SessionKey) -> bool {
        self.sessions.write().remove(session).is_some()
    }

    /// Username logged in on `session`, if any.
    pub fn user_for(&self, session: &SessionKey) -> Option<String> {
        self.sessions.read().get(session).cloned()
    }
}

impl IdentityProvider for Accounts {
    fn identity(&self, request: &Request) -> Option<Identity> {
        let session = request.session()?;
        let user = self
            .user_for(session)
            .and_then(|username| self.users.read().get(&username).cloned());
        Some(user.unwrap_or_default().with_session(session.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::flags;

    fn request(session: &str) -> Request {
        Request::get("req-1", "/").with_session(SessionKey::new(session))
    }

    #[test]
    fn unknown_user_cannot_log_in() {
        let accounts = Accounts::new();
        assert!(!accounts.login(&SessionKey::new("s1"), "ghost"));
        assert!(accounts.user_for(&SessionKey::new("s1")).is_none());
    }

    #[test]
    fn logged_in_session_resolves_to_user() {
        let accounts = Accounts::new();
        accounts.register(Identity::authenticated("sam").with_flag(flags::STAFF));
        accounts.login(&SessionKey::new("s1"), "sam");

        let identity = accounts.identity(&request("s1")).unwrap();
        assert!(identity.is_staff());
        assert_eq!(identity.session(), Some(&SessionKey::new("s1")));
    }

    #[test]
    fn unknown_session_is_anonymous() {
        let accounts = Accounts::new();
        let identity = accounts.identity(&request("fresh")).unwrap();
        assert!(identity.is_anonymous());
        assert_eq!(identity.session(), Some(&SessionKey::new("fresh")));
    }

    #[test]
    fn no_session_yields_nothing() {
        let accounts = Accounts::new();
        assert!(accounts.identity(&Request::get("req-1", "/")).is_none());
    }

    #[test]
    fn logout_returns_to_anonymous() {
        let accounts = Accounts::new();
        accounts.register(Identity::authenticated("bob"));
        let session = SessionKey::new("s1");
        accounts.login(&session, "bob");

        assert!(accounts.logout(&session));
        assert!(!accounts.logout(&session));
        assert!(accounts.identity(&request("s1")).unwrap().is_anonymous());
    }

    #[test]
    fn anonymous_is_not_registered() {
        let accounts = Accounts::new();
        accounts.register(Identity::anonymous());
        assert!(!accounts.login(&SessionKey::new("s1"), ""));
    }
}
