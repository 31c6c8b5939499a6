//! Session storage seam.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::identity::SessionKey;

/// Durable per-session key/value storage.
///
/// Implemented by whatever persists sessions between requests (a database
/// table, a cache, a signed cookie). Values are opaque strings; the queue
/// stores JSON in them.
///
/// `update` and `take` must each be atomic with respect to every other call
/// on the same session field.
pub trait SessionStore: Send + Sync {
    /// Reads a field without consuming it.
    fn load(&self, session: &SessionKey, field: &str) -> Result<Option<String>>;

    /// Read-modify-write of a field. `apply` receives the current value and
    /// returns the new one.
    fn update(
        &self,
        session: &SessionKey,
        field: &str,
        apply: &mut dyn FnMut(Option<String>) -> Result<String>,
    ) -> Result<()>;

    /// Removes a field and returns what it held.
    fn take(&self, session: &SessionKey, field: &str) -> Result<Option<String>>;
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn load(&self, session: &SessionKey, field: &str) -> Result<Option<String>> {
        (**self).load(session, field)
    }

    fn update(
        &self,
        session: &SessionKey,
        field: &str,
        apply: &mut dyn FnMut(Option<String>) -> Result<String>,
    ) -> Result<()> {
        (**self).update(session, field, apply)
    }

    fn take(&self, session: &SessionKey, field: &str) -> Result<Option<String>> {
        (**self).take(session, field)
    }
}

/// In-process session store.
///
/// Suitable for tests and single-process demos. A single lock guards all
/// sessions, which makes `update` and `take` trivially atomic.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<SessionKey, HashMap<String, String>>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions holding at least one field.
    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Drops every field of a session.
    pub fn flush(&self, session: &SessionKey) {
        self.sessions.lock().remove(session);
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, session: &SessionKey, field: &str) -> Result<Option<String>> {
        Ok(self
            .sessions
            .lock()
            .get(session)
            .and_then(|fields| fields.get(field).cloned()))
    }

    fn update(
        &self,
        session: &SessionKey,
        field: &str,
        apply: &mut dyn FnMut(Option<String>) -> Result<String>,
    ) -> Result<()> {
        let mut sessions = self.sessions.lock();
        let current = sessions
            .get(session)
            .and_then(|fields| fields.get(field).cloned());
        let next = apply(current)?;
        sessions
            .entry(session.clone())
            .or_default()
            .insert(field.to_string(), next);
        Ok(())
    }

    fn take(&self, session: &SessionKey, field: &str) -> Result<Option<String>> {
        let mut sessions = self.sessions.lock();
        let Some(fields) = sessions.get_mut(session) else {
            return Ok(None);
        };
        let value = fields.remove(field);
        if fields.is_empty() {
            sessions.remove(session);
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn update_then_load() {
        let store = MemorySessionStore::new();
        let key = SessionKey::new("s1");
        store
            .update(&key, "f", &mut |current| {
                assert!(current.is_none());
                Ok("one".to_string())
            })
            .unwrap();
        assert_eq!(store.load(&key, "f").unwrap().as_deref(), Some("one"));
    }

    #[test]
    fn take_clears_field() {
        let store = MemorySessionStore::new();
        let key = SessionKey::new("s1");
        store.update(&key, "f", &mut |_| Ok("v".to_string())).unwrap();

        assert_eq!(store.take(&key, "f").unwrap().as_deref(), Some("v"));
        assert_eq!(store.take(&key, "f").unwrap(), None);
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn failed_update_leaves_value() {
        let store = MemorySessionStore::new();
        let key = SessionKey::new("s1");
        store.update(&key, "f", &mut |_| Ok("v".to_string())).unwrap();

        let result = store.update(&key, "f", &mut |_| Err(Error::queue_unavailable("nope")));
        assert!(result.is_err());
        assert_eq!(store.load(&key, "f").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn sessions_are_isolated() {
        let store = MemorySessionStore::new();
        let a = SessionKey::new("a");
        let b = SessionKey::new("b");
        store.update(&a, "f", &mut |_| Ok("for a".to_string())).unwrap();

        assert_eq!(store.load(&b, "f").unwrap(), None);
        store.flush(&a);
        assert_eq!(store.load(&a, "f").unwrap(), None);
    }

    #[test]
    fn arc_store_delegates() {
        let store = Arc::new(MemorySessionStore::new());
        let key = SessionKey::new("s1");
        store.update(&key, "f", &mut |_| Ok("v".to_string())).unwrap();
        assert_eq!(SessionStore::load(&store, &key, "f").unwrap().as_deref(), Some("v"));
    }
}
