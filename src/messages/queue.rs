//! The notification queue handlers write to and renders drain.

use std::iter::FusedIterator;
use std::vec;

use super::{Level, Notification, SessionStore};
use crate::config::MessageConfig;
use crate::error::{Error, Result};
use crate::identity::{Identity, SessionKey};

/// Session-scoped notification queue.
///
/// Notifications are appended to the session of the identity passed in and
/// handed back, in insertion order, by the next
/// [`drain_for_render`](Self::drain_for_render). Each queue is private to its
/// session.
///
/// # Examples
///
/// ```
/// use authgate::{Identity, SessionKey};
/// use authgate::messages::{Level, MemorySessionStore, Notifications};
///
/// let queue = Notifications::new(MemorySessionStore::new());
/// let bob = Identity::authenticated("bob").with_session(SessionKey::new("s1"));
///
/// queue.info(&bob, "Hello bob").unwrap();
/// queue.warning(&bob, "DANGER").unwrap();
///
/// let shown: Vec<_> = queue.drain_for_render(&bob).unwrap().collect();
/// assert_eq!(shown.len(), 2);
/// assert_eq!(shown[0].tags(), "info");
/// assert_eq!(shown[1].tags(), "warning");
///
/// assert_eq!(queue.drain_for_render(&bob).unwrap().count(), 0);
/// ```
#[derive(Debug)]
pub struct Notifications<S> {
    store: S,
    config: MessageConfig,
}

impl<S: SessionStore> Notifications<S> {
    /// Creates a queue with default settings.
    pub fn new(store: S) -> Self {
        Self::with_config(store, MessageConfig::default())
    }

    /// Creates a queue with explicit settings.
    pub fn with_config(store: S, config: MessageConfig) -> Self {
        Self { store, config }
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Appends a notification to the identity's session queue.
    ///
    /// # Errors
    ///
    /// [`Error::QueueUnavailable`] if the identity has no session or the
    /// store cannot be reached; [`Error::Codec`] if the stored queue is
    /// corrupt.
    pub fn enqueue(
        &self,
        identity: &Identity,
        level: Level,
        text: impl Into<String>,
    ) -> Result<()> {
        self.push(identity, Notification::new(level, text))
    }

    /// Like [`enqueue`](Self::enqueue), with extra rendering tags.
    pub fn enqueue_with_tags(
        &self,
        identity: &Identity,
        level: Level,
        text: impl Into<String>,
        extra_tags: impl Into<String>,
    ) -> Result<()> {
        self.push(identity, Notification::new(level, text).with_extra_tags(extra_tags))
    }

    /// Best-effort enqueue: failures are logged and dropped.
    ///
    /// Returns whether the notification was queued.
    pub fn enqueue_quiet(
        &self,
        identity: &Identity,
        level: Level,
        text: impl Into<String>,
    ) -> bool {
        match self.enqueue(identity, level, text) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(user = %identity.username(), error = %err, "dropping notification");
                false
            }
        }
    }

    /// Enqueues at [`Level::Debug`].
    pub fn debug(&self, identity: &Identity, text: impl Into<String>) -> Result<()> {
        self.enqueue(identity, Level::Debug, text)
    }

    /// Enqueues at [`Level::Info`].
    pub fn info(&self, identity: &Identity, text: impl Into<String>) -> Result<()> {
        self.enqueue(identity, Level::Info, text)
    }

    /// Enqueues at [`Level::Success`].
    pub fn success(&self, identity: &Identity, text: impl Into<String>) -> Result<()> {
        self.enqueue(identity, Level::Success, text)
    }

    /// Enqueues at [`Level::Warning`].
    pub fn warning(&self, identity: &Identity, text: impl Into<String>) -> Result<()> {
        self.enqueue(identity, Level::Warning, text)
    }

    /// Enqueues at [`Level::Error`].
    pub fn error(&self, identity: &Identity, text: impl Into<String>) -> Result<()> {
        self.enqueue(identity, Level::Error, text)
    }

    /// Takes every pending notification for the identity's session.
    ///
    /// The queue is emptied by the same store operation that reads it, so a
    /// second drain without an intervening enqueue yields nothing.
    ///
    /// # Errors
    ///
    /// Same as [`enqueue`](Self::enqueue).
    pub fn drain_for_render(&self, identity: &Identity) -> Result<Drain> {
        let session = session_of(identity)?;
        let pending = match self.store.take(session, &self.config.session_field)? {
            Some(raw) => decode(&raw)?,
            None => Vec::new(),
        };
        tracing::debug!(session = %session, count = pending.len(), "drained notifications");
        let tags = &self.config.tags;
        let tagged: Vec<Notification> = pending.into_iter().map(|n| n.tagged(tags)).collect();
        Ok(Drain {
            inner: tagged.into_iter(),
        })
    }

    /// Number of notifications waiting, without consuming them.
    pub fn pending(&self, identity: &Identity) -> Result<usize> {
        let session = session_of(identity)?;
        match self.store.load(session, &self.config.session_field)? {
            Some(raw) => Ok(decode(&raw)?.len()),
            None => Ok(0),
        }
    }

    fn push(&self, identity: &Identity, notification: Notification) -> Result<()> {
        let session = session_of(identity)?;
        let level = notification.level();
        let mut pending = Some(notification);
        self.store
            .update(session, &self.config.session_field, &mut |current| {
                let mut queue = match current {
                    Some(raw) => decode(&raw)?,
                    None => Vec::new(),
                };
                queue.extend(pending.take());
                Ok(serde_json::to_string(&queue)?)
            })?;
        tracing::debug!(session = %session, %level, "queued notification");
        Ok(())
    }
}

fn session_of(identity: &Identity) -> Result<&SessionKey> {
    identity
        .session()
        .ok_or_else(|| Error::queue_unavailable("request has no session"))
}

fn decode(raw: &str) -> Result<Vec<Notification>> {
    Ok(serde_json::from_str(raw)?)
}

/// Notifications handed to one render.
///
/// Finite and not restartable: once iterated, the notifications are gone.
#[derive(Debug)]
pub struct Drain {
    inner: vec::IntoIter<Notification>,
}

impl Iterator for Drain {
    type Item = Notification;

    fn next(&mut self) -> Option<Notification> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Drain {}

impl FusedIterator for Drain {}
