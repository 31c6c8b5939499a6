//! Session-scoped, leveled user notifications.
//!
//! This module provides:
//! - `Level`: ordered severity of a notification
//! - `Notification`: one pending message with its rendering tags
//! - `SessionStore`: the seam to whatever persists sessions between requests
//! - `Notifications`: the queue handlers write to and renders drain
//!
//! Delivery is at-most-once and in insertion order: a drain hands back every
//! pending notification and clears the queue in the same store operation.

mod level;
mod notification;
mod queue;
mod store;

pub use level::Level;
pub use notification::Notification;
pub use queue::{Drain, Notifications};
pub use store::{MemorySessionStore, SessionStore};
