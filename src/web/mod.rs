//! Web framework integration surface.
//!
//! This module is the boundary between HTTP frameworks and the gates. It
//! handles:
//! - Mapping framework requests to [`Request`](crate::Request)
//! - Resolving the [`Identity`](crate::Identity) behind a request, falling
//!   back to anonymous when none can be found
//! - Dispatching to handlers by path ([`Site`])
//!
//! # Design Principles
//!
//! 1. **No Framework Dependencies**: nothing here names a concrete framework.
//!    Integrations implement [`ExtractRequest`] / [`ExtractIdentity`] or
//!    fill in a [`RequestAdapter`].
//!
//! 2. **No Authorization**: the boundary resolves who is asking and never
//!    decides what they may do. That happens in the gates around each
//!    handler.
//!
//! 3. **Explicit Context**: no global state. The identity is passed to every
//!    gate and handler.
//!
//! # Example Flow
//!
//! ```
//! use std::sync::Arc;
//!
//! use authgate::messages::MemorySessionStore;
//! use authgate::web::{blog, Accounts, RequestAdapter};
//! use authgate::{Identity, Method, Settings};
//!
//! let accounts = Arc::new(Accounts::new());
//! accounts.register(Identity::authenticated("bob"));
//! let site = blog::blog_site(&Settings::default(), accounts, MemorySessionStore::new());
//!
//! // Log in, queue two notifications, then see them on the front page.
//! for (method, target) in [
//!     (Method::Post, "/accounts/login/?username=bob"),
//!     (Method::Get, "/add_messages"),
//! ] {
//!     let mut adapter = RequestAdapter::new("req".to_string());
//!     adapter.set_method(method);
//!     adapter.set_target(target);
//!     adapter.add_header("Cookie".to_string(), "sessionid=s1".to_string());
//!     assert!(site.serve(&adapter).is_redirect());
//! }
//!
//! let mut adapter = RequestAdapter::new("req".to_string());
//! adapter.add_header("Cookie".to_string(), "sessionid=s1".to_string());
//! let page = site.serve(&adapter);
//! assert!(page.body().contains("[info] Hello bob\n[warning] DANGER"));
//! ```

mod accounts;
mod adapter;
pub mod blog;
mod extract;
mod middleware;
mod site;

pub use accounts::Accounts;
pub use adapter::{RequestAdapter, SESSION_COOKIE};
pub use extract::{ExtractIdentity, ExtractRequest, IdentityProvider};
pub use middleware::{extract, resolve_identity, Extraction};
pub use site::Site;
