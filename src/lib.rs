//! Request authorization gates, role predicates and session-scoped
//! notifications for web handlers.
//!
//! The crate decides, per request, whether a handler may run:
//! - **Identity**: an explicit per-request snapshot of who is asking
//! - **Predicates**: named, composable, fail-closed tests over the identity
//! - **Gates**: wrappers that admit the handler or answer with a login
//!   redirect (carrying `next`) or a 403
//! - **Notifications**: a per-session queue that admitted handlers write to
//!   and the next render drains exactly once
//!
//! # Core Types
//!
//! - [`Identity`]: who is making the request
//! - [`Predicate`]: `Authenticated`, `Staff`, permissions, custom tests and
//!   their combinations
//! - [`guard`] / [`Guarded`]: one predicate in front of one [`Handler`]
//! - [`Gate`]: several layers in front of one handler
//! - [`messages::Notifications`]: the notification queue
//!
//! # Examples
//!
//! ```
//! use authgate::{
//!     guard, handler_fn, Denial, Handler, Identity, Predicate, Request, Response, StatusCode,
//! };
//!
//! let staff_place = guard(
//!     guard(
//!         handler_fn(|_, _| Response::ok("staff only")),
//!         Predicate::Staff,
//!         Denial::Forbidden,
//!     ),
//!     Predicate::Authenticated,
//!     Denial::RedirectToLogin,
//! );
//!
//! let request = Request::get("req-123", "/staff_place/");
//!
//! let anon = staff_place.call(&Identity::anonymous(), &request);
//! assert_eq!(anon.location(), Some("/accounts/login/?next=/staff_place/"));
//!
//! let bob = staff_place.call(&Identity::authenticated("bob"), &request);
//! assert_eq!(bob.status(), StatusCode::FORBIDDEN);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod gate;
mod http;
mod identity;
mod logging;
pub mod messages;
mod predicate;
mod request;
pub mod web;

pub use config::{
    GateConfig, MessageConfig, Settings, TagOverrides, ENV_LOGIN_URL, ENV_REDIRECT_FIELD,
};
pub use error::{Error, PredicateError, Result};
pub use gate::{
    guard, handler_fn, login_required, permission_required, post_login_redirect, redirect_to_login,
    staff_member_required, user_passes_test, Denial, Gate, GateChain, Guarded, Handler, HandlerFn,
};
pub use http::{Method, Response, StatusCode};
pub use identity::{flags, Identity, SessionKey};
pub use logging::RequestLog;
pub use predicate::Predicate;
pub use request::Request;
