//! Extraction boundary traits for web integration.
//!
//! These traits map framework-specific request types onto the crate's
//! [`Request`] and [`Identity`]. They never authorize anything; that is the
//! job of the gates wrapped around each handler.

use std::sync::Arc;

use crate::identity::Identity;
use crate::request::Request;

/// Extracts the routing view of a framework-specific request.
///
/// # Examples
///
/// ```
/// use authgate::web::ExtractRequest;
/// use authgate::{Method, Request};
///
/// struct MyFrameworkRequest {
///     id: String,
///     uri: String,
/// }
///
/// impl ExtractRequest for MyFrameworkRequest {
///     fn extract_request(&self) -> Request {
///         Request::from_target(self.id.clone(), Method::Get, &self.uri)
///     }
/// }
///
/// let req = MyFrameworkRequest { id: "req-1".into(), uri: "/posts/?page=2".into() };
/// assert_eq!(req.extract_request().full_path(), "/posts/?page=2");
/// ```
pub trait ExtractRequest {
    /// Builds the [`Request`] gates and handlers see.
    fn extract_request(&self) -> Request;
}

/// Extracts an identity the framework already resolved, if any.
///
/// Frameworks that authenticate in their own middleware implement this;
/// `None` means "not known here" and defers to an [`IdentityProvider`].
pub trait ExtractIdentity {
    /// The identity attached to the request, if any.
    fn extract_identity(&self) -> Option<Identity>;
}

/// Resolves the identity behind a request, usually from its session.
///
/// Returning `None` means the identity could not be determined at all, which
/// the web layer treats as anonymous (see
/// [`resolve_identity`](super::resolve_identity)).
pub trait IdentityProvider {
    /// Looks up the identity for `request`.
    fn identity(&self, request: &Request) -> Option<Identity>;
}

impl<T: IdentityProvider + ?Sized> IdentityProvider for Arc<T> {
    fn identity(&self, request: &Request) -> Option<Identity> {
        (**self).identity(request)
    }
}

impl<T: IdentityProvider + ?Sized> IdentityProvider for &T {
    fn identity(&self, request: &Request) -> Option<Identity> {
        (**self).identity(request)
    }
}
