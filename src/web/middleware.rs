//! Identity resolution at the web boundary.
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework-specific code builds RequestAdapter
//!   ↓
//! extract() / Site::serve()
//!   ↓
//! (Request, Identity)   identity falls back to anonymous
//!   ↓
//! Gates, then the handler
//! ```
//!
//! Nothing here authorizes. A missing identity is not an error: the request
//! continues as anonymous and the gates decide.

use crate::identity::Identity;
use crate::logging::RequestLog;
use crate::request::Request;

use super::{ExtractIdentity, ExtractRequest};

/// A request paired with the identity gates should see.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The request
    pub request: Request,
    /// The resolved identity, never missing
    pub identity: Identity,
}

/// Turns a possibly-missing identity into the one gates evaluate.
///
/// `None` is logged at `warn` and replaced by [`Identity::anonymous`]. The
/// request's session is bound to the identity when the identity carries
/// none of its own, so anonymous visitors can still receive notifications.
///
/// # Examples
///
/// ```
/// use authgate::web::resolve_identity;
/// use authgate::{Request, SessionKey};
///
/// let request = Request::get("req-1", "/").with_session(SessionKey::new("s1"));
/// let identity = resolve_identity(None, &request);
///
/// assert!(identity.is_anonymous());
/// assert_eq!(identity.session(), Some(&SessionKey::new("s1")));
/// ```
pub fn resolve_identity(resolved: Option<Identity>, request: &Request) -> Identity {
    let identity = match resolved {
        Some(identity) => identity,
        None => {
            let anonymous = Identity::anonymous();
            RequestLog::new(request, &anonymous)
                .warn(format_args!("no identity for {}, continuing as anonymous", request.path()));
            anonymous
        }
    };
    match (identity.session(), request.session()) {
        (None, Some(session)) => identity.with_session(session.clone()),
        _ => identity,
    }
}

/// Extracts the request and the framework-supplied identity from `source`.
///
/// # Examples
///
/// ```
/// use authgate::web::{extract, RequestAdapter};
/// use authgate::Identity;
///
/// let mut adapter = RequestAdapter::new("req-002".to_string());
/// adapter.set_identity(Some(Identity::authenticated("alice")));
///
/// let extraction = extract(&adapter);
/// assert_eq!(extraction.request.request_id(), "req-002");
/// assert!(extraction.identity.is_authenticated());
/// ```
pub fn extract<T>(source: &T) -> Extraction
where
    T: ExtractRequest + ExtractIdentity,
{
    let request = source.extract_request();
    let identity = resolve_identity(source.extract_identity(), &request);
    Extraction { request, identity }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SessionKey;
    use crate::web::RequestAdapter;

    #[test]
    fn missing_identity_becomes_anonymous() {
        let adapter = RequestAdapter::new("req-unauth-test".to_string());
        let extraction = extract(&adapter);

        assert_eq!(extraction.request.request_id(), "req-unauth-test");
        assert!(extraction.identity.is_anonymous());
        assert!(extraction.identity.session().is_none());
    }

    #[test]
    fn provided_identity_is_kept() {
        let mut adapter = RequestAdapter::new("req-auth-test".to_string());
        adapter.set_identity(Some(Identity::authenticated("bob")));

        let extraction = extract(&adapter);
        assert_eq!(extraction.identity.username(), "bob");
    }

    #[test]
    fn request_session_binds_to_identity() {
        let mut adapter = RequestAdapter::new("req-1".to_string());
        adapter.add_header("Cookie".to_string(), "sessionid=s1".to_string());
        adapter.set_identity(Some(Identity::authenticated("bob")));

        let extraction = extract(&adapter);
        assert_eq!(extraction.identity.session(), Some(&SessionKey::new("s1")));
    }

    #[test]
    fn identity_session_wins_over_cookie() {
        let request = Request::get("req-1", "/").with_session(SessionKey::new("cookie"));
        let identity = Identity::authenticated("bob").with_session(SessionKey::new("own"));

        let resolved = resolve_identity(Some(identity), &request);
        assert_eq!(resolved.session(), Some(&SessionKey::new("own")));
    }
}
