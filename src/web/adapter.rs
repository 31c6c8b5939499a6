//! Request adapter for mapping HTTP requests to authgate types.

use std::collections::HashMap;

use crate::http::Method;
use crate::identity::{Identity, SessionKey};
use crate::request::Request;

use super::{ExtractIdentity, ExtractRequest};

/// Cookie carrying the session key.
pub const SESSION_COOKIE: &str = "sessionid";

/// Adapter for converting framework-specific HTTP requests into authgate types.
///
/// `RequestAdapter` holds simple owned data so it does not couple to any
/// framework's request type. Framework glue fills it in (usually through a
/// `From<FrameworkRequest>` impl) and hands it to
/// [`Site::serve`](super::Site::serve) or [`extract`](super::extract).
///
/// # Examples
///
/// ```
/// use authgate::web::{ExtractRequest, RequestAdapter};
/// use authgate::Method;
///
/// let mut adapter = RequestAdapter::new("req-12345".to_string());
/// adapter.set_method(Method::Post);
/// adapter.set_target("/add_messages?from=nav");
/// adapter.add_header("Cookie".to_string(), "theme=dark; sessionid=abc123".to_string());
///
/// let request = adapter.extract_request();
/// assert_eq!(request.request_id(), "req-12345");
/// assert_eq!(request.full_path(), "/add_messages?from=nav");
/// assert_eq!(request.session().map(|s| s.as_str()), Some("abc123"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    request_id: String,
    method: Method,
    /// Path plus optional query, as received
    target: String,
    /// Header names are stored lowercase
    headers: HashMap<String, String>,
    /// Identity resolved by framework middleware, if any
    identity: Option<Identity>,
}

impl RequestAdapter {
    /// Creates an adapter for a `GET /` with the given request ID.
    ///
    /// Use the setters to fill in the rest.
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            method: Method::Get,
            target: "/".to_string(),
            headers: HashMap::new(),
            identity: None,
        }
    }

    /// Sets the HTTP method.
    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    /// Sets the request target (path plus optional `?query`).
    pub fn set_target(&mut self, target: impl Into<String>) {
        self.target = target.into();
    }

    /// Adds a header. Names are case-insensitive.
    pub fn add_header(&mut self, key: String, value: String) {
        self.headers.insert(key.to_ascii_lowercase(), value);
    }

    /// Attaches an identity resolved by framework middleware.
    pub fn set_identity(&mut self, identity: Option<Identity>) {
        self.identity = identity;
    }

    /// Returns the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Looks up a header by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// The session key from the session cookie, if present and non-empty.
    pub fn session(&self) -> Option<SessionKey> {
        let cookies = self.header("cookie")?;
        cookies
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .map(SessionKey::new)
    }
}

impl ExtractRequest for RequestAdapter {
    fn extract_request(&self) -> Request {
        let request = Request::from_target(self.request_id.clone(), self.method, &self.target);
        match self.session() {
            Some(session) => request.with_session(session),
            None => request,
        }
    }
}

impl ExtractIdentity for RequestAdapter {
    fn extract_identity(&self) -> Option<Identity> {
        self.identity.clone()
    }
}
