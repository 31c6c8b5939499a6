use crate::http::Method;
use crate::identity::SessionKey;

/// An incoming request as the gate sees it.
///
/// Only what authorization needs: a request id for log correlation, the
/// method, the path and raw query string, and the session key the transport
/// resolved (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    request_id: String,
    method: Method,
    path: String,
    query: Option<String>,
    session: Option<SessionKey>,
}

impl Request {
    /// Creates a request with no query string.
    pub fn new(request_id: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            method,
            path: path.into(),
            query: None,
            session: None,
        }
    }

    /// Shorthand for a GET request.
    pub fn get(request_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(request_id, Method::Get, path)
    }

    /// Builds a request from a request target such as `/search?q=rust`.
    ///
    /// The query string is everything after the first `?`, kept verbatim.
    pub fn from_target(request_id: impl Into<String>, method: Method, target: &str) -> Self {
        match target.split_once('?') {
            Some((path, query)) => Self::new(request_id, method, path).with_query(query),
            None => Self::new(request_id, method, target),
        }
    }

    /// Sets the raw (already encoded) query string, without the leading `?`.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Attaches the session the transport resolved for this request.
    pub fn with_session(mut self, session: SessionKey) -> Self {
        self.session = Some(session);
        self
    }

    /// Request id used to correlate log lines.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// HTTP method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Path without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string, if the target had one.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Session key, if the transport resolved one.
    pub fn session(&self) -> Option<&SessionKey> {
        self.session.as_ref()
    }

    /// Path plus `?query` when a query string is present.
    ///
    /// This is exactly what the client asked for and what a login redirect
    /// carries back in its `next` parameter.
    pub fn full_path(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    /// Decoded value of the first query parameter named `name`.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query.as_deref().and_then(|q| query_value(q, name))
    }
}

/// Finds and decodes the first `name=value` pair in a query string.
///
/// `+` decodes to a space, as in form encoding. Malformed percent escapes
/// make the value unreadable and yield `None`.
pub(crate) fn query_value(query: &str, name: &str) -> Option<String> {
    query
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| decode(key).as_deref() == Some(name))
        .and_then(|(_, value)| decode(value))
}

fn decode(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|v| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_path_without_query() {
        let r = Request::get("req-1", "/private_place");
        assert_eq!(r.full_path(), "/private_place");
        assert!(r.query().is_none());
    }

    #[test]
    fn full_path_keeps_query_verbatim() {
        let r = Request::get("req-1", "/search").with_query("q=rust%20gates&page=2");
        assert_eq!(r.full_path(), "/search?q=rust%20gates&page=2");
    }

    #[test]
    fn from_target_splits_on_first_question_mark() {
        let r = Request::from_target("req-1", Method::Get, "/a?b=1?c");
        assert_eq!(r.path(), "/a");
        assert_eq!(r.query(), Some("b=1?c"));
        assert_eq!(r.full_path(), "/a?b=1?c");
    }

    #[test]
    fn from_target_preserves_empty_query() {
        let r = Request::from_target("req-1", Method::Get, "/a?");
        assert_eq!(r.full_path(), "/a?");
    }

    #[test]
    fn query_param_decodes() {
        let r = Request::get("req-1", "/accounts/login/")
            .with_query("next=/search%3Fq%3Drust&username=bob+smith");
        assert_eq!(r.query_param("next").as_deref(), Some("/search?q=rust"));
        assert_eq!(r.query_param("username").as_deref(), Some("bob smith"));
        assert_eq!(r.query_param("missing"), None);
    }

    #[test]
    fn query_param_without_value() {
        let r = Request::get("req-1", "/").with_query("flag&x=1");
        assert_eq!(r.query_param("flag").as_deref(), Some(""));
        assert_eq!(r.query_param("x").as_deref(), Some("1"));
    }
}
