use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// HTTP GET method
    #[default]
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
            Method::Patch => write!(f, "PATCH"),
        }
    }
}

/// HTTP status code of a [`Response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(u16);

impl StatusCode {
    /// 200 OK
    pub const OK: StatusCode = StatusCode(200);
    /// 302 Found
    pub const FOUND: StatusCode = StatusCode(302);
    /// 403 Forbidden
    pub const FORBIDDEN: StatusCode = StatusCode(403);
    /// 404 Not Found
    pub const NOT_FOUND: StatusCode = StatusCode(404);

    /// Wraps a raw status code.
    pub const fn from_u16(code: u16) -> Self {
        StatusCode(code)
    }

    /// Returns the numeric code.
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Whether this is a 3xx status.
    pub const fn is_redirection(self) -> bool {
        self.0 >= 300 && self.0 < 400
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Response produced by a handler or by a gate that denied a request.
///
/// This is deliberately small: status, an optional `Location` and a text
/// body. Framework integrations map it onto their own response type.
///
/// # Examples
///
/// ```
/// use authgate::{Response, StatusCode};
///
/// let r = Response::redirect("/accounts/login/?next=/private_place");
/// assert_eq!(r.status(), StatusCode::FOUND);
/// assert_eq!(r.location(), Some("/accounts/login/?next=/private_place"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    location: Option<String>,
    body: String,
}

impl Response {
    /// A 200 response with a body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            location: None,
            body: body.into(),
        }
    }

    /// A 302 redirect to `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FOUND,
            location: Some(location.into()),
            body: String::new(),
        }
    }

    /// A 403 with an empty body.
    pub fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            location: None,
            body: String::new(),
        }
    }

    /// A 404 with an empty body.
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            location: None,
            body: String::new(),
        }
    }

    /// Status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Redirect target, for 3xx responses.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether this response redirects.
    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection()
    }
}
