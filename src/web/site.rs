//! Path to handler dispatch.

use std::fmt;

use crate::gate::Handler;
use crate::http::Response;
use crate::identity::Identity;
use crate::logging::RequestLog;
use crate::request::Request;

use super::{resolve_identity, ExtractIdentity, ExtractRequest, IdentityProvider};

type Route = (String, Box<dyn Handler>);

/// A table of routes plus the provider that resolves identities for them.
///
/// Paths match exactly, except that a trailing `/` is optional on both the
/// route and the request. Unknown paths get a 404.
///
/// # Examples
///
/// ```
/// use authgate::web::{Accounts, Site};
/// use authgate::{handler_fn, Request, Response, StatusCode};
///
/// let site = Site::new(Accounts::new())
///     .route("/", handler_fn(|_, _| Response::ok("home")));
///
/// assert_eq!(site.handle(&Request::get("req-1", "/")).body(), "home");
/// assert_eq!(site.handle(&Request::get("req-2", "/nope")).status(), StatusCode::NOT_FOUND);
/// ```
pub struct Site<P> {
    provider: P,
    routes: Vec<Route>,
}

impl<P: IdentityProvider> Site<P> {
    /// Creates a site with no routes.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            routes: Vec::new(),
        }
    }

    /// Adds a route. A later route for the same path replaces the earlier one.
    pub fn route<H>(mut self, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        let path = path.into();
        self.routes.retain(|(existing, _)| !same_path(existing, &path));
        self.routes.push((path, Box::new(handler)));
        self
    }

    /// The identity provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Registered paths, in registration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(path, _)| path.as_str())
    }

    /// Resolves the identity through the provider and dispatches.
    pub fn handle(&self, request: &Request) -> Response {
        let identity = resolve_identity(self.provider.identity(request), request);
        self.dispatch(&identity, request)
    }

    /// Dispatches a framework request.
    ///
    /// An identity attached by the framework takes precedence over the
    /// provider.
    pub fn serve<T>(&self, source: &T) -> Response
    where
        T: ExtractRequest + ExtractIdentity,
    {
        let request = source.extract_request();
        let resolved = source
            .extract_identity()
            .or_else(|| self.provider.identity(&request));
        let identity = resolve_identity(resolved, &request);
        self.dispatch(&identity, &request)
    }

    /// Dispatches with an already-resolved identity.
    pub fn dispatch(&self, identity: &Identity, request: &Request) -> Response {
        match self.routes.iter().find(|(path, _)| same_path(path, request.path())) {
            Some((_, handler)) => handler.call(identity, request),
            None => {
                RequestLog::new(request, identity)
                    .debug(format_args!("no route for {}", request.path()));
                Response::not_found()
            }
        }
    }
}

impl<P: fmt::Debug> fmt::Debug for Site<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Site")
            .field("provider", &self.provider)
            .field("routes", &self.routes.iter().map(|(p, _)| p).collect::<Vec<_>>())
            .finish()
    }
}

fn same_path(a: &str, b: &str) -> bool {
    trim_slash(a) == trim_slash(b)
}

fn trim_slash(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
