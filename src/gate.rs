use crate::config::GateConfig;
use crate::http::Response;
use crate::identity::Identity;
use crate::logging::RequestLog;
use crate::predicate::Predicate;
use crate::request::Request;

/// A view: turns an identity and a request into a response.
///
/// Gates are handlers too, so wrapping composes by nesting.
pub trait Handler {
    /// Handles one request.
    fn call(&self, identity: &Identity, request: &Request) -> Response;
}

/// Handler built from a closure. See [`handler_fn`].
#[derive(Debug, Clone, Copy)]
pub struct HandlerFn<F> {
    f: F,
}

/// Wraps a closure as a [`Handler`].
///
/// ```
/// use authgate::{handler_fn, Handler, Identity, Request, Response};
///
/// let hello = handler_fn(|identity, _request| {
///     Response::ok(format!("hi {}", identity.username()))
/// });
/// let r = hello.call(&Identity::authenticated("bob"), &Request::get("req-1", "/"));
/// assert_eq!(r.body(), "hi bob");
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&Identity, &Request) -> Response,
{
    HandlerFn { f }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&Identity, &Request) -> Response,
{
    fn call(&self, identity: &Identity, request: &Request) -> Response {
        (self.f)(identity, request)
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn call(&self, identity: &Identity, request: &Request) -> Response {
        (**self).call(identity, request)
    }
}

/// What a gate answers when its predicate does not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// 302 to the configured login URL, carrying the original full path.
    RedirectToLogin,
    /// 302 to the given login URL instead of the configured one.
    RedirectTo(String),
    /// Plain 403.
    Forbidden,
}

impl Denial {
    /// Builds the denial response for `request`.
    pub fn respond(&self, request: &Request, config: &GateConfig) -> Response {
        match self {
            Denial::RedirectToLogin => redirect_to_login(
                &request.full_path(),
                &config.login_url,
                &config.redirect_field_name,
            ),
            Denial::RedirectTo(login_url) => {
                redirect_to_login(&request.full_path(), login_url, &config.redirect_field_name)
            }
            Denial::Forbidden => Response::forbidden(),
        }
    }
}

/// A 302 to `login_url` with `field=<next>` appended to its query string.
///
/// `next` is percent-encoded except for `/`, so the common case reads
/// naturally (`/accounts/login/?next=/private_place`) and the value decodes
/// back to `next` exactly.
///
/// ```
/// use authgate::redirect_to_login;
///
/// let r = redirect_to_login("/search?q=rust", "/accounts/login/", "next");
/// assert_eq!(r.location(), Some("/accounts/login/?next=/search%3Fq%3Drust"));
/// ```
pub fn redirect_to_login(next: &str, login_url: &str, field: &str) -> Response {
    let encoded = urlencoding::encode(next).replace("%2F", "/");
    let sep = match login_url.split_once('?') {
        None => "?",
        Some((_, query)) if query.is_empty() || query.ends_with('&') => "",
        Some(_) => "&",
    };
    Response::redirect(format!("{}{}{}={}", login_url, sep, field, encoded))
}

/// Where to send a user after logging in.
///
/// Reads the redirect field from the login request and accepts it only when
/// it is a local absolute path; anything else (another host, a scheme,
/// protocol-relative `//`, backslashes) falls back to `fallback`.
pub fn post_login_redirect(request: &Request, config: &GateConfig, fallback: &str) -> String {
    request
        .query_param(&config.redirect_field_name)
        .filter(|next| is_local_path(next))
        .unwrap_or_else(|| fallback.to_string())
}

fn is_local_path(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && !target.chars().any(char::is_control)
}

/// A handler behind a predicate.
///
/// Built by [`guard`] or the helper constructors. The predicate is
/// evaluated before the wrapped handler starts; on denial the handler is not
/// called at all.
#[derive(Debug, Clone)]
pub struct Guarded<H> {
    inner: H,
    predicate: Predicate,
    denial: Denial,
    config: GateConfig,
}

impl<H> Guarded<H> {
    /// Replaces the gate's configuration.
    pub fn with_config(mut self, config: GateConfig) -> Self {
        self.config = config;
        self
    }

    /// The gate's predicate.
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// The gate's denial strategy.
    pub fn denial(&self) -> &Denial {
        &self.denial
    }

    /// The wrapped handler.
    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H: Handler> Handler for Guarded<H> {
    fn call(&self, identity: &Identity, request: &Request) -> Response {
        if admits(&self.predicate, identity, request) {
            return self.inner.call(identity, request);
        }
        deny(&self.predicate, &self.denial, &self.config, identity, request)
    }
}

fn admits(predicate: &Predicate, identity: &Identity, request: &Request) -> bool {
    let admitted = predicate.evaluate(identity);
    if admitted {
        RequestLog::new(request, identity).debug(format_args!(
            "{} {} admitted by {}",
            request.method(),
            request.path(),
            predicate
        ));
    }
    admitted
}

fn deny(
    predicate: &Predicate,
    denial: &Denial,
    config: &GateConfig,
    identity: &Identity,
    request: &Request,
) -> Response {
    let response = denial.respond(request, config);
    RequestLog::new(request, identity).info(format_args!(
        "{} {} denied by {} ({})",
        request.method(),
        request.path(),
        predicate,
        response.status()
    ));
    response
}

/// Wraps `handler` so it runs only when `predicate` holds.
///
/// Uses the default [`GateConfig`]; see [`Guarded::with_config`] or [`Gate`]
/// for another login URL.
///
/// ```
/// use authgate::{guard, handler_fn, Denial, Handler, Identity, Predicate, Request, Response};
///
/// let private = guard(
///     handler_fn(|_, _| Response::ok("secret")),
///     Predicate::Authenticated,
///     Denial::RedirectToLogin,
/// );
///
/// let r = private.call(&Identity::anonymous(), &Request::get("req-1", "/private_place"));
/// assert_eq!(r.location(), Some("/accounts/login/?next=/private_place"));
/// ```
pub fn guard<H: Handler>(handler: H, predicate: Predicate, denial: Denial) -> Guarded<H> {
    Guarded {
        inner: handler,
        predicate,
        denial,
        config: GateConfig::default(),
    }
}

/// Requires a logged-in user; anonymous requests go to the login page.
pub fn login_required<H: Handler>(handler: H, config: &GateConfig) -> Guarded<H> {
    user_passes_test(handler, Predicate::Authenticated, config)
}

/// Requires `predicate`; failing requests go to the login page.
pub fn user_passes_test<H: Handler>(
    handler: H,
    predicate: Predicate,
    config: &GateConfig,
) -> Guarded<H> {
    guard(handler, predicate, Denial::RedirectToLogin).with_config(config.clone())
}

/// Requires an active staff member; others go to the login page.
pub fn staff_member_required<H: Handler>(handler: H, config: &GateConfig) -> Guarded<H> {
    user_passes_test(handler, Predicate::Active.and(Predicate::Staff), config)
}

/// Requires every permission in `perms`.
///
/// With `raise_exception` the denial is a 403; otherwise the user is sent
/// to the login page to sign in as someone who holds them.
pub fn permission_required<H, I, S>(
    handler: H,
    perms: I,
    raise_exception: bool,
    config: &GateConfig,
) -> Guarded<H>
where
    H: Handler,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let denial = if raise_exception {
        Denial::Forbidden
    } else {
        Denial::RedirectToLogin
    };
    guard(handler, Predicate::permissions(perms), denial).with_config(config.clone())
}

/// Builder stacking several gates in front of one handler.
///
/// Each [`require`](Self::require) adds a layer; the first one added is the
/// outermost and is evaluated first. Evaluation stops at the first layer
/// that denies.
///
/// # Examples
///
/// ```
/// use authgate::{
///     handler_fn, Denial, Gate, GateConfig, Handler, Identity, Predicate, Request, Response,
///     StatusCode,
/// };
///
/// let staff_only = Gate::new(GateConfig::default())
///     .require(Predicate::Authenticated, Denial::RedirectToLogin)
///     .require(Predicate::Staff, Denial::Forbidden)
///     .wrap(handler_fn(|_, _| Response::ok("staff area")));
///
/// let request = Request::get("req-1", "/staff_place/");
/// let anon = staff_only.call(&Identity::anonymous(), &request);
/// assert_eq!(anon.status(), StatusCode::FOUND);
///
/// let bob = staff_only.call(&Identity::authenticated("bob"), &request);
/// assert_eq!(bob.status(), StatusCode::FORBIDDEN);
/// ```
#[derive(Debug, Clone)]
pub struct Gate {
    config: GateConfig,
    layers: Vec<(Predicate, Denial)>,
}

impl Gate {
    /// Creates a gate with no layers.
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            layers: Vec::new(),
        }
    }

    /// Adds a layer inside the ones already added.
    pub fn require(mut self, predicate: Predicate, denial: Denial) -> Self {
        self.layers.push((predicate, denial));
        self
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether no layer was added.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Puts `handler` behind every layer.
    pub fn wrap<H: Handler>(self, handler: H) -> GateChain<H> {
        GateChain {
            inner: handler,
            layers: self.layers,
            config: self.config,
        }
    }
}

/// A handler behind a stack of gates. Built by [`Gate::wrap`].
#[derive(Debug, Clone)]
pub struct GateChain<H> {
    inner: H,
    layers: Vec<(Predicate, Denial)>,
    config: GateConfig,
}

impl<H: Handler> Handler for GateChain<H> {
    fn call(&self, identity: &Identity, request: &Request) -> Response {
        for (predicate, denial) in &self.layers {
            if !admits(predicate, identity, request) {
                return deny(predicate, denial, &self.config, identity, request);
            }
        }
        self.inner.call(identity, request)
    }
}
