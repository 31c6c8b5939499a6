//! A small blog site wired from the crate's gates and notification queue.
//!
//! | path              | policy                             | on denial        |
//! |-------------------|------------------------------------|------------------|
//! | `/`               | public                             |                  |
//! | `/private_place`  | logged in                          | login redirect   |
//! | `/staff_place/`   | staff flag                         | 403              |
//! | `/add_messages`   | logged in                          | login redirect   |
//! | login URL         | public                             |                  |
//! | `/accounts/logout/` | public                           |                  |
//!
//! Bodies are plain text; notifications render as `[tags] text` lines.

use std::sync::Arc;

use crate::config::{GateConfig, Settings};
use crate::gate::{guard, handler_fn, login_required, post_login_redirect, Denial, Handler};
use crate::http::{Method, Response};
use crate::identity::Identity;
use crate::logging::RequestLog;
use crate::messages::{Level, Notification, Notifications, SessionStore};
use crate::predicate::Predicate;
use crate::request::Request;

use super::{Accounts, IdentityProvider, Site};

/// Logout path.
pub const LOGOUT_PATH: &str = "/accounts/logout/";

/// Public front page. Shows who is visiting and drains pending notifications.
///
/// A queue failure is logged and the page renders without notifications.
pub fn index<S>(queue: Arc<Notifications<S>>) -> impl Handler
where
    S: SessionStore + 'static,
{
    handler_fn(move |identity: &Identity, request: &Request| {
        let mut body = format!("Blog index\nvisitor: {}\n", visitor(identity));
        match queue.drain_for_render(identity) {
            Ok(drain) => {
                for notification in drain {
                    body.push_str(&render(&notification));
                    body.push('\n');
                }
            }
            Err(err) => {
                RequestLog::new(request, identity)
                    .warn(format_args!("rendering without notifications: {}", err));
            }
        }
        Response::ok(body)
    })
}

/// Members-only page.
pub fn private_place(config: &GateConfig) -> impl Handler {
    login_required(
        handler_fn(|identity: &Identity, _: &Request| {
            Response::ok(format!("Private place\nwelcome, {}\n", identity.username()))
        }),
        config,
    )
}

/// Staff-only page; everyone else gets a 403.
pub fn staff_place() -> impl Handler {
    guard(
        handler_fn(|identity: &Identity, _: &Request| {
            Response::ok(format!("Staff place\nwelcome, {}\n", identity.username()))
        }),
        Predicate::Staff,
        Denial::Forbidden,
    )
}

/// Queues a greeting and a warning for the visitor, then sends them home.
pub fn add_messages<S>(queue: Arc<Notifications<S>>, config: &GateConfig) -> impl Handler
where
    S: SessionStore + 'static,
{
    login_required(
        handler_fn(move |identity: &Identity, request: &Request| {
            let log = RequestLog::new(request, identity);
            let queued = [
                (Level::Info, format!("Hello {}", identity.username())),
                (Level::Warning, "DANGER".to_string()),
            ];
            for (level, text) in queued {
                if let Err(err) = queue.enqueue(identity, level, text) {
                    log.error(format_args!("could not queue notification: {}", err));
                }
            }
            Response::redirect("/")
        }),
        config,
    )
}

/// Login entry point.
///
/// `GET` shows the form text, echoing the redirect field. `POST` with a
/// `username` query parameter logs the session in and redirects to the
/// redirect field when it names a local path, or to `/`. Requests without a
/// session cannot log in and get a 403.
pub fn login<S>(
    accounts: Arc<Accounts>,
    queue: Arc<Notifications<S>>,
    config: &GateConfig,
) -> impl Handler
where
    S: SessionStore + 'static,
{
    let config = config.clone();
    handler_fn(move |identity: &Identity, request: &Request| {
        let log = RequestLog::new(request, identity);
        if request.method() != Method::Post {
            let next = post_login_redirect(request, &config, "/");
            return Response::ok(format!("Log in\n{}: {}\n", config.redirect_field_name, next));
        }
        let Some(session) = request.session() else {
            log.warn(format_args!("login attempt without a session"));
            return Response::forbidden();
        };
        let username = request.query_param("username").unwrap_or_default();
        if !accounts.login(session, &username) {
            log.info(format_args!("rejected login for {:?}", username));
            return Response::forbidden();
        }
        log.info(format_args!("{} logged in", username));
        let Some(user) = accounts.identity(request) else {
            return Response::forbidden();
        };
        queue.enqueue_quiet(&user, Level::Success, format!("Welcome back, {}", username));
        Response::redirect(post_login_redirect(request, &config, "/"))
    })
}

/// Logs the session out and redirects to `/`.
pub fn logout(accounts: Arc<Accounts>) -> impl Handler {
    handler_fn(move |identity: &Identity, request: &Request| {
        if let Some(session) = request.session() {
            if accounts.logout(session) {
                RequestLog::new(request, identity).info(format_args!("logged out"));
            }
        }
        Response::redirect("/")
    })
}

/// Wires every blog page into a [`Site`] resolving identities from `accounts`.
///
/// The login page is routed at the path of the configured login URL when it
/// is a local path; an external login URL gets no route here.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use authgate::messages::MemorySessionStore;
/// use authgate::web::{blog, Accounts};
/// use authgate::{Request, Settings, StatusCode};
///
/// let accounts = Arc::new(Accounts::new());
/// let site = blog::blog_site(&Settings::default(), accounts, MemorySessionStore::new());
///
/// let r = site.handle(&Request::get("req-1", "/private_place"));
/// assert_eq!(r.location(), Some("/accounts/login/?next=/private_place"));
///
/// let r = site.handle(&Request::get("req-2", "/staff_place/"));
/// assert_eq!(r.status(), StatusCode::FORBIDDEN);
/// ```
pub fn blog_site<S>(settings: &Settings, accounts: Arc<Accounts>, store: S) -> Site<Arc<Accounts>>
where
    S: SessionStore + 'static,
{
    let gate = &settings.gate;
    let queue = Arc::new(Notifications::with_config(store, settings.messages.clone()));

    let site = Site::new(accounts.clone())
        .route("/", index(queue.clone()))
        .route("/private_place", private_place(gate))
        .route("/staff_place/", staff_place())
        .route("/add_messages", add_messages(queue.clone(), gate))
        .route(LOGOUT_PATH, logout(accounts.clone()));

    match local_route(&gate.login_url) {
        Some(path) => site.route(path, login(accounts, queue, gate)),
        None => site,
    }
}

fn visitor(identity: &Identity) -> &str {
    if identity.is_authenticated() {
        identity.username()
    } else {
        "anonymous"
    }
}

fn render(notification: &Notification) -> String {
    format!("[{}] {}", notification.tags(), notification.text())
}

fn local_route(url: &str) -> Option<&str> {
    let path = url.split('?').next().unwrap_or(url);
    (path.starts_with('/') && !path.starts_with("//")).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;
    use crate::identity::{flags, SessionKey};
    use crate::messages::MemorySessionStore;

    fn queue() -> Arc<Notifications<MemorySessionStore>> {
        Arc::new(Notifications::new(MemorySessionStore::new()))
    }

    fn bob() -> Identity {
        Identity::authenticated("bob").with_session(SessionKey::new("bob-session"))
    }

    #[test]
    fn add_messages_then_index_shows_both_in_order() {
        let queue = queue();
        let config = GateConfig::default();
        let add = add_messages(queue.clone(), &config);
        let home = index(queue);

        let r = add.call(&bob(), &Request::get("req-1", "/add_messages"));
        assert_eq!(r.location(), Some("/"));

        let page = home.call(&bob(), &Request::get("req-2", "/"));
        assert_eq!(page.body(), "Blog index\nvisitor: bob\n[info] Hello bob\n[warning] DANGER\n");

        let again = home.call(&bob(), &Request::get("req-3", "/"));
        assert_eq!(again.body(), "Blog index\nvisitor: bob\n");
    }

    #[test]
    fn add_messages_requires_login() {
        let queue = queue();
        let add = add_messages(queue.clone(), &GateConfig::default());
        let anon = Identity::anonymous().with_session(SessionKey::new("anon"));

        let r = add.call(&anon, &Request::get("req-1", "/add_messages"));
        assert_eq!(r.location(), Some("/accounts/login/?next=/add_messages"));
        assert_eq!(queue.pending(&anon).unwrap(), 0);
    }

    #[test]
    fn index_without_session_still_renders() {
        let home = index(queue());
        let page = home.call(&Identity::anonymous(), &Request::get("req-1", "/"));
        assert_eq!(page.status(), StatusCode::OK);
        assert_eq!(page.body(), "Blog index\nvisitor: anonymous\n");
    }

    #[test]
    fn staff_place_admits_staff_only() {
        let page = staff_place();
        let request = Request::get("req-1", "/staff_place/");
        assert_eq!(page.call(&bob(), &request).status(), StatusCode::FORBIDDEN);

        let sam = Identity::authenticated("sam").with_flag(flags::STAFF);
        assert_eq!(page.call(&sam, &request).body(), "Staff place\nwelcome, sam\n");
    }

    #[test]
    fn login_get_echoes_safe_next() {
        let page = login(Arc::new(Accounts::new()), queue(), &GateConfig::default());
        let request = Request::get("req-1", "/accounts/login/").with_query("next=/private_place");
        let r = page.call(&Identity::anonymous(), &request);
        assert_eq!(r.body(), "Log in\nnext: /private_place\n");
    }

    #[test]
    fn login_post_redirects_to_next_and_greets() {
        let accounts = Arc::new(Accounts::new());
        accounts.register(Identity::authenticated("bob"));
        let queue = queue();
        let page = login(accounts.clone(), queue.clone(), &GateConfig::default());

        let session = SessionKey::new("s1");
        let request = Request::new("req-1", Method::Post, "/accounts/login/")
            .with_query("username=bob&next=/private_place")
            .with_session(session.clone());
        let r = page.call(&Identity::anonymous().with_session(session.clone()), &request);

        assert_eq!(r.location(), Some("/private_place"));
        assert_eq!(accounts.user_for(&session).as_deref(), Some("bob"));
        let bob = Identity::authenticated("bob").with_session(session);
        assert_eq!(queue.pending(&bob).unwrap(), 1);
    }

    #[test]
    fn login_post_rejects_unknown_user_and_missing_session() {
        let page = login(Arc::new(Accounts::new()), queue(), &GateConfig::default());

        let no_session =
            Request::new("req-1", Method::Post, "/accounts/login/").with_query("username=bob");
        assert_eq!(page.call(&Identity::anonymous(), &no_session).status(), StatusCode::FORBIDDEN);

        let unknown = no_session.with_session(SessionKey::new("s1"));
        assert_eq!(page.call(&Identity::anonymous(), &unknown).status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn local_route_strips_query_and_rejects_external() {
        assert_eq!(local_route("/accounts/login/"), Some("/accounts/login/"));
        assert_eq!(local_route("/login/?lang=en"), Some("/login/"));
        assert_eq!(local_route("https://sso.example/login"), None);
        assert_eq!(local_route("//sso.example/login"), None);
    }
}
