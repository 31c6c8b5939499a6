//! Gate composition demonstration.
//!
//! This example shows how predicates and gates combine:
//! - Nesting `guard` calls versus stacking layers with `Gate`
//! - Permission and staff helpers
//! - Predicates that fail or panic deny instead of crashing
//!
//! Run with: `RUST_LOG=authgate=debug cargo run --example gate_composition`

use authgate::{
    flags, guard, handler_fn, permission_required, staff_member_required, Denial, Gate,
    GateConfig, Handler, Identity, Predicate, Request, Response,
};
use tracing_subscriber::EnvFilter;

fn show(label: &str, response: &Response) {
    match response.location() {
        Some(location) => println!("   {:<10} {} -> {}", label, response.status(), location),
        None => println!("   {:<10} {} {}", label, response.status(), response.body()),
    }
}

fn try_all(view: &impl Handler, request: &Request) {
    let people = [
        ("anonymous", Identity::anonymous()),
        ("bob", Identity::authenticated("bob")),
        (
            "ann",
            Identity::authenticated("ann").with_permission("blog.add_post"),
        ),
        ("sam", Identity::authenticated("sam").with_flag(flags::STAFF)),
        (
            "retired",
            Identity::authenticated("retired")
                .with_flag(flags::STAFF)
                .without_flag(flags::ACTIVE),
        ),
    ];
    for (label, identity) in &people {
        show(label, &view.call(identity, request));
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = GateConfig::default();
    let request = Request::get("req-demo", "/posts/new/").with_query("draft=1");

    println!("=== Nested guards: logged in, then staff (403) ===");
    let nested = guard(
        guard(
            handler_fn(|_: &Identity, _: &Request| Response::ok("staff area")),
            Predicate::Staff,
            Denial::Forbidden,
        ),
        Predicate::Authenticated,
        Denial::RedirectToLogin,
    );
    try_all(&nested, &request);

    println!("\n=== Gate builder: logged in, then permission (403) ===");
    let layered = Gate::new(config.clone())
        .require(Predicate::Authenticated, Denial::RedirectToLogin)
        .require(Predicate::permission("blog.add_post"), Denial::Forbidden)
        .wrap(handler_fn(|identity: &Identity, _: &Request| {
            Response::ok(format!("new post by {}", identity.username()))
        }));
    try_all(&layered, &request);

    println!("\n=== permission_required, redirecting ===");
    let view = permission_required(
        handler_fn(|_: &Identity, _: &Request| Response::ok("editor")),
        ["blog.add_post"],
        false,
        &config,
    );
    try_all(&view, &request);

    println!("\n=== staff_member_required (active staff only) ===");
    let admin = staff_member_required(
        handler_fn(|_: &Identity, _: &Request| Response::ok("admin")),
        &config,
    );
    try_all(&admin, &Request::get("req-demo", "/admin/"));

    println!("\n=== A predicate that cannot answer ===");
    let flaky = Predicate::fallible("directory_lookup", |_: &Identity| {
        Err::<bool, _>("directory unreachable")
    });
    println!("   policy: {}", flaky);
    let view = guard(
        handler_fn(|_: &Identity, _: &Request| Response::ok("unreachable")),
        Predicate::Authenticated.or(flaky),
        Denial::Forbidden,
    );
    try_all(&view, &request);
}
