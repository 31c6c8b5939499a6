//! Blog site walkthrough.
//!
//! This example drives the bundled blog site the way a browser would:
//! 1. Visit a members-only page anonymously and get sent to the login page
//! 2. Log in and follow `next` back
//! 3. Try the staff page as a regular user
//! 4. Queue notifications and see them rendered exactly once
//!
//! Run with: `RUST_LOG=authgate=debug cargo run --example blog_site`

use std::sync::Arc;

use authgate::messages::MemorySessionStore;
use authgate::web::{blog, Accounts, RequestAdapter, Site};
use authgate::{flags, Identity, Method, Response, Settings};
use tracing_subscriber::EnvFilter;

/// Simulates request ID generation
mod request_id {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(1);

    pub fn next() -> String {
        format!("req-{:04}", COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

/// Simulates a browser request carrying the session cookie
fn send(site: &Site<Arc<Accounts>>, method: Method, target: &str) -> Response {
    let mut adapter = RequestAdapter::new(request_id::next());
    adapter.set_method(method);
    adapter.set_target(target);
    adapter.add_header("Cookie".to_string(), "sessionid=demo-session".to_string());

    let response = site.serve(&adapter);
    println!("{} {}", method, target);
    match response.location() {
        Some(location) => println!("   -> {} Location: {}", response.status(), location),
        None => println!("   -> {}", response.status()),
    }
    for line in response.body().lines() {
        println!("   | {}", line);
    }
    response
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = Settings::from_env()?;
    let accounts = Arc::new(Accounts::new());
    accounts.register(Identity::authenticated("bob"));
    accounts.register(Identity::authenticated("sam").with_flag(flags::STAFF));
    let site = blog::blog_site(&settings, accounts, MemorySessionStore::new());

    println!("=== Anonymous visit ===");
    let denied = send(&site, Method::Get, "/private_place");
    let login_page = denied.location().unwrap_or("/accounts/login/").to_string();

    println!("\n=== Log in as bob ===");
    send(&site, Method::Get, &login_page);
    let back = send(&site, Method::Post, &format!("{}&username=bob", login_page));
    if let Some(next) = back.location() {
        send(&site, Method::Get, next);
    }

    println!("\n=== Staff page as a regular user ===");
    send(&site, Method::Get, "/staff_place/");

    println!("\n=== Notifications ===");
    send(&site, Method::Get, "/add_messages");
    send(&site, Method::Get, "/");
    println!("\n(rendered once; the next visit shows none)");
    send(&site, Method::Get, "/");

    println!("\n=== Log out ===");
    send(&site, Method::Get, "/accounts/logout/");
    send(&site, Method::Get, "/private_place");

    Ok(())
}
