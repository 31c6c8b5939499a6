//! Property tests for the gate and the notification queue.
//!
//! These check the invariants that must hold for every identity, path and
//! message sequence, not just the hand-picked cases in the unit tests.

use std::cell::Cell;

use authgate::messages::{Level, MemorySessionStore, Notifications};
use authgate::{
    flags, guard, handler_fn, redirect_to_login, Denial, Gate, GateConfig, Handler, Identity,
    Method, Predicate, Request, Response, SessionKey,
};
use proptest::prelude::*;

// Strategy: arbitrary identity, anonymous or authenticated with any flags
fn arb_identity() -> impl Strategy<Value = Identity> {
    (
        any::<bool>(),
        prop::string::string_regex("[a-z]{1,8}").unwrap(),
        prop::collection::vec(
            prop_oneof![
                Just(flags::STAFF),
                Just(flags::SUPERUSER),
                Just("is_editor"),
            ],
            0..3,
        ),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(authenticated, name, set, inactive, can_post)| {
            if !authenticated {
                return Identity::anonymous();
            }
            let mut identity = Identity::authenticated(name);
            for flag in set {
                identity = identity.with_flag(flag);
            }
            if inactive {
                identity = identity.without_flag(flags::ACTIVE);
            }
            if can_post {
                identity = identity.with_permission("blog.add_post");
            }
            identity
        })
}

// Strategy: predicate trees up to a few levels deep
fn arb_predicate() -> impl Strategy<Value = Predicate> {
    let leaf = prop_oneof![
        Just(Predicate::Authenticated),
        Just(Predicate::Staff),
        Just(Predicate::Superuser),
        Just(Predicate::Active),
        Just(Predicate::flag("is_editor")),
        Just(Predicate::permission("blog.add_post")),
        Just(Predicate::custom("always_fails", |_| panic!("unavailable"))),
    ];
    leaf.prop_recursive(3, 12, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(|preds| Predicate::all(preds)),
            prop::collection::vec(inner.clone(), 0..3).prop_map(|preds| Predicate::any(preds)),
            inner.prop_map(|p| !p),
        ]
    })
}

fn arb_denial() -> impl Strategy<Value = Denial> {
    prop_oneof![Just(Denial::RedirectToLogin), Just(Denial::Forbidden)]
}

fn arb_level() -> impl Strategy<Value = Level> {
    prop::sample::select(Level::ALL.to_vec())
}

proptest! {
    /// Property: the handler runs iff the predicate holds
    #[test]
    fn proptest_handler_admitted_iff_predicate_holds(
        identity in arb_identity(),
        predicate in arb_predicate(),
        denial in arb_denial(),
    ) {
        let expected = predicate.evaluate(&identity);
        let calls = Cell::new(0);
        let view = guard(
            handler_fn(|_: &Identity, _: &Request| {
                calls.set(calls.get() + 1);
                Response::ok("ran")
            }),
            predicate,
            denial.clone(),
        );

        let r = view.call(&identity, &Request::get("req-prop", "/view/"));

        prop_assert_eq!(calls.get() == 1, expected);
        if expected {
            prop_assert_eq!(r.body(), "ran");
        } else {
            match denial {
                Denial::Forbidden => prop_assert_eq!(r.status().as_u16(), 403),
                _ => prop_assert_eq!(r.location(), Some("/accounts/login/?next=/view/")),
            }
        }
    }

    /// Property: `next` decodes back to the exact original full path
    #[test]
    fn proptest_next_round_trips(
        path in prop::string::string_regex("/[A-Za-z0-9_./%+-]{0,24}").unwrap(),
        query in prop::option::of("\\PC{0,16}"),
    ) {
        let mut request = Request::get("req-prop", path);
        if let Some(q) = query {
            request = request.with_query(q);
        }
        let full_path = request.full_path();

        let r = guard(
            handler_fn(|_: &Identity, _: &Request| Response::ok("")),
            Predicate::Authenticated,
            Denial::RedirectToLogin,
        )
        .call(&Identity::anonymous(), &request);

        let location = r.location().unwrap();
        let login = Request::from_target("req-login", Method::Get, location);
        prop_assert_eq!(login.path(), "/accounts/login/");
        prop_assert_eq!(login.query_param("next"), Some(full_path));
    }

    /// Property: a login URL with its own query keeps it and still carries `next`
    #[test]
    fn proptest_next_survives_login_query(
        next in prop::string::string_regex("/[a-z]{0,8}(\\?[a-z=&]{0,8})?").unwrap(),
        lang in "[a-z]{2}",
    ) {
        let login_url = format!("/login/?lang={}", lang);
        let r = redirect_to_login(&next, &login_url, "next");
        let login = Request::from_target("req-login", Method::Get, r.location().unwrap());
        prop_assert_eq!(login.query_param("lang"), Some(lang));
        prop_assert_eq!(login.query_param("next"), Some(next));
    }

    /// Property: a layered Gate answers exactly like the equivalent nested guards
    #[test]
    fn proptest_gate_chain_matches_nesting(
        identity in arb_identity(),
        outer in arb_predicate(),
        inner in arb_predicate(),
    ) {
        let chain = Gate::new(GateConfig::default())
            .require(outer.clone(), Denial::RedirectToLogin)
            .require(inner.clone(), Denial::Forbidden)
            .wrap(handler_fn(|_: &Identity, _: &Request| Response::ok("ran")));
        let nested = guard(
            guard(
                handler_fn(|_: &Identity, _: &Request| Response::ok("ran")),
                inner,
                Denial::Forbidden,
            ),
            outer,
            Denial::RedirectToLogin,
        );

        let request = Request::get("req-prop", "/x");
        prop_assert_eq!(chain.call(&identity, &request), nested.call(&identity, &request));
    }

    /// Property: drain returns exactly what was queued, in order, once
    #[test]
    fn proptest_drain_preserves_order(
        queued in prop::collection::vec((arb_level(), "[a-zA-Z0-9 ]{0,12}"), 0..16),
    ) {
        let queue = Notifications::new(MemorySessionStore::new());
        let identity = Identity::authenticated("bob").with_session(SessionKey::new("s"));

        for (level, text) in &queued {
            queue.enqueue(&identity, *level, text.clone()).unwrap();
        }

        let drained: Vec<(Level, String)> = queue
            .drain_for_render(&identity)
            .unwrap()
            .map(|n| (n.level(), n.text().to_string()))
            .collect();
        prop_assert_eq!(drained, queued);
        prop_assert_eq!(queue.drain_for_render(&identity).unwrap().count(), 0);
    }

    /// Property: one session's drain never sees another session's notifications
    #[test]
    fn proptest_sessions_are_isolated(
        for_a in prop::collection::vec("[a-z]{1,6}", 0..6),
        for_b in prop::collection::vec("[a-z]{1,6}", 0..6),
    ) {
        let queue = Notifications::new(MemorySessionStore::new());
        let a = Identity::authenticated("a").with_session(SessionKey::new("session-a"));
        let b = Identity::authenticated("b").with_session(SessionKey::new("session-b"));

        for text in &for_a {
            queue.info(&a, text.clone()).unwrap();
        }
        for text in &for_b {
            queue.info(&b, text.clone()).unwrap();
        }

        let seen_b: Vec<String> = queue
            .drain_for_render(&b)
            .unwrap()
            .map(|n| n.text().to_string())
            .collect();
        prop_assert_eq!(seen_b, for_b);
        prop_assert_eq!(queue.pending(&a).unwrap(), for_a.len());
    }
}
