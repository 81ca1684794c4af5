mod common;

use common::{credential, valid_credential, NOW_SECS};
use knowledge_core::auth::route::AuthorizationDenied;
use knowledge_core::routing::RedirectReason;
use knowledge_core::{
    role_set, ClientConfig, CredentialStore, ManualClock, MemoryCredentialStore, Navigation,
    RouteAuthorizer, RouteTable, SessionGuard, Verdict, ROLE_ADMIN, ROLE_USER,
};
use std::collections::BTreeSet;
use std::time::Duration;

const TTL: Duration = Duration::from_secs(86_400);

fn store() -> MemoryCredentialStore<ManualClock> {
    MemoryCredentialStore::new(ManualClock::at_secs(NOW_SECS))
}

fn authorizer(
    store: &MemoryCredentialStore<ManualClock>,
) -> RouteAuthorizer<&MemoryCredentialStore<ManualClock>, ManualClock> {
    RouteAuthorizer::new(SessionGuard::new(store, ManualClock::at_secs(NOW_SECS)))
}

fn members() -> BTreeSet<String> {
    role_set([ROLE_USER, ROLE_ADMIN])
}

#[test]
fn admin_is_allowed_on_member_route() {
    let store = store();
    store.set(valid_credential(&["ADMIN"]), TTL).unwrap();

    assert_eq!(authorizer(&store).authorize(&members()), Verdict::Allow);
}

#[test]
fn guest_is_forbidden_on_member_route() {
    let store = store();
    store.set(valid_credential(&["GUEST"]), TTL).unwrap();

    let verdict = authorizer(&store).authorize(&members());
    assert_eq!(verdict, Verdict::DenyForbidden);
    assert_eq!(verdict.into_result(), Err(AuthorizationDenied::Forbidden));
}

#[test]
fn empty_requirement_only_needs_authentication() {
    let store = store();
    assert_eq!(
        authorizer(&store).authorize(&BTreeSet::new()),
        Verdict::DenyUnauthenticated
    );

    store.set(valid_credential(&[]), TTL).unwrap();
    assert_eq!(authorizer(&store).authorize(&BTreeSet::new()), Verdict::Allow);
}

#[test]
fn expired_credential_is_unauthenticated_not_forbidden() {
    let store = store();
    store
        .set(credential("a", &["ADMIN"], Some(NOW_SECS - 10)), TTL)
        .unwrap();

    assert_eq!(
        authorizer(&store).authorize(&members()),
        Verdict::DenyUnauthenticated
    );
}

#[test]
fn allow_iff_roles_intersect() {
    let cases: [(&[&str], &[&str], Verdict); 5] = [
        (&["USER"], &["USER", "ADMIN"], Verdict::Allow),
        (&["EDITOR", "ADMIN"], &["ADMIN"], Verdict::Allow),
        (&["EDITOR"], &["ADMIN"], Verdict::DenyForbidden),
        (&[], &["USER"], Verdict::DenyForbidden),
        (&["user"], &["USER"], Verdict::DenyForbidden),
    ];

    for (session_roles, required, expected) in cases {
        let store = store();
        store.set(valid_credential(session_roles), TTL).unwrap();
        assert_eq!(
            authorizer(&store).authorize(&role_set(required.iter().copied())),
            expected,
            "session={session_roles:?} required={required:?}"
        );
    }
}

#[test]
fn clear_always_leads_to_unauthenticated() {
    let store = store();
    store.set(valid_credential(&["ADMIN"]), TTL).unwrap();
    store.set_refresh(valid_credential(&["ADMIN"]), TTL).unwrap();
    let authorizer = authorizer(&store);
    assert_eq!(authorizer.authorize(&members()), Verdict::Allow);

    store.clear().unwrap();
    assert_eq!(
        authorizer.authorize(&members()),
        Verdict::DenyUnauthenticated
    );
    assert_eq!(
        authorizer.authorize(&BTreeSet::new()),
        Verdict::DenyUnauthenticated
    );
}

#[test]
fn navigation_redirects_by_verdict() {
    let config = ClientConfig::default();
    let table = RouteTable::knowledge_app(&config);
    let store = store();
    let authorizer = authorizer(&store);

    assert!(matches!(
        table.navigate("/articles?page=2", &authorizer),
        Navigation::Render(_)
    ));
    assert_eq!(
        table.navigate("/dashboard", &authorizer),
        Navigation::Redirect {
            to: config.unauthorized_path.clone(),
            reason: RedirectReason::Unauthenticated,
        }
    );
    assert_eq!(
        table.navigate("/no/such/screen", &authorizer),
        Navigation::Redirect {
            to: config.fallback_path.clone(),
            reason: RedirectReason::UnknownRoute,
        }
    );

    store.set(valid_credential(&["GUEST"]), TTL).unwrap();
    assert_eq!(
        table.navigate("/manage-articles", &authorizer),
        Navigation::Redirect {
            to: config.unauthorized_path.clone(),
            reason: RedirectReason::Forbidden,
        }
    );

    store.set(valid_credential(&["USER"]), TTL).unwrap();
    match table.navigate("/edit-article/12", &authorizer) {
        Navigation::Render(matched) => {
            assert_eq!(matched.pattern, "/edit-article/:id");
            assert_eq!(matched.params.get("id").map(String::as_str), Some("12"));
        }
        other => panic!("unexpected navigation: {other:?}"),
    }
}
