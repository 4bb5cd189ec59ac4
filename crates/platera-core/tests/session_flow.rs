//! Sign-in, hydration and route guarding against a mock backend.


use fixtures::{client, offline, profile, signed_in};
use platera_core::guard::{self, GuardDecision, Location};
use platera_core::store::{self, TokenStore, keys};
use platera_core::{ApiErrorKind, Session};
use platera_types::Role;
use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_manager_login_persists_tokens_and_role() {
    let server = MockServer::start().await;
    let (client, store) = client(&server);

    Mock::given(method("POST"))
        .and(path("/api/auth/manager/login/"))
        .and(body_json(json!({"username": "mgr", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "a1",
            "refresh": "r1",
            "user": profile(2, "mgr", "MANAGER")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new(client.clone());
    let login = client.auth().manager_login("mgr", "pw").await.unwrap();
    let state = session.login(login.user.unwrap());

    assert!(state.is_authenticated);
    assert!(state.is_manager);
    assert!(!state.is_admin);
    assert_eq!(store::access_token(store.as_ref()).as_deref(), Some("a1"));
    assert_eq!(store.get(keys::USER_TYPE).as_deref(), Some("manager"));
    assert_eq!(store::cached_user(store.as_ref()).unwrap().id, 2);
}

#[tokio::test]
async fn test_admin_login_without_user_marks_admin() {
    let server = MockServer::start().await;
    let (client, store) = client(&server);

    Mock::given(method("POST"))
        .and(path("/api/auth/admin/login/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})),
        )
        .mount(&server)
        .await;

    client.auth().admin_login("root", "pw").await.unwrap();

    assert_eq!(store.get(keys::USER_TYPE).as_deref(), Some("admin"));
    assert!(store::cached_user(store.as_ref()).is_none());
}

#[tokio::test]
async fn test_staff_login_fetches_missing_profile() {
    let server = MockServer::start().await;
    let (client, store) = client(&server);

    Mock::given(method("POST"))
        .and(path("/api/auth/staff/login/"))
        .and(body_json(json!({"employee_id": "EMP-004"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile(4, "kofi", "STAFF")))
        .expect(1)
        .mount(&server)
        .await;

    let login = client.auth().staff_login("  EMP-004 ").await.unwrap();

    assert_eq!(login.user.unwrap().username, "kofi");
    assert_eq!(store.get(keys::USER_TYPE).as_deref(), Some("staff"));
}

#[tokio::test]
async fn test_staff_login_tolerates_profile_fetch_failure() {
    let server = MockServer::start().await;
    let (client, store) = client(&server);

    Mock::given(method("POST"))
        .and(path("/api/auth/staff/login/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let login = client.auth().staff_login("EMP-004").await.unwrap();

    assert!(login.user.is_none());
    assert_eq!(store::access_token(store.as_ref()).as_deref(), Some("a1"));
}

#[tokio::test]
async fn test_blank_staff_id_is_rejected_locally() {
    let server = MockServer::start().await;
    let (client, _store) = client(&server);

    Mock::given(method("POST"))
        .and(path("/api/auth/staff/login/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.auth().staff_login("   ").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::InvalidRequest);
}

#[tokio::test]
async fn test_login_response_without_access_is_an_error() {
    let server = MockServer::start().await;
    let (client, store) = client(&server);

    Mock::given(method("POST"))
        .and(path("/api/auth/manager/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"detail": "ok"})))
        .mount(&server)
        .await;

    let err = client.auth().manager_login("mgr", "pw").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Decode);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_hydrate_revalidates_profile() {
    let server = MockServer::start().await;
    let (client, store) = signed_in(&server, "a1", "r1");
    store.set(keys::USER, &profile(3, "old-name", "MANAGER").to_string());

    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile(3, "new-name", "ADMIN")))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new(client);
    let state = session.hydrate().await;

    assert!(!state.loading);
    assert!(state.is_admin);
    assert_eq!(state.user.unwrap().username, "new-name");
    assert_eq!(store::cached_user(store.as_ref()).unwrap().username, "new-name");
}

#[tokio::test]
async fn test_hydrate_keeps_cached_profile_when_server_fails() {
    let server = MockServer::start().await;
    let (client, store) = signed_in(&server, "a1", "r1");
    store.set(keys::USER, &profile(3, "cached", "STAFF").to_string());

    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let session = Session::new(client);
    let state = session.hydrate().await;

    assert!(state.is_authenticated);
    assert_eq!(state.role, Role::Staff);
    assert_eq!(store::access_token(store.as_ref()).as_deref(), Some("a1"));
}

#[tokio::test]
async fn test_hydrate_without_cache_clears_on_failure() {
    let server = MockServer::start().await;
    let (client, store) = signed_in(&server, "a1", "r1");

    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = Session::new(client);
    let state = session.hydrate().await;

    assert!(!state.loading);
    assert!(!state.is_authenticated);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_expired_refresh_signs_session_out() {
    let server = MockServer::start().await;
    let (client, store) = signed_in(&server, "a1", "r1");

    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile(1, "ama", "MANAGER")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/orders/"))
        .respond_with(fixtures::unauthorized())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/token/refresh/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = Session::new(client.clone());
    assert!(session.hydrate().await.is_authenticated);

    let err = client.orders().list(Default::default()).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::SessionExpired);

    let state = session.state();
    assert!(!state.is_authenticated);
    assert!(state.user.is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_staff_session_is_redirected_from_admin_route() {
    let server = MockServer::start().await;
    let (client, _store) = signed_in(&server, "a1", "r1");

    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile(4, "kofi", "STAFF")))
        .mount(&server)
        .await;

    let session = Session::new(client);
    let loading = session.state();
    assert_eq!(
        guard::guard(&[Role::Admin], &loading, &Location::parse("/admin/staff")),
        GuardDecision::Wait
    );

    let state = session.hydrate().await;
    assert_eq!(
        guard::guard(&[Role::Admin], &state, &Location::parse("/admin/staff")),
        GuardDecision::Redirect {
            to: "/staff/dashboard".into()
        }
    );
    assert_eq!(
        guard::guard(&[Role::Staff], &state, &Location::parse("/staff/orders")),
        GuardDecision::Render
    );
}

#[tokio::test]
async fn test_logout_removes_credentials() {
    let server = MockServer::start().await;
    let (client, store) = signed_in(&server, "a1", "r1");
    store.set(keys::MANAGER_TOKEN, "m");
    let session = Session::new(client);
    session.login(serde_json::from_value(profile(2, "mgr", "MANAGER")).unwrap());

    session.logout();

    let state = session.state();
    assert!(!state.is_authenticated);
    assert!(store.is_empty());
    assert_eq!(
        guard::guard(&[], &state, &Location::parse("/admin/menu?tab=2")),
        GuardDecision::Redirect {
            to: "/manager-login?redirect=%2Fadmin%2Fmenu%3Ftab%3D2".into()
        }
    );
}

#[tokio::test]
async fn test_requests_after_logout_are_anonymous() {
    let server = MockServer::start().await;
    let (client, _store) = signed_in(&server, "a1", "r1");

    Mock::given(method("GET"))
        .and(path("/api/menu/items/"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(418))
        .with_priority(1)
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/menu/items/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new(client.clone());
    session.logout();

    let items = client.menu().items(Default::default()).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_hydrate_offline_keeps_cached_profile() {
    let (client, store) = offline("a1", "r1");
    store.set(keys::USER, &profile(5, "efua", "STAFF").to_string());

    let session = Session::new(client);
    let state = session.hydrate().await;

    assert!(!state.loading);
    assert!(state.is_authenticated);
    assert_eq!(state.user.unwrap().username, "efua");
    assert_eq!(store::refresh_token(store.as_ref()).as_deref(), Some("r1"));
}
