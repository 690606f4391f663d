use incidens_console::{
    api::ApiClient,
    gate::{AccessGate, GateStatus},
    models::Role,
    session::SessionStore,
};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

async fn session_in(dir: &TempDir) -> Arc<SessionStore> {
    Arc::new(SessionStore::open(dir.path().join("session.json")).await)
}

fn client(base_url: &str, session: Arc<SessionStore>) -> ApiClient {
    ApiClient::new(base_url, 2_000, session).expect("client")
}

fn identity_body(role_id: i64) -> serde_json::Value {
    json!({
        "user_id": 1,
        "first_name": "Ana",
        "last_name": "Ruiz",
        "email": "ana@example.com",
        "role_id": role_id,
        "office_id": 1
    })
}

#[tokio::test]
async fn missing_credential_is_refused_without_any_request() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("dir");
    let gate = AccessGate::new(client(&server.uri(), session_in(&dir).await));

    let outcome = gate.verify(Some(Role::Admin)).await;
    assert_eq!(outcome, GateStatus::Unauthorized);

    let requests = server.received_requests().await.expect("requests");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn matching_role_is_authorized_and_carries_the_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(identity_body(1)))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("dir");
    let session = session_in(&dir).await;
    session.store("tok-123".to_string()).await.expect("token");
    let gate = AccessGate::new(client(&server.uri(), session));

    let outcome = gate.verify(Some(Role::Admin)).await;
    match outcome {
        GateStatus::Authorized(identity) => {
            assert_eq!(identity.role_id, 1);
            assert_eq!(identity.display_name(), "Ana Ruiz");
        }
        other => panic!("expected authorized, got {other:?}"),
    }
}

#[tokio::test]
async fn mismatched_role_is_refused_but_keeps_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(identity_body(3)))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("dir");
    let session = session_in(&dir).await;
    session.store("tok-123".to_string()).await.expect("token");
    let gate = AccessGate::new(client(&server.uri(), session.clone()));

    assert_eq!(gate.verify(Some(Role::Admin)).await, GateStatus::Unauthorized);
    assert!(session.has_token().await);
}

#[tokio::test]
async fn no_required_role_admits_any_verified_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(identity_body(3)))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("dir");
    let session = session_in(&dir).await;
    session.store("tok-123".to_string()).await.expect("token");
    let gate = AccessGate::new(client(&server.uri(), session));

    match gate.verify(None).await {
        GateStatus::Authorized(identity) => assert_eq!(identity.role_id, 3),
        other => panic!("expected authorized, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_credential_destroys_the_persisted_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("dir");
    let session = session_in(&dir).await;
    session.store("tok-123".to_string()).await.expect("token");
    let gate = AccessGate::new(client(&server.uri(), session.clone()));

    assert_eq!(gate.verify(Some(Role::Admin)).await, GateStatus::Unauthorized);
    assert!(!session.has_token().await);
    assert!(!dir.path().join("session.json").exists());
}

#[tokio::test]
async fn transport_failure_fails_closed_but_keeps_the_session() {
    let dir = TempDir::new().expect("dir");
    let session = session_in(&dir).await;
    session.store("tok-123".to_string()).await.expect("token");
    let gate = AccessGate::new(client("http://127.0.0.1:9", session.clone()));

    assert_eq!(gate.verify(Some(Role::Admin)).await, GateStatus::Unauthorized);
    assert!(session.has_token().await);
}

#[tokio::test]
async fn login_round_trip_persists_the_token_and_authorizes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/"))
        .and(body_json(json!({
            "email": "ana@example.com",
            "password": "secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-fresh"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/"))
        .and(header("authorization", "Bearer tok-fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(identity_body(1)))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("dir");
    let session = session_in(&dir).await;
    let api = client(&server.uri(), session.clone());
    api.login("ana@example.com", "secret").await.expect("login");
    assert!(session.has_token().await);

    let reopened = SessionStore::open(dir.path().join("session.json")).await;
    assert_eq!(reopened.token().await, Some("tok-fresh".to_string()));

    let gate = AccessGate::new(api);
    assert!(gate.verify(Some(Role::Admin)).await.is_authorized());
}

#[tokio::test]
async fn failed_login_is_an_auth_failure_and_stores_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "incorrect email or password"
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("dir");
    let session = session_in(&dir).await;
    let api = client(&server.uri(), session.clone());

    let err = api
        .login("ana@example.com", "wrong")
        .await
        .expect_err("rejected login");
    assert!(err.is_auth());
    assert!(!session.has_token().await);
    assert!(!dir.path().join("session.json").exists());
}

#[tokio::test]
async fn stale_verification_never_touches_gate_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(identity_body(1)))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("dir");
    let session = session_in(&dir).await;
    session.store("tok-123".to_string()).await.expect("token");
    let gate = AccessGate::new(client(&server.uri(), session));

    let older = gate.mount().await;
    let newer = gate.mount().await;

    let outcome = gate.resolve(older, Some(Role::Admin)).await;
    assert_eq!(outcome, GateStatus::Pending);
    assert_eq!(gate.status().await, GateStatus::Pending);

    let outcome = gate.resolve(newer, Some(Role::Admin)).await;
    assert!(outcome.is_authorized());
    assert!(gate.status().await.is_authorized());
}
