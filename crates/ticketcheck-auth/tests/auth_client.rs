//! Integration tests for AuthClient against a scripted HTTP server.

use serde_json::json;
use ticketcheck_auth::testing::{MockResponse, MockServer};
use ticketcheck_auth::{
    AuthClient, AuthConfig, AuthError, CredentialSource, SessionPhase, SessionStatus,
};

fn session_body() -> serde_json::Value {
    json!({
        "session": {
            "id": "sess_1",
            "userId": "usr_1",
            "expiresAt": "2030-01-01T00:00:00.000Z"
        },
        "user": {
            "id": "usr_1",
            "email": "staff@iw3.fr",
            "emailVerified": true,
            "name": "Camille Staff",
            "createdAt": "2025-01-01T00:00:00.000Z",
            "updatedAt": "2025-01-01T00:00:00.000Z"
        }
    })
}

fn client_for(server: &MockServer) -> AuthClient {
    AuthClient::new(AuthConfig::new(&server.base_url)).expect("client")
}

#[tokio::test]
async fn sign_in_stores_cookie_and_resolves_session() {
    let server = MockServer::start(vec![
        MockResponse::json(200, json!({ "redirect": false, "token": "tok" })).with_header(
            "Set-Cookie",
            "better-auth.session_token=tok.sig; Path=/; HttpOnly; SameSite=Lax",
        ),
        MockResponse::json(200, session_body()),
    ])
    .await
    .expect("mock server");
    let client = client_for(&server);

    let session = client
        .sign_in_with_credentials("staff@iw3.fr", "hunter2")
        .await
        .expect("sign-in succeeds");
    assert_eq!(session.user.email, "staff@iw3.fr");
    assert_eq!(
        client.cookie_header().as_deref(),
        Some("better-auth.session_token=tok.sig")
    );

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/api/auth/sign-in/email");
    assert_eq!(
        requests[0].json(),
        json!({ "email": "staff@iw3.fr", "password": "hunter2" })
    );
    assert_eq!(requests[1].method, "GET");
    assert_eq!(requests[1].path, "/api/auth/get-session");
    assert_eq!(
        requests[1].header("cookie"),
        Some("better-auth.session_token=tok.sig")
    );
}

#[tokio::test]
async fn sign_in_rejection_surfaces_server_message() {
    let server = MockServer::start(vec![MockResponse::json(
        401,
        json!({ "code": "INVALID_EMAIL_OR_PASSWORD", "message": "Invalid email or password" }),
    )])
    .await
    .expect("mock server");
    let client = client_for(&server);

    let err = client
        .sign_in_with_credentials("staff@iw3.fr", "wrong")
        .await
        .unwrap_err();
    match err {
        AuthError::Rejected { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(client.cookie_header().is_none());
}

#[tokio::test]
async fn null_session_body_is_absent() {
    let server = MockServer::start(vec![MockResponse::json(200, json!(null))])
        .await
        .expect("mock server");
    let client = client_for(&server).with_cookie("better-auth.session_token=stale");

    assert_eq!(client.get_session().await, SessionStatus::Absent);
}

#[tokio::test]
async fn server_error_keeps_session_pending() {
    let server = MockServer::start(vec![MockResponse::text(503, "maintenance")])
        .await
        .expect("mock server");
    let client = client_for(&server).with_cookie("better-auth.session_token=tok");

    assert_eq!(client.get_session().await.phase(), SessionPhase::Pending);
}

#[tokio::test]
async fn social_sign_in_returns_provider_url() {
    let server = MockServer::start(vec![MockResponse::json(
        200,
        json!({ "url": "https://accounts.google.com/o/oauth2/auth?x=1", "redirect": true }),
    )])
    .await
    .expect("mock server");
    let client = client_for(&server);

    let redirect = client
        .sign_in_with_provider("google", "/edition-select")
        .await
        .expect("social sign-in");
    assert!(redirect.redirect);
    assert!(redirect.url.starts_with("https://accounts.google.com"));

    let body = server.requests()[0].json();
    assert_eq!(body["provider"], "google");
    assert_eq!(body["callbackURL"], "/edition-select");
}

#[tokio::test]
async fn sign_out_clears_cookie_even_when_server_fails() {
    let server = MockServer::start(vec![MockResponse::json(500, json!({}))])
        .await
        .expect("mock server");
    let client = client_for(&server).with_cookie("better-auth.session_token=tok");

    assert!(client.sign_out().await.is_err());
    assert!(client.cookie_header().is_none());
    assert_eq!(
        server.requests()[0].header("cookie"),
        Some("better-auth.session_token=tok")
    );
}
