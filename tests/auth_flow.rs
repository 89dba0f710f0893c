mod common;

use common::{header_str, Stub, CSRF, X_TOKEN};
use scratch_cli::{AuthFlow, AuthMode, AuthState, ScratchError};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn password(username: &str, pw: &str) -> AuthMode {
    AuthMode::Password {
        username: username.into(),
        password: pw.into(),
    }
}

#[test]
fn password_login_records_echoed_identity() {
    let stub = Stub::start();
    stub.mount_login();
    let client = stub.client();

    let mut flow = AuthFlow::new(&client);
    let session = flow.run(&password("ALICE", "pw")).expect("login succeeds");

    // The server's spelling of the username wins.
    assert_eq!(session.username, "alice");
    assert_eq!(session.user_id.as_deref(), Some("42"));
    assert_eq!(session.token.as_deref(), Some(X_TOKEN));
    assert_eq!(session.csrf_token.as_deref(), Some(CSRF));
    assert_eq!(flow.state(), &AuthState::Authenticated(session));
}

#[test]
fn login_posts_credentials_with_csrf_header() {
    let stub = Stub::start();
    stub.mount_login();
    let client = stub.client();

    scratch_cli::authenticate(&client, &password("alice", "s3cret")).unwrap();

    let logins = stub.requests_to("POST", "/accounts/login/");
    assert_eq!(logins.len(), 1);
    assert_eq!(header_str(&logins[0], "x-csrftoken"), Some(CSRF));
    let body: serde_json::Value = logins[0].body_json().unwrap();
    assert_eq!(
        body,
        json!({"username": "alice", "password": "s3cret", "useMessages": true})
    );
}

#[test]
fn transitions_step_through_csrf_acquired() {
    let stub = Stub::start();
    stub.mount_login();
    let client = stub.client();

    let mut flow = AuthFlow::new(&client);
    assert_eq!(flow.state(), &AuthState::Unauthenticated);

    let csrf = flow.acquire_csrf().unwrap();
    assert_eq!(csrf, CSRF);
    assert_eq!(
        flow.state(),
        &AuthState::CsrfAcquired {
            csrf_token: CSRF.into()
        }
    );

    flow.submit_credentials("alice", "pw").unwrap();
    assert!(matches!(flow.state(), AuthState::Authenticated(_)));

    // Terminal: nothing further is accepted.
    assert!(matches!(flow.acquire_csrf(), Err(ScratchError::Validation(_))));
}

#[test]
fn credentials_before_csrf_are_rejected_locally() {
    let stub = Stub::start();
    let client = stub.client();

    let mut flow = AuthFlow::new(&client);
    let err = flow.submit_credentials("alice", "pw").unwrap_err();
    assert!(matches!(err, ScratchError::Validation(_)));
    assert!(stub.requests().is_empty());
}

#[test]
fn response_without_token_fails_the_flow() {
    let stub = Stub::start();
    stub.mount(
        Mock::given(method("GET"))
            .and(path("/csrf_token/"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("set-cookie", "scratchcsrftoken=abc123; Path=/"),
            ),
    );
    stub.mount(
        Mock::given(method("POST"))
            .and(path("/accounts/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "username": "alice",
                "success": 0,
                "msg": "Incorrect username or password."
            }]))),
    );
    let client = stub.client();

    let mut flow = AuthFlow::new(&client);
    let err = flow.run(&password("alice", "wrong")).unwrap_err();

    match err {
        ScratchError::InvalidCredentials { message } => {
            assert_eq!(message.as_deref(), Some("Incorrect username or password."))
        }
        other => panic!("expected InvalidCredentials, got {other:?}"),
    }
    assert_eq!(flow.state(), &AuthState::Failed);
    // Bootstrap and login only; nothing authenticated follows.
    assert_eq!(stub.requests().len(), 2);
}

#[test]
fn missing_csrf_cookie_stops_before_login() {
    let stub = Stub::start();
    stub.mount(
        Mock::given(method("GET"))
            .and(path("/csrf_token/"))
            .respond_with(ResponseTemplate::new(200)),
    );
    let client = stub.client();

    let mut flow = AuthFlow::new(&client);
    let err = flow.run(&password("alice", "pw")).unwrap_err();

    assert!(matches!(err, ScratchError::CsrfMissing));
    assert!(err.is_auth_failure());
    assert_eq!(flow.state(), &AuthState::Failed);
    assert!(stub.requests_to("POST", "/accounts/login/").is_empty());
}

#[test]
fn login_rejected_by_status_surfaces_the_status() {
    let stub = Stub::start();
    stub.mount(
        Mock::given(method("GET"))
            .and(path("/csrf_token/"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("set-cookie", "scratchcsrftoken=abc123; Path=/"),
            ),
    );
    stub.mount(
        Mock::given(method("POST"))
            .and(path("/accounts/login/"))
            .respond_with(ResponseTemplate::new(403).set_body_string("CSRF verification failed")),
    );
    let client = stub.client();

    let mut flow = AuthFlow::new(&client);
    let err = flow.run(&password("alice", "pw")).unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(flow.state(), &AuthState::Failed);
}

#[test]
fn empty_password_never_reaches_the_network() {
    let stub = Stub::start();
    let client = stub.client();

    let mut flow = AuthFlow::new(&client);
    let err = flow.run(&password("alice", "")).unwrap_err();
    assert!(matches!(err, ScratchError::Validation(_)));
    assert_eq!(flow.state(), &AuthState::Failed);
    assert!(stub.requests().is_empty());
}

#[test]
fn token_probe_success_authenticates_without_csrf() {
    let stub = Stub::start();
    stub.mount(
        Mock::given(method("GET"))
            .and(path("/users/alice/messages/count"))
            .and(header("x-token", X_TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 3}))),
    );
    let client = stub.client();

    let mut flow = AuthFlow::new(&client);
    let session = flow
        .run(&AuthMode::Token {
            username: "alice".into(),
            token: X_TOKEN.into(),
        })
        .unwrap();

    assert_eq!(session.username, "alice");
    assert_eq!(session.token.as_deref(), Some(X_TOKEN));
    assert_eq!(session.csrf_token, None);
    assert_eq!(session.user_id, None);
    assert!(matches!(flow.state(), AuthState::Authenticated(_)));
    assert_eq!(stub.requests().len(), 1);
}

#[test]
fn token_probe_rejection_fails_the_flow() {
    for status in [401u16, 403] {
        let stub = Stub::start();
        stub.mount(
            Mock::given(method("GET"))
                .and(path("/users/alice/messages/count"))
                .respond_with(ResponseTemplate::new(status)),
        );
        let client = stub.client();

        let mut flow = AuthFlow::new(&client);
        let err = flow
            .run(&AuthMode::Token {
                username: "alice".into(),
                token: "stale".into(),
            })
            .unwrap_err();

        match &err {
            ScratchError::InvalidToken { reason } => assert!(reason.contains(&status.to_string())),
            other => panic!("expected InvalidToken for {status}, got {other:?}"),
        }
        assert_eq!(flow.state(), &AuthState::Failed);
        // Only the probe went out.
        assert_eq!(stub.requests().len(), 1);
    }
}

#[test]
fn session_cookie_mode_resumes_existing_login() {
    let stub = Stub::start();
    stub.mount(
        Mock::given(method("GET"))
            .and(path("/session/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {"id": 7, "username": "alice", "token": X_TOKEN}
            }))),
    );
    let client = stub.client();

    let session = scratch_cli::authenticate(
        &client,
        &AuthMode::SessionCookie {
            session_id: "sess-7".into(),
            csrf_token: "csrf-7".into(),
        },
    )
    .unwrap();

    assert_eq!(session.username, "alice");
    assert_eq!(session.user_id.as_deref(), Some("7"));
    assert_eq!(session.token.as_deref(), Some(X_TOKEN));
    assert_eq!(session.csrf_token.as_deref(), Some("csrf-7"));

    let requests = stub.requests_to("GET", "/session/");
    let cookie = header_str(&requests[0], "cookie").unwrap();
    assert!(cookie.contains("scratchsessionsid=sess-7"));
    assert!(cookie.contains("scratchcsrftoken=csrf-7"));
}

#[test]
fn session_cookie_mode_rejects_signed_out_cookie() {
    let stub = Stub::start();
    stub.mount(
        Mock::given(method("GET"))
            .and(path("/session/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({}))),
    );
    let client = stub.client();

    let mut flow = AuthFlow::new(&client);
    let err = flow
        .run(&AuthMode::SessionCookie {
            session_id: "expired".into(),
            csrf_token: "csrf".into(),
        })
        .unwrap_err();
    assert!(matches!(err, ScratchError::InvalidToken { .. }));
    assert_eq!(flow.state(), &AuthState::Failed);
}
