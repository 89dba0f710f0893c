//! Shared stub-server helpers for the integration tests.
//!
//! wiremock runs its server on its own thread, so the blocking client can
//! talk to it from the plain test thread. The runtime here only drives
//! setup and inspection futures.

#![allow(dead_code)]

use scratch_cli::{Dispatcher, ScratchClient, ScratchConfig, Session};
use serde_json::{json, Value};
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const CSRF: &str = "abc123";
pub const X_TOKEN: &str = "xtok-999";

pub struct Stub {
    // Dropped before the runtime.
    pub server: MockServer,
    rt: Runtime,
}

impl Stub {
    pub fn start() -> Self {
        let rt = Runtime::new().expect("tokio runtime");
        let server = rt.block_on(MockServer::start());
        Stub { server, rt }
    }

    pub fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn client(&self) -> ScratchClient {
        let config = ScratchConfig::single_origin(&self.server.uri()).expect("stub URL");
        ScratchClient::new(config).expect("client")
    }

    pub fn requests(&self) -> Vec<Request> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    pub fn requests_to(&self, verb: &str, route: &str) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| r.method.as_str() == verb && r.url.path() == route)
            .collect()
    }

    /// `/csrf_token/` sets the CSRF cookie; `/accounts/login/` accepts
    /// `alice` when the header matches it.
    pub fn mount_login(&self) {
        self.mount(
            Mock::given(method("GET"))
                .and(path("/csrf_token/"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header("set-cookie", format!("scratchcsrftoken={CSRF}; Path=/").as_str()),
                ),
        );
        self.mount(
            Mock::given(method("POST"))
                .and(path("/accounts/login/"))
                .and(header("x-csrftoken", CSRF))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header("set-cookie", "scratchsessionsid=sess-1; Path=/")
                        .set_body_json(login_success()),
                ),
        );
    }

    /// Dispatcher for a token-only session; no request is made.
    pub fn token_dispatcher(&self, username: &str) -> Dispatcher {
        let session = Session {
            username: username.to_string(),
            user_id: None,
            token: Some(X_TOKEN.to_string()),
            csrf_token: None,
        };
        Dispatcher::new(self.client(), session)
    }
}

pub fn login_success() -> Value {
    json!([{
        "username": "alice",
        "id": 42,
        "token": X_TOKEN,
        "success": 1,
        "msg": "",
        "messages": []
    }])
}

pub fn header_str<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}
