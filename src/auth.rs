// Auth flow: Unauthenticated -> CsrfAcquired -> Authenticated, or Failed.
//
// Password mode walks both transitions. Token mode and session-cookie mode
// skip them and validate the supplied credential with one cheap
// authenticated request instead.

use crate::api::{header_value, ScratchClient, CSRF_COOKIE, CSRF_HEADER, SESSION_COOKIE, TOKEN_HEADER};
use crate::error::{Result, ScratchError};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{info, warn};

/// Authenticated identity. Lives as long as the run; never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub user_id: Option<String>,
    /// Value for the `X-Token` header.
    pub token: Option<String>,
    /// CSRF token observed when the session was established. Actions
    /// re-read the jar before posting, so this is informational.
    pub csrf_token: Option<String>,
}

/// How the operator wants to authenticate.
#[derive(Clone)]
pub enum AuthMode {
    Password { username: String, password: String },
    /// Pre-obtained `X-Token`. No CSRF token is recorded, so CSRF-gated
    /// actions such as profile comments will be rejected by the server.
    Token { username: String, token: String },
    /// Pre-obtained browser session cookies.
    SessionCookie { session_id: String, csrf_token: String },
}

impl AuthMode {
    /// Reject empty or malformed input before anything goes on the wire.
    pub fn validate(&self) -> Result<()> {
        match self {
            AuthMode::Password { username, password } => {
                validate_username(username)?;
                require("password", password)
            }
            AuthMode::Token { username, token } => {
                validate_username(username)?;
                require("token", token)
            }
            AuthMode::SessionCookie {
                session_id,
                csrf_token,
            } => {
                require("session id", session_id)?;
                require("CSRF token", csrf_token)
            }
        }
    }
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
            AuthMode::Token { username, .. } => f
                .debug_struct("Token")
                .field("username", username)
                .finish_non_exhaustive(),
            AuthMode::SessionCookie { .. } => f.debug_struct("SessionCookie").finish_non_exhaustive(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    CsrfAcquired { csrf_token: String },
    Authenticated(Session),
    Failed,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(rename = "useMessages")]
    use_messages: bool,
}

/// One element of the login response array. The server answers 200 for
/// wrong passwords too, with `msg` set and no `token`.
#[derive(Deserialize, Debug, Default)]
struct LoginEntry {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

#[derive(Deserialize, Debug)]
struct SessionInfo {
    #[serde(default)]
    user: Option<SessionUser>,
}

#[derive(Deserialize, Debug)]
struct SessionUser {
    username: String,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    token: Option<String>,
}

/// Drives one authentication attempt against a shared client.
pub struct AuthFlow<'a> {
    client: &'a ScratchClient,
    state: AuthState,
}

impl<'a> AuthFlow<'a> {
    pub fn new(client: &'a ScratchClient) -> Self {
        AuthFlow {
            client,
            state: AuthState::Unauthenticated,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Run the whole flow for `mode`.
    pub fn run(&mut self, mode: &AuthMode) -> Result<Session> {
        self.ensure_unauthenticated("authenticate")?;
        if let Err(e) = mode.validate() {
            return self.fail(e);
        }
        match mode {
            AuthMode::Password { username, password } => {
                self.acquire_csrf()?;
                self.submit_credentials(username, password)
            }
            AuthMode::Token { username, token } => self.probe_token(username, token),
            AuthMode::SessionCookie {
                session_id,
                csrf_token,
            } => self.resume_session(session_id, csrf_token),
        }
    }

    /// Transition 1: hit the bootstrap endpoint and pick the CSRF cookie
    /// out of the jar.
    pub fn acquire_csrf(&mut self) -> Result<String> {
        self.ensure_unauthenticated("acquire CSRF token")?;
        let client = self.client;
        let fetched = client
            .site_endpoint("csrf_token/")
            .and_then(|url| client.get(url, None))
            .and_then(|_| client.csrf_token().ok_or(ScratchError::CsrfMissing));

        match fetched {
            Ok(csrf_token) => {
                info!("CSRF token acquired");
                self.state = AuthState::CsrfAcquired {
                    csrf_token: csrf_token.clone(),
                };
                Ok(csrf_token)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Transition 2: post the credentials with the CSRF header.
    pub fn submit_credentials(&mut self, username: &str, password: &str) -> Result<Session> {
        let csrf_token = match &self.state {
            AuthState::CsrfAcquired { csrf_token } => csrf_token.clone(),
            _ => return Err(self.out_of_order("submit credentials")),
        };
        let result = self.login(username, password, &csrf_token);
        self.settle(result)
    }

    /// Token-direct entry: validate the token with the message-count
    /// endpoint. Any non-2xx answer means the token is unusable.
    pub fn probe_token(&mut self, username: &str, token: &str) -> Result<Session> {
        self.ensure_unauthenticated("probe token")?;
        let result = self.probe(username, token);
        self.settle(result)
    }

    /// Session-cookie entry: seed the jar and ask the site who we are.
    pub fn resume_session(&mut self, session_id: &str, csrf_token: &str) -> Result<Session> {
        self.ensure_unauthenticated("resume session")?;
        self.client.seed_cookie(SESSION_COOKIE, session_id);
        self.client.seed_cookie(CSRF_COOKIE, csrf_token);
        let result = self.whoami();
        self.settle(result)
    }

    fn login(&self, username: &str, password: &str, csrf_token: &str) -> Result<Session> {
        let url = self.client.site_endpoint("accounts/login/")?;
        let mut headers = HeaderMap::new();
        headers.insert(CSRF_HEADER, header_value(csrf_token)?);

        let body = LoginRequest {
            username,
            password,
            use_messages: true,
        };
        info!(username, "submitting login");
        let res = self.client.post(url, &body, Some(headers))?;

        let entry = first_login_entry(res.body);
        let Some(token) = entry.token.filter(|t| !t.is_empty()) else {
            return Err(ScratchError::InvalidCredentials {
                message: entry.msg.filter(|m| !m.is_empty()),
            });
        };

        Ok(Session {
            username: entry.username.unwrap_or_else(|| username.to_string()),
            user_id: entry.id.as_ref().and_then(id_to_string),
            token: Some(token),
            csrf_token: self
                .client
                .csrf_token()
                .or_else(|| Some(csrf_token.to_string())),
        })
    }

    fn probe(&self, username: &str, token: &str) -> Result<Session> {
        let url = self
            .client
            .api_endpoint(&format!("users/{username}/messages/count"))?;
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, header_value(token)?);

        match self.client.get(url, Some(headers)) {
            Ok(_) => Ok(Session {
                username: username.to_string(),
                user_id: None,
                token: Some(token.to_string()),
                csrf_token: None,
            }),
            Err(ScratchError::HttpStatus { status, .. }) => Err(ScratchError::InvalidToken {
                reason: format!("probe answered HTTP {status}"),
            }),
            Err(e) => Err(e),
        }
    }

    fn whoami(&self) -> Result<Session> {
        let url = self.client.site_endpoint("session/")?;
        let res = match self.client.get(url, None) {
            Ok(res) => res,
            Err(ScratchError::HttpStatus { status, .. }) => {
                return Err(ScratchError::InvalidToken {
                    reason: format!("session lookup answered HTTP {status}"),
                })
            }
            Err(e) => return Err(e),
        };

        let info: SessionInfo = serde_json::from_value(res.body)
            .map_err(|e| ScratchError::Decode(format!("session payload: {e}")))?;
        let user = info.user.ok_or_else(|| ScratchError::InvalidToken {
            reason: "session cookie is not signed in".into(),
        })?;

        Ok(Session {
            username: user.username,
            user_id: user.id.as_ref().and_then(id_to_string),
            token: user.token,
            csrf_token: self.client.csrf_token(),
        })
    }

    fn settle(&mut self, result: Result<Session>) -> Result<Session> {
        match result {
            Ok(session) => {
                info!(username = %session.username, "authenticated");
                self.state = AuthState::Authenticated(session.clone());
                Ok(session)
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail<T>(&mut self, error: ScratchError) -> Result<T> {
        warn!(%error, "authentication failed");
        self.state = AuthState::Failed;
        Err(error)
    }

    fn ensure_unauthenticated(&self, step: &str) -> Result<()> {
        match self.state {
            AuthState::Unauthenticated => Ok(()),
            _ => Err(self.out_of_order(step)),
        }
    }

    fn out_of_order(&self, step: &str) -> ScratchError {
        ScratchError::validation(format!("cannot {step} from state {:?}", self.state))
    }
}

/// Run the flow once and hand back the session.
pub fn authenticate(client: &ScratchClient, mode: &AuthMode) -> Result<Session> {
    AuthFlow::new(client).run(mode)
}

/// Usernames go into URL paths, so keep them to the characters the
/// platform allows.
pub fn validate_username(username: &str) -> Result<()> {
    require("username", username)?;
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(())
    } else {
        Err(ScratchError::validation(format!(
            "username {username:?} may only contain letters, digits, '_' and '-'"
        )))
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(ScratchError::validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

fn first_login_entry(body: Value) -> LoginEntry {
    match body {
        Value::Array(mut items) if !items.is_empty() => {
            serde_json::from_value(items.swap_remove(0)).unwrap_or_default()
        }
        _ => LoginEntry::default(),
    }
}

fn id_to_string(id: &Value) -> Option<String> {
    match id {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
