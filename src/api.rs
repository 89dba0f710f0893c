// HTTP session client: one blocking reqwest client bound to one cookie jar.
// Every request goes through `send` so cookies, default headers and status
// handling behave the same for the auth flow and the actions.

use crate::config::ScratchConfig;
use crate::error::{Result, ScratchError};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, REFERER};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use url::Url;

pub const CSRF_COOKIE: &str = "scratchcsrftoken";
pub const SESSION_COOKIE: &str = "scratchsessionsid";

pub const CSRF_HEADER: HeaderName = HeaderName::from_static("x-csrftoken");
pub const TOKEN_HEADER: HeaderName = HeaderName::from_static("x-token");
const AJAX_HEADER: HeaderName = HeaderName::from_static("x-requested-with");

/// A response with a 2xx status. `body` holds parsed JSON, or the raw text
/// wrapped in `Value::String` when the server did not send JSON.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Cookie-aware client shared by the auth flow and the dispatcher.
#[derive(Clone)]
pub struct ScratchClient {
    http: Client,
    jar: Arc<Jar>,
    config: ScratchConfig,
}

impl ScratchClient {
    /// Build a client with an empty jar and the browser-like default
    /// headers the platform expects on AJAX endpoints.
    pub fn new(config: ScratchConfig) -> Result<Self> {
        let jar = Arc::new(Jar::default());

        let mut defaults = HeaderMap::new();
        defaults.insert(AJAX_HEADER, HeaderValue::from_static("XMLHttpRequest"));
        defaults.insert(REFERER, header_value(config.site_url.as_str())?);

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(defaults)
            .cookie_provider(jar.clone())
            .build()?;

        Ok(ScratchClient { http, jar, config })
    }

    /// Client configured from `SCRATCH_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ScratchConfig::from_env()?)
    }

    pub fn config(&self) -> &ScratchConfig {
        &self.config
    }

    pub fn site_endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.config.site_url.join(path)?)
    }

    pub fn api_endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.config.api_url.join(path)?)
    }

    pub fn get(&self, url: Url, headers: Option<HeaderMap>) -> Result<ApiResponse> {
        let mut req = self.http.get(url);
        if let Some(h) = headers {
            req = req.headers(h);
        }
        self.send(req)
    }

    pub fn post<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
        headers: Option<HeaderMap>,
    ) -> Result<ApiResponse> {
        let mut req = self.http.post(url).json(body);
        if let Some(h) = headers {
            req = req.headers(h);
        }
        self.send(req)
    }

    fn send(&self, req: RequestBuilder) -> Result<ApiResponse> {
        let req = req.build()?;
        let method = req.method().clone();
        let url = req.url().clone();
        debug!(%method, %url, "sending request");

        let res = self.http.execute(req)?;
        let status = res.status();
        let headers = res.headers().clone();
        let text = res.text()?;
        debug!(%method, %url, status = status.as_u16(), "response received");

        if !status.is_success() {
            return Err(ScratchError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    /// Value of a cookie the jar would send to the site root.
    ///
    /// The jar only exposes the assembled `Cookie` header, so this looks
    /// cookies up by name in that header. Cookies scoped to a deeper path
    /// are not visible here. Values wrapped in double quotes are returned
    /// without them.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.config.site_url)?;
        let raw = header.to_str().ok()?;
        raw.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| unquote(value.trim()).to_string())
        })
    }

    /// CSRF token as last observed in the jar.
    pub fn csrf_token(&self) -> Option<String> {
        self.cookie(CSRF_COOKIE)
    }

    /// Store a cookie for the site origin as if the server had set it.
    pub fn seed_cookie(&self, name: &str, value: &str) {
        let cookie = format!("{name}={value}; Path=/");
        self.jar.add_cookie_str(&cookie, &self.config.site_url);
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

pub(crate) fn header_value(raw: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(raw)
        .map_err(|_| ScratchError::validation(format!("{raw:?} cannot be sent as a header")))
}

/// Headers carrying the current CSRF token, if the jar holds one.
pub(crate) fn csrf_headers(csrf: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(token) = csrf {
        headers.insert(CSRF_HEADER, header_value(token)?);
    }
    Ok(headers)
}
