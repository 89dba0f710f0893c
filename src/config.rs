// Runtime configuration. Everything has a default pointing at the live
// platform; the environment overrides exist for stub servers and proxies.

use crate::error::Result;
use url::Url;

pub const DEFAULT_SITE_URL: &str = "https://scratch.mit.edu/";
pub const DEFAULT_API_URL: &str = "https://api.scratch.mit.edu/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Where to send requests and how to present ourselves.
#[derive(Clone, Debug)]
pub struct ScratchConfig {
    /// Origin serving `/csrf_token/`, `/accounts/login/` and `/site-api/`.
    pub site_url: Url,
    /// Origin serving `/users/`, `/projects/` and `/proxy/`.
    pub api_url: Url,
    pub user_agent: String,
}

impl ScratchConfig {
    /// Read `SCRATCH_SITE_URL`, `SCRATCH_API_URL` and `SCRATCH_USER_AGENT`,
    /// falling back to the public platform.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let site = lookup("SCRATCH_SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.into());
        let api = lookup("SCRATCH_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let user_agent = lookup("SCRATCH_USER_AGENT")
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.into());
        Ok(ScratchConfig {
            site_url: base_url(&site)?,
            api_url: base_url(&api)?,
            user_agent,
        })
    }

    /// Both origins served by one host. Handy for stub servers.
    pub fn single_origin(base: &str) -> Result<Self> {
        let url = base_url(base)?;
        Ok(ScratchConfig {
            site_url: url.clone(),
            api_url: url,
            user_agent: DEFAULT_USER_AGENT.into(),
        })
    }
}

// `Url::join` drops the last path segment unless the base ends in '/'.
fn base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Ok(Url::parse(trimmed)?)
    } else {
        Ok(Url::parse(&format!("{trimmed}/"))?)
    }
}
