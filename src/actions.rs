// Action dispatcher: everything an authenticated operator can do.
// Owns the client and the session so no state lives in globals.

use crate::api::{csrf_headers, header_value, ScratchClient, TOKEN_HEADER};
use crate::auth::{validate_username, Session};
use crate::error::{Result, ScratchError};
use reqwest::header::{HeaderMap, REFERER};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// The platform rejects longer comments.
pub const MAX_COMMENT_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Project,
    Profile,
}

/// One comment to post. Built per invocation and validated on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRequest {
    pub target_kind: TargetKind,
    /// Project id or profile username.
    pub target_id: String,
    pub content: String,
    pub parent_id: String,
    pub commentee_id: String,
}

#[derive(Serialize)]
struct CommentPayload<'a> {
    content: &'a str,
    parent_id: &'a str,
    commentee_id: &'a str,
}

impl CommentRequest {
    pub fn project(project_id: impl Into<String>, content: impl Into<String>) -> Result<Self> {
        let target_id = project_id.into();
        validate_project_id(&target_id)?;
        Self::build(TargetKind::Project, target_id, content.into())
    }

    pub fn profile(username: impl Into<String>, content: impl Into<String>) -> Result<Self> {
        let target_id = username.into();
        validate_username(&target_id)?;
        Self::build(TargetKind::Profile, target_id, content.into())
    }

    /// Turn the comment into a reply within an existing thread.
    pub fn reply_to(mut self, parent_id: impl Into<String>, commentee_id: impl Into<String>) -> Self {
        self.parent_id = parent_id.into();
        self.commentee_id = commentee_id.into();
        self
    }

    fn build(target_kind: TargetKind, target_id: String, content: String) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(ScratchError::validation("comment content is required"));
        }
        let chars = content.chars().count();
        if chars > MAX_COMMENT_CHARS {
            return Err(ScratchError::validation(format!(
                "comment is {chars} characters, limit is {MAX_COMMENT_CHARS}"
            )));
        }
        Ok(CommentRequest {
            target_kind,
            target_id,
            content,
            parent_id: String::new(),
            commentee_id: String::new(),
        })
    }

    fn payload(&self) -> CommentPayload<'_> {
        CommentPayload {
            content: &self.content,
            parent_id: &self.parent_id,
            commentee_id: &self.commentee_id,
        }
    }
}

/// Result of a comment POST, split into the three classes the operator
/// cares about. Nothing is retried automatically.
#[derive(Debug)]
pub enum CommentOutcome {
    Posted { status: u16 },
    /// HTTP 429. The operator should wait before trying again.
    RateLimited,
    Failed(ScratchError),
}

impl CommentOutcome {
    pub fn classify(result: Result<u16>) -> Self {
        match result {
            Ok(status) => CommentOutcome::Posted { status },
            Err(e) if e.is_rate_limited() => CommentOutcome::RateLimited,
            Err(e) => CommentOutcome::Failed(e),
        }
    }

    pub fn is_posted(&self) -> bool {
        matches!(self, CommentOutcome::Posted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageCount {
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub country: String,
    pub joined: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub favorites: u64,
    pub loves: u64,
    pub views: u64,
}

#[derive(Deserialize, Debug)]
struct RawUser {
    id: u64,
    username: String,
    #[serde(default)]
    profile: RawUserProfile,
    #[serde(default)]
    history: RawHistory,
}

#[derive(Deserialize, Debug, Default)]
struct RawUserProfile {
    #[serde(default)]
    country: String,
}

#[derive(Deserialize, Debug, Default)]
struct RawHistory {
    #[serde(default)]
    joined: String,
}

#[derive(Deserialize, Debug)]
struct RawProject {
    id: u64,
    #[serde(default)]
    title: String,
    author: RawAuthor,
    #[serde(default)]
    stats: RawStats,
}

#[derive(Deserialize, Debug)]
struct RawAuthor {
    username: String,
}

#[derive(Deserialize, Debug, Default)]
struct RawStats {
    #[serde(default)]
    views: u64,
    #[serde(default)]
    loves: u64,
    #[serde(default)]
    favorites: u64,
}

/// What the operator picked from the menu.
#[derive(Debug, Clone)]
pub enum Action {
    CheckMessages,
    Profile { username: String },
    Project { id: String },
    Comment(CommentRequest),
}

#[derive(Debug)]
pub enum ActionOutput {
    Messages(MessageCount),
    Profile(UserProfile),
    Project(ProjectInfo),
    Comment(CommentOutcome),
}

pub struct Dispatcher {
    client: ScratchClient,
    session: Session,
}

impl Dispatcher {
    pub fn new(client: ScratchClient, session: Session) -> Self {
        Dispatcher { client, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn client(&self) -> &ScratchClient {
        &self.client
    }

    pub fn dispatch(&self, action: Action) -> Result<ActionOutput> {
        match action {
            Action::CheckMessages => self.message_count().map(ActionOutput::Messages),
            Action::Profile { username } => self.profile(&username).map(ActionOutput::Profile),
            Action::Project { id } => self.project(&id).map(ActionOutput::Project),
            Action::Comment(req) => Ok(ActionOutput::Comment(self.comment(&req))),
        }
    }

    /// Unread messages for the signed-in user.
    pub fn message_count(&self) -> Result<MessageCount> {
        let url = self
            .client
            .api_endpoint(&format!("users/{}/messages/count", self.session.username))?;
        let res = self.client.get(url, Some(self.token_headers()?))?;
        decode(res.body, "message count")
    }

    pub fn profile(&self, username: &str) -> Result<UserProfile> {
        validate_username(username)?;
        let url = self.client.api_endpoint(&format!("users/{username}"))?;
        let res = self.client.get(url, Some(self.token_headers()?))?;
        let raw: RawUser = decode(res.body, "user profile")?;
        Ok(UserProfile {
            id: raw.id,
            username: raw.username,
            country: raw.profile.country,
            joined: raw.history.joined,
        })
    }

    pub fn project(&self, project_id: &str) -> Result<ProjectInfo> {
        validate_project_id(project_id)?;
        let url = self.client.api_endpoint(&format!("projects/{project_id}"))?;
        let res = self.client.get(url, Some(self.token_headers()?))?;
        let raw: RawProject = decode(res.body, "project")?;
        Ok(ProjectInfo {
            id: raw.id,
            title: raw.title,
            author: raw.author.username,
            favorites: raw.stats.favorites,
            loves: raw.stats.loves,
            views: raw.stats.views,
        })
    }

    /// Post a comment and classify the result.
    pub fn comment(&self, req: &CommentRequest) -> CommentOutcome {
        let outcome = CommentOutcome::classify(self.post_comment(req));
        match &outcome {
            CommentOutcome::Posted { status } => info!(comment_target = %req.target_id, status, "comment posted"),
            CommentOutcome::RateLimited => warn!(comment_target = %req.target_id, "comment rate limited"),
            CommentOutcome::Failed(error) => warn!(comment_target = %req.target_id, %error, "comment failed"),
        }
        outcome
    }

    /// Post a comment, returning the HTTP status on success.
    pub fn post_comment(&self, req: &CommentRequest) -> Result<u16> {
        // Read the jar right before posting: the server may have rotated
        // the token since login.
        let csrf = self.client.csrf_token();
        let mut headers = csrf_headers(csrf.as_deref())?;

        let url = match req.target_kind {
            TargetKind::Project => {
                headers.extend(self.token_headers()?);
                self.client
                    .api_endpoint(&format!("proxy/comments/project/{}/", req.target_id))?
            }
            TargetKind::Profile => {
                let referer = self
                    .client
                    .site_endpoint(&format!("users/{}/", req.target_id))?;
                headers.insert(REFERER, header_value(referer.as_str())?);
                self.client
                    .site_endpoint(&format!("site-api/comments/user/{}/add/", req.target_id))?
            }
        };

        let res = self.client.post(url, &req.payload(), Some(headers))?;
        Ok(res.status.as_u16())
    }

    fn token_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.session.token {
            headers.insert(TOKEN_HEADER, header_value(token)?);
        }
        Ok(headers)
    }
}

pub fn validate_project_id(project_id: &str) -> Result<()> {
    if !project_id.is_empty() && project_id.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ScratchError::validation(format!(
            "project id {project_id:?} must be a number"
        )))
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: serde_json::Value, what: &str) -> Result<T> {
    serde_json::from_value(body).map_err(|e| ScratchError::Decode(format!("{what}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn project_comment_requires_numeric_id() {
        assert!(CommentRequest::project("123", "hello").is_ok());
        assert!(matches!(
            CommentRequest::project("12a", "hello"),
            Err(ScratchError::Validation(_))
        ));
        assert!(matches!(
            CommentRequest::project("", "hello"),
            Err(ScratchError::Validation(_))
        ));
    }

    #[test]
    fn comment_content_is_checked_before_sending() {
        assert!(matches!(
            CommentRequest::profile("alice", "  "),
            Err(ScratchError::Validation(_))
        ));
        let long = "x".repeat(MAX_COMMENT_CHARS + 1);
        assert!(matches!(
            CommentRequest::profile("alice", long),
            Err(ScratchError::Validation(_))
        ));
        let exact = "あ".repeat(MAX_COMMENT_CHARS);
        assert!(CommentRequest::profile("alice", exact).is_ok());
    }

    #[test]
    fn payload_serializes_empty_thread_fields() {
        let req = CommentRequest::project("123", "hello").unwrap();
        assert_eq!(
            serde_json::to_value(req.payload()).unwrap(),
            json!({"content": "hello", "parent_id": "", "commentee_id": ""})
        );

        let reply = req.reply_to("77", "5");
        assert_eq!(
            serde_json::to_value(reply.payload()).unwrap(),
            json!({"content": "hello", "parent_id": "77", "commentee_id": "5"})
        );
    }

    #[test]
    fn outcomes_separate_rate_limit_from_failure() {
        assert!(CommentOutcome::classify(Ok(201)).is_posted());
        assert!(matches!(
            CommentOutcome::classify(Err(ScratchError::HttpStatus {
                status: 429,
                body: String::new()
            })),
            CommentOutcome::RateLimited
        ));
        assert!(matches!(
            CommentOutcome::classify(Err(ScratchError::HttpStatus {
                status: 403,
                body: String::new()
            })),
            CommentOutcome::Failed(ScratchError::HttpStatus { status: 403, .. })
        ));
        assert!(matches!(
            CommentOutcome::classify(Err(ScratchError::Network {
                message: "refused".into()
            })),
            CommentOutcome::Failed(ScratchError::Network { .. })
        ));
    }

    #[test]
    fn project_payload_tolerates_missing_stats() {
        let raw: RawProject =
            decode(json!({"id": 1, "title": "t", "author": {"username": "a"}}), "project").unwrap();
        assert_eq!(raw.stats.loves, 0);
    }

    #[test]
    fn decode_errors_name_the_payload() {
        let err = decode::<RawUser>(json!({"username": "a"}), "user profile").unwrap_err();
        assert!(err.to_string().contains("user profile"));
    }
}
