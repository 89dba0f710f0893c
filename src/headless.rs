// Non-interactive runner: sign in from environment variables (or flags),
// post one comment, report, exit. Suited to cron jobs and CI.

use crate::actions::{CommentOutcome, CommentRequest, Dispatcher};
use crate::api::ScratchClient;
use crate::auth::{authenticate, AuthMode};
use crate::error::{Result, ScratchError};
use crate::i18n::{Lang, Msg};
use clap::Args;
use tracing::info;

/// Arguments for `scratch-cli send`. Every flag can come from the
/// environment instead.
#[derive(Debug, Clone, Default, Args)]
pub struct SendArgs {
    /// Account to sign in as.
    #[arg(long, env = "SCRATCH_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "SCRATCH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Existing `scratchsessionsid` cookie. Used together with
    /// `--csrf-token` instead of a password.
    #[arg(long, env = "SCRATCH_SESSION_ID", hide_env_values = true)]
    pub session_id: Option<String>,

    #[arg(long, env = "SCRATCH_CSRF_TOKEN", hide_env_values = true)]
    pub csrf_token: Option<String>,

    /// Profile to comment on.
    #[arg(long = "target-user", env = "TARGET_USER")]
    pub target_user: Option<String>,

    /// Project to comment on instead of a profile. Wins over
    /// `--target-user`, so a `TARGET_USER` kept in `.env` can stay.
    #[arg(long = "target-project", env = "TARGET_PROJECT")]
    pub target_project: Option<String>,

    #[arg(long, env = "COMMENT_CONTENT")]
    pub content: Option<String>,
}

impl SendArgs {
    /// A complete session-cookie pair wins over username/password.
    pub fn auth_mode(&self) -> Result<AuthMode> {
        let mode = match (
            present(&self.session_id),
            present(&self.csrf_token),
            present(&self.username),
            present(&self.password),
        ) {
            (Some(session_id), Some(csrf_token), _, _) => AuthMode::SessionCookie {
                session_id: session_id.to_string(),
                csrf_token: csrf_token.to_string(),
            },
            (_, _, Some(username), Some(password)) => AuthMode::Password {
                username: username.to_string(),
                password: password.to_string(),
            },
            _ => {
                return Err(ScratchError::validation(
                    "set SCRATCH_USERNAME and SCRATCH_PASSWORD, or SCRATCH_SESSION_ID and SCRATCH_CSRF_TOKEN",
                ))
            }
        };
        mode.validate()?;
        Ok(mode)
    }

    pub fn comment_request(&self) -> Result<CommentRequest> {
        let content = present(&self.content)
            .ok_or_else(|| ScratchError::validation("set COMMENT_CONTENT"))?;
        match (present(&self.target_project), present(&self.target_user)) {
            (Some(project), _) => CommentRequest::project(project, content),
            (None, Some(user)) => CommentRequest::profile(user, content),
            (None, None) => Err(ScratchError::validation(
                "set TARGET_USER (or TARGET_PROJECT)",
            )),
        }
    }
}

/// Sign in and post one comment. All input is checked before the first
/// request. Authentication failures come back as `Err`; comment results
/// come back as the classified outcome.
pub fn run(client: ScratchClient, args: &SendArgs) -> Result<CommentOutcome> {
    let mode = args.auth_mode()?;
    let request = args.comment_request()?;
    let lang = Lang::En;

    println!("\n🚀 Sending to {}", request.target_id);
    println!("🔄 {}", lang.text(Msg::LoginTry));
    let session = authenticate(&client, &mode)?;
    println!("{} {}", lang.text(Msg::LoginOk), session.username);

    let dispatcher = Dispatcher::new(client, session);
    println!("📨 {}", lang.text(Msg::Sending));
    let outcome = dispatcher.comment(&request);

    match &outcome {
        CommentOutcome::Posted { status } => {
            info!(status, "headless run finished");
            println!("{}", lang.text(Msg::ResCommentPosted));
        }
        CommentOutcome::RateLimited => eprintln!("{}", lang.text(Msg::ResRateLimited)),
        CommentOutcome::Failed(e) => {
            eprintln!("{}", lang.text(Msg::ResCommentFailed));
            eprintln!("{} {}", lang.text(Msg::Error), e);
        }
    }
    Ok(outcome)
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
