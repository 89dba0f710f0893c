// Library root
// -----------
// This crate exposes the library surface behind the `scratch-cli`
// binary. `main.rs` parses arguments, sets up logging and hands a client
// to either the interactive menu or the headless runner.
//
// Module responsibilities:
// - `api`: cookie-aware HTTP client shared by every request.
// - `auth`: CSRF/login handshake, token probe and session-cookie resume.
// - `actions`: message count, profile, project and comment actions.
// - `config`: base URLs and user agent, overridable from the environment.
// - `error`: the error enum every fallible call returns.
// - `i18n`: English and Japanese strings for the prompts.
// - `ui`: interactive terminal flow.
// - `headless`: one-shot comment sender driven by env vars.
pub mod actions;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod headless;
pub mod i18n;
pub mod ui;

pub use actions::{Action, ActionOutput, CommentOutcome, CommentRequest, Dispatcher};
pub use api::{ApiResponse, ScratchClient};
pub use auth::{authenticate, AuthFlow, AuthMode, AuthState, Session};
pub use config::ScratchConfig;
pub use error::ScratchError;
