// UI layer: interactive menu built on `dialoguer`.
// Flow: language -> auth mode -> credentials -> action loop. Auth failure
// ends the run; action failures are reported and the loop carries on.

use crate::actions::{Action, ActionOutput, CommentOutcome, CommentRequest, Dispatcher};
use crate::api::ScratchClient;
use crate::auth::{AuthFlow, AuthMode, Session};
use crate::error::ScratchError;
use crate::i18n::{Lang, Msg};
use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::{Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    CheckMessages,
    Profile,
    Project,
    ProjectComment,
    ProfileComment,
    Exit,
}

const MENU: [MenuItem; 6] = [
    MenuItem::CheckMessages,
    MenuItem::Profile,
    MenuItem::Project,
    MenuItem::ProjectComment,
    MenuItem::ProfileComment,
    MenuItem::Exit,
];

impl MenuItem {
    fn label(self) -> Msg {
        match self {
            MenuItem::CheckMessages => Msg::ActCheckMessages,
            MenuItem::Profile => Msg::ActProfile,
            MenuItem::Project => Msg::ActProject,
            MenuItem::ProjectComment => Msg::ActProjectComment,
            MenuItem::ProfileComment => Msg::ActProfileComment,
            MenuItem::Exit => Msg::ActExit,
        }
    }
}

/// Entry point for the interactive CLI. Returns normally when the
/// operator exits or authentication fails.
pub fn run(client: ScratchClient) -> Result<()> {
    let lang = choose_language()?;
    println!("\n{}", lang.text(Msg::Title).bold());

    let mode = choose_auth_mode(lang)?;
    let Some(session) = sign_in(&client, &mode, lang)? else {
        println!("{}", lang.text(Msg::Terminating));
        return Ok(());
    };

    main_menu(Dispatcher::new(client, session), lang)
}

/// Action loop. Runs until the operator picks "Exit".
pub fn main_menu(dispatcher: Dispatcher, lang: Lang) -> Result<()> {
    let items: Vec<&str> = MENU.iter().map(|item| lang.text(item.label())).collect();
    loop {
        println!("\n-----------------------------------");
        println!(
            "{} {}",
            lang.text(Msg::CurrentUser),
            dispatcher.session().username
        );

        let selection = Select::new()
            .with_prompt(lang.text(Msg::MenuPrompt))
            .items(&items)
            .default(0)
            .interact()?;

        let item = MENU[selection];
        if item == MenuItem::Exit {
            println!("{}", lang.text(Msg::Goodbye));
            break;
        }

        // Bad input is reported like any other action failure.
        match build_action(item, dispatcher.session(), lang)? {
            Ok(action) => perform(&dispatcher, action, lang)?,
            Err(e) => report_error(lang, &e),
        }
    }
    Ok(())
}

fn choose_language() -> Result<Lang> {
    let labels: Vec<&str> = Lang::ALL.iter().map(|l| l.label()).collect();
    let selection = Select::new()
        .with_prompt(Lang::En.text(Msg::AskLang))
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(Lang::ALL[selection])
}

fn choose_auth_mode(lang: Lang) -> Result<AuthMode> {
    let items = [lang.text(Msg::ModeLogin), lang.text(Msg::ModeToken)];
    let selection = Select::new()
        .with_prompt(lang.text(Msg::AskAuthMode))
        .items(&items)
        .default(0)
        .interact()?;

    if selection == 0 {
        let username = ask_text(lang, Msg::AskUsername)?;
        let password = ask_secret(lang, Msg::AskPassword)?;
        Ok(AuthMode::Password { username, password })
    } else {
        println!("\n{}\n", lang.text(Msg::TokenNote).yellow());
        let username = ask_text(lang, Msg::AskUsernameApi)?;
        let token = ask_secret(lang, Msg::AskToken)?;
        Ok(AuthMode::Token { username, token })
    }
}

/// Walk the auth flow step by step so the operator sees progress.
fn sign_in(client: &ScratchClient, mode: &AuthMode, lang: Lang) -> Result<Option<Session>> {
    if let Err(e) = mode.validate() {
        report_error(lang, &e);
        return Ok(None);
    }

    let mut flow = AuthFlow::new(client);
    let result = match mode {
        AuthMode::Password { username, password } => {
            println!("{}", lang.text(Msg::FetchingCsrf));
            flow.acquire_csrf().and_then(|_| {
                println!("{}", lang.text(Msg::LoginTry));
                flow.submit_credentials(username, password)
            })
        }
        AuthMode::Token { username, token } => {
            println!("{}", lang.text(Msg::CheckingToken));
            flow.probe_token(username, token)
        }
        AuthMode::SessionCookie {
            session_id,
            csrf_token,
        } => flow.resume_session(session_id, csrf_token),
    };

    match result {
        Ok(session) => {
            let greeting = match mode {
                AuthMode::Token { .. } => lang.text(Msg::TokenOk).to_string(),
                _ => format!("{} {}", lang.text(Msg::LoginOk), session.username),
            };
            println!("{}", greeting.green());
            Ok(Some(session))
        }
        Err(e) => {
            let headline = match mode {
                AuthMode::Token { .. } => lang.text(Msg::TokenFail),
                _ => lang.text(Msg::LoginFail),
            };
            println!("{}", headline.red());
            report_error(lang, &e);
            Ok(None)
        }
    }
}

/// Prompt for whatever the chosen item needs. The outer `Result` is
/// terminal I/O; the inner one is input validation.
fn build_action(
    item: MenuItem,
    session: &Session,
    lang: Lang,
) -> Result<Result<Action, ScratchError>> {
    let action = match item {
        MenuItem::CheckMessages => Ok(Action::CheckMessages),
        MenuItem::Profile => Ok(Action::Profile {
            username: session.username.clone(),
        }),
        MenuItem::Project => Ok(Action::Project {
            id: ask_number(lang, Msg::AskProjectId)?,
        }),
        MenuItem::ProjectComment => {
            let id = ask_number(lang, Msg::AskProjectId)?;
            let content = ask_text(lang, Msg::AskCommentContent)?;
            CommentRequest::project(id, content).map(Action::Comment)
        }
        MenuItem::ProfileComment => {
            let target = ask_text(lang, Msg::AskTargetUser)?;
            let content = ask_text(lang, Msg::AskCommentContent)?;
            CommentRequest::profile(target, content).map(Action::Comment)
        }
        MenuItem::Exit => Err(ScratchError::validation("exit has no action")),
    };
    Ok(action)
}

fn perform(dispatcher: &Dispatcher, action: Action, lang: Lang) -> Result<()> {
    let busy = match &action {
        Action::Project { id } => {
            println!("{} {id}...", lang.text(Msg::ResSearching));
            Msg::Communicating
        }
        Action::Comment(_) => Msg::Sending,
        _ => Msg::Communicating,
    };
    let is_project = matches!(action, Action::Project { .. });

    let spinner = spinner(lang.text(busy))?;
    let result = dispatcher.dispatch(action);
    spinner.finish_and_clear();

    match result {
        Ok(output) => print_output(lang, &output),
        Err(e) => {
            if is_project {
                println!("{}", lang.text(Msg::ResProjectError).red());
            }
            report_error(lang, &e);
        }
    }
    Ok(())
}

fn print_output(lang: Lang, output: &ActionOutput) {
    match output {
        ActionOutput::Messages(m) => {
            println!("\n{} 【 {} 】", lang.text(Msg::ResUnread), m.count);
        }
        ActionOutput::Profile(p) => {
            println!("\n{} {}", lang.text(Msg::ResUsername), p.username);
            println!("{} {}", lang.text(Msg::ResCountry), p.country);
            println!("{} {}", lang.text(Msg::ResJoined), p.joined);
            println!("{} {}", lang.text(Msg::ResId), p.id);
        }
        ActionOutput::Project(p) => {
            println!("\n{} {}", lang.text(Msg::ResTitle), p.title);
            println!("{} {}", lang.text(Msg::ResAuthor), p.author);
            println!("{} {}", lang.text(Msg::ResFavorites), p.favorites);
            println!("{} {}", lang.text(Msg::ResLoves), p.loves);
        }
        ActionOutput::Comment(outcome) => match outcome {
            CommentOutcome::Posted { .. } => {
                println!("{}", lang.text(Msg::ResCommentPosted).green())
            }
            CommentOutcome::RateLimited => {
                println!("{}", lang.text(Msg::ResRateLimited).yellow())
            }
            CommentOutcome::Failed(e) => {
                println!("{}", lang.text(Msg::ResCommentFailed).red());
                report_error(lang, e);
            }
        },
    }
}

fn report_error(lang: Lang, error: &ScratchError) {
    eprintln!("{} {}", lang.text(Msg::Error).red(), error);
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn ask_text(lang: Lang, prompt: Msg) -> Result<String> {
    let required = lang.text(Msg::ValidRequired);
    let value: String = Input::new()
        .with_prompt(lang.text(prompt))
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            if input.trim().is_empty() {
                Err(required)
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(value.trim().to_string())
}

fn ask_number(lang: Lang, prompt: Msg) -> Result<String> {
    let invalid = lang.text(Msg::ValidNumber);
    let value: String = Input::new()
        .with_prompt(lang.text(prompt))
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            let trimmed = input.trim();
            if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
                Ok(())
            } else {
                Err(invalid)
            }
        })
        .interact_text()?;
    Ok(value.trim().to_string())
}

// `Password` hides input; it has no validator hook, so loop by hand.
fn ask_secret(lang: Lang, prompt: Msg) -> Result<String> {
    loop {
        let value: String = Password::new()
            .with_prompt(lang.text(prompt))
            .allow_empty_password(true)
            .interact()?;
        if !value.trim().is_empty() {
            return Ok(value);
        }
        println!("{}", lang.text(Msg::ValidRequired).red());
    }
}
