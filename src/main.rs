//! Console entry point.
//!
//! Reads one command per line from stdin, translates it into a controller
//! [`Event`], runs the resulting actions, and redraws the screen. Remote
//! requests run on spawned tasks; their responses come back through a channel
//! and are handled like any other event.
//!
//! # Usage
//!
//! ```text
//! usergrid [config.toml]
//! ```
//!
//! # Commands
//!
//! - `login <email> <password>`: Sign in
//! - `/<text>`: Search (`/` alone clears the search)
//! - `j` / `k`: Move the selection down / up
//! - `e [id]`: Edit the selected (or given) user
//! - `d [id]`: Delete the selected (or given) user
//! - `new first=.. last=.. email=.. status=.. dob=YYYY-MM-DD`: Create a user
//! - `r`: Reload
//! - `t`: Toggle the theme
//! - `logout`, `q`
//!
//! With the edit dialog open:
//! - `set field=value ...`: Submit the changed fields
//! - `n`: Cancel
//!
//! With the delete dialog open:
//! - `y`: Confirm
//! - `n`: Cancel

#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use usergrid::app::{ModalKind, Notice, NoticeLevel};
use usergrid::domain::user::parse_date_of_birth;
use usergrid::domain::{NewUser, UserPatch, UserStatus};
use usergrid::infrastructure::paths;
use usergrid::remote::{HttpUserApi, RemoteDispatcher, RemoteResponse};
use usergrid::session::{Credentials, JsonSessionStore, SessionStore};
use usergrid::ui::theme::Theme;
use usergrid::{handle_event, Action, AppState, Config, Event, Result};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("usergrid: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;
    let trace_file = usergrid::observability::init_tracing(&config)?;

    let span = tracing::debug_span!("console_start");
    let guard = span.enter();
    tracing::debug!(trace_file = ?trace_file, config = ?config, "starting console");

    let data_dir = paths::resolve_data_dir(config.data_dir.as_deref())?;
    let store = JsonSessionStore::new(paths::session_file(&data_dir))?;
    let app = usergrid::initialize(&config, &store)?;
    let api = Arc::new(HttpUserApi::new(&config.base_url, config.timeout())?);
    drop(guard);

    api.set_token(app.session.token()).await;

    let (responses, mut inbox) = mpsc::unbounded_channel();
    let mut console = Console {
        app,
        store,
        api: Arc::clone(&api),
        dispatcher: RemoteDispatcher::new(api),
        responses,
        notice: None,
    };

    console.dispatch(Event::Mount).await;
    console.draw();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let event = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => match parse_command(&line, &console.app) {
                    Ok(Some(event)) => event,
                    Ok(None) => {
                        console.draw();
                        continue;
                    }
                    Err(message) => {
                        console.notice = Some(Notice::error(message));
                        console.draw();
                        continue;
                    }
                },
                None => break,
            },
            Some(response) = inbox.recv() => Event::Remote(response),
        };

        if !console.dispatch(event).await {
            break;
        }
    }

    tracing::debug!("console exiting");
    usergrid::observability::shutdown_tracing();
    Ok(())
}

/// Controller state plus the handles that carry out its actions.
struct Console {
    app: AppState,
    store: JsonSessionStore,
    api: Arc<HttpUserApi>,
    dispatcher: RemoteDispatcher,
    responses: mpsc::UnboundedSender<RemoteResponse>,
    notice: Option<Notice>,
}

impl Console {
    /// Handles one event and runs its actions. Returns `false` on quit.
    async fn dispatch(&mut self, event: Event) -> bool {
        let (should_render, actions) = match handle_event(&mut self.app, &event) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!(error = %e, "error handling event");
                return true;
            }
        };

        tracing::debug!(action_count = actions.len(), should_render = should_render, "event handled");

        let mut keep_running = true;
        let mut notified = false;
        for action in actions {
            match action {
                Action::Remote(request) => {
                    let dispatcher = self.dispatcher.clone();
                    let responses = self.responses.clone();
                    tokio::spawn(async move {
                        let response = dispatcher.handle_request(request).await;
                        if responses.send(response).is_err() {
                            tracing::debug!("console gone, dropping response");
                        }
                    });
                }
                Action::Notify(notice) => {
                    self.notice = Some(notice);
                    notified = true;
                }
                Action::PersistSession(stored) => {
                    // The token must be in place before any request queued after this action.
                    self.api.set_token(stored.token.as_ref()).await;
                    if let Err(e) = self.store.save(&stored) {
                        tracing::warn!(error = %e, "failed to persist session");
                        self.notice = Some(Notice::error(format!("Could not save session: {e}")));
                        notified = true;
                    }
                }
                Action::ClearSession => {
                    self.api.set_token(None).await;
                    if let Err(e) = self.store.clear() {
                        tracing::warn!(error = %e, "failed to clear stored session");
                        self.notice = Some(Notice::error(format!("Could not clear session: {e}")));
                        notified = true;
                    }
                }
                Action::Quit => keep_running = false,
            }
        }

        if keep_running && (should_render || notified) {
            self.draw();
        }
        keep_running
    }

    fn draw(&self) {
        let (rows, cols) = terminal_size();
        let frame = usergrid::ui::render(&self.app, rows.saturating_sub(2), cols);
        print!("{CLEAR_SCREEN}{frame}");

        if let Some(notice) = &self.notice {
            let theme = self.app.theme();
            let color = match notice.level {
                NoticeLevel::Success => &theme.colors.success_fg,
                NoticeLevel::Info => &theme.colors.accent,
                NoticeLevel::Error => &theme.colors.error_fg,
            };
            println!("{}{}{}", Theme::fg(color), notice.message, Theme::reset());
        }
        print!("> ");
        if let Err(e) = std::io::Write::flush(&mut std::io::stdout()) {
            tracing::debug!(error = %e, "failed to flush stdout");
        }
    }
}

/// `LINES`/`COLUMNS` when exported by the shell, else 24x80.
fn terminal_size() -> (usize, usize) {
    let read = |name: &str, default: usize| {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(default)
    };
    (read("LINES", 24), read("COLUMNS", 80))
}

/// Translates one input line into an event.
///
/// `Ok(None)` means nothing to do (blank line); `Err` carries a message for the
/// user when the line cannot be understood.
fn parse_command(line: &str, app: &AppState) -> std::result::Result<Option<Event>, String> {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(query) = line.strip_prefix('/') {
        return Ok(Some(if query.is_empty() { Event::ClearSearch } else { Event::Search(query.to_string()) }));
    }

    let trimmed = line.trim();
    let (command, rest) = trimmed.split_once(char::is_whitespace).unwrap_or((trimmed, ""));
    let rest = rest.trim();

    match (app.modal.kind(), command) {
        (_, "") => Ok(None),
        (Some(_), "n" | "esc") => Ok(Some(Event::CancelModal)),
        (Some(ModalKind::Delete), "y") => Ok(Some(Event::ConfirmDelete)),
        (Some(ModalKind::Edit), "set") => parse_patch(rest).map(|patch| Some(Event::ConfirmEdit(patch))),
        (Some(kind), _) => Err(match kind {
            ModalKind::Edit => "Use `set field=value ...` to save or `n` to cancel.".to_string(),
            ModalKind::Delete => "Press `y` to delete or `n` to cancel.".to_string(),
        }),
        (None, "j") => Ok(Some(Event::SelectNext)),
        (None, "k") => Ok(Some(Event::SelectPrevious)),
        (None, "e") if rest.is_empty() => Ok(Some(Event::OpenEditSelected)),
        (None, "e") => Ok(Some(Event::OpenEdit(rest.to_string()))),
        (None, "d") if rest.is_empty() => Ok(Some(Event::OpenDeleteSelected)),
        (None, "d") => Ok(Some(Event::OpenDelete(rest.to_string()))),
        (None, "new") => parse_new_user(rest).map(|user| Some(Event::Create(user))),
        (None, "r") => Ok(Some(Event::RetryLoad)),
        (None, "t") => Ok(Some(Event::ToggleTheme)),
        (None, "login") => match rest.split_once(char::is_whitespace) {
            Some((email, password)) if !password.trim().is_empty() => Ok(Some(Event::Login(Credentials {
                email: email.to_string(),
                password: password.trim().to_string(),
            }))),
            _ => Err("Usage: login <email> <password>".to_string()),
        },
        (None, "logout") => Ok(Some(Event::Logout)),
        (None, "q" | "quit") => Ok(Some(Event::Quit)),
        (None, other) => Err(format!("Unknown command `{other}`")),
    }
}

/// Splits `key=value` pairs; values may not contain spaces.
fn fields(args: &str) -> std::result::Result<Vec<(&str, &str)>, String> {
    args.split_whitespace()
        .map(|pair| pair.split_once('=').ok_or_else(|| format!("Expected field=value, got `{pair}`")))
        .collect()
}

fn parse_status(value: &str) -> std::result::Result<UserStatus, String> {
    UserStatus::parse(value).ok_or_else(|| format!("Unknown status `{value}` (active or locked)"))
}

fn parse_patch(args: &str) -> std::result::Result<UserPatch, String> {
    let mut patch = UserPatch::default();
    for (key, value) in fields(args)? {
        match key {
            "first" | "firstName" => patch.first_name = Some(value.to_string()),
            "last" | "lastName" => patch.last_name = Some(value.to_string()),
            "email" => patch.email = Some(value.to_string()),
            "status" => patch.status = Some(parse_status(value)?),
            "dob" | "dateOfBirth" => {
                patch.date_of_birth = Some(parse_date_of_birth(value).map_err(|e| e.message)?);
            }
            other => return Err(format!("Unknown field `{other}`")),
        }
    }
    Ok(patch)
}

fn parse_new_user(args: &str) -> std::result::Result<NewUser, String> {
    let patch = parse_patch(args)?;
    Ok(NewUser {
        first_name: patch.first_name.ok_or("first= is required")?,
        last_name: patch.last_name,
        email: patch.email.ok_or("email= is required")?,
        status: patch.status.unwrap_or(UserStatus::Active),
        date_of_birth: patch.date_of_birth.ok_or("dob= is required")?,
    })
}
