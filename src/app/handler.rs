//! Event handling and state transitions.
//!
//! [`handle_event`] is the only function that mutates [`AppState`]. It takes
//! user intents and remote responses alike, applies them, and returns whether
//! the screen should be redrawn together with the side effects to run.
//!
//! # Event Types
//!
//! - **Session**: `Mount`, `Login`, `Logout`, `ToggleTheme`, `Quit`
//! - **Search and navigation**: `Search`, `SearchChar`, `SearchBackspace`,
//!   `ClearSearch`, `SelectNext`, `SelectPrevious`
//! - **Dialogs**: `OpenEdit`, `OpenDelete`, their `*Selected` forms,
//!   `CancelModal`, `ConfirmEdit`, `ConfirmDelete`
//! - **Mutations and loads**: `Create`, `RetryLoad`
//! - **Remote**: `Remote` with a [`RemoteResponse`]
//!
//! # Liveness
//!
//! Every request carries the session epoch it was issued under. A response is
//! discarded before it touches any state unless that epoch is still live, so
//! nothing issued before a logout is ever applied afterwards.
//!
//! # Example
//!
//! ```rust
//! use usergrid::app::{handle_event, AppState, Event};
//! use usergrid::session::SessionContext;
//! use usergrid::ui::theme::ThemeMode;
//!
//! let mut state = AppState::new(SessionContext::new(ThemeMode::Light), None);
//! let (render, actions) = handle_event(&mut state, &Event::SearchChar('a'))?;
//! assert!(render);
//! assert!(actions.is_empty());
//! # Ok::<(), usergrid::domain::UserGridError>(())
//! ```

use super::actions::{Action, Notice};
use super::modal::ModalKind;
use super::mutation::{Completion, MutationKind};
use super::state::AppState;
use crate::domain::error::Result;
use crate::domain::user::describe;
use crate::domain::{FieldError, NewUser, OperationError, UserPatch};
use crate::remote::{RemoteRequest, RemoteResponse};
use crate::session::Credentials;
use chrono::Utc;

/// User intents and remote responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The user list became visible. Loads unless the cache is fresh.
    Mount,
    /// Exchange credentials for a session.
    Login(Credentials),
    /// Replace the whole search query.
    Search(String),
    SearchChar(char),
    SearchBackspace,
    ClearSearch,
    SelectNext,
    SelectPrevious,
    OpenEdit(String),
    OpenDelete(String),
    OpenEditSelected,
    OpenDeleteSelected,
    CancelModal,
    /// Submit the edit dialog with the changed fields.
    ConfirmEdit(UserPatch),
    ConfirmDelete,
    Create(NewUser),
    /// Reload from the server regardless of freshness.
    RetryLoad,
    ToggleTheme,
    Logout,
    Quit,
    Remote(RemoteResponse),
}

/// Applies `event` to `state`.
///
/// Returns `(render, actions)`: whether the view changed, and the side effects
/// to execute in order.
///
/// # Errors
///
/// Infrastructure faults only. Remote and validation failures are recorded in
/// the status channel instead.
#[allow(clippy::too_many_lines)]
pub fn handle_event(state: &mut AppState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = %event_name(event)).entered();

    match event {
        Event::Mount => {
            if !state.session.is_authenticated() {
                return Ok((true, vec![]));
            }
            if state.is_load_pending() || !state.cache.needs_load(Utc::now(), state.stale_after) {
                tracing::debug!(cached = state.cache.len(), "cache fresh, skipping load");
                state.apply_search_filter();
                return Ok((true, vec![]));
            }
            Ok((true, vec![issue_load(state)]))
        }
        Event::Login(credentials) => {
            if state.session.is_authenticated() || state.login_pending {
                tracing::debug!("login already in progress or signed in");
                return Ok((false, vec![]));
            }
            tracing::debug!(email = %credentials.email, "signing in");
            state.login_pending = true;
            state.status.clear_error();
            let request = RemoteRequest::login(state.session.epoch(), credentials.clone());
            Ok((true, vec![Action::Remote(request)]))
        }
        Event::Search(query) => {
            state.search_query.clone_from(query);
            state.apply_search_filter();
            Ok((true, vec![]))
        }
        Event::SearchChar(c) => {
            state.search_query.push(*c);
            tracing::trace!(query = %state.search_query, "search query updated");
            state.apply_search_filter();
            Ok((true, vec![]))
        }
        Event::SearchBackspace => {
            if state.search_query.pop().is_none() {
                return Ok((false, vec![]));
            }
            state.apply_search_filter();
            Ok((true, vec![]))
        }
        Event::ClearSearch => {
            if state.search_query.is_empty() {
                return Ok((false, vec![]));
            }
            state.search_query.clear();
            state.apply_search_filter();
            Ok((true, vec![]))
        }
        Event::SelectNext => {
            state.move_selection_down();
            Ok((true, vec![]))
        }
        Event::SelectPrevious => {
            state.move_selection_up();
            Ok((true, vec![]))
        }
        Event::OpenEdit(id) => Ok((state.modal.open_edit(&state.cache, id), vec![])),
        Event::OpenDelete(id) => Ok((state.modal.open_delete(&state.cache, id), vec![])),
        Event::OpenEditSelected => {
            let Some(id) = state.selected_user().map(|u| u.id.clone()) else {
                tracing::debug!("no user selected");
                return Ok((false, vec![]));
            };
            Ok((state.modal.open_edit(&state.cache, &id), vec![]))
        }
        Event::OpenDeleteSelected => {
            let Some(id) = state.selected_user().map(|u| u.id.clone()) else {
                tracing::debug!("no user selected");
                return Ok((false, vec![]));
            };
            Ok((state.modal.open_delete(&state.cache, &id), vec![]))
        }
        Event::CancelModal => {
            if !state.modal.is_open() {
                return Ok((false, vec![]));
            }
            state.modal.close();
            Ok((true, vec![]))
        }
        Event::ConfirmEdit(patch) => Ok(confirm_edit(state, patch)),
        Event::ConfirmDelete => Ok(confirm_delete(state)),
        Event::Create(user) => Ok(create(state, user)),
        Event::RetryLoad => {
            if !state.session.is_authenticated() {
                return Ok((false, vec![]));
            }
            Ok((true, vec![issue_load(state)]))
        }
        Event::ToggleTheme => {
            let mode = state.session.toggle_theme();
            tracing::debug!(theme = %mode.name(), "theme toggled");
            Ok((true, vec![Action::PersistSession(state.session.to_stored())]))
        }
        Event::Logout => {
            if !state.session.is_authenticated() {
                return Ok((false, vec![]));
            }
            state.session.teardown();
            state.reset_session_state();
            Ok((
                true,
                vec![
                    Action::ClearSession,
                    Action::Notify(Notice::info("Signed out.")),
                ],
            ))
        }
        Event::Quit => Ok((false, vec![Action::Quit])),
        Event::Remote(response) => Ok(handle_response(state, response)),
    }
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::Mount => "mount",
        Event::Login(_) => "login",
        Event::Search(_) => "search",
        Event::SearchChar(_) => "search_char",
        Event::SearchBackspace => "search_backspace",
        Event::ClearSearch => "clear_search",
        Event::SelectNext => "select_next",
        Event::SelectPrevious => "select_previous",
        Event::OpenEdit(_) | Event::OpenEditSelected => "open_edit",
        Event::OpenDelete(_) | Event::OpenDeleteSelected => "open_delete",
        Event::CancelModal => "cancel_modal",
        Event::ConfirmEdit(_) => "confirm_edit",
        Event::ConfirmDelete => "confirm_delete",
        Event::Create(_) => "create",
        Event::RetryLoad => "retry_load",
        Event::ToggleTheme => "toggle_theme",
        Event::Logout => "logout",
        Event::Quit => "quit",
        Event::Remote(_) => "remote_response",
    }
}

fn issue_load(state: &mut AppState) -> Action {
    let generation = state.begin_load();
    tracing::debug!(generation = generation, cached = state.cache.len(), "loading users");
    Action::Remote(RemoteRequest::list_users(state.session.epoch(), generation, None))
}

fn reject_locally(state: &mut AppState, errors: &[FieldError]) -> (bool, Vec<Action>) {
    tracing::debug!(errors = errors.len(), "local validation failed");
    state.status.fail(OperationError::validation(describe(errors), 400));
    (true, vec![])
}

fn confirm_edit(state: &mut AppState, patch: &UserPatch) -> (bool, Vec<Action>) {
    let Some(id) = state
        .modal
        .target()
        .filter(|_| state.modal.kind() == Some(ModalKind::Edit))
        .map(|target| target.id.clone())
    else {
        tracing::debug!("confirm edit without an open edit dialog");
        return (false, vec![]);
    };

    if state.mutations.is_pending(MutationKind::Update, &id) {
        tracing::debug!(user_id = %id, "update already in flight");
        return (false, vec![]);
    }

    if patch.is_empty() {
        tracing::debug!(user_id = %id, "nothing changed, closing dialog");
        state.modal.close();
        return (true, vec![]);
    }

    if let Err(errors) = patch.validate() {
        return reject_locally(state, &errors);
    }

    let seq = state.mutations.begin_update(&id);
    let request = RemoteRequest::update_user(state.session.epoch(), seq, id, patch.clone());
    (true, vec![Action::Remote(request)])
}

fn confirm_delete(state: &mut AppState) -> (bool, Vec<Action>) {
    let Some(id) = state
        .modal
        .target()
        .filter(|_| state.modal.kind() == Some(ModalKind::Delete))
        .map(|target| target.id.clone())
    else {
        tracing::debug!("confirm delete without an open delete dialog");
        return (false, vec![]);
    };

    if state.mutations.is_pending(MutationKind::Delete, &id) {
        tracing::debug!(user_id = %id, "delete already in flight");
        return (false, vec![]);
    }

    let seq = state.mutations.begin_delete(&id);
    let request = RemoteRequest::delete_user(state.session.epoch(), seq, id);
    (true, vec![Action::Remote(request)])
}

fn create(state: &mut AppState, user: &NewUser) -> (bool, Vec<Action>) {
    if !state.session.is_authenticated() {
        return (false, vec![]);
    }

    if let Err(errors) = user.validate() {
        return reject_locally(state, &errors);
    }

    let seq = state.mutations.begin_create();
    let request = RemoteRequest::create_user(state.session.epoch(), seq, user.clone());
    (true, vec![Action::Remote(request)])
}

fn handle_response(state: &mut AppState, response: &RemoteResponse) -> (bool, Vec<Action>) {
    if let RemoteResponse::LoggedIn { epoch, result } = response {
        return logged_in(state, *epoch, result);
    }

    if !state.session.is_live(response.epoch()) {
        tracing::debug!(
            response_epoch = response.epoch(),
            current_epoch = state.session.epoch(),
            "discarding response from ended session"
        );
        return (false, vec![]);
    }

    match response {
        RemoteResponse::LoggedIn { .. } => (false, vec![]),
        RemoteResponse::UsersLoaded { generation, result, .. } => {
            if !state.finish_load(*generation) {
                return (false, vec![]);
            }
            match result {
                Ok(records) => state.apply_loaded(records.clone()),
                Err(error) => {
                    state.mutations.stop_tracking();
                    state.status.fail(error.clone());
                }
            }
            (true, vec![])
        }
        RemoteResponse::UserCreated { seq, result, .. } => {
            let completion =
                state
                    .mutations
                    .complete_create(*seq, result.clone(), &mut state.cache, &mut state.status);
            match completion {
                Completion::Applied(record) => {
                    state.apply_search_filter();
                    let name = record.map(|r| r.first_name).unwrap_or_default();
                    (true, vec![Action::Notify(Notice::success(format!("User {name} created successfully!")))])
                }
                Completion::Failed(_) => (true, vec![]),
                Completion::Ignored | Completion::Superseded => (false, vec![]),
            }
        }
        RemoteResponse::UserUpdated { seq, id, patch, result, .. } => {
            let completion = state.mutations.complete_update(
                *seq,
                id,
                patch,
                result.clone(),
                &mut state.cache,
                &mut state.status,
            );
            match completion {
                Completion::Applied(record) => {
                    let name = record
                        .map(|r| r.first_name)
                        .or_else(|| patch.first_name.clone())
                        .or_else(|| snapshot_first_name(state, ModalKind::Edit, id))
                        .unwrap_or_else(|| id.clone());
                    if state.modal.matches(ModalKind::Edit, id) {
                        state.modal.close();
                    }
                    state.apply_search_filter();
                    (true, vec![Action::Notify(Notice::success(format!("User {name} updated successfully!")))])
                }
                Completion::Failed(_) => (true, vec![]),
                Completion::Ignored | Completion::Superseded => (false, vec![]),
            }
        }
        RemoteResponse::UserDeleted { seq, id, result, .. } => {
            let completion =
                state
                    .mutations
                    .complete_delete(*seq, id, result.clone(), &mut state.cache, &mut state.status);
            match completion {
                Completion::Applied(removed) => {
                    let name = removed
                        .map(|r| r.first_name)
                        .or_else(|| snapshot_first_name(state, ModalKind::Delete, id))
                        .unwrap_or_else(|| id.clone());
                    if state.modal.matches(ModalKind::Delete, id) {
                        state.modal.close();
                    }
                    state.apply_search_filter();
                    (true, vec![Action::Notify(Notice::success(format!("User {name} deleted successfully!")))])
                }
                Completion::Failed(_) => (true, vec![]),
                Completion::Ignored | Completion::Superseded => (false, vec![]),
            }
        }
    }
}

fn snapshot_first_name(state: &AppState, kind: ModalKind, id: &str) -> Option<String> {
    state
        .modal
        .matches(kind, id)
        .then(|| state.modal.target().map(|t| t.first_name.clone()))
        .flatten()
}

fn logged_in(
    state: &mut AppState,
    epoch: u64,
    result: &std::result::Result<crate::session::AuthToken, OperationError>,
) -> (bool, Vec<Action>) {
    if !state.login_pending || state.session.is_authenticated() || state.session.epoch() != epoch {
        tracing::debug!(response_epoch = epoch, "discarding stale login response");
        return (false, vec![]);
    }
    state.login_pending = false;

    match result {
        Ok(token) => {
            let epoch = state.session.start(token.clone());
            tracing::debug!(epoch = epoch, expires_at = %token.expires_at, "signed in");
            state.status.clear_error();
            let mut actions = vec![Action::PersistSession(state.session.to_stored())];
            if state.cache.needs_load(Utc::now(), state.stale_after) {
                actions.push(issue_load(state));
            }
            (true, actions)
        }
        Err(error) => {
            state.status.fail(error.clone());
            (true, vec![])
        }
    }
}
