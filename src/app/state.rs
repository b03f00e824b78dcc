//! Controller state and view model computation.
//!
//! [`AppState`] owns everything the user-list controller knows about one
//! signed-in session: the entity cache, the search query and its projection,
//! the selection, the open dialog, in-flight mutations, in-flight loads and the
//! status channel. It is mutated only by [`handle_event`](super::handle_event).
//!
//! # Derived State
//!
//! `filtered_ids` is the projection of the cache through the search query. It
//! is recomputed by [`AppState::apply_search_filter`] after every cache or query
//! change and is never edited directly.
//!
//! # Example
//!
//! ```rust
//! use usergrid::app::AppState;
//! use usergrid::session::SessionContext;
//! use usergrid::ui::theme::ThemeMode;
//!
//! let mut state = AppState::new(SessionContext::new(ThemeMode::Light), None);
//! state.apply_search_filter();
//! let viewmodel = state.compute_viewmodel(24, 80);
//! assert!(viewmodel.cards.is_empty());
//! ```

use super::cache::EntityCache;
use super::modal::{ModalKind, ModalState};
use super::mutation::{MutationCoordinator, MutationKind};
use super::projection::project;
use super::status::StatusChannel;
use crate::domain::UserRecord;
use crate::session::SessionContext;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{
    EmptyState, ErrorBanner, FooterInfo, HeaderInfo, ModalView, SearchBarInfo, UIViewModel, UserCard,
};
use chrono::{Duration, Utc};

/// Rows used by the header, search bar, borders and footer.
const CHROME_ROWS: usize = 7;

/// Controller state for one process.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Token, epoch and theme. Replaced at sign-in, torn down at logout.
    pub session: SessionContext,

    pub cache: EntityCache,

    /// Live search text, used as typed.
    pub search_query: String,

    /// Ids of the cached records matching `search_query`, in cache order.
    pub filtered_ids: Vec<String>,

    /// Zero-based index into `filtered_ids`. Wraps during navigation.
    pub selected_index: usize,

    pub modal: ModalState,

    pub mutations: MutationCoordinator,

    pub status: StatusChannel,

    /// How long a populated cache stays fresh. `None` keeps it for the session.
    pub stale_after: Option<Duration>,

    /// True while a login request is in flight.
    pub login_pending: bool,

    load_generation: u64,
    pending_load: Option<u64>,
}

impl AppState {
    #[must_use]
    pub fn new(session: SessionContext, stale_after: Option<Duration>) -> Self {
        Self {
            session,
            cache: EntityCache::new(),
            search_query: String::new(),
            filtered_ids: vec![],
            selected_index: 0,
            modal: ModalState::Closed,
            mutations: MutationCoordinator::new(),
            status: StatusChannel::default(),
            stale_after,
            login_pending: false,
            load_generation: 0,
            pending_load: None,
        }
    }

    /// Registers a new load and returns its generation.
    ///
    /// Any earlier load still in flight is superseded. The loading indicator is
    /// raised only when there is nothing to show yet.
    pub fn begin_load(&mut self) -> u64 {
        self.load_generation += 1;
        self.pending_load = Some(self.load_generation);
        self.mutations.track_applied();
        self.status.set_loading(self.cache.is_empty());
        self.load_generation
    }

    /// Consumes the pending load if `generation` is the newest one issued.
    pub fn finish_load(&mut self, generation: u64) -> bool {
        if self.pending_load != Some(generation) {
            tracing::debug!(
                generation = generation,
                pending = ?self.pending_load,
                "dropping response from superseded load"
            );
            return false;
        }
        self.pending_load = None;
        self.status.set_loading(false);
        true
    }

    /// Replaces the cache with a finished load and replays the changes
    /// confirmed while it was in flight, so the payload cannot undo them.
    pub fn apply_loaded(&mut self, records: Vec<UserRecord>) {
        self.cache.replace(records, Utc::now());
        self.mutations.replay_applied(&mut self.cache);
        self.status.clear_error();
        self.apply_search_filter();
    }

    #[must_use]
    pub const fn is_load_pending(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Drops every piece of per-session state. The session itself is torn
    /// down by the caller.
    pub fn reset_session_state(&mut self) {
        self.cache.clear();
        self.search_query.clear();
        self.filtered_ids.clear();
        self.selected_index = 0;
        self.modal.close();
        self.mutations.reset();
        self.status.reset();
        self.pending_load = None;
        self.login_pending = false;
    }

    pub fn move_selection_down(&mut self) {
        if self.filtered_ids.is_empty() {
            return;
        }
        self.selected_index = (self.selected_index + 1) % self.filtered_ids.len();
    }

    pub fn move_selection_up(&mut self) {
        if self.filtered_ids.is_empty() {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = self.filtered_ids.len() - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// The highlighted record, if the projection is non-empty.
    #[must_use]
    pub fn selected_user(&self) -> Option<&UserRecord> {
        self.filtered_ids
            .get(self.selected_index)
            .and_then(|id| self.cache.get(id))
    }

    /// The current projection, resolved against the cache.
    #[must_use]
    pub fn visible_users(&self) -> Vec<&UserRecord> {
        self.filtered_ids.iter().filter_map(|id| self.cache.get(id)).collect()
    }

    /// Recomputes the projection and clamps the selection to it.
    pub fn apply_search_filter(&mut self) {
        let _span = tracing::debug_span!(
            "apply_search_filter",
            total_users = self.cache.len(),
            query_len = self.search_query.len()
        )
        .entered();

        self.filtered_ids = project(self.cache.records(), &self.search_query)
            .into_iter()
            .map(|record| record.id.clone())
            .collect();

        if self.filtered_ids.is_empty() {
            self.selected_index = 0;
        } else {
            self.selected_index = self.selected_index.min(self.filtered_ids.len() - 1);
        }

        tracing::debug!(filtered_count = self.filtered_ids.len(), "search filter applied");
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        Theme::for_mode(self.session.theme())
    }

    /// Builds the renderable view of the current state.
    ///
    /// Only as many cards as fit in `rows` are produced, in a window kept
    /// around the selected row.
    #[must_use]
    pub fn compute_viewmodel(&self, rows: usize, cols: usize) -> UIViewModel {
        let visible = self.visible_users();
        let available_rows = rows.saturating_sub(CHROME_ROWS).max(1);

        let mut window_start = self.selected_index.saturating_sub(available_rows / 2);
        let window_end = (window_start + available_rows).min(visible.len());
        if window_end - window_start < available_rows && visible.len() >= available_rows {
            window_start = window_end.saturating_sub(available_rows);
        }

        let cards = visible[window_start..window_end]
            .iter()
            .enumerate()
            .map(|(offset, user)| self.compute_card(user, window_start + offset, cols))
            .collect();

        UIViewModel {
            header: self.compute_header(visible.len()),
            search_bar: self.session.is_authenticated().then(|| SearchBarInfo {
                query: self.search_query.clone(),
            }),
            error_banner: self.status.error().map(|error| ErrorBanner {
                message: error.message.clone(),
                status_line: format!("Status Code: {}", error.status_code),
            }),
            cards,
            selected_index: self.selected_index.saturating_sub(window_start),
            empty_state: self.compute_empty_state(visible.is_empty()),
            modal: self.compute_modal(),
            footer: self.compute_footer(),
        }
    }

    fn compute_card(&self, user: &UserRecord, absolute_index: usize, cols: usize) -> UserCard {
        const FIXED_COLUMNS: usize = 40;

        let name_width = cols.saturating_sub(FIXED_COLUMNS).max(12);
        let pending = self.mutations.pending_for(&user.id).map(|kind| match kind {
            MutationKind::Create => "creating",
            MutationKind::Update => "saving",
            MutationKind::Delete => "deleting",
        });

        UserCard {
            id: user.id.clone(),
            initials: user.initials(),
            name: truncate(&user.display_name(), name_width),
            email: user.email.clone(),
            status_label: user.status.label().to_string(),
            is_locked: user.status == crate::domain::UserStatus::Locked,
            date_of_birth: user.date_of_birth.format("%Y-%m-%d").to_string(),
            is_selected: absolute_index == self.selected_index,
            pending,
        }
    }

    fn compute_header(&self, shown: usize) -> HeaderInfo {
        let title = if self.session.is_authenticated() {
            format!(" Users ({shown}/{}) ", self.cache.len())
        } else {
            " Users ".to_string()
        };
        HeaderInfo { title, theme_name: self.session.theme().name().to_string() }
    }

    fn compute_empty_state(&self, nothing_visible: bool) -> Option<EmptyState> {
        if !self.session.is_authenticated() {
            let subtitle = if self.login_pending {
                "Signing in..."
            } else {
                "Type: login <email> <password>"
            };
            return Some(EmptyState { message: "Sign in to manage users.".into(), subtitle: subtitle.into() });
        }

        if self.status.is_loading() {
            return Some(EmptyState { message: "Loading users...".into(), subtitle: String::new() });
        }

        nothing_visible.then(|| EmptyState {
            message: "No users found.".into(),
            subtitle: if self.search_query.is_empty() {
                "Press r to reload".into()
            } else {
                "Type / to clear the search".into()
            },
        })
    }

    fn compute_modal(&self) -> Option<ModalView> {
        let kind = self.modal.kind()?;
        let target = self.modal.target()?;
        let pending = match kind {
            ModalKind::Edit => self.mutations.is_pending(MutationKind::Update, &target.id),
            ModalKind::Delete => self.mutations.is_pending(MutationKind::Delete, &target.id),
        };

        let view = match kind {
            ModalKind::Edit => ModalView {
                title: format!("Edit {}", target.display_name()),
                lines: vec![
                    format!("first={}", target.first_name),
                    format!("last={}", target.last_name.as_deref().unwrap_or_default()),
                    format!("email={}", target.email),
                    format!("status={}", target.status.label()),
                    format!("dob={}", target.date_of_birth.format("%Y-%m-%d")),
                ],
                prompt: "set field=value ... to save, n to cancel".into(),
                pending,
            },
            ModalKind::Delete => ModalView {
                title: "Delete user".into(),
                lines: vec![format!(
                    "Are you sure you want to delete {}? This action cannot be undone.",
                    target.display_name()
                )],
                prompt: "y to delete, n to cancel".into(),
                pending,
            },
        };
        Some(view)
    }

    fn compute_footer(&self) -> FooterInfo {
        let keybindings = if !self.session.is_authenticated() {
            "login <email> <password>  t: theme  q: quit"
        } else if self.modal.is_open() {
            "y: confirm  n: cancel  set field=value: edit fields"
        } else {
            "/text: search  j/k: move  e: edit  d: delete  new: create  r: reload  t: theme  logout  q: quit"
        };
        FooterInfo { keybindings: keybindings.to_string() }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}
