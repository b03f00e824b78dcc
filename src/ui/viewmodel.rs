//! View model types representing renderable UI state.
//!
//! View models are computed by [`AppState::compute_viewmodel`] and consumed by
//! the renderer. They hold display-ready strings and flags and no logic.
//!
//! [`AppState::compute_viewmodel`]: crate::app::AppState::compute_viewmodel

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UIViewModel {
    pub header: HeaderInfo,

    /// Present once signed in.
    pub search_bar: Option<SearchBarInfo>,

    /// The last operation error, shown above the grid.
    pub error_banner: Option<ErrorBanner>,

    /// The visible window of the projection.
    pub cards: Vec<UserCard>,

    /// Index of the selected card within `cards`.
    pub selected_index: usize,

    /// Replaces the grid when there is nothing to list.
    pub empty_state: Option<EmptyState>,

    pub modal: Option<ModalView>,

    pub footer: FooterInfo,
}

/// One user in the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCard {
    pub id: String,
    pub initials: String,
    pub name: String,
    pub email: String,
    /// `Active` or `Locked`.
    pub status_label: String,
    pub is_locked: bool,
    /// `YYYY-MM-DD`.
    pub date_of_birth: String,
    pub is_selected: bool,
    /// Short label while a mutation on this record is in flight.
    pub pending: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub title: String,
    pub theme_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBarInfo {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub message: String,
    /// `Status Code: {code}`.
    pub status_line: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    /// `No users found.` or `Loading users...`.
    pub message: String,
    pub subtitle: String,
}

/// The open confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    pub title: String,
    pub lines: Vec<String>,
    pub prompt: String,
    /// A confirm for this dialog is awaiting its response.
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterInfo {
    pub keybindings: String,
}
