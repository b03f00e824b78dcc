//! Side effects requested by the event handler.
//!
//! The handler never performs I/O. It returns a `Vec<Action>` which the runtime
//! executes in order: remote requests are spawned as asynchronous tasks whose
//! responses come back as [`Event::Remote`](super::Event::Remote), notices are
//! shown to the user, and session snapshots are persisted.
//!
//! # Example
//!
//! ```rust
//! use usergrid::app::Action;
//! use usergrid::remote::RemoteRequest;
//!
//! let actions = vec![Action::Remote(RemoteRequest::list_users(1, 1, None))];
//! assert_eq!(actions.len(), 1);
//! ```

use crate::remote::RemoteRequest;
use crate::session::StoredSession;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A transient message for the user, e.g. `User Ann created successfully!`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Commands executed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send a request to the backend. The response re-enters the handler.
    Remote(RemoteRequest),

    /// Show a transient notice.
    Notify(Notice),

    /// Write the session snapshot (token and theme) to the session store.
    PersistSession(StoredSession),

    /// Forget the stored token and stop sending it. The theme choice stays.
    ClearSession,

    /// Exit the program.
    Quit,
}
