//! Confirmation dialog state machine.
//!
//! At most one workflow is open at a time:
//!
//! ```text
//!            open_edit(id)               confirm ok
//! Closed ─────────────────▶ EditOpen ──────────────▶ Closed
//!   │ ▲                      │    ▲ confirm failed
//!   │ └──────── cancel ──────┘    └─(stays open)
//!   │
//!   └── open_delete(id) ──▶ DeleteOpen  (same transitions)
//! ```
//!
//! Opening a dialog for an id that is not cached is ignored. Opening one
//! dialog while another is open replaces it.

use super::cache::EntityCache;
use crate::domain::UserRecord;

/// Which workflow a dialog belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalKind {
    Edit,
    Delete,
}

/// Dialog state. `target` is a snapshot taken when the dialog opened and does
/// not follow later cache changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    Closed,
    EditOpen { target: UserRecord },
    DeleteOpen { target: UserRecord },
}

impl ModalState {
    /// Opens the edit dialog for `id`. Returns `false` if `id` is not cached.
    pub fn open_edit(&mut self, cache: &EntityCache, id: &str) -> bool {
        self.open(cache, id, ModalKind::Edit)
    }

    /// Opens the delete dialog for `id`. Returns `false` if `id` is not cached.
    pub fn open_delete(&mut self, cache: &EntityCache, id: &str) -> bool {
        self.open(cache, id, ModalKind::Delete)
    }

    fn open(&mut self, cache: &EntityCache, id: &str, kind: ModalKind) -> bool {
        let Some(record) = cache.get(id) else {
            tracing::debug!(user_id = %id, kind = ?kind, "ignoring open for unknown record");
            return false;
        };

        if let Some(previous) = self.kind() {
            tracing::debug!(previous = ?previous, next = ?kind, "replacing open dialog");
        }

        let target = record.clone();
        *self = match kind {
            ModalKind::Edit => Self::EditOpen { target },
            ModalKind::Delete => Self::DeleteOpen { target },
        };
        true
    }

    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    #[must_use]
    pub const fn kind(&self) -> Option<ModalKind> {
        match self {
            Self::Closed => None,
            Self::EditOpen { .. } => Some(ModalKind::Edit),
            Self::DeleteOpen { .. } => Some(ModalKind::Delete),
        }
    }

    #[must_use]
    pub const fn target(&self) -> Option<&UserRecord> {
        match self {
            Self::Closed => None,
            Self::EditOpen { target } | Self::DeleteOpen { target } => Some(target),
        }
    }

    /// Whether the dialog still shows `kind` for `id`.
    #[must_use]
    pub fn matches(&self, kind: ModalKind, id: &str) -> bool {
        self.kind() == Some(kind) && self.target().is_some_and(|t| t.id == id)
    }
}
