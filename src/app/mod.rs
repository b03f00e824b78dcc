//! The user-list synchronization controller.
//!
//! This layer sits between the console runtime (main.rs) and the domain and
//! remote layers. It owns the authoritative copy of the user collection and
//! decides when local state changes relative to server responses.
//!
//! # Architecture
//!
//! ```text
//! User Input → Events → handle_event → State Mutations → Actions → Side Effects
//!                           ↑                                  ↓
//!                           └────── Remote Responses ──────────┘
//! ```
//!
//! The cache is written only after the server confirms an operation. Dialogs
//! gate updates and deletes; the mutation coordinator sequences their
//! responses; the status channel carries the last error and the loading flag.
//!
//! # Modules
//!
//! - [`actions`]: side effects returned by the handler
//! - [`cache`]: the entity cache
//! - [`handler`]: event processing
//! - [`modal`]: the edit/delete dialog state machine
//! - [`mutation`]: sequencing and write-through of mutations
//! - [`projection`]: search filtering
//! - [`state`]: the state container and view model computation
//! - [`status`]: last error and loading flag

pub mod actions;
pub mod cache;
pub mod handler;
pub mod modal;
pub mod mutation;
pub mod projection;
pub mod state;
pub mod status;

pub use actions::{Action, Notice, NoticeLevel};
pub use cache::EntityCache;
pub use handler::{handle_event, Event};
pub use modal::{ModalKind, ModalState};
pub use mutation::{Completion, MutationCoordinator, MutationKind, PendingMutation};
pub use state::AppState;
pub use status::StatusChannel;
