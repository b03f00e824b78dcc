//! Session lifecycle: the explicit context handed to the controller and its
//! persistence between runs.
//!
//! - [`context`]: [`SessionContext`] with start/teardown and epoch-based liveness
//! - [`store`]: [`SessionStore`] backends for the token and theme choice

pub mod context;
pub mod store;

pub use context::{AuthToken, Credentials, SessionContext, StoredSession};
pub use store::{JsonSessionStore, MemorySessionStore, SessionStore};
