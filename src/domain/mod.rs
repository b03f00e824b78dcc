//! Domain layer for the user grid.
//!
//! Core types independent of transport, rendering, or runtime concerns.
//!
//! # Organization
//!
//! - [`error`]: Infrastructure errors and the normalized [`OperationError`]
//! - [`user`]: The [`UserRecord`] model, create/update payloads and validation
//!
//! # Examples
//!
//! ```
//! use usergrid::domain::{OperationError, FailureKind};
//!
//! let err = OperationError::from_status(404, Some("User not found".into()));
//! assert_eq!(err.kind, FailureKind::NotFound);
//! ```

pub mod error;
pub mod user;

pub use error::{FailureKind, OperationError, Result, UserGridError};
pub use user::{FieldError, NewUser, UserPatch, UserRecord, UserStatus};
