//! Platform utilities.
//!
//! - [`paths`]: data directory resolution and the files kept inside it

pub mod paths;

pub use paths::{default_data_dir, expand_tilde, resolve_data_dir, session_file, trace_file};
