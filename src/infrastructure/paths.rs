//! Filesystem locations for the session file and trace output.
//!
//! Everything lives under one data directory, `<data_local_dir>/usergrid` by
//! default (e.g. `~/.local/share/usergrid` on Linux), unless the configuration
//! names another one.

use crate::domain::error::{Result, UserGridError};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "usergrid";
const SESSION_FILE: &str = "session.json";
const TRACE_FILE: &str = "usergrid-otlp.json";

/// The platform data directory for this application.
///
/// # Errors
///
/// Returns an error if the platform has no local data directory.
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| UserGridError::Config("no local data directory on this platform".into()))
}

/// `configured` with `~` expanded, or the platform default.
///
/// # Errors
///
/// Returns an error if no directory is configured and the platform has none.
pub fn resolve_data_dir(configured: Option<&str>) -> Result<PathBuf> {
    match configured {
        Some(dir) if !dir.trim().is_empty() => Ok(expand_tilde(dir.trim())),
        _ => default_data_dir(),
    }
}

/// Expands a leading `~` to the home directory. Other paths are unchanged.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

#[must_use]
pub fn session_file(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE)
}

#[must_use]
pub fn trace_file(data_dir: &Path) -> PathBuf {
    data_dir.join(TRACE_FILE)
}
