//! Persistence for the session token and theme choice.
//!
//! The [`SessionStore`] trait abstracts where a [`StoredSession`] lives between
//! runs. [`JsonSessionStore`] keeps it in a small JSON file written atomically
//! (write to a temporary file, then rename) so a crash never leaves a
//! half-written token behind. [`MemorySessionStore`] is the in-process variant.

use super::context::StoredSession;
use crate::domain::error::{Result, UserGridError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

/// Abstraction over session persistence backends.
pub trait SessionStore: Send {
    /// Returns the stored session, or the default (signed out) when none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if existing data cannot be read or parsed.
    fn load(&self) -> Result<StoredSession>;

    /// Replaces the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be written.
    fn save(&self, session: &StoredSession) -> Result<()>;

    /// Forgets the token, keeping the theme choice.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored session cannot be read or rewritten.
    fn clear(&self) -> Result<()> {
        let session = StoredSession { token: None, ..self.load()? };
        self.save(&session)
    }
}

/// On-disk container.
#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    #[serde(flatten)]
    session: StoredSession,
}

/// JSON file session store.
///
/// # File Format
///
/// ```json
/// {
///   "version": 1,
///   "token": { "access_token": "...", "expires_at": "2025-01-01T00:00:00Z" },
///   "theme": "dark"
/// }
/// ```
#[derive(Debug)]
pub struct JsonSessionStore {
    file_path: PathBuf,
}

impl JsonSessionStore {
    /// Creates a store at `file_path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing session store");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Ok(Self { file_path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl SessionStore for JsonSessionStore {
    fn load(&self) -> Result<StoredSession> {
        if !self.file_path.exists() {
            tracing::debug!("no stored session");
            return Ok(StoredSession::default());
        }

        let contents = std::fs::read_to_string(&self.file_path)?;
        let file: SessionFile = serde_json::from_str(&contents)
            .map_err(|e| UserGridError::Session(format!("failed to parse session file: {e}")))?;

        if file.version != FORMAT_VERSION {
            return Err(UserGridError::Session(format!(
                "unsupported session file version {}",
                file.version
            )));
        }

        tracing::debug!(has_token = file.session.token.is_some(), "loaded stored session");
        Ok(file.session)
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        let file = SessionFile { version: FORMAT_VERSION, session: session.clone() };
        let json = serde_json::to_string_pretty(&file)?;

        let tmp_path = self.file_path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        tracing::debug!(path = ?self.file_path, has_token = session.token.is_some(), "session saved");
        Ok(())
    }
}

/// Keeps the session in memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<StoredSession>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<StoredSession> {
        self.session
            .lock()
            .map(|s| s.clone())
            .map_err(|e| UserGridError::Session(format!("session lock poisoned: {e}")))
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| UserGridError::Session(format!("session lock poisoned: {e}")))?;
        *guard = session.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AuthToken;
    use crate::ui::theme::ThemeMode;
    use chrono::{Duration, Utc};

    fn sample() -> StoredSession {
        StoredSession {
            token: Some(AuthToken {
                access_token: "token-123".into(),
                expires_at: Utc::now() + Duration::days(1),
            }),
            theme: Some(ThemeMode::Dark),
        }
    }

    #[test]
    fn missing_file_is_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path().join("nested/session.json")).unwrap();
        assert_eq!(store.load().unwrap(), StoredSession::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = JsonSessionStore::new(path.clone()).unwrap();

        let session = sample();
        store.save(&session).unwrap();
        assert!(!path.with_extension("tmp").exists());

        let reopened = JsonSessionStore::new(path).unwrap();
        assert_eq!(reopened.load().unwrap(), session);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonSessionStore::new(path).unwrap();
        assert!(matches!(store.load(), Err(UserGridError::Session(_))));
    }

    #[test]
    fn memory_store_replaces_contents() {
        let store = MemorySessionStore::default();
        store.save(&sample()).unwrap();
        store.save(&StoredSession::default()).unwrap();
        assert!(store.load().unwrap().token.is_none());
    }

    #[test]
    fn clear_keeps_theme() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path().join("session.json")).unwrap();
        store.save(&sample()).unwrap();

        store.clear().unwrap();
        let session = store.load().unwrap();
        assert!(session.token.is_none());
        assert_eq!(session.theme, Some(ThemeMode::Dark));
    }
}
