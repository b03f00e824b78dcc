//! Explicit session context.
//!
//! The session owns the bearer token and the display preferences for one signed-in
//! user. It is created when the user signs in and torn down on logout. Every
//! request issued by the controller is stamped with the session *epoch*; a
//! response is only applied while that epoch is still current, which is how
//! responses that arrive after logout are discarded.

use crate::ui::theme::ThemeMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bearer token issued by the login endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Email and password submitted to the login endpoint.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// What survives between runs: the token (if any) and the theme choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default)]
    pub token: Option<AuthToken>,
    /// `None` until the user has chosen one.
    #[serde(default)]
    pub theme: Option<ThemeMode>,
}

/// Session state passed into the controller at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    token: Option<AuthToken>,
    epoch: u64,
    theme: ThemeMode,
}

impl SessionContext {
    /// A signed-out context.
    #[must_use]
    pub const fn new(theme: ThemeMode) -> Self {
        Self { token: None, epoch: 0, theme }
    }

    /// Restores a persisted session, dropping an expired token. `fallback_theme`
    /// applies when no theme was stored.
    #[must_use]
    pub fn restore(stored: StoredSession, fallback_theme: ThemeMode, now: DateTime<Utc>) -> Self {
        let mut context = Self::new(stored.theme.unwrap_or(fallback_theme));
        if let Some(token) = stored.token {
            if token.is_expired(now) {
                tracing::debug!(expires_at = %token.expires_at, "discarding expired session token");
            } else {
                context.start(token);
            }
        }
        context
    }

    /// Begins a session and returns its epoch.
    pub fn start(&mut self, token: AuthToken) -> u64 {
        self.epoch += 1;
        self.token = Some(token);
        tracing::debug!(epoch = self.epoch, "session started");
        self.epoch
    }

    /// Ends the session. Requests stamped with the old epoch become stale.
    pub fn teardown(&mut self) {
        self.epoch += 1;
        self.token = None;
        tracing::debug!(epoch = self.epoch, "session torn down");
    }

    /// Liveness check for an asynchronous resumption point.
    #[must_use]
    pub fn is_live(&self, epoch: u64) -> bool {
        self.token.is_some() && self.epoch == epoch
    }

    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub const fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub const fn theme(&self) -> ThemeMode {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> ThemeMode {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Snapshot to persist.
    #[must_use]
    pub fn to_stored(&self) -> StoredSession {
        StoredSession { token: self.token.clone(), theme: Some(self.theme) }
    }
}
