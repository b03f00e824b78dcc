//! Usergrid: a terminal client for managing user accounts over a REST backend.
//!
//! The heart of the crate is the user-list synchronization controller: it
//! owns the authoritative local copy of the user collection, filters it by a
//! live search query, gates edits and deletes behind confirmation dialogs, and
//! writes to the local copy only after the server confirms an operation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Console runtime (main.rs)                          │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Controller (app/)                                  │
//! │  - Event handling, dialogs, mutation sequencing     │
//! │  - Entity cache, search projection, status channel  │
//! │  - View model computation                           │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ UI (ui/)      │   │ Session       │   │ Remote        │
//! │ - Rendering   │   │ (session/)    │   │ (remote/)     │
//! │ - Theming     │   │ - Token, epoch│   │ - HTTP client │
//! │ - Components  │   │ - JSON store  │   │ - Envelopes   │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (domain/) and platform paths (infrastructure/)│
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │
//! │  - tracing + OpenTelemetry, OTLP JSON file export   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! A TOML file, every key optional:
//!
//! ```toml
//! base_url = "http://localhost:5173"
//! timeout_ms = 5000
//! stale_after_secs = 300
//! trace_level = "debug"
//! data_dir = "~/.local/share/usergrid"
//! theme = "dark"
//! ```
//!
//! Each key can be overridden by an environment variable named after it,
//! e.g. `USERGRID_BASE_URL` or `USERGRID_TIMEOUT_MS`.
//!
//! # Example
//!
//! ```rust
//! use usergrid::session::MemorySessionStore;
//! use usergrid::{handle_event, initialize, Config, Event};
//!
//! let mut state = initialize(&Config::default(), &MemorySessionStore::default())?;
//! let (render, actions) = handle_event(&mut state, &Event::Mount)?;
//! assert!(render);
//! assert!(actions.is_empty()); // signed out: nothing to load yet
//! # Ok::<(), usergrid::UserGridError>(())
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod remote;
pub mod session;
pub mod ui;

pub mod observability;

pub use app::{handle_event, Action, AppState, Event};
pub use domain::{OperationError, Result, UserGridError};
pub use ui::Theme;

use chrono::Utc;
use serde::Deserialize;
use session::{SessionContext, SessionStore};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use ui::ThemeMode;

/// Prefix of the environment variables that override configuration keys.
pub const ENV_PREFIX: &str = "USERGRID_";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend origin; requests go to `{base_url}/api/...`.
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,

    /// Seconds a populated cache stays fresh. Unset keeps it for the whole
    /// session; `r` always reloads.
    pub stale_after_secs: Option<u64>,

    /// `EnvFilter` directive, e.g. `debug` or `usergrid=trace`. `RUST_LOG`
    /// takes precedence.
    pub trace_level: Option<String>,

    /// Where the session file and traces live. Defaults to the platform data
    /// directory.
    pub data_dir: Option<String>,

    /// `light` or `dark`. Used until the user toggles the theme.
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            timeout_ms: 5000,
            stale_after_secs: None,
            trace_level: None,
            data_dir: None,
            theme: "light".to_string(),
        }
    }
}

impl Config {
    /// Reads a TOML file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// # Errors
    ///
    /// Returns an error if `contents` is not valid TOML for this struct.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Builds a configuration from key/value pairs over the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use usergrid::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("base_url".to_string(), "https://api.example.com/".to_string());
    /// map.insert("timeout_ms".to_string(), "250".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.base_url, "https://api.example.com");
    /// assert_eq!(config.timeout_ms, 250);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let mut config = Self::default();
        config.apply_overrides(map);
        config
    }

    /// Overwrites fields named in `map`. Unparseable values are ignored.
    pub fn apply_overrides(&mut self, map: &BTreeMap<String, String>) {
        let non_empty = |key: &str| map.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        if let Some(base_url) = non_empty("base_url") {
            self.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(timeout) = non_empty("timeout_ms") {
            match timeout.parse() {
                Ok(ms) => self.timeout_ms = ms,
                Err(_) => tracing::debug!(value = %timeout, "ignoring invalid timeout_ms"),
            }
        }
        if let Some(stale) = non_empty("stale_after_secs") {
            match stale.parse() {
                Ok(secs) => self.stale_after_secs = Some(secs),
                Err(_) => tracing::debug!(value = %stale, "ignoring invalid stale_after_secs"),
            }
        }
        if let Some(level) = non_empty("trace_level") {
            self.trace_level = Some(level.to_string());
        }
        if let Some(dir) = non_empty("data_dir") {
            self.data_dir = Some(dir.to_string());
        }
        if let Some(theme) = non_empty("theme") {
            self.theme = theme.to_string();
        }
    }

    /// `USERGRID_*` variables from `vars`, keyed by lowercased suffix.
    #[must_use]
    pub fn env_overrides(vars: impl IntoIterator<Item = (String, String)>) -> BTreeMap<String, String> {
        vars.into_iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(ENV_PREFIX).map(|suffix| (suffix.to_ascii_lowercase(), value))
            })
            .collect()
    }

    /// The file at `path` (or the defaults), then the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(&Self::env_overrides(std::env::vars()));
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn stale_after(&self) -> Option<chrono::Duration> {
        self.stale_after_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .map(chrono::Duration::seconds)
    }

    /// The configured theme, or light if the name is unknown.
    #[must_use]
    pub fn theme_mode(&self) -> ThemeMode {
        ThemeMode::parse(&self.theme).unwrap_or_else(|| {
            tracing::debug!(theme = %self.theme, "unknown theme, using light");
            ThemeMode::Light
        })
    }
}

/// Builds the controller state from configuration and the stored session.
///
/// A stored, unexpired token resumes the session; the stored theme wins over
/// the configured one.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub fn initialize(config: &Config, store: &dyn SessionStore) -> Result<AppState> {
    tracing::debug!(base_url = %config.base_url, "initializing usergrid");

    let stored = store.load()?;
    let session = SessionContext::restore(stored, config.theme_mode(), Utc::now());
    tracing::debug!(signed_in = session.is_authenticated(), theme = %session.theme().name(), "session restored");

    Ok(AppState::new(session, config.stale_after()))
}
