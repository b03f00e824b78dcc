//! Light and dark color palettes and ANSI escape sequence generation.
//!
//! # Example
//!
//! ```rust
//! use usergrid::ui::theme::{Theme, ThemeMode};
//!
//! let theme = Theme::for_mode(ThemeMode::Dark);
//! println!("{}Bold Text{}", Theme::bold(), Theme::reset());
//! print!("{}", Theme::fg(&theme.colors.header_fg));
//! ```

use serde::{Deserialize, Serialize};

/// Which palette the session prefers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Parses `light` / `dark` (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Color scheme for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub mode: ThemeMode,
    pub colors: ThemeColors,
}

/// Hex colors (`#rrggbb`) for each UI element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeColors {
    pub header_fg: String,
    pub text_normal: String,
    pub text_dim: String,
    pub selection_fg: String,
    pub selection_bg: String,
    pub border: String,
    pub accent: String,
    pub error_fg: String,
    pub success_fg: String,
    pub locked_fg: String,
}

impl Theme {
    #[must_use]
    pub fn for_mode(mode: ThemeMode) -> Self {
        let colors = match mode {
            ThemeMode::Light => ThemeColors {
                header_fg: "#1f2937".into(),
                text_normal: "#111827".into(),
                text_dim: "#6b7280".into(),
                selection_fg: "#ffffff".into(),
                selection_bg: "#3251d0".into(),
                border: "#d1d5db".into(),
                accent: "#3251d0".into(),
                error_fg: "#dc2626".into(),
                success_fg: "#16a34a".into(),
                locked_fg: "#b45309".into(),
            },
            ThemeMode::Dark => ThemeColors {
                header_fg: "#f9fafb".into(),
                text_normal: "#e5e7eb".into(),
                text_dim: "#9ca3af".into(),
                selection_fg: "#ffffff".into(),
                selection_bg: "#2563eb".into(),
                border: "#374151".into(),
                accent: "#60a5fa".into(),
                error_fg: "#f87171".into(),
                success_fg: "#4ade80".into(),
                locked_fg: "#fbbf24".into(),
            },
        };
        Self { mode, colors }
    }

    /// Converts a hex color to an RGB tuple, falling back to white.
    fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
        let hex = hex.trim().trim_start_matches('#');

        if hex.len() != 6 || !hex.is_ascii() {
            return (255, 255, 255);
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).unwrap_or(255);
        (channel(0..2), channel(2..4), channel(4..6))
    }

    /// ANSI 24-bit foreground sequence for a hex color.
    #[must_use]
    pub fn fg(hex: &str) -> String {
        let (r, g, b) = Self::hex_to_rgb(hex);
        format!("\u{001b}[38;2;{r};{g};{b}m")
    }

    /// ANSI 24-bit background sequence for a hex color.
    #[must_use]
    pub fn bg(hex: &str) -> String {
        let (r, g, b) = Self::hex_to_rgb(hex);
        format!("\u{001b}[48;2;{r};{g};{b}m")
    }

    #[must_use]
    pub const fn bold() -> &'static str {
        "\u{001b}[1m"
    }

    #[must_use]
    pub const fn dim() -> &'static str {
        "\u{001b}[2m"
    }

    #[must_use]
    pub const fn reset() -> &'static str {
        "\u{001b}[0m"
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::for_mode(ThemeMode::default())
    }
}
