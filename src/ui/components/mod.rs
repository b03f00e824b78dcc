//! Composable UI component renderers.
//!
//! Each component appends complete lines (ending in `\n`) to a frame buffer.
//!
//! # Components
//!
//! - [`header`]: title bar with the active theme
//! - [`search`]: search input line
//! - [`banner`]: last error with its status code
//! - [`grid`]: one row per user card
//! - [`empty`]: `No users found.` / `Loading users...` / sign-in prompt
//! - [`modal`]: the open edit or delete dialog
//! - [`footer`]: keybinding hints

mod banner;
mod empty;
mod footer;
mod grid;
mod header;
mod modal;
mod search;

pub use banner::render_error_banner;
pub use empty::render_empty_state;
pub use footer::render_footer;
pub use grid::render_grid;
pub use header::render_header;
pub use modal::render_modal;
pub use search::render_search_bar;

use crate::ui::theme::Theme;

/// Renders a horizontal rule across the frame.
pub fn render_border(frame: &mut String, theme: &Theme, cols: usize) {
    frame.push_str(&Theme::fg(&theme.colors.border));
    frame.push_str(&"─".repeat(cols));
    frame.push_str(Theme::reset());
    frame.push('\n');
}

/// Pads `text` with spaces on both sides so it sits centered in `cols`.
fn centered(text: &str, cols: usize) -> String {
    let len = text.chars().count();
    let padding = cols.saturating_sub(len) / 2;
    format!(
        "{}{text}{}",
        " ".repeat(padding),
        " ".repeat(cols.saturating_sub(padding + len))
    )
}

/// Cuts `text` to at most `cols` characters.
fn clip(text: &str, cols: usize) -> String {
    text.chars().take(cols).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_pads_to_width() {
        assert_eq!(centered("ab", 6), "  ab  ");
        assert_eq!(centered("abc", 6), " abc  ");
        assert_eq!(centered("toolong", 3), "toolong");
    }

    #[test]
    fn clip_counts_chars() {
        assert_eq!(clip("Émile", 2), "Ém");
    }
}
