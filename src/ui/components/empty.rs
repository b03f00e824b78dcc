//! Empty state component renderer.

use super::centered;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::EmptyState;

/// Renders the message centered, then the subtitle dimmed if there is one.
///
/// ```text
/// [blank line]
///             No users found.
///        Type / to clear the search
/// [blank line]
/// ```
pub fn render_empty_state(frame: &mut String, empty: &EmptyState, theme: &Theme, cols: usize) {
    frame.push('\n');
    frame.push_str(&Theme::fg(&theme.colors.text_normal));
    frame.push_str(&centered(&empty.message, cols));
    frame.push_str(Theme::reset());
    frame.push('\n');

    if !empty.subtitle.is_empty() {
        frame.push_str(Theme::dim());
        frame.push_str(&Theme::fg(&theme.colors.text_dim));
        frame.push_str(&centered(&empty.subtitle, cols));
        frame.push_str(Theme::reset());
        frame.push('\n');
    }
    frame.push('\n');
}
