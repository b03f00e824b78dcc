//! Search bar component renderer.

use super::clip;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::SearchBarInfo;

/// Renders `Search: <query>` with a block cursor, or a dimmed placeholder
/// when the query is empty.
pub fn render_search_bar(frame: &mut String, search: &SearchBarInfo, theme: &Theme, cols: usize) {
    frame.push_str(&Theme::fg(&theme.colors.accent));
    frame.push_str(" Search: ");
    frame.push_str(Theme::reset());

    let room = cols.saturating_sub(10);
    if search.query.is_empty() {
        frame.push_str(Theme::dim());
        frame.push_str(&clip("Search by name...", room));
    } else {
        frame.push_str(&Theme::fg(&theme.colors.text_normal));
        frame.push_str(&clip(&search.query, room));
        frame.push('█');
    }
    frame.push_str(Theme::reset());
    frame.push('\n');
}
