//! Header component renderer.

use super::centered;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::HeaderInfo;

/// Renders the bold, centered title followed by the theme name, dimmed.
pub fn render_header(frame: &mut String, header: &HeaderInfo, theme: &Theme, cols: usize) {
    let suffix = format!("[{}]", header.theme_name);
    let title_cols = cols.saturating_sub(suffix.len());

    frame.push_str(Theme::bold());
    frame.push_str(&Theme::fg(&theme.colors.header_fg));
    frame.push_str(&centered(&header.title, title_cols));
    frame.push_str(Theme::reset());
    frame.push_str(Theme::dim());
    frame.push_str(&suffix);
    frame.push_str(Theme::reset());
    frame.push('\n');
}
