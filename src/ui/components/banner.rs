//! Error banner component renderer.

use super::clip;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::ErrorBanner;

/// Renders the error message and its `Status Code: N` line in the error color.
pub fn render_error_banner(frame: &mut String, banner: &ErrorBanner, theme: &Theme, cols: usize) {
    let color = Theme::fg(&theme.colors.error_fg);
    for line in [&banner.message, &banner.status_line] {
        frame.push_str(&color);
        frame.push(' ');
        frame.push_str(&clip(line, cols.saturating_sub(1)));
        frame.push_str(Theme::reset());
        frame.push('\n');
    }
}
