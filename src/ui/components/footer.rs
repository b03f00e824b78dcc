//! Footer component renderer.

use super::{centered, clip};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::FooterInfo;

/// Renders the keybinding hints centered and dimmed, clipped to the width.
pub fn render_footer(frame: &mut String, footer: &FooterInfo, theme: &Theme, cols: usize) {
    frame.push_str(&Theme::fg(&theme.colors.text_dim));
    frame.push_str(&centered(&clip(&footer.keybindings, cols), cols));
    frame.push_str(Theme::reset());
    frame.push('\n');
}
