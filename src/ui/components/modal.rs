//! Confirmation dialog component renderer.

use super::clip;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::ModalView;

/// Renders the dialog as a boxed block below the grid.
///
/// ```text
/// ┌ Delete user ─────────────────────────┐
/// │ Are you sure you want to delete ...  │
/// │ y to delete, n to cancel             │
/// └──────────────────────────────────────┘
/// ```
pub fn render_modal(frame: &mut String, modal: &ModalView, theme: &Theme, cols: usize) {
    let inner = cols.saturating_sub(4).max(10);
    let border = Theme::fg(&theme.colors.accent);

    let title = clip(&modal.title, inner);
    let rule = inner.saturating_sub(title.chars().count());
    frame.push_str(&border);
    frame.push_str("┌ ");
    frame.push_str(Theme::bold());
    frame.push_str(&title);
    frame.push_str(Theme::reset());
    frame.push_str(&border);
    frame.push(' ');
    frame.push_str(&"─".repeat(rule));
    frame.push('┐');
    frame.push_str(Theme::reset());
    frame.push('\n');

    for line in &modal.lines {
        push_row(frame, line, &border, inner);
    }

    let prompt = if modal.pending { "Working..." } else { modal.prompt.as_str() };
    push_row(frame, prompt, &border, inner);

    frame.push_str(&border);
    frame.push('└');
    frame.push_str(&"─".repeat(inner + 2));
    frame.push('┘');
    frame.push_str(Theme::reset());
    frame.push('\n');
}

fn push_row(frame: &mut String, text: &str, border: &str, inner: usize) {
    let text = clip(text, inner);
    let padding = inner.saturating_sub(text.chars().count());
    frame.push_str(border);
    frame.push_str("│ ");
    frame.push_str(Theme::reset());
    frame.push_str(&text);
    frame.push_str(&" ".repeat(padding));
    frame.push_str(border);
    frame.push_str(" │");
    frame.push_str(Theme::reset());
    frame.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_dialog_hides_prompt() {
        let modal = ModalView {
            title: "Delete user".into(),
            lines: vec!["Are you sure?".into()],
            prompt: "y to delete, n to cancel".into(),
            pending: true,
        };
        let mut frame = String::new();
        render_modal(&mut frame, &modal, &Theme::default(), 40);

        assert_eq!(frame.lines().count(), 4);
        assert!(frame.contains("Delete user"));
        assert!(frame.contains("Working..."));
        assert!(!frame.contains("y to delete"));
    }
}
