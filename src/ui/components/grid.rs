//! User grid component renderer.
//!
//! Each card is one row:
//!
//! ```text
//!  JD  John Doe            john@example.com          Active  1990-01-01
//! ```
//!
//! The selected row uses the selection colors. A locked status is drawn in
//! the warning color, and an in-flight mutation appends its label.

use super::clip;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::UserCard;

const INITIALS_WIDTH: usize = 4;
const STATUS_WIDTH: usize = 8;
const DATE_WIDTH: usize = 10;

pub fn render_grid(frame: &mut String, cards: &[UserCard], theme: &Theme, cols: usize) {
    for card in cards {
        render_card(frame, card, theme, cols);
    }
}

fn render_card(frame: &mut String, card: &UserCard, theme: &Theme, cols: usize) {
    let flexible = cols.saturating_sub(INITIALS_WIDTH + STATUS_WIDTH + DATE_WIDTH + 4);
    let name_width = flexible * 2 / 5;
    let email_width = flexible.saturating_sub(name_width);

    if card.is_selected {
        frame.push_str(&Theme::fg(&theme.colors.selection_fg));
        frame.push_str(&Theme::bg(&theme.colors.selection_bg));
    } else {
        frame.push_str(&Theme::fg(&theme.colors.text_normal));
    }

    frame.push_str(&format!(" {:<width$}", card.initials, width = INITIALS_WIDTH - 1));
    frame.push_str(&format!(" {:<width$}", clip(&card.name, name_width), width = name_width));
    frame.push_str(&format!(" {:<width$}", clip(&card.email, email_width), width = email_width));

    if card.is_locked && !card.is_selected {
        frame.push_str(&Theme::fg(&theme.colors.locked_fg));
    }
    frame.push_str(&format!(" {:<width$}", card.status_label, width = STATUS_WIDTH - 1));
    if card.is_locked && !card.is_selected {
        frame.push_str(&Theme::fg(&theme.colors.text_normal));
    }

    frame.push_str(&format!(" {:<width$}", card.date_of_birth, width = DATE_WIDTH));

    if let Some(pending) = card.pending {
        frame.push_str(Theme::dim());
        frame.push_str(&format!("  ({pending}...)"));
    }

    frame.push_str(Theme::reset());
    frame.push('\n');
}
