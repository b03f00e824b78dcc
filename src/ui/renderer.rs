//! Top-level rendering coordinator.
//!
//! Rendering is two steps: compute the [`UIViewModel`] from state, then hand
//! it to the components, which append ANSI-styled lines to a frame buffer.
//! The caller decides where the frame goes (the console runtime clears the
//! screen and prints it).
//!
//! # Example
//!
//! ```rust
//! use usergrid::app::AppState;
//! use usergrid::session::SessionContext;
//! use usergrid::ui::render;
//! use usergrid::ui::theme::ThemeMode;
//!
//! let state = AppState::new(SessionContext::new(ThemeMode::Light), None);
//! let frame = render(&state, 24, 80);
//! assert!(frame.contains("Sign in"));
//! ```

use crate::app::AppState;
use crate::ui::components;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::UIViewModel;

/// Renders `state` into a frame `cols` wide and roughly `rows` tall.
#[must_use]
pub fn render(state: &AppState, rows: usize, cols: usize) -> String {
    let viewmodel = state.compute_viewmodel(rows, cols);
    render_viewmodel(&viewmodel, &state.theme(), cols)
}

/// Lays out a view model: header, search bar, error banner, then either the
/// grid or the empty state, the dialog if one is open, and the footer.
#[must_use]
pub fn render_viewmodel(vm: &UIViewModel, theme: &Theme, cols: usize) -> String {
    let mut frame = String::new();

    components::render_header(&mut frame, &vm.header, theme, cols);
    components::render_border(&mut frame, theme, cols);

    if let Some(search) = &vm.search_bar {
        components::render_search_bar(&mut frame, search, theme, cols);
    }
    if let Some(banner) = &vm.error_banner {
        components::render_error_banner(&mut frame, banner, theme, cols);
    }

    match &vm.empty_state {
        Some(empty) => components::render_empty_state(&mut frame, empty, theme, cols),
        None => components::render_grid(&mut frame, &vm.cards, theme, cols),
    }

    if let Some(modal) = &vm.modal {
        components::render_modal(&mut frame, modal, theme, cols);
    }

    components::render_border(&mut frame, theme, cols);
    components::render_footer(&mut frame, &vm.footer, theme, cols);
    frame
}
