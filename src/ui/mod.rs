//! Terminal rendering of the user grid.
//!
//! ```text
//! AppState → compute_viewmodel → UIViewModel → render → ANSI frame
//! ```
//!
//! # Modules
//!
//! - [`viewmodel`]: display-ready view types
//! - [`renderer`]: lays components out into a frame
//! - [`components`]: the individual component renderers
//! - [`theme`]: light/dark palettes and ANSI escape generation

pub mod components;
pub mod renderer;
pub mod theme;
pub mod viewmodel;

pub use renderer::{render, render_viewmodel};
pub use theme::{Theme, ThemeMode};
pub use viewmodel::{
    EmptyState, ErrorBanner, FooterInfo, HeaderInfo, ModalView, SearchBarInfo, UIViewModel, UserCard,
};
