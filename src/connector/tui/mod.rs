//! Interactive front-ends: a full-screen ratatui UI and a plain line mode.

mod line_view;
mod terminal_ui;

pub use line_view::*;
pub use terminal_ui::*;
