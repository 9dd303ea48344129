//! Terminal frontend: paints the headless tree with ratatui and feeds
//! crossterm input back into the menu engine.

mod input;
mod render;

pub use input::PointerTracker;
pub use render::{render_dom, to_rect};
