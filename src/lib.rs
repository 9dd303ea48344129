//! Nested context menus: lifecycle, sub-menu coordination and viewport-aware
//! placement, driven through a small host capability trait.
//!
//! `MenuSystem` is the entry point. Attach a menu to a target node, feed it
//! the host's input events through `dispatch`, and advance its clock so
//! sub-menu hover delays can fire. `HeadlessDom` is an in-memory host; the
//! `terminal` module paints it with ratatui and turns crossterm input into
//! menu events.

pub mod constants;
pub mod dom;
pub mod drivers;
pub mod error;
pub mod event;
pub mod event_loop;
pub mod geometry;
pub mod host;
pub mod item;
pub mod listeners;
pub mod log_buffer;
pub mod menu;
pub mod options;
pub mod overlay;
pub mod position;
pub mod registry;
pub mod scroll_lock;
pub mod terminal;
pub mod theme;
pub mod timers;
pub mod tracing_sub;
pub mod ui;

pub use error::{Error, HostError, Result};
pub use event::{EventKind, EventOutcome, Key, MenuEvent, Modifiers, PointerButton};
pub use host::{ElementRole, Host, NodeId};
pub use item::MenuItem;
pub use menu::{LifecycleState, MenuId, MenuSystem};
pub use options::{Callbacks, Disabled, MenuConfig, MenuOptions};
