//! Input events as the engine sees them.
//!
//! Hosts translate their native events (DOM events, terminal mouse reports)
//! into `MenuEvent`s and hand them to `MenuSystem::dispatch`.

use crate::geometry::Point;
use crate::host::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ContextMenu,
    PointerDown,
    PointerUp,
    PointerEnter,
    PointerLeave,
    KeyDown,
}

impl EventKind {
    /// Enter/leave are delivered to the target only.
    pub const fn bubbles(self) -> bool {
        !matches!(self, EventKind::PointerEnter | EventKind::PointerLeave)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PointerButton {
    #[default]
    Primary,
    Auxiliary,
    Secondary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        alt: false,
        ctrl: false,
        shift: false,
    };

    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ctrl: false,
        shift: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEvent {
    pub kind: EventKind,
    pub target: NodeId,
    /// Viewport-relative pointer position; ignored for key events.
    pub position: Point,
    pub button: PointerButton,
    pub modifiers: Modifiers,
    pub key: Option<Key>,
}

impl MenuEvent {
    fn pointer(kind: EventKind, target: NodeId, position: Point, button: PointerButton) -> Self {
        Self {
            kind,
            target,
            position,
            button,
            modifiers: Modifiers::NONE,
            key: None,
        }
    }

    pub fn context_menu(target: NodeId, position: Point) -> Self {
        Self::pointer(
            EventKind::ContextMenu,
            target,
            position,
            PointerButton::Secondary,
        )
    }

    pub fn pointer_down(target: NodeId, position: Point, button: PointerButton) -> Self {
        Self::pointer(EventKind::PointerDown, target, position, button)
    }

    pub fn pointer_up(target: NodeId, position: Point, button: PointerButton) -> Self {
        Self::pointer(EventKind::PointerUp, target, position, button)
    }

    pub fn pointer_enter(target: NodeId, position: Point) -> Self {
        Self::pointer(
            EventKind::PointerEnter,
            target,
            position,
            PointerButton::Primary,
        )
    }

    pub fn pointer_leave(target: NodeId, position: Point) -> Self {
        Self::pointer(
            EventKind::PointerLeave,
            target,
            position,
            PointerButton::Primary,
        )
    }

    pub fn key_down(target: NodeId, key: Key) -> Self {
        Self {
            kind: EventKind::KeyDown,
            target,
            position: Point::default(),
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
            key: Some(key),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// What the engine did with an event, so the host can mirror it onto the
/// native event (e.g. `preventDefault`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
    /// At least one bound handler ran.
    pub handled: bool,
}
