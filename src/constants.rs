//! Shared crate-wide constants.

/// Default sub-menu open delay in milliseconds.
pub const DEFAULT_OPEN_DELAY_MS: u64 = 250;

/// Default sub-menu close delay in milliseconds.
pub const DEFAULT_CLOSE_DELAY_MS: u64 = 250;

/// Window after a menu opens during which pointer-up on an action item is
/// ignored.
///
/// A right-click opens the menu on button press; when the menu lands under
/// the pointer, the matching release would otherwise activate whatever item
/// happens to be there.
pub const ACTIVATION_GRACE_MS: u64 = 150;

/// Value used for the styling-hook attributes when no `id` is configured.
pub const DEFAULT_MENU_ID: &str = "ctxmenu";

/// Marker attribute on menu containers.
pub const ATTR_MENU: &str = "data-ctxmenu";
/// Marker attribute on action items.
pub const ATTR_ITEM: &str = "data-ctxmenu-item";
/// Marker attribute on dividers.
pub const ATTR_DIVIDER: &str = "data-ctxmenu-divider";
/// Marker attribute on sub-menu openers.
pub const ATTR_SUBMENU: &str = "data-ctxmenu-sub";
/// Marker attribute on the overlay layer.
pub const ATTR_OVERLAY: &str = "data-ctxmenu-overlay";
/// Animation hook, set to `"open"` once a container is placed and revealed.
pub const ATTR_STATE: &str = "data-ctxmenu-state";
/// Present on an opener while its sub-menu is open.
pub const ATTR_ACTIVE: &str = "data-ctxmenu-active";
