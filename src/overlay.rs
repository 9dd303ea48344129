//! Full-viewport capture layer owned by a root menu.

use crate::constants::ATTR_OVERLAY;
use crate::error::HostError;
use crate::host::{ElementRole, Host, NodeId};

/// Create the overlay under the body, hidden until the menu is placed.
pub fn create<H: Host + ?Sized>(host: &mut H, menu_id: &str) -> Result<NodeId, HostError> {
    let overlay = host.create_element(ElementRole::Overlay)?;
    host.set_attribute(overlay, ATTR_OVERLAY, menu_id)?;
    host.set_visible(overlay, false)?;
    let body = host.body();
    host.append_child(body, overlay)?;
    tracing::trace!(node = ?overlay, "overlay created");
    Ok(overlay)
}

pub fn reveal<H: Host + ?Sized>(host: &mut H, overlay: NodeId) -> Result<(), HostError> {
    host.set_visible(overlay, true)
}

/// Removing the overlay takes every menu container hosted inside it along.
pub fn destroy<H: Host + ?Sized>(host: &mut H, overlay: NodeId) -> Result<(), HostError> {
    tracing::trace!(node = ?overlay, "overlay destroyed");
    host.remove(overlay)
}
