//! Opening and closing a single menu level.

use crate::constants::{ATTR_ACTIVE, ATTR_DIVIDER, ATTR_ITEM, ATTR_MENU, ATTR_STATE, ATTR_SUBMENU};
use crate::error::{Error, Result};
use crate::event::EventKind;
use crate::geometry::Point;
use crate::host::{ElementRole, Host, NodeId};
use crate::item::MenuItem;
use crate::listeners::{Binding, EventTarget, Handler};
use crate::overlay;
use crate::position::{Anchor, Placement, place};

use super::{LifecycleState, MenuId, MenuSystem};

impl<H: Host> MenuSystem<H> {
    /// Open a root menu at `point`: overlay and scroll lock first, then the
    /// item list. A failed open leaves nothing behind.
    pub(super) fn open_root(&mut self, menu: MenuId, point: Point) -> Result<()> {
        if let Err(err) = self.try_open_root(menu, point) {
            tracing::warn!(menu = ?menu, error = %err, "open failed, tearing down");
            let _ = self.teardown(menu, false);
            return Err(err);
        }
        Ok(())
    }

    fn try_open_root(&mut self, menu: MenuId, point: Point) -> Result<()> {
        let (wants_overlay, locks_scroll, id) = {
            let instance = self.instance(menu)?;
            (
                instance.options.overlay,
                instance.options.locks_scroll(),
                instance.options.id.clone(),
            )
        };
        let overlay = if wants_overlay {
            Some(overlay::create(&mut self.host, &id)?)
        } else {
            None
        };
        let instance = self.menus.get_mut(&menu).ok_or(Error::UnknownMenu(menu))?;
        instance.overlay = overlay;
        if locks_scroll {
            self.scroll_lock.acquire(&mut self.host);
            instance.holds_scroll_lock = true;
        }
        let parent = overlay.unwrap_or_else(|| self.host.body());
        tracing::debug!(menu = ?menu, x = point.x, y = point.y, overlay = overlay.is_some(), "opening menu");
        self.build_and_show(menu, Anchor::Point(point), parent)
    }

    /// Create the item list under `parent`, place it against `anchor`, show
    /// it and start listening for the events that close it.
    pub(super) fn build_and_show(
        &mut self,
        menu: MenuId,
        anchor: Anchor,
        parent: NodeId,
    ) -> Result<()> {
        let (items, id, transfer, is_root) = {
            let instance = self.instance(menu)?;
            (
                instance.items.clone(),
                instance.options.id.clone(),
                instance.options.transfer,
                instance.is_root(),
            )
        };

        let container = self.host.create_element(ElementRole::Container)?;
        self.set_container(menu, container)?;
        self.host.set_attribute(container, ATTR_MENU, &id)?;
        self.host.set_visible(container, false)?;

        let mut item_nodes = Vec::with_capacity(items.len());
        let mut bindings = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let node = match item {
                MenuItem::Divider => {
                    let node = self.host.create_element(ElementRole::Divider)?;
                    self.host.set_attribute(node, ATTR_DIVIDER, &id)?;
                    node
                }
                MenuItem::Action { label, .. } => {
                    let node = self.host.create_element(ElementRole::Item)?;
                    self.host.set_attribute(node, ATTR_ITEM, &id)?;
                    self.host.set_text(node, label)?;
                    bindings.push(Binding::new(
                        EventTarget::Node(node),
                        EventKind::PointerUp,
                        menu,
                        Handler::ActivateItem { index },
                    ));
                    bindings.push(Binding::new(
                        EventTarget::Node(node),
                        EventKind::PointerDown,
                        menu,
                        Handler::ContainPointerDown,
                    ));
                    node
                }
                MenuItem::Submenu { label, .. } => {
                    let node = self.host.create_element(ElementRole::Opener)?;
                    self.host.set_attribute(node, ATTR_ITEM, &id)?;
                    self.host.set_attribute(node, ATTR_SUBMENU, &id)?;
                    self.host.set_text(node, label)?;
                    bindings.extend([
                        Binding::new(
                            EventTarget::Node(node),
                            EventKind::PointerEnter,
                            menu,
                            Handler::OpenerEnter { index },
                        ),
                        Binding::new(
                            EventTarget::Node(node),
                            EventKind::PointerLeave,
                            menu,
                            Handler::OpenerLeave { index },
                        ),
                        Binding::new(
                            EventTarget::Node(node),
                            EventKind::PointerDown,
                            menu,
                            Handler::OpenerActivate { index },
                        ),
                    ]);
                    node
                }
            };
            self.host.append_child(container, node)?;
            item_nodes.push(node);
        }

        self.host.append_child(parent, container)?;
        let placement = Placement {
            anchor,
            menu: self.host.measure(container)?,
            viewport: self.host.viewport(),
            scroll: self.host.scroll_offset(),
            transfer,
        };
        let position = place(&placement);
        self.host.set_position(container, position)?;
        self.host.set_visible(container, true)?;

        let overlay = if is_root { self.instance(menu)?.overlay } else { None };
        if let Some(overlay) = overlay {
            overlay::reveal(&mut self.host, overlay)?;
        }
        self.host.set_attribute(container, ATTR_STATE, "open")?;

        let mut close_bindings = vec![
            Binding::new(
                EventTarget::Document,
                EventKind::PointerDown,
                menu,
                Handler::DismissOnPointerDown,
            ),
            Binding::new(
                EventTarget::Document,
                EventKind::KeyDown,
                menu,
                Handler::DismissOnEscape,
            ),
        ];
        if let Some(overlay) = overlay {
            close_bindings.push(Binding::new(
                EventTarget::Node(overlay),
                EventKind::ContextMenu,
                menu,
                Handler::DismissOnOverlayContextMenu,
            ));
        }

        let now_ms = self.now_ms;
        let instance = self.menus.get_mut(&menu).ok_or(Error::UnknownMenu(menu))?;
        instance.item_nodes = item_nodes;
        instance.item_listeners.install(&mut self.listeners, bindings);
        instance.close_listeners.install(&mut self.listeners, close_bindings);
        instance.state = LifecycleState::Open;
        instance.opened_at_ms = now_ms;
        let callbacks = instance.options.callbacks.clone();
        tracing::debug!(
            menu = ?menu,
            depth = instance.depth,
            x = position.x,
            y = position.y,
            listeners = instance.item_listeners.len() + instance.close_listeners.len(),
            "menu open"
        );
        callbacks.fire_open();
        Ok(())
    }

    fn set_container(&mut self, menu: MenuId, container: NodeId) -> Result<()> {
        let instance = self.menus.get_mut(&menu).ok_or(Error::UnknownMenu(menu))?;
        instance.container = Some(container);
        Ok(())
    }

    /// Close `menu` after its open child, undoing everything `open` did.
    ///
    /// Every step runs even if an earlier one failed; the first host error is
    /// returned once the menu is fully closed. Sub-menus are dropped from the
    /// arena here, roots stay until detached.
    pub(super) fn teardown(&mut self, menu: MenuId, notify: bool) -> Result<()> {
        let mut first_err: Option<Error> = None;

        if let Some(child) = self.menus.get(&menu).and_then(|m| m.opened_child)
            && let Err(err) = self.close(child)
        {
            first_err.get_or_insert(err);
        }

        let canceled = self.timers.cancel_owned_by(menu);
        let Some(instance) = self.menus.get_mut(&menu) else {
            return first_err.map_or(Ok(()), Err);
        };
        instance.openers.clear();
        instance.opened_child = None;
        let unbound = instance.item_listeners.remove_all(&mut self.listeners)
            + instance.close_listeners.remove_all(&mut self.listeners);

        let overlay = instance.overlay.take();
        let container = instance.container.take();
        instance.item_nodes.clear();
        // The overlay holds the root's container, so one removal covers both.
        let removed = match (overlay, container) {
            (Some(overlay), _) => overlay::destroy(&mut self.host, overlay),
            (None, Some(container)) => self.host.remove(container),
            (None, None) => Ok(()),
        };
        if let Err(err) = removed {
            first_err.get_or_insert(err.into());
        }

        if instance.holds_scroll_lock {
            instance.holds_scroll_lock = false;
            self.scroll_lock.release(&mut self.host);
        }

        let was_open = instance.state == LifecycleState::Open;
        instance.state = LifecycleState::Closed;
        let parent = instance.parent;
        let opener = instance.target;
        let callbacks = instance.options.callbacks.clone();
        tracing::debug!(
            menu = ?menu,
            canceled,
            unbound,
            remaining = self.listeners.len(),
            "menu closed"
        );
        if notify && was_open {
            callbacks.fire_close();
        }

        if let Some(parent) = parent {
            if let Some(parent_instance) = self.menus.get_mut(&parent)
                && parent_instance.opened_child == Some(menu)
            {
                parent_instance.opened_child = None;
            }
            if self.host.parent(opener).is_some()
                && let Err(err) = self.host.remove_attribute(opener, ATTR_ACTIVE)
            {
                first_err.get_or_insert(err.into());
            }
            self.menus.remove(&menu);
        }

        first_err.map_or(Ok(()), Err)
    }
}
