//! Sub-menu coordination: hover timers, immediate activation and the
//! one-open-child-per-parent rule.

use crate::constants::ATTR_ACTIVE;
use crate::error::{Error, Result};
use crate::host::Host;
use crate::item::MenuItem;
use crate::options::MenuOptions;
use crate::position::Anchor;
use crate::timers::TimerKind;

use super::instance::MenuInstance;
use super::{MenuId, MenuSystem};

impl<H: Host> MenuSystem<H> {
    /// Open the sub-menu behind item `index` of `parent` right away. Any other
    /// open child of `parent` is closed first. Returns the sub-menu, or
    /// `None` if `parent` is closed, the item is not a sub-menu opener or the
    /// sub-menu is disabled.
    pub fn open_submenu(&mut self, parent: MenuId, index: usize) -> Result<Option<MenuId>> {
        let parent_instance = self.instance(parent)?;
        if !parent_instance.is_open() {
            return Ok(None);
        }
        let Some(spec) = parent_instance
            .items
            .get(index)
            .and_then(MenuItem::submenu_spec)
            .cloned()
        else {
            return Ok(None);
        };
        let Some(opener) = parent_instance.item_nodes.get(index).copied() else {
            return Ok(None);
        };
        let depth = parent_instance.depth + 1;
        let options = MenuOptions::resolve_nested(&parent_instance.options, &spec.config);
        if options.disabled.is_disabled() {
            tracing::debug!(parent = ?parent, index, "sub-menu disabled");
            return Ok(None);
        }

        if let Some(child) = parent_instance.opened_child {
            if self.child_for_opener(parent, index) == Some(child) {
                return Ok(Some(child));
            }
            self.close_sibling(parent, child)?;
        }

        let root = self.root_of(parent)?;
        let host_parent = self
            .instance(root)?
            .overlay
            .unwrap_or_else(|| self.host.body());
        let anchor = Anchor::Item(self.host.bounds(opener)?);

        let id = self.alloc_id();
        self.menus.insert(
            id,
            MenuInstance::new(opener, spec.items, options, Some(parent), depth),
        );
        self.menus
            .get_mut(&parent)
            .ok_or(Error::UnknownMenu(parent))?
            .opened_child = Some(id);
        tracing::debug!(menu = ?id, parent = ?parent, index, depth, "opening sub-menu");

        let shown = self
            .build_and_show(id, anchor, host_parent)
            .and_then(|()| {
                self.host
                    .set_attribute(opener, ATTR_ACTIVE, &id.0.to_string())
                    .map_err(Error::from)
            });
        if let Err(err) = shown {
            tracing::warn!(menu = ?id, error = %err, "sub-menu open failed, tearing down");
            let _ = self.teardown(id, false);
            return Err(err);
        }
        Ok(Some(id))
    }

    /// Pointer entered opener `index` of `menu`.
    pub(super) fn opener_enter(&mut self, menu: MenuId, index: usize) -> Result<()> {
        let Some(options) = self.opener_options(menu, index) else {
            return Ok(());
        };
        let delay = options.delay;
        let now_ms = self.now_ms;
        let instance = self.menus.get_mut(&menu).ok_or(Error::UnknownMenu(menu))?;
        let timers = instance.openers.entry(index).or_default();
        if let Some(pending) = timers.close.take() {
            self.timers.cancel(pending);
        }

        let open_child = instance.opened_child;
        if let Some(child) = open_child {
            if self.child_for_opener(menu, index) == Some(child) {
                return Ok(());
            }
            self.schedule_sibling_close(menu, child)?;
        }

        let instance = self.menus.get_mut(&menu).ok_or(Error::UnknownMenu(menu))?;
        let timers = instance.openers.entry(index).or_default();
        if let Some(pending) = timers.open.take() {
            self.timers.cancel(pending);
        }
        if options.disabled.is_disabled() {
            return Ok(());
        }
        if delay.open_ms == 0 {
            return self.open_submenu(menu, index).map(|_| ());
        }
        timers.open = Some(self.timers.schedule(
            now_ms.saturating_add(delay.open_ms),
            menu,
            TimerKind::OpenSubmenu { index },
        ));
        Ok(())
    }

    /// Pointer left opener `index`: drop a pending open, keep an open child.
    pub(super) fn opener_leave(&mut self, menu: MenuId, index: usize) {
        if let Some(instance) = self.menus.get_mut(&menu)
            && let Some(timers) = instance.openers.get_mut(&index)
            && let Some(pending) = timers.open.take()
        {
            self.timers.cancel(pending);
        }
    }

    /// Pointer-down on opener `index`: skip the delay and open now.
    pub(super) fn opener_activate(&mut self, menu: MenuId, index: usize) -> Result<()> {
        if let Some(instance) = self.menus.get_mut(&menu)
            && let Some(timers) = instance.openers.get_mut(&index)
        {
            for pending in [timers.open.take(), timers.close.take()].into_iter().flatten() {
                self.timers.cancel(pending);
            }
        }
        self.open_submenu(menu, index).map(|_| ())
    }

    /// The open child of `menu`, if it was opened from item `index`.
    pub(super) fn child_for_opener(&self, menu: MenuId, index: usize) -> Option<MenuId> {
        let instance = self.menus.get(&menu)?;
        let opener = instance.item_nodes.get(index).copied()?;
        let child = instance.opened_child?;
        (self.menus.get(&child)?.target == opener).then_some(child)
    }

    /// Resolved options of the sub-menu behind opener `index` of an open
    /// `menu`, as it would be opened now.
    fn opener_options(&self, menu: MenuId, index: usize) -> Option<MenuOptions> {
        let instance = self.menus.get(&menu)?;
        if !instance.is_open() {
            return None;
        }
        let spec = instance.items.get(index)?.submenu_spec()?;
        Some(MenuOptions::resolve_nested(&instance.options, &spec.config))
    }

    /// Index of the opener `child` was opened from.
    fn opener_index_of(&self, parent: MenuId, child: MenuId) -> Option<usize> {
        let target = self.menus.get(&child)?.target;
        self.menus.get(&parent)?.item_index_of(target)
    }

    /// Start the close timer for a sibling that is about to be replaced.
    fn schedule_sibling_close(&mut self, parent: MenuId, child: MenuId) -> Result<()> {
        let Some(sibling) = self.opener_index_of(parent, child) else {
            return self.close(child);
        };
        let close_ms = self
            .opener_options(parent, sibling)
            .map_or(0, |options| options.delay.close_ms);
        if close_ms == 0 {
            return self.close_sibling(parent, child);
        }
        let due_ms = self.now_ms.saturating_add(close_ms);
        let instance = self.menus.get_mut(&parent).ok_or(Error::UnknownMenu(parent))?;
        let timers = instance.openers.entry(sibling).or_default();
        if timers.close.is_some() {
            return Ok(());
        }
        timers.close = Some(self.timers.schedule(
            due_ms,
            parent,
            TimerKind::CloseSubmenu { index: sibling },
        ));
        Ok(())
    }

    /// Close `child` now, dropping any close timer still pending for it.
    fn close_sibling(&mut self, parent: MenuId, child: MenuId) -> Result<()> {
        if let Some(sibling) = self.opener_index_of(parent, child)
            && let Some(instance) = self.menus.get_mut(&parent)
            && let Some(timers) = instance.openers.get_mut(&sibling)
            && let Some(pending) = timers.close.take()
        {
            self.timers.cancel(pending);
        }
        tracing::trace!(parent = ?parent, menu = ?child, "closing sibling sub-menu");
        self.close(child)
    }
}
