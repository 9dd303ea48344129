//! The menu state machine.
//!
//! `MenuSystem` is the one place holding shared state: the instance arena,
//! the target registry, every bound listener, pending timers, the scroll lock
//! and the logical clock. It is created once per document and dropped with
//! it; nothing in the crate keeps global state of its own.
//!
//! Menus reference each other by `MenuId` only. A parent records its single
//! open child in `opened_child`; a child records its parent for root lookups.
//! Closing always walks down to the open leaf first, so a parent never
//! outlives the DOM or listeners of its children.

mod instance;
mod lifecycle;
mod submenu;

pub use instance::LifecycleState;

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::event::{EventKind, EventOutcome, Key, MenuEvent, PointerButton};
use crate::geometry::Point;
use crate::host::{Host, NodeId};
use crate::item::MenuItem;
use crate::listeners::{Binding, EventTarget, Handler, ListenerTable};
use crate::options::{MenuConfig, MenuOptions};
use crate::registry::InstanceRegistry;
use crate::scroll_lock::ScrollLock;
use crate::timers::{Task, TimerKind, TimerQueue};

use instance::MenuInstance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuId(pub(crate) usize);

pub struct MenuSystem<H: Host> {
    host: H,
    menus: HashMap<MenuId, MenuInstance>,
    next_menu: usize,
    registry: InstanceRegistry,
    listeners: ListenerTable,
    timers: TimerQueue,
    scroll_lock: ScrollLock,
    now_ms: u64,
}

impl<H: Host> MenuSystem<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            menus: HashMap::new(),
            next_menu: 1,
            registry: InstanceRegistry::new(),
            listeners: ListenerTable::new(),
            timers: TimerQueue::new(),
            scroll_lock: ScrollLock::new(),
            now_ms: 0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Attach a root menu to `target`. A target carries at most one menu:
    /// attaching again returns the menu that is already there and ignores
    /// the new items and config.
    pub fn attach(&mut self, target: NodeId, items: Vec<MenuItem>, config: MenuConfig) -> MenuId {
        if let Some(existing) = self.registry.get(target) {
            tracing::debug!(?target, menu = ?existing, "target already has a menu");
            return existing;
        }
        let id = self.alloc_id();
        let options = MenuOptions::resolve(&config);
        let mut instance = MenuInstance::new(target, items.into(), options, None, 0);
        instance.invoke_listeners.install(
            &mut self.listeners,
            [Binding::new(
                EventTarget::Node(target),
                EventKind::ContextMenu,
                id,
                Handler::Invoke,
            )],
        );
        self.menus.insert(id, instance);
        self.registry.set(target, id);
        tracing::debug!(?target, menu = ?id, "menu attached");
        id
    }

    /// Close and forget the menu attached to `target`.
    pub fn detach(&mut self, target: NodeId) -> Result<bool> {
        let Some(id) = self.registry.remove(target) else {
            return Ok(false);
        };
        let closed = self.close(id);
        if let Some(mut instance) = self.menus.remove(&id) {
            instance.invoke_listeners.remove_all(&mut self.listeners);
        }
        if self.registry.is_empty() && self.scroll_lock.is_locked() {
            tracing::warn!(
                holders = self.scroll_lock.holders(),
                "scroll lock still held after last menu detached, resetting"
            );
            self.scroll_lock.reset(&mut self.host);
        }
        tracing::debug!(?target, menu = ?id, "menu detached");
        closed.map(|_| true)
    }

    pub fn menu_for(&self, target: NodeId) -> Option<MenuId> {
        self.registry.get(target)
    }

    /// Open a root menu at a viewport-relative point, as if invoked there.
    /// Returns `false` when it was already open or is disabled.
    pub fn open_at(&mut self, menu: MenuId, point: Point) -> Result<bool> {
        let instance = self.instance(menu)?;
        if !instance.is_root() || instance.is_open() || instance.options.disabled.is_disabled() {
            return Ok(false);
        }
        self.open_root(menu, point)?;
        Ok(true)
    }

    /// Close `menu` and everything opened from it. Closing a closed (or
    /// already destroyed) menu does nothing.
    pub fn close(&mut self, menu: MenuId) -> Result<()> {
        match self.menus.get(&menu) {
            Some(instance) if instance.is_open() => self.teardown(menu, true),
            _ => Ok(()),
        }
    }

    pub fn close_all(&mut self) -> Result<()> {
        let mut roots: Vec<MenuId> = self
            .menus
            .iter()
            .filter(|(_, m)| m.is_root() && m.is_open())
            .map(|(id, _)| *id)
            .collect();
        roots.sort();
        let mut first_err = None;
        for root in roots {
            if let Err(err) = self.close(root) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Deliver an event. Bindings run innermost target first, then outward
    /// through the ancestors, then document-level bindings, stopping early
    /// once a handler stops propagation. Enter/leave reach only the target.
    pub fn dispatch(&mut self, event: &MenuEvent) -> Result<EventOutcome> {
        let mut outcome = EventOutcome::default();
        let mut path: Vec<EventTarget> = if event.kind.bubbles() {
            self.host
                .propagation_path(event.target)
                .into_iter()
                .map(EventTarget::Node)
                .collect()
        } else {
            vec![EventTarget::Node(event.target)]
        };
        if event.kind.bubbles() {
            path.push(EventTarget::Document);
        }
        for current in path {
            for listener in self.listeners.matching(current, event.kind) {
                // An earlier handler may have closed this binding's owner.
                let Some(binding) = self.listeners.get(listener).copied() else {
                    continue;
                };
                outcome.handled = true;
                self.run_handler(binding, event, &mut outcome)?;
            }
            if outcome.propagation_stopped {
                break;
            }
        }
        Ok(outcome)
    }

    fn run_handler(
        &mut self,
        binding: Binding,
        event: &MenuEvent,
        outcome: &mut EventOutcome,
    ) -> Result<()> {
        let owner = binding.owner;
        match binding.handler {
            Handler::Invoke => self.handle_invoke(owner, event, outcome),
            Handler::ActivateItem { index } => self.handle_activate(owner, index, outcome),
            Handler::ContainPointerDown => {
                outcome.propagation_stopped = true;
                Ok(())
            }
            Handler::OpenerEnter { index } => self.opener_enter(owner, index),
            Handler::OpenerLeave { index } => {
                self.opener_leave(owner, index);
                Ok(())
            }
            Handler::OpenerActivate { index } => {
                outcome.propagation_stopped = true;
                self.opener_activate(owner, index)
            }
            Handler::DismissOnPointerDown => {
                let root = self.root_of(owner)?;
                let root_instance = self.instance(root)?;
                if event.button == PointerButton::Secondary
                    && root_instance.options.no_recreate
                    && root_instance.overlay.is_some()
                {
                    return Ok(());
                }
                if self.inside_open_tree(owner, event.target) {
                    return Ok(());
                }
                tracing::debug!(menu = ?owner, target = ?event.target, "outside pointer-down");
                self.close(owner)
            }
            Handler::DismissOnOverlayContextMenu => {
                // Alt with default_on_alt: close and let the native menu through.
                let (native, reopen) = {
                    let options = &self.instance(owner)?.options;
                    let native = event.modifiers.alt && options.default_on_alt;
                    (
                        native,
                        !native && options.no_recreate && !options.disabled.is_disabled(),
                    )
                };
                if !native {
                    outcome.default_prevented = true;
                }
                if self.inside_open_tree(owner, event.target) {
                    return Ok(());
                }
                if native {
                    tracing::trace!(menu = ?owner, "alt held, closing for the native menu");
                }
                self.close(owner)?;
                if reopen {
                    tracing::debug!(menu = ?owner, "reopening from overlay");
                    self.open_root(owner, event.position)?;
                }
                Ok(())
            }
            Handler::DismissOnEscape => {
                if event.key == Some(Key::Escape) {
                    tracing::debug!(menu = ?owner, "escape");
                    self.close(owner)?;
                }
                Ok(())
            }
        }
    }

    fn handle_invoke(
        &mut self,
        menu: MenuId,
        event: &MenuEvent,
        outcome: &mut EventOutcome,
    ) -> Result<()> {
        let instance = self.instance(menu)?;
        if event.modifiers.alt && instance.options.default_on_alt {
            tracing::trace!(menu = ?menu, "alt held, leaving native menu alone");
            return Ok(());
        }
        outcome.default_prevented = true;
        outcome.propagation_stopped = true;
        if instance.options.disabled.is_disabled() {
            tracing::debug!(menu = ?menu, "menu disabled");
            return Ok(());
        }
        if instance.is_open() {
            self.close(menu)?;
        }
        self.open_root(menu, event.position)
    }

    fn handle_activate(
        &mut self,
        menu: MenuId,
        index: usize,
        outcome: &mut EventOutcome,
    ) -> Result<()> {
        let instance = self.instance(menu)?;
        if self.now_ms.saturating_sub(instance.opened_at_ms) < crate::constants::ACTIVATION_GRACE_MS
        {
            tracing::trace!(menu = ?menu, index, "activation inside grace window");
            return Ok(());
        }
        let Some(MenuItem::Action { label, action }) = instance.items.get(index) else {
            return Ok(());
        };
        let (label, action) = (label.clone(), action.clone());
        outcome.propagation_stopped = true;
        let root = self.root_of(menu)?;
        self.close(root)?;
        tracing::debug!(menu = ?menu, %label, "item activated");
        action();
        Ok(())
    }

    /// Whether `target` lies inside `menu`'s container or the container of
    /// any menu opened below it.
    fn inside_open_tree(&self, menu: MenuId, target: NodeId) -> bool {
        let mut cursor = Some(menu);
        while let Some(id) = cursor {
            let Some(instance) = self.menus.get(&id) else {
                break;
            };
            if let Some(container) = instance.container
                && self.host.contains(container, target)
            {
                return true;
            }
            cursor = instance.opened_child;
        }
        false
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Move the clock forward, running every timer that falls due on the way
    /// in order. Times in the past are ignored.
    pub fn advance_to(&mut self, now_ms: u64) -> Result<()> {
        if now_ms < self.now_ms {
            return Ok(());
        }
        while let Some(task) = self.timers.pop_due(now_ms) {
            self.now_ms = self.now_ms.max(task.due_ms);
            self.run_timer(task)?;
        }
        self.now_ms = now_ms;
        Ok(())
    }

    pub fn advance_by(&mut self, delta_ms: u64) -> Result<()> {
        self.advance_to(self.now_ms.saturating_add(delta_ms))
    }

    pub fn next_timer_due(&self) -> Option<u64> {
        self.timers.next_due()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    fn run_timer(&mut self, task: Task) -> Result<()> {
        let Some(instance) = self.menus.get_mut(&task.owner) else {
            return Ok(());
        };
        if !instance.is_open() {
            return Ok(());
        }
        tracing::trace!(timer = ?task.id, menu = ?task.owner, kind = ?task.kind, "timer fired");
        match task.kind {
            TimerKind::OpenSubmenu { index } => {
                if let Some(timers) = instance.openers.get_mut(&index) {
                    timers.open = None;
                }
                self.open_submenu(task.owner, index).map(|_| ())
            }
            TimerKind::CloseSubmenu { index } => {
                if let Some(timers) = instance.openers.get_mut(&index) {
                    timers.close = None;
                }
                match self.child_for_opener(task.owner, index) {
                    Some(child) => self.close(child),
                    None => Ok(()),
                }
            }
        }
    }

    pub fn state(&self, menu: MenuId) -> Option<LifecycleState> {
        self.menus.get(&menu).map(|m| m.state)
    }

    pub fn is_open(&self, menu: MenuId) -> bool {
        self.menus.get(&menu).is_some_and(|m| m.is_open())
    }

    pub fn opened_child(&self, menu: MenuId) -> Option<MenuId> {
        self.menus.get(&menu).and_then(|m| m.opened_child)
    }

    pub fn parent_of(&self, menu: MenuId) -> Option<MenuId> {
        self.menus.get(&menu).and_then(|m| m.parent)
    }

    pub fn depth(&self, menu: MenuId) -> Option<usize> {
        self.menus.get(&menu).map(|m| m.depth)
    }

    pub fn root_of(&self, menu: MenuId) -> Result<MenuId> {
        let mut current = menu;
        loop {
            match self.instance(current)?.parent {
                Some(parent) => current = parent,
                None => return Ok(current),
            }
        }
    }

    pub fn container(&self, menu: MenuId) -> Option<NodeId> {
        self.menus.get(&menu).and_then(|m| m.container)
    }

    pub fn overlay(&self, menu: MenuId) -> Option<NodeId> {
        self.menus.get(&menu).and_then(|m| m.overlay)
    }

    pub fn item_node(&self, menu: MenuId, index: usize) -> Option<NodeId> {
        self.menus
            .get(&menu)
            .and_then(|m| m.item_nodes.get(index).copied())
    }

    /// The menu and item index an item node belongs to.
    pub fn item_at(&self, node: NodeId) -> Option<(MenuId, usize)> {
        self.menus
            .iter()
            .find_map(|(id, m)| m.item_index_of(node).map(|index| (*id, index)))
    }

    /// Every open menu, roots and sub-menus, in creation order.
    pub fn open_menus(&self) -> Vec<MenuId> {
        let mut ids: Vec<MenuId> = self
            .menus
            .iter()
            .filter(|(_, m)| m.is_open())
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Close-detection bindings currently installed for `menu`.
    pub fn close_listener_count(&self, menu: MenuId) -> usize {
        self.menus
            .get(&menu)
            .map_or(0, |m| m.close_listeners.len())
    }

    /// All bindings owned by `menu`, invocation binding included.
    pub fn listeners_owned_by(&self, menu: MenuId) -> usize {
        self.listeners.owned_by(menu)
    }

    pub fn bound_listeners(&self) -> usize {
        self.listeners.len()
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_lock.is_locked()
    }

    fn alloc_id(&mut self) -> MenuId {
        let id = MenuId(self.next_menu);
        self.next_menu += 1;
        id
    }

    fn instance(&self, menu: MenuId) -> Result<&MenuInstance> {
        self.menus.get(&menu).ok_or(Error::UnknownMenu(menu))
    }
}
