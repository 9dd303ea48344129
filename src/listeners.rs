//! Event bindings and the sets that own them.
//!
//! Handlers are data, not closures: a `Binding` names the menu that owns it
//! and what to do, and `MenuSystem` interprets it at dispatch time. That keeps
//! the table free of references back into the menus and makes "is this
//! handler still bound?" a cheap lookup.

use std::collections::BTreeMap;

use crate::event::EventKind;
use crate::host::NodeId;
use crate::menu::MenuId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// Reached by every bubbling event whose propagation was not stopped.
    Document,
    Node(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Root invocation on the attached surface.
    Invoke,
    /// Pointer-up on an action item.
    ActivateItem { index: usize },
    /// Pointer-down inside an item: keep it away from document-level bindings.
    ContainPointerDown,
    OpenerEnter { index: usize },
    OpenerLeave { index: usize },
    OpenerActivate { index: usize },
    DismissOnPointerDown,
    DismissOnOverlayContextMenu,
    DismissOnEscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub target: EventTarget,
    pub kind: EventKind,
    pub owner: MenuId,
    pub handler: Handler,
}

impl Binding {
    pub const fn new(target: EventTarget, kind: EventKind, owner: MenuId, handler: Handler) -> Self {
        Self {
            target,
            kind,
            owner,
            handler,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Every live binding, in installation order.
#[derive(Debug, Default)]
pub struct ListenerTable {
    bindings: BTreeMap<ListenerId, Binding>,
    next_id: u64,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, binding: Binding) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.bindings.insert(id, binding);
        id
    }

    pub fn unbind(&mut self, id: ListenerId) -> bool {
        self.bindings.remove(&id).is_some()
    }

    pub fn get(&self, id: ListenerId) -> Option<&Binding> {
        self.bindings.get(&id)
    }

    pub fn is_bound(&self, id: ListenerId) -> bool {
        self.bindings.contains_key(&id)
    }

    /// Bindings for `target`/`kind`, oldest first.
    pub fn matching(&self, target: EventTarget, kind: EventKind) -> Vec<ListenerId> {
        self.bindings
            .iter()
            .filter(|(_, b)| b.target == target && b.kind == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn owned_by(&self, owner: MenuId) -> usize {
        self.bindings.values().filter(|b| b.owner == owner).count()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Bindings installed together and removed together.
#[derive(Debug, Default)]
pub struct ListenerSet {
    ids: Vec<ListenerId>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install<I>(&mut self, table: &mut ListenerTable, bindings: I)
    where
        I: IntoIterator<Item = Binding>,
    {
        let before = self.ids.len();
        for binding in bindings {
            self.ids.push(table.bind(binding));
        }
        tracing::trace!(installed = self.ids.len() - before, total = table.len(), "listeners installed");
    }

    /// Unbind everything this set installed. Returns how many bindings were
    /// still live; a second call is a no-op returning zero.
    pub fn remove_all(&mut self, table: &mut ListenerTable) -> usize {
        let removed = self.ids.drain(..).filter(|id| table.unbind(*id)).count();
        if removed > 0 {
            tracing::trace!(removed, total = table.len(), "listeners removed");
        }
        removed
    }

    pub fn ids(&self) -> &[ListenerId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
