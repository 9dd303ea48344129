use std::collections::HashMap;
use std::rc::Rc;

use crate::host::NodeId;
use crate::item::MenuItem;
use crate::listeners::ListenerSet;
use crate::options::MenuOptions;
use crate::timers::TimerId;

use super::MenuId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Closed,
    Open,
}

/// Pending timers of one sub-menu opener item.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OpenerTimers {
    pub(crate) open: Option<TimerId>,
    pub(crate) close: Option<TimerId>,
}

#[derive(Debug)]
pub(crate) struct MenuInstance {
    /// Root: the attached surface. Sub-menu: the opener item in the parent.
    pub(crate) target: NodeId,
    pub(crate) items: Rc<[MenuItem]>,
    pub(crate) options: MenuOptions,
    /// Back reference for root lookup; the parent owns this menu, not the
    /// other way around.
    pub(crate) parent: Option<MenuId>,
    pub(crate) opened_child: Option<MenuId>,
    pub(crate) depth: usize,
    pub(crate) state: LifecycleState,
    pub(crate) opened_at_ms: u64,
    /// Root only, bound from attach until detach.
    pub(crate) invoke_listeners: ListenerSet,
    pub(crate) item_listeners: ListenerSet,
    pub(crate) close_listeners: ListenerSet,
    /// Root only. Sub-menus look the root's up instead.
    pub(crate) overlay: Option<NodeId>,
    pub(crate) container: Option<NodeId>,
    /// One node per item, dividers included.
    pub(crate) item_nodes: Vec<NodeId>,
    pub(crate) openers: HashMap<usize, OpenerTimers>,
    pub(crate) holds_scroll_lock: bool,
}

impl MenuInstance {
    pub(crate) fn new(
        target: NodeId,
        items: Rc<[MenuItem]>,
        options: MenuOptions,
        parent: Option<MenuId>,
        depth: usize,
    ) -> Self {
        Self {
            target,
            items,
            options,
            parent,
            opened_child: None,
            depth,
            state: LifecycleState::Closed,
            opened_at_ms: 0,
            invoke_listeners: ListenerSet::new(),
            item_listeners: ListenerSet::new(),
            close_listeners: ListenerSet::new(),
            overlay: None,
            container: None,
            item_nodes: Vec::new(),
            openers: HashMap::new(),
            holds_scroll_lock: false,
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.state == LifecycleState::Open
    }

    pub(crate) fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Index of the item whose node is `node`.
    pub(crate) fn item_index_of(&self, node: NodeId) -> Option<usize> {
        self.item_nodes.iter().position(|n| *n == node)
    }
}
