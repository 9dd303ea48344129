//! Target surface → root menu mapping.

use std::collections::HashMap;

use crate::host::NodeId;
use crate::menu::MenuId;

#[derive(Debug, Default)]
pub struct InstanceRegistry {
    by_target: HashMap<NodeId, MenuId>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, target: NodeId) -> Option<MenuId> {
        self.by_target.get(&target).copied()
    }

    /// Register `menu` for `target` unless the target already has one, in
    /// which case the existing menu is returned.
    pub fn set(&mut self, target: NodeId, menu: MenuId) -> MenuId {
        *self.by_target.entry(target).or_insert(menu)
    }

    pub fn remove(&mut self, target: NodeId) -> Option<MenuId> {
        self.by_target.remove(&target)
    }

    pub fn len(&self) -> usize {
        self.by_target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_set_keeps_first_menu() {
        let mut registry = InstanceRegistry::new();
        assert_eq!(registry.set(NodeId(4), MenuId(1)), MenuId(1));
        assert_eq!(registry.set(NodeId(4), MenuId(2)), MenuId(1));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.remove(NodeId(4)), Some(MenuId(1)));
        assert!(registry.is_empty());
    }
}
