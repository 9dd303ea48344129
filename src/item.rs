//! Menu item descriptors.

use std::fmt;
use std::rc::Rc;

use crate::options::MenuConfig;

pub type Action = Rc<dyn Fn()>;

/// Items and configuration of a nested menu, instantiated on demand.
#[derive(Clone, Debug)]
pub struct SubmenuSpec {
    pub items: Rc<[MenuItem]>,
    pub config: MenuConfig,
}

#[derive(Clone)]
pub enum MenuItem {
    Divider,
    Action { label: String, action: Action },
    Submenu { label: String, submenu: SubmenuSpec },
}

impl MenuItem {
    pub fn divider() -> Self {
        MenuItem::Divider
    }

    pub fn action<F: Fn() + 'static>(label: impl Into<String>, action: F) -> Self {
        MenuItem::Action {
            label: label.into(),
            action: Rc::new(action),
        }
    }

    pub fn submenu(label: impl Into<String>, items: Vec<MenuItem>, config: MenuConfig) -> Self {
        MenuItem::Submenu {
            label: label.into(),
            submenu: SubmenuSpec {
                items: items.into(),
                config,
            },
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            MenuItem::Divider => None,
            MenuItem::Action { label, .. } | MenuItem::Submenu { label, .. } => Some(label),
        }
    }

    pub fn is_divider(&self) -> bool {
        matches!(self, MenuItem::Divider)
    }

    pub fn submenu_spec(&self) -> Option<&SubmenuSpec> {
        match self {
            MenuItem::Submenu { submenu, .. } => Some(submenu),
            _ => None,
        }
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::Divider => f.write_str("Divider"),
            MenuItem::Action { label, .. } => f.debug_tuple("Action").field(label).finish(),
            MenuItem::Submenu { label, submenu } => f
                .debug_struct("Submenu")
                .field("label", label)
                .field("items", &submenu.items.len())
                .finish(),
        }
    }
}
