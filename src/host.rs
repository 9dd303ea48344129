//! Capability interface between the menu engine and whatever draws it.
//!
//! The engine never touches a concrete node tree. Everything it needs, from
//! creating item nodes to reading the scroll offset, goes through `Host`. A
//! browser binding would forward these calls to the DOM; `HeadlessDom` in
//! `crate::dom` keeps an in-memory tree that the terminal frontend paints.
//!
//! Coordinates follow the DOM convention:
//! - `bounds` is viewport-relative (what `getBoundingClientRect` reports),
//! - `set_position` takes document coordinates (viewport + scroll offset).

use crate::error::HostError;
use crate::geometry::{Bounds, Point, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Role of a node, which decides how hosts lay it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRole {
    /// The document body. Hosts create exactly one.
    Document,
    /// An application surface menus can be attached to.
    Surface,
    /// Full-viewport capture layer.
    Overlay,
    /// The list holding a menu's items.
    Container,
    Item,
    Divider,
    /// An item that opens a sub-menu.
    Opener,
}

pub trait Host {
    fn body(&self) -> NodeId;

    fn create_element(&mut self, role: ElementRole) -> Result<NodeId, HostError>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), HostError>;

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), HostError>;

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), HostError>;

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError>;

    /// Detach `node` and its subtree from the document.
    fn remove(&mut self, node: NodeId) -> Result<(), HostError>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Rendered size of `node`, valid once it is attached (even if hidden).
    fn measure(&self, node: NodeId) -> Result<Size, HostError>;

    /// Viewport-relative rectangle of an attached node.
    fn bounds(&self, node: NodeId) -> Result<Bounds, HostError>;

    /// Move a positioned node (containers) to a document coordinate.
    fn set_position(&mut self, node: NodeId, position: Point) -> Result<(), HostError>;

    fn set_visible(&mut self, node: NodeId, visible: bool) -> Result<(), HostError>;

    fn viewport(&self) -> Size;

    fn scroll_offset(&self) -> Point;

    fn scrolling_enabled(&self) -> bool;

    fn set_scrolling_enabled(&mut self, enabled: bool);

    /// Whether `node` is `ancestor` or lies inside it.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// `target` followed by its ancestors, innermost first.
    fn propagation_path(&self, target: NodeId) -> Vec<NodeId> {
        let mut path = vec![target];
        let mut cursor = self.parent(target);
        while let Some(current) = cursor {
            path.push(current);
            cursor = self.parent(current);
        }
        path
    }
}
