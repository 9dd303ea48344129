//! In-memory node tree implementing `Host`.
//!
//! Layout is deliberately simple: containers stack their items vertically,
//! size themselves to the widest label and are absolutely positioned; the
//! overlay covers the viewport; surfaces have fixed bounds supplied by the
//! application. Units are whatever `Metrics` says they are (terminal cells by
//! default).

use std::collections::{BTreeMap, HashMap};

use crate::error::HostError;
use crate::geometry::{Bounds, Point, Size};
use crate::host::{ElementRole, Host, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub char_width: i32,
    pub item_height: i32,
    pub divider_height: i32,
    pub padding_x: i32,
    pub border: i32,
    /// Extra width reserved on openers for the sub-menu indicator.
    pub indicator_width: i32,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            char_width: 1,
            item_height: 1,
            divider_height: 1,
            padding_x: 1,
            border: 1,
            indicator_width: 2,
        }
    }
}

/// Structural changes, recorded in order for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomOp {
    Created(NodeId, ElementRole),
    Appended { parent: NodeId, child: NodeId },
    Removed(NodeId),
    ScrollingEnabled(bool),
}

#[derive(Debug, Clone)]
struct Node {
    role: ElementRole,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attrs: BTreeMap<String, String>,
    text: String,
    visible: bool,
    /// Document coordinate for positioned nodes.
    position: Point,
    /// Fixed viewport-relative bounds for surfaces.
    fixed: Bounds,
}

impl Node {
    fn new(role: ElementRole) -> Self {
        Self {
            role,
            parent: None,
            children: Vec::new(),
            attrs: BTreeMap::new(),
            text: String::new(),
            visible: true,
            position: Point::default(),
            fixed: Bounds::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessDom {
    nodes: HashMap<NodeId, Node>,
    next_id: usize,
    body: NodeId,
    viewport: Size,
    scroll: Point,
    scrolling_enabled: bool,
    metrics: Metrics,
    journal: Vec<DomOp>,
}

impl HeadlessDom {
    pub fn new(viewport: Size) -> Self {
        let body = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(body, Node::new(ElementRole::Document));
        Self {
            nodes,
            next_id: 1,
            body,
            viewport,
            scroll: Point::default(),
            scrolling_enabled: true,
            metrics: Metrics::default(),
            journal: Vec::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Scroll the page. Ignored while scrolling is disabled, like a locked
    /// document would.
    pub fn scroll_to(&mut self, offset: Point) -> bool {
        if !self.scrolling_enabled {
            return false;
        }
        self.scroll = offset;
        true
    }

    /// Create a surface with fixed viewport-relative bounds under `parent`
    /// (the body when `None`).
    pub fn add_surface(&mut self, parent: Option<NodeId>, bounds: Bounds) -> Result<NodeId, HostError> {
        let id = self.create_element(ElementRole::Surface)?;
        self.node_mut(id)?.fixed = bounds;
        self.append_child(parent.unwrap_or(self.body), id)?;
        Ok(id)
    }

    /// Move or resize a surface. Other nodes are ignored.
    pub fn set_surface_bounds(&mut self, surface: NodeId, bounds: Bounds) -> bool {
        match self.nodes.get_mut(&surface) {
            Some(node) if node.role == ElementRole::Surface => {
                node.fixed = bounds;
                true
            }
            _ => false,
        }
    }

    pub fn exists(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn role(&self, node: NodeId) -> Option<ElementRole> {
        self.nodes.get(&node).map(|n| n.role)
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|n| n.text.as_str())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(&node)
            .and_then(|n| n.attrs.get(name))
            .map(String::as_str)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Visible if the node and every ancestor are visible.
    pub fn is_shown(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            match self.nodes.get(&current) {
                Some(n) if n.visible => cursor = n.parent,
                _ => return false,
            }
        }
        true
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        self.exists(node) && self.contains(self.body, node)
    }

    /// Attached nodes with `role`, in document order.
    pub fn nodes_with_role(&self, role: ElementRole) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(self.body, &mut |id, node| {
            if node.role == role {
                out.push(id);
            }
        });
        out
    }

    pub fn journal(&self) -> &[DomOp] {
        &self.journal
    }

    pub fn take_journal(&mut self) -> Vec<DomOp> {
        std::mem::take(&mut self.journal)
    }

    /// Topmost shown node under a viewport-relative point. Later siblings
    /// paint over earlier ones; falls back to the body.
    pub fn hit_test(&self, point: Point) -> NodeId {
        self.hit_test_in(self.body, point).unwrap_or(self.body)
    }

    fn hit_test_in(&self, node: NodeId, point: Point) -> Option<NodeId> {
        let data = self.nodes.get(&node)?;
        if !data.visible {
            return None;
        }
        for child in data.children.iter().rev() {
            if let Some(hit) = self.hit_test_in(*child, point) {
                return Some(hit);
            }
        }
        if node == self.body {
            return None;
        }
        let bounds = self.bounds(node).ok()?;
        bounds.contains(point).then_some(node)
    }

    fn walk(&self, node: NodeId, f: &mut impl FnMut(NodeId, &Node)) {
        if let Some(data) = self.nodes.get(&node) {
            f(node, data);
            for child in &data.children {
                self.walk(*child, f);
            }
        }
    }

    fn node(&self, id: NodeId) -> Result<&Node, HostError> {
        self.nodes.get(&id).ok_or(HostError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, HostError> {
        self.nodes.get_mut(&id).ok_or(HostError::UnknownNode(id))
    }

    fn item_size(&self, node: &Node) -> Size {
        let m = self.metrics;
        match node.role {
            ElementRole::Divider => Size::new(0, m.divider_height),
            ElementRole::Opener => Size::new(
                m.padding_x * 2 + node.text.chars().count() as i32 * m.char_width + m.indicator_width,
                m.item_height,
            ),
            _ => Size::new(
                m.padding_x * 2 + node.text.chars().count() as i32 * m.char_width,
                m.item_height,
            ),
        }
    }

    fn container_size(&self, node: &Node) -> Size {
        let border = self.metrics.border;
        let (width, height) = node
            .children
            .iter()
            .filter_map(|child| self.nodes.get(child))
            .map(|child| self.item_size(child))
            .fold((0, 0), |(w, h), size| (w.max(size.width), h + size.height));
        Size::new(width + border * 2, height + border * 2)
    }
}

impl Host for HeadlessDom {
    fn body(&self) -> NodeId {
        self.body
    }

    fn create_element(&mut self, role: ElementRole) -> Result<NodeId, HostError> {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(role));
        self.journal.push(DomOp::Created(id, role));
        Ok(id)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), HostError> {
        self.node_mut(node)?
            .attrs
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), HostError> {
        self.node_mut(node)?.attrs.remove(name);
        Ok(())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), HostError> {
        self.node_mut(node)?.text = text.to_string();
        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        self.node(parent)?;
        let previous = self.node(child)?.parent;
        if let Some(previous) = previous
            && let Some(old) = self.nodes.get_mut(&previous)
        {
            old.children.retain(|c| *c != child);
        }
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        self.journal.push(DomOp::Appended { parent, child });
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> Result<(), HostError> {
        let parent = self.node(node)?.parent;
        if let Some(parent) = parent
            && let Some(p) = self.nodes.get_mut(&parent)
        {
            p.children.retain(|c| *c != node);
        }
        // Nothing can reach a detached subtree again, so drop it.
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.nodes.remove(&current) {
                stack.extend(data.children);
            }
        }
        self.journal.push(DomOp::Removed(node));
        Ok(())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn measure(&self, node: NodeId) -> Result<Size, HostError> {
        let data = self.node(node)?;
        Ok(match data.role {
            ElementRole::Document | ElementRole::Overlay => self.viewport,
            ElementRole::Surface => data.fixed.size(),
            ElementRole::Container => self.container_size(data),
            ElementRole::Item | ElementRole::Divider | ElementRole::Opener => self.item_size(data),
        })
    }

    fn bounds(&self, node: NodeId) -> Result<Bounds, HostError> {
        let data = self.node(node)?;
        if !self.is_attached(node) {
            return Err(HostError::Detached(node));
        }
        match data.role {
            ElementRole::Document | ElementRole::Overlay => {
                Ok(Bounds::from_parts(Point::default(), self.viewport))
            }
            ElementRole::Surface => Ok(data.fixed),
            ElementRole::Container => {
                let origin = Point::new(
                    data.position.x - self.scroll.x,
                    data.position.y - self.scroll.y,
                );
                Ok(Bounds::from_parts(origin, self.container_size(data)))
            }
            ElementRole::Item | ElementRole::Divider | ElementRole::Opener => {
                let parent = data.parent.ok_or(HostError::NoParent(node))?;
                let container = self.bounds(parent)?;
                let border = self.metrics.border;
                let siblings = &self.node(parent)?.children;
                let mut y = container.y + border;
                for sibling in siblings {
                    let Some(sibling_data) = self.nodes.get(sibling) else {
                        continue;
                    };
                    let height = self.item_size(sibling_data).height;
                    if *sibling == node {
                        return Ok(Bounds::new(
                            container.x + border,
                            y,
                            container.width - border * 2,
                            height,
                        ));
                    }
                    y += height;
                }
                Err(HostError::UnknownNode(node))
            }
        }
    }

    fn set_position(&mut self, node: NodeId, position: Point) -> Result<(), HostError> {
        self.node_mut(node)?.position = position;
        Ok(())
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) -> Result<(), HostError> {
        self.node_mut(node)?.visible = visible;
        Ok(())
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn scroll_offset(&self) -> Point {
        self.scroll
    }

    fn scrolling_enabled(&self) -> bool {
        self.scrolling_enabled
    }

    fn set_scrolling_enabled(&mut self, enabled: bool) {
        self.scrolling_enabled = enabled;
        self.journal.push(DomOp::ScrollingEnabled(enabled));
    }
}
