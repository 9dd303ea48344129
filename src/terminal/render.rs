//! Paint a `HeadlessDom` into a ratatui buffer.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear};

use crate::dom::HeadlessDom;
use crate::geometry::Bounds;
use crate::host::{ElementRole, Host, NodeId};
use crate::theme;
use crate::ui::UiFrame;

const OPENER_INDICATOR: &str = "▸";

/// Paint every shown node in tree order, so later siblings (and the menus
/// appended last) end up on top. `hovered` gets the selected item style.
pub fn render_dom(frame: &mut UiFrame<'_>, dom: &HeadlessDom, hovered: Option<NodeId>) {
    paint(frame, dom, dom.body(), hovered);
}

fn paint(frame: &mut UiFrame<'_>, dom: &HeadlessDom, node: NodeId, hovered: Option<NodeId>) {
    if !dom.is_shown(node) {
        return;
    }
    let rect = dom
        .bounds(node)
        .ok()
        .and_then(|bounds| to_rect(bounds, frame.area()));
    match (dom.role(node), rect) {
        (Some(ElementRole::Surface), Some(rect)) => paint_surface(frame, dom, node, rect),
        (Some(ElementRole::Overlay), Some(rect)) => {
            frame.buffer_mut().set_style(rect, theme::overlay_style());
        }
        (Some(ElementRole::Container), Some(rect)) => {
            frame.render_widget(Clear, rect);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::menu_border()))
                .style(Style::default().bg(theme::menu_bg()).fg(theme::menu_fg()));
            frame.render_widget(block, rect);
        }
        (Some(ElementRole::Item | ElementRole::Opener), Some(rect)) => {
            paint_item(frame, dom, node, rect, hovered == Some(node));
        }
        (Some(ElementRole::Divider), Some(rect)) => {
            let line = "─".repeat(rect.width as usize);
            let style = Style::default().bg(theme::menu_bg()).fg(theme::menu_divider());
            frame.set_string(rect, rect.x, rect.y, &line, style);
        }
        _ => {}
    }
    for child in dom.children(node) {
        paint(frame, dom, *child, hovered);
    }
}

fn paint_surface(frame: &mut UiFrame<'_>, dom: &HeadlessDom, node: NodeId, rect: Rect) {
    let title = dom.text(node).unwrap_or_default();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(Style::default().fg(theme::surface_border()))
        .style(Style::default().bg(theme::surface_bg()).fg(theme::surface_fg()));
    frame.render_widget(block, rect);
}

fn paint_item(frame: &mut UiFrame<'_>, dom: &HeadlessDom, node: NodeId, rect: Rect, hovered: bool) {
    let style = theme::menu_item_style(hovered);
    frame.buffer_mut().set_style(rect, style);
    let padding = dom.metrics().padding_x.max(0) as u16;
    let label = dom.text(node).unwrap_or_default();
    frame.set_string(rect, rect.x.saturating_add(padding), rect.y, label, style);
    if dom.role(node) == Some(ElementRole::Opener) {
        let x = rect
            .x
            .saturating_add(rect.width)
            .saturating_sub(padding.max(1));
        frame.set_string(rect, x, rect.y, OPENER_INDICATOR, style);
    }
}

/// Viewport bounds → buffer rect, clipped to `area`. `None` when nothing of
/// it is visible.
pub fn to_rect(bounds: Bounds, area: Rect) -> Option<Rect> {
    let x0 = bounds.x.max(i32::from(area.x));
    let y0 = bounds.y.max(i32::from(area.y));
    let x1 = bounds.right().min(i32::from(area.x) + i32::from(area.width));
    let y1 = bounds.bottom().min(i32::from(area.y) + i32::from(area.height));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Rect::new(
        u16::try_from(x0).ok()?,
        u16::try_from(y0).ok()?,
        u16::try_from(x1 - x0).ok()?,
        u16::try_from(y1 - y0).ok()?,
    ))
}
