//! Viewport-aware menu placement.
//!
//! `place` is pure: it never looks at the host. Callers measure the menu,
//! read the viewport and scroll offset, and apply the returned document
//! coordinate themselves.

use crate::geometry::{Bounds, Point, Size};

/// What a menu is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Viewport-relative pointer position of the invocation event.
    Point(Point),
    /// Viewport-relative bounds of the opener item of a sub-menu.
    Item(Bounds),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub anchor: Anchor,
    pub menu: Size,
    pub viewport: Size,
    pub scroll: Point,
    /// Flip to the other side of the anchor instead of clamping to the edge.
    pub transfer: bool,
}

/// Top-left document coordinate for a menu described by `placement`.
pub fn place(placement: &Placement) -> Point {
    let Placement {
        anchor,
        menu,
        viewport,
        scroll,
        transfer,
    } = *placement;
    let (x, y) = match anchor {
        Anchor::Point(point) => {
            let px = point.x.clamp(0, viewport.width.max(0));
            let py = point.y.clamp(0, viewport.height.max(0));
            (
                place_axis(px, px - menu.width, menu.width, viewport.width, transfer),
                place_axis(py, py - menu.height, menu.height, viewport.height, transfer),
            )
        }
        Anchor::Item(item) => (
            place_axis(
                item.right(),
                item.x - menu.width,
                menu.width,
                viewport.width,
                transfer,
            ),
            place_axis(
                item.y,
                item.bottom() - menu.height,
                menu.height,
                viewport.height,
                transfer,
            ),
        ),
    };
    Point::new(x, y).offset(scroll)
}

/// Resolve one axis. `start` is the preferred near edge, `flipped` the near
/// edge when the menu is moved to the opposite side of the anchor.
fn place_axis(start: i32, flipped: i32, size: i32, limit: i32, transfer: bool) -> i32 {
    let start = start.max(0);
    if start + size <= limit {
        return start;
    }
    if transfer {
        flipped.max(0)
    } else {
        (limit - size).max(0)
    }
}
