//! crossterm input → menu events.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::dom::HeadlessDom;
use crate::error::Result;
use crate::event::{EventOutcome, Key, MenuEvent, Modifiers, PointerButton};
use crate::geometry::{Point, Size};
use crate::host::{Host, NodeId};
use crate::menu::MenuSystem;

/// Remembers which node the pointer is over so motion can be turned into
/// enter/leave pairs, and hit-tests every pointer report against the
/// headless tree.
#[derive(Debug, Default)]
pub struct PointerTracker {
    hovered: Option<NodeId>,
    position: Point,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Feed one terminal event through `system`. The returned outcome merges
    /// every menu event the terminal event turned into.
    pub fn feed(
        &mut self,
        system: &mut MenuSystem<HeadlessDom>,
        event: &Event,
    ) -> Result<EventOutcome> {
        match event {
            Event::Mouse(mouse) => self.feed_mouse(system, mouse),
            Event::Key(key) => Self::feed_key(system, key),
            Event::Resize(width, height) => {
                system
                    .host_mut()
                    .set_viewport(Size::new(i32::from(*width), i32::from(*height)));
                Ok(EventOutcome::default())
            }
            _ => Ok(EventOutcome::default()),
        }
    }

    fn feed_mouse(
        &mut self,
        system: &mut MenuSystem<HeadlessDom>,
        mouse: &MouseEvent,
    ) -> Result<EventOutcome> {
        let point = Point::new(i32::from(mouse.column), i32::from(mouse.row));
        let modifiers = modifiers_from(mouse.modifiers);
        self.position = point;
        let mut outcome = self.update_hover(system, point)?;
        match mouse.kind {
            MouseEventKind::Down(button) => {
                let target = system.host().hit_test(point);
                let down = MenuEvent::pointer_down(target, point, button_from(button))
                    .with_modifiers(modifiers);
                merge(&mut outcome, system.dispatch(&down)?);
                if button == MouseButton::Right {
                    // The pointer-down may have closed a menu, so hit-test again.
                    let target = system.host().hit_test(point);
                    let invoke = MenuEvent::context_menu(target, point).with_modifiers(modifiers);
                    merge(&mut outcome, system.dispatch(&invoke)?);
                }
            }
            MouseEventKind::Up(button) => {
                let target = system.host().hit_test(point);
                let up = MenuEvent::pointer_up(target, point, button_from(button))
                    .with_modifiers(modifiers);
                merge(&mut outcome, system.dispatch(&up)?);
            }
            MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
                let delta = if mouse.kind == MouseEventKind::ScrollDown { 1 } else { -1 };
                let dom = system.host_mut();
                let scroll = dom.scroll_offset();
                let next = Point::new(scroll.x, (scroll.y + delta).max(0));
                if !dom.scroll_to(next) {
                    tracing::trace!("scroll ignored while locked");
                }
            }
            _ => {}
        }
        Ok(outcome)
    }

    fn update_hover(
        &mut self,
        system: &mut MenuSystem<HeadlessDom>,
        point: Point,
    ) -> Result<EventOutcome> {
        let mut outcome = EventOutcome::default();
        let target = system.host().hit_test(point);
        if self.hovered == Some(target) {
            return Ok(outcome);
        }
        if let Some(previous) = self.hovered.take()
            && system.host().exists(previous)
        {
            merge(
                &mut outcome,
                system.dispatch(&MenuEvent::pointer_leave(previous, point))?,
            );
        }
        self.hovered = Some(target);
        merge(
            &mut outcome,
            system.dispatch(&MenuEvent::pointer_enter(target, point))?,
        );
        Ok(outcome)
    }

    fn feed_key(system: &mut MenuSystem<HeadlessDom>, key: &KeyEvent) -> Result<EventOutcome> {
        let mapped = match key.code {
            KeyCode::Esc => Key::Escape,
            KeyCode::Enter => Key::Enter,
            KeyCode::Char(c) => Key::Char(c),
            _ => Key::Other,
        };
        let body = system.host().body();
        let event = MenuEvent::key_down(body, mapped).with_modifiers(modifiers_from(key.modifiers));
        system.dispatch(&event)
    }
}

fn button_from(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Middle => PointerButton::Auxiliary,
        MouseButton::Right => PointerButton::Secondary,
    }
}

fn modifiers_from(modifiers: KeyModifiers) -> Modifiers {
    Modifiers {
        alt: modifiers.contains(KeyModifiers::ALT),
        ctrl: modifiers.contains(KeyModifiers::CONTROL),
        shift: modifiers.contains(KeyModifiers::SHIFT),
    }
}

fn merge(into: &mut EventOutcome, from: EventOutcome) {
    into.default_prevented |= from.default_prevented;
    into.propagation_stopped |= from.propagation_stopped;
    into.handled |= from.handled;
}
