use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use ctxmenu::dom::{DomOp, HeadlessDom};
use ctxmenu::geometry::{Bounds, Point, Size};
use ctxmenu::{
    Callbacks, Disabled, Host, Key, LifecycleState, MenuConfig, MenuEvent, MenuItem, Modifiers,
    MenuSystem, NodeId, PointerButton,
};

fn scene() -> (MenuSystem<HeadlessDom>, NodeId) {
    let mut dom = HeadlessDom::new(Size::new(80, 24));
    let surface = dom.add_surface(None, Bounds::new(0, 0, 40, 20)).unwrap();
    (MenuSystem::new(dom), surface)
}

/// Collects formatted log output for inspection.
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes).lines().map(str::to_owned).collect()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLog {
    type Writer = CapturedLog;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn basic_items() -> Vec<MenuItem> {
    vec![
        MenuItem::action("Copy", || {}),
        MenuItem::divider(),
        MenuItem::action("Paste", || {}),
    ]
}

#[test]
fn attaching_twice_returns_the_first_menu() {
    let (mut system, surface) = scene();
    let first = system.attach(surface, basic_items(), MenuConfig::new());
    let second = system.attach(surface, vec![MenuItem::action("Other", || {})], MenuConfig::new());
    assert_eq!(first, second);
    assert_eq!(system.menu_for(surface), Some(first));
    // only the invocation binding of the one menu
    assert_eq!(system.bound_listeners(), 1);
}

#[test]
fn context_menu_opens_at_pointer_and_prevents_default() {
    let (mut system, surface) = scene();
    let menu = system.attach(surface, basic_items(), MenuConfig::new());
    let outcome = system
        .dispatch(&MenuEvent::context_menu(surface, Point::new(6, 4)))
        .unwrap();
    assert!(outcome.default_prevented);
    assert!(outcome.propagation_stopped);
    assert_eq!(system.state(menu), Some(LifecycleState::Open));
    let container = system.container(menu).unwrap();
    assert_eq!(system.host().bounds(container).unwrap().origin(), Point::new(6, 4));
    assert_eq!(
        system.host().attribute(container, "data-ctxmenu-state"),
        Some("open")
    );
    assert_eq!(system.close_listener_count(menu), 2);
}

#[test]
fn closing_removes_submenu_before_root() {
    let (mut system, surface) = scene();
    let order = Rc::new(RefCell::new(Vec::new()));
    let (root_log, sub_log) = (order.clone(), order.clone());
    let menu = system.attach(
        surface,
        vec![
            MenuItem::action("Copy", || {}),
            MenuItem::submenu(
                "More",
                vec![MenuItem::action("Inner", || {})],
                MenuConfig::new().on_close(move || sub_log.borrow_mut().push("sub")),
            ),
        ],
        MenuConfig::new().on_close(move || root_log.borrow_mut().push("root")),
    );
    system.open_at(menu, Point::new(2, 2)).unwrap();
    let child = system.open_submenu(menu, 1).unwrap().unwrap();
    let root_container = system.container(menu).unwrap();
    let child_container = system.container(child).unwrap();
    system.host_mut().take_journal();

    system.close(menu).unwrap();

    assert_eq!(*order.borrow(), vec!["sub", "root"]);
    let removed: Vec<NodeId> = system
        .host()
        .journal()
        .iter()
        .filter_map(|op| match op {
            DomOp::Removed(node) => Some(*node),
            _ => None,
        })
        .collect();
    assert_eq!(removed, vec![child_container, root_container]);
    assert_eq!(system.state(child), None);
    assert_eq!(system.state(menu), Some(LifecycleState::Closed));
}

#[test]
fn submenu_listeners_are_removed_before_the_roots() {
    let (mut system, surface) = scene();
    let menu = system.attach(
        surface,
        vec![
            MenuItem::action("Copy", || {}),
            MenuItem::submenu("More", vec![MenuItem::action("Inner", || {})], MenuConfig::new()),
        ],
        MenuConfig::new(),
    );
    system.open_at(menu, Point::new(2, 2)).unwrap();
    let child = system.open_submenu(menu, 1).unwrap().unwrap();
    let root_bindings = system.listeners_owned_by(menu);
    assert!(system.listeners_owned_by(child) > 0);
    assert_eq!(
        system.bound_listeners(),
        root_bindings + system.listeners_owned_by(child)
    );

    let log = CapturedLog::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(log.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::with_default(subscriber, || system.close(menu).unwrap());

    let closed: Vec<String> = log
        .lines()
        .into_iter()
        .filter(|line| line.contains("menu closed"))
        .collect();
    assert_eq!(closed.len(), 2, "{closed:?}");
    // the child is torn down while every root binding is still in place
    assert!(closed[0].contains(&format!("menu={child:?}")), "{closed:?}");
    assert!(closed[0].contains(&format!("remaining={root_bindings}")), "{closed:?}");
    // then the root leaves only its invocation binding
    assert!(closed[1].contains(&format!("menu={menu:?}")), "{closed:?}");
    assert!(closed[1].contains("remaining=1"), "{closed:?}");
}

#[test]
fn close_twice_is_a_no_op() {
    let (mut system, surface) = scene();
    let closes = Rc::new(Cell::new(0));
    let counter = closes.clone();
    let menu = system.attach(
        surface,
        basic_items(),
        MenuConfig::new().on_close(move || counter.set(counter.get() + 1)),
    );
    system.open_at(menu, Point::new(1, 1)).unwrap();
    system.close(menu).unwrap();
    let journal = system.host().journal().to_vec();
    let listeners = system.bound_listeners();

    system.close(menu).unwrap();

    assert_eq!(system.host().journal(), journal.as_slice());
    assert_eq!(system.bound_listeners(), listeners);
    assert_eq!(closes.get(), 1);
}

#[test]
fn alt_lets_the_native_menu_through() {
    let (mut system, surface) = scene();
    let menu = system.attach(surface, basic_items(), MenuConfig::new());
    let outcome = system
        .dispatch(&MenuEvent::context_menu(surface, Point::new(3, 3)).with_modifiers(Modifiers::ALT))
        .unwrap();
    assert!(!outcome.default_prevented);
    assert!(!system.is_open(menu));
}

#[test]
fn alt_opens_when_default_on_alt_is_off() {
    let (mut system, surface) = scene();
    let menu = system.attach(surface, basic_items(), MenuConfig::new().default_on_alt(false));
    system
        .dispatch(&MenuEvent::context_menu(surface, Point::new(3, 3)).with_modifiers(Modifiers::ALT))
        .unwrap();
    assert!(system.is_open(menu));
}

#[test]
fn disabled_predicate_is_checked_on_every_invocation() {
    let (mut system, surface) = scene();
    let disabled = Rc::new(Cell::new(true));
    let flag = disabled.clone();
    let menu = system.attach(
        surface,
        basic_items(),
        MenuConfig::new().disabled(Disabled::when(move || flag.get())),
    );
    let outcome = system
        .dispatch(&MenuEvent::context_menu(surface, Point::new(3, 3)))
        .unwrap();
    assert!(outcome.default_prevented);
    assert!(!system.is_open(menu));

    disabled.set(false);
    system
        .dispatch(&MenuEvent::context_menu(surface, Point::new(3, 3)))
        .unwrap();
    assert!(system.is_open(menu));
}

#[test]
fn item_activation_waits_out_the_grace_period() {
    let (mut system, surface) = scene();
    let runs = Rc::new(Cell::new(0));
    let counter = runs.clone();
    let menu = system.attach(
        surface,
        vec![MenuItem::action("Copy", move || counter.set(counter.get() + 1))],
        MenuConfig::new(),
    );
    system
        .dispatch(&MenuEvent::context_menu(surface, Point::new(3, 3)))
        .unwrap();
    let item = system.item_node(menu, 0).unwrap();
    let up = MenuEvent::pointer_up(item, Point::new(4, 4), PointerButton::Secondary);

    system.dispatch(&up).unwrap();
    assert_eq!(runs.get(), 0);
    assert!(system.is_open(menu));

    system.advance_by(200).unwrap();
    system.dispatch(&up).unwrap();
    assert_eq!(runs.get(), 1);
    assert!(!system.is_open(menu));
}

#[test]
fn pointer_down_outside_closes_but_inside_does_not() {
    let (mut system, surface) = scene();
    let menu = system.attach(surface, basic_items(), MenuConfig::new());
    system.open_at(menu, Point::new(5, 5)).unwrap();

    let divider = system.item_node(menu, 1).unwrap();
    system
        .dispatch(&MenuEvent::pointer_down(divider, Point::new(6, 7), PointerButton::Primary))
        .unwrap();
    assert!(system.is_open(menu));

    let item = system.item_node(menu, 0).unwrap();
    let outcome = system
        .dispatch(&MenuEvent::pointer_down(item, Point::new(6, 6), PointerButton::Primary))
        .unwrap();
    assert!(outcome.propagation_stopped);
    assert!(system.is_open(menu));

    system
        .dispatch(&MenuEvent::pointer_down(surface, Point::new(30, 15), PointerButton::Primary))
        .unwrap();
    assert!(!system.is_open(menu));
    assert_eq!(system.close_listener_count(menu), 0);
}

#[test]
fn escape_closes_and_other_keys_do_not() {
    let (mut system, surface) = scene();
    let menu = system.attach(surface, basic_items(), MenuConfig::new());
    system.open_at(menu, Point::new(5, 5)).unwrap();
    let body = system.host().body();

    system.dispatch(&MenuEvent::key_down(body, Key::Char('x'))).unwrap();
    assert!(system.is_open(menu));
    system.dispatch(&MenuEvent::key_down(body, Key::Escape)).unwrap();
    assert!(!system.is_open(menu));
}

#[test]
fn scroll_lock_follows_configuration_and_restores() {
    let (mut system, surface) = scene();
    let menu = system.attach(surface, basic_items(), MenuConfig::new());
    system.open_at(menu, Point::new(1, 1)).unwrap();
    assert!(!system.host().scrolling_enabled());
    assert!(system.scroll_locked());
    system.close(menu).unwrap();
    assert!(system.host().scrolling_enabled());

    let mut dom = HeadlessDom::new(Size::new(80, 24));
    let surface = dom.add_surface(None, Bounds::new(0, 0, 40, 20)).unwrap();
    let mut system = MenuSystem::new(dom);
    let menu = system.attach(surface, basic_items(), MenuConfig::new().scrolling(true));
    system.open_at(menu, Point::new(1, 1)).unwrap();
    assert!(system.host().scrolling_enabled());
    assert!(!system.scroll_locked());
}

#[test]
fn scroll_lock_restores_a_previously_disabled_page() {
    let (mut system, surface) = scene();
    system.host_mut().set_scrolling_enabled(false);
    let menu = system.attach(surface, basic_items(), MenuConfig::new().overlay(true));
    system.open_at(menu, Point::new(1, 1)).unwrap();
    system.close(menu).unwrap();
    assert!(!system.host().scrolling_enabled());
}

#[test]
fn overlay_right_click_reopens_with_no_recreate() {
    let (mut system, surface) = scene();
    let menu = system.attach(
        surface,
        basic_items(),
        MenuConfig::new().overlay(true).no_recreate(true),
    );
    system.open_at(menu, Point::new(2, 2)).unwrap();
    let overlay = system.overlay(menu).unwrap();
    assert!(system.host().is_shown(overlay));

    system
        .dispatch(&MenuEvent::pointer_down(overlay, Point::new(50, 12), PointerButton::Secondary))
        .unwrap();
    assert!(system.is_open(menu));

    let outcome = system
        .dispatch(&MenuEvent::context_menu(overlay, Point::new(50, 12)))
        .unwrap();
    assert!(outcome.default_prevented);
    assert!(system.is_open(menu));
    let container = system.container(menu).unwrap();
    assert_eq!(system.host().bounds(container).unwrap().origin(), Point::new(50, 12));
    assert!(!system.host().exists(overlay));
}

#[test]
fn alt_right_click_on_overlay_lets_the_native_menu_through() {
    let (mut system, surface) = scene();
    let menu = system.attach(
        surface,
        basic_items(),
        MenuConfig::new().overlay(true).no_recreate(true),
    );
    system.open_at(menu, Point::new(2, 2)).unwrap();
    let overlay = system.overlay(menu).unwrap();

    system
        .dispatch(
            &MenuEvent::pointer_down(overlay, Point::new(40, 10), PointerButton::Secondary)
                .with_modifiers(Modifiers::ALT),
        )
        .unwrap();
    assert!(system.is_open(menu));

    let outcome = system
        .dispatch(&MenuEvent::context_menu(overlay, Point::new(40, 10)).with_modifiers(Modifiers::ALT))
        .unwrap();
    assert!(!outcome.default_prevented);
    assert!(!system.is_open(menu));
    assert_eq!(system.container(menu), None);
    assert!(!system.host().exists(overlay));
    assert_eq!(system.bound_listeners(), 1);
}

#[test]
fn overlay_right_click_closes_without_no_recreate() {
    let (mut system, surface) = scene();
    let menu = system.attach(surface, basic_items(), MenuConfig::new().overlay(true));
    system.open_at(menu, Point::new(2, 2)).unwrap();
    let overlay = system.overlay(menu).unwrap();

    let outcome = system
        .dispatch(&MenuEvent::context_menu(overlay, Point::new(50, 12)))
        .unwrap();
    assert!(outcome.default_prevented);
    assert!(!system.is_open(menu));
    assert!(!system.host().exists(overlay));
}

#[test]
fn callbacks_run_once_per_transition() {
    let (mut system, surface) = scene();
    let opened = Rc::new(Cell::new(0));
    let counter = opened.clone();
    let menu = system.attach(
        surface,
        basic_items(),
        MenuConfig::new().callbacks(Callbacks::on_open(move || counter.set(counter.get() + 1))),
    );
    for _ in 0..3 {
        system
            .dispatch(&MenuEvent::context_menu(surface, Point::new(3, 3)))
            .unwrap();
    }
    // each invocation closes the open menu and opens it again
    assert_eq!(opened.get(), 3);
    assert!(system.is_open(menu));
}

#[test]
fn detach_unbinds_everything() {
    let (mut system, surface) = scene();
    let menu = system.attach(surface, basic_items(), MenuConfig::new().overlay(true));
    system.open_at(menu, Point::new(3, 3)).unwrap();
    let overlay = system.overlay(menu).unwrap();

    assert!(system.detach(surface).unwrap());
    assert!(!system.detach(surface).unwrap());
    assert_eq!(system.bound_listeners(), 0);
    assert_eq!(system.menu_for(surface), None);
    assert_eq!(system.state(menu), None);
    assert!(!system.host().exists(overlay));
    assert!(system.host().scrolling_enabled());
}

#[test]
fn close_of_unknown_menu_is_ok() {
    let (mut system, surface) = scene();
    let menu = system.attach(surface, basic_items(), MenuConfig::new());
    system.detach(surface).unwrap();
    assert_eq!(system.close(menu), Ok(()));
    assert!(system.open_at(menu, Point::new(0, 0)).is_err());
}

#[test]
fn close_all_closes_every_open_root() {
    let mut dom = HeadlessDom::new(Size::new(80, 24));
    let left = dom.add_surface(None, Bounds::new(0, 0, 40, 20)).unwrap();
    let right = dom.add_surface(None, Bounds::new(40, 0, 40, 20)).unwrap();
    let mut system = MenuSystem::new(dom);
    let a = system.attach(left, basic_items(), MenuConfig::new());
    let b = system.attach(right, basic_items(), MenuConfig::new());
    system.open_at(a, Point::new(2, 2)).unwrap();
    system.open_at(b, Point::new(42, 2)).unwrap();
    assert_eq!(system.open_menus(), vec![a, b]);
    assert!(system.scroll_locked());

    system.close_all().unwrap();
    assert!(system.open_menus().is_empty());
    assert!(!system.scroll_locked());
    assert!(system.host().scrolling_enabled());
    assert_eq!(system.bound_listeners(), 2);
}
