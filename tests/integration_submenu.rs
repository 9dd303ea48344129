use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ctxmenu::dom::HeadlessDom;
use ctxmenu::geometry::{Bounds, Point, Size};
use ctxmenu::{Disabled, Host, Key, MenuConfig, MenuEvent, MenuId, MenuItem, MenuSystem, NodeId, PointerButton};

const ONE: usize = 1;
const TWO: usize = 2;
const DEEPER: usize = 1;

fn delays() -> MenuConfig {
    MenuConfig::new().open_delay(100.0).close_delay(100.0)
}

/// Root: [A, One ▸ [x, Deeper ▸ [y]], Two ▸ [z]]
fn scene(viewport: Size, root_config: MenuConfig) -> (MenuSystem<HeadlessDom>, MenuId) {
    let mut dom = HeadlessDom::new(viewport);
    let surface = dom
        .add_surface(None, Bounds::from_parts(Point::default(), viewport))
        .unwrap();
    let mut system = MenuSystem::new(dom);
    let items = vec![
        MenuItem::action("A", || {}),
        MenuItem::submenu(
            "One",
            vec![
                MenuItem::action("x", || {}),
                MenuItem::submenu("Deeper", vec![MenuItem::action("y", || {})], delays()),
            ],
            delays(),
        ),
        MenuItem::submenu("Two", vec![MenuItem::action("z", || {})], delays()),
    ];
    let menu = system.attach(surface, items, root_config);
    (system, menu)
}

fn open_scene() -> (MenuSystem<HeadlessDom>, MenuId) {
    let (mut system, menu) = scene(Size::new(80, 24), MenuConfig::new());
    system.open_at(menu, Point::new(10, 5)).unwrap();
    (system, menu)
}

fn opener(system: &MenuSystem<HeadlessDom>, menu: MenuId, index: usize) -> NodeId {
    system.item_node(menu, index).unwrap()
}

fn enter(system: &mut MenuSystem<HeadlessDom>, node: NodeId) {
    system
        .dispatch(&MenuEvent::pointer_enter(node, Point::default()))
        .unwrap();
}

fn leave(system: &mut MenuSystem<HeadlessDom>, node: NodeId) {
    system
        .dispatch(&MenuEvent::pointer_leave(node, Point::default()))
        .unwrap();
}

fn press(system: &mut MenuSystem<HeadlessDom>, node: NodeId) -> ctxmenu::EventOutcome {
    system
        .dispatch(&MenuEvent::pointer_down(node, Point::default(), PointerButton::Primary))
        .unwrap()
}

/// The open child of `menu`, if it hangs off item `index`.
fn child_at(system: &MenuSystem<HeadlessDom>, menu: MenuId, index: usize) -> Option<MenuId> {
    let item = opener(system, menu, index);
    system
        .host()
        .attribute(item, "data-ctxmenu-active")
        .and(system.opened_child(menu))
}

#[test]
fn hover_opens_after_the_delay() {
    let (mut system, root) = open_scene();
    let one = opener(&system, root, ONE);
    enter(&mut system, one);
    assert_eq!(system.pending_timers(), 1);

    system.advance_by(99).unwrap();
    assert_eq!(system.opened_child(root), None);

    system.advance_by(1).unwrap();
    let child = system.opened_child(root).unwrap();
    assert!(system.is_open(child));
    assert_eq!(system.parent_of(child), Some(root));
    assert_eq!(system.depth(child), Some(1));
    assert!(system.host().attribute(one, "data-ctxmenu-active").is_some());
}

#[test]
fn leaving_before_the_delay_cancels_the_open() {
    let (mut system, root) = open_scene();
    let one = opener(&system, root, ONE);
    enter(&mut system, one);
    leave(&mut system, one);
    assert_eq!(system.pending_timers(), 0);
    system.advance_by(500).unwrap();
    assert_eq!(system.opened_child(root), None);
}

#[test]
fn leaving_does_not_close_an_open_submenu() {
    let (mut system, root) = open_scene();
    let one = opener(&system, root, ONE);
    press(&mut system, one);
    let child = system.opened_child(root).unwrap();
    leave(&mut system, one);
    system.advance_by(500).unwrap();
    assert!(system.is_open(child));
}

#[test]
fn pressing_an_opener_opens_immediately_and_stays_inside() {
    let (mut system, root) = open_scene();
    let one = opener(&system, root, ONE);
    let outcome = press(&mut system, one);
    assert!(outcome.propagation_stopped);
    assert!(system.is_open(root));
    assert!(child_at(&system, root, ONE).is_some());
}

#[test]
fn hovering_a_sibling_swaps_the_open_submenu() {
    let (mut system, root) = open_scene();
    let (one, two) = (opener(&system, root, ONE), opener(&system, root, TWO));
    press(&mut system, one);
    let first = system.opened_child(root).unwrap();

    enter(&mut system, two);
    // sibling close and new open are both pending; nothing changed yet
    assert_eq!(system.pending_timers(), 2);
    assert_eq!(system.opened_child(root), Some(first));

    system.advance_by(100).unwrap();
    let second = system.opened_child(root).unwrap();
    assert_ne!(first, second);
    assert_eq!(system.state(first), None);
    assert!(system.host().attribute(one, "data-ctxmenu-active").is_none());
    assert!(system.host().attribute(two, "data-ctxmenu-active").is_some());
    assert_eq!(system.open_menus(), vec![root, second]);
}

#[test]
fn pressing_a_sibling_closes_the_other_first() {
    let (mut system, root) = open_scene();
    let (one, two) = (opener(&system, root, ONE), opener(&system, root, TWO));
    press(&mut system, one);
    let first = system.opened_child(root).unwrap();
    let first_container = system.container(first).unwrap();

    press(&mut system, two);
    let second = system.opened_child(root).unwrap();
    assert_ne!(first, second);
    assert!(!system.host().exists(first_container));
    assert_eq!(system.open_menus().len(), 2);
}

#[test]
fn returning_to_the_open_opener_keeps_it() {
    let (mut system, root) = open_scene();
    let (one, two) = (opener(&system, root, ONE), opener(&system, root, TWO));
    press(&mut system, one);
    let first = system.opened_child(root).unwrap();

    enter(&mut system, two);
    leave(&mut system, two);
    enter(&mut system, one);
    assert_eq!(system.pending_timers(), 0);

    system.advance_by(300).unwrap();
    assert_eq!(system.opened_child(root), Some(first));
    assert!(system.is_open(first));
}

#[test]
fn escape_closes_the_whole_tree_leaf_first() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let log = |name: &'static str| {
        let order = order.clone();
        move || order.borrow_mut().push(name)
    };
    let mut dom = HeadlessDom::new(Size::new(80, 24));
    let surface = dom.add_surface(None, Bounds::new(0, 0, 80, 24)).unwrap();
    let mut system = MenuSystem::new(dom);
    let root = system.attach(
        surface,
        vec![MenuItem::submenu(
            "One",
            vec![MenuItem::submenu(
                "Deeper",
                vec![MenuItem::action("y", || {})],
                delays().on_close(log("grandchild")),
            )],
            delays().on_close(log("child")),
        )],
        MenuConfig::new().on_close(log("root")),
    );
    system.open_at(root, Point::new(1, 1)).unwrap();
    let child = system.open_submenu(root, 0).unwrap().unwrap();
    let grandchild = system.open_submenu(child, 0).unwrap().unwrap();
    assert_eq!(system.depth(grandchild), Some(2));
    assert_eq!(system.root_of(grandchild), Ok(root));

    let body = system.host().body();
    system.dispatch(&MenuEvent::key_down(body, Key::Escape)).unwrap();

    assert_eq!(*order.borrow(), vec!["grandchild", "child", "root"]);
    assert!(system.open_menus().is_empty());
    // only the root's invocation binding survives
    assert_eq!(system.bound_listeners(), 1);
}

#[test]
fn outside_click_closes_nested_tree() {
    let (mut system, root) = open_scene();
    let node = opener(&system, root, ONE);
    press(&mut system, node);
    let child = system.opened_child(root).unwrap();
    let node = opener(&system, child, DEEPER);
    press(&mut system, node);
    assert_eq!(system.open_menus().len(), 3);

    let body = system.host().body();
    system
        .dispatch(&MenuEvent::pointer_down(body, Point::new(79, 23), PointerButton::Primary))
        .unwrap();
    assert!(system.open_menus().is_empty());
    assert_eq!(system.bound_listeners(), 1);
}

#[test]
fn click_inside_a_submenu_keeps_the_tree_open() {
    let (mut system, root) = open_scene();
    let node = opener(&system, root, ONE);
    press(&mut system, node);
    let child = system.opened_child(root).unwrap();
    let container = system.container(child).unwrap();
    system
        .dispatch(&MenuEvent::pointer_down(container, Point::default(), PointerButton::Primary))
        .unwrap();
    assert!(system.is_open(root));
    assert!(system.is_open(child));
}

#[test]
fn closing_cancels_pending_timers() {
    let (mut system, root) = open_scene();
    let node = opener(&system, root, ONE);
    enter(&mut system, node);
    assert_eq!(system.pending_timers(), 1);
    system.close(root).unwrap();
    assert_eq!(system.pending_timers(), 0);
    system.advance_by(1_000).unwrap();
    assert_eq!(system.opened_child(root), None);
}

#[test]
fn zero_delay_opens_on_enter() {
    let mut dom = HeadlessDom::new(Size::new(80, 24));
    let surface = dom.add_surface(None, Bounds::new(0, 0, 80, 24)).unwrap();
    let mut system = MenuSystem::new(dom);
    let root = system.attach(
        surface,
        vec![MenuItem::submenu(
            "Now",
            vec![MenuItem::action("x", || {})],
            MenuConfig::new().open_delay(0.0),
        )],
        MenuConfig::new(),
    );
    system.open_at(root, Point::new(1, 1)).unwrap();
    let node = opener(&system, root, 0);
    enter(&mut system, node);
    assert!(system.opened_child(root).is_some());
    assert_eq!(system.pending_timers(), 0);
}

#[test]
fn submenu_opens_beside_its_opener() {
    let (system, root) = {
        let (mut system, root) = open_scene();
        let one = opener(&system, root, ONE);
        press(&mut system, one);
        (system, root)
    };
    let child = system.opened_child(root).unwrap();
    let one_bounds = system.host().bounds(opener(&system, root, ONE)).unwrap();
    let child_bounds = system.host().bounds(system.container(child).unwrap()).unwrap();
    assert_eq!(child_bounds.origin(), Point::new(one_bounds.right(), one_bounds.y));
}

#[test]
fn transfer_flips_submenu_to_the_left() {
    let viewport = Size::new(24, 20);
    let (mut system, root) = scene(viewport, MenuConfig::new().transfer(true));
    system.open_at(root, Point::new(14, 5)).unwrap();
    let node = opener(&system, root, ONE);
    press(&mut system, node);
    let child = system.opened_child(root).unwrap();
    let bounds = system.host().bounds(system.container(child).unwrap()).unwrap();
    // opener spans x 15..22; the 12-wide sub-menu does not fit to its right
    assert_eq!(bounds.origin(), Point::new(3, 7));
}

#[test]
fn without_transfer_submenu_is_clamped() {
    let viewport = Size::new(24, 20);
    let (mut system, root) = scene(viewport, MenuConfig::new());
    system.open_at(root, Point::new(14, 5)).unwrap();
    let node = opener(&system, root, ONE);
    press(&mut system, node);
    let child = system.opened_child(root).unwrap();
    let bounds = system.host().bounds(system.container(child).unwrap()).unwrap();
    assert_eq!(bounds.origin(), Point::new(12, 7));
}

#[test]
fn disabled_submenu_never_opens() {
    let blocked = Rc::new(Cell::new(true));
    let flag = blocked.clone();
    let mut dom = HeadlessDom::new(Size::new(80, 24));
    let surface = dom.add_surface(None, Bounds::new(0, 0, 80, 24)).unwrap();
    let mut system = MenuSystem::new(dom);
    let root = system.attach(
        surface,
        vec![MenuItem::submenu(
            "Sub",
            vec![MenuItem::action("x", || {})],
            delays().disabled(Disabled::when(move || flag.get())),
        )],
        MenuConfig::new(),
    );
    system.open_at(root, Point::new(1, 1)).unwrap();
    let sub = opener(&system, root, 0);

    assert_eq!(system.open_submenu(root, 0), Ok(None));
    press(&mut system, sub);
    enter(&mut system, sub);
    assert_eq!(system.pending_timers(), 0);
    system.advance_by(500).unwrap();
    assert_eq!(system.opened_child(root), None);
    assert!(system.host().attribute(sub, "data-ctxmenu-active").is_none());
    assert!(system.is_open(root));

    blocked.set(false);
    press(&mut system, sub);
    assert!(system.opened_child(root).is_some());
}
