use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyModifiers};
use indoc::indoc;
use ratatui::layout::Rect;

use ctxmenu::dom::HeadlessDom;
use ctxmenu::drivers::OutputDriver;
use ctxmenu::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use ctxmenu::event_loop::{ControlFlow, EventLoop, LoopEvent};
use ctxmenu::geometry::{Bounds, Size};
use ctxmenu::host::{Host, NodeId};
use ctxmenu::item::MenuItem;
use ctxmenu::log_buffer::{self, LogBufferHandle};
use ctxmenu::menu::MenuSystem;
use ctxmenu::options::{Callbacks, MenuConfig};
use ctxmenu::terminal::{PointerTracker, render_dom};
use ctxmenu::{theme, tracing_sub};

/// Rows reserved at the bottom for the status line and log tail.
const STATUS_ROWS: u16 = 4;

#[derive(Parser, Debug)]
#[command(
    name = "ctxmenu-demo",
    version = env!("CARGO_PKG_VERSION"),
    about = "Right-click the panels to open nested context menus. Esc closes, q quits.",
    after_help = indoc! {"
        Mouse:
          right-click    open the panel's menu
          hover, click   open a sub-menu (click skips the delay)
          left-click     activate an item, or close when outside

        Set RUST_LOG to override --log-level, e.g. RUST_LOG=ctxmenu=trace.
    "}
)]
struct DemoCli {
    /// Put a modal overlay behind open menus.
    #[arg(long)]
    overlay: bool,

    /// Flip menus to the other side of the anchor instead of clamping.
    #[arg(long)]
    transfer: bool,

    /// Keep page scrolling enabled while a menu is open.
    #[arg(long)]
    scrolling: bool,

    /// With --overlay: right-clicking elsewhere moves the menu instead of closing it.
    #[arg(long = "no-recreate")]
    no_recreate: bool,

    /// Open the menu even when Alt is held.
    #[arg(long = "no-default-on-alt")]
    no_default_on_alt: bool,

    /// Sub-menu hover delay before opening, in milliseconds.
    #[arg(long = "open-delay", value_name = "MS", default_value_t = 250.0)]
    open_delay: f64,

    /// Delay before a replaced sub-menu closes, in milliseconds.
    #[arg(long = "close-delay", value_name = "MS", default_value_t = 250.0)]
    close_delay: f64,

    /// Tracing filter used when RUST_LOG is unset.
    #[arg(long = "log-level", value_name = "FILTER", default_value = "debug")]
    log_level: String,
}

struct DemoConfig {
    menu: MenuConfig,
    open_delay: f64,
    close_delay: f64,
    log_level: String,
}

impl TryFrom<&DemoCli> for DemoConfig {
    type Error = String;

    fn try_from(cli: &DemoCli) -> Result<Self, Self::Error> {
        for (name, value) in [("open-delay", cli.open_delay), ("close-delay", cli.close_delay)] {
            if !(0.0..=10_000.0).contains(&value) {
                return Err(format!("{name} must be between 0 and 10000 ms"));
            }
        }
        if cli.no_recreate && !cli.overlay {
            return Err("--no-recreate requires --overlay".to_string());
        }
        let menu = MenuConfig::new()
            .overlay(cli.overlay)
            .transfer(cli.transfer)
            .scrolling(cli.scrolling)
            .no_recreate(cli.no_recreate)
            .default_on_alt(!cli.no_default_on_alt);
        Ok(Self {
            menu,
            open_delay: cli.open_delay,
            close_delay: cli.close_delay,
            log_level: cli.log_level.clone(),
        })
    }
}

fn main() -> io::Result<()> {
    let args = DemoCli::parse();
    let config = DemoConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let logs = LogBufferHandle::new(log_buffer::DEFAULT_MAX_LINES);
    log_buffer::set_global_log_buffer(logs.clone());
    tracing_sub::init_with_filter(&config.log_level);

    let mut output = ConsoleOutputDriver::new()?;
    let (width, height) = output.size()?;
    let status = Rc::new(RefCell::new(String::from("right-click a panel")));
    let mut system = build_scene(width, height, &config, &status).map_err(io::Error::other)?;
    let mut tracker = PointerTracker::new();

    output.enter()?;
    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), Duration::from_millis(16));
    let result = event_loop.run(|_driver, event| {
        match event {
            LoopEvent::Tick { now_ms } => {
                system.advance_to(now_ms).map_err(io::Error::other)?;
            }
            LoopEvent::Input(Event::Key(key))
                if key.code == KeyCode::Char('q')
                    || (key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)) =>
            {
                return Ok(ControlFlow::Quit);
            }
            LoopEvent::Input(input) => {
                if let Event::Resize(width, height) = input {
                    layout_surfaces(system.host_mut(), width, height);
                }
                tracker.feed(&mut system, &input).map_err(io::Error::other)?;
            }
        }
        output.draw(|mut frame| {
            render_dom(&mut frame, system.host(), tracker.hovered());
            draw_status(&mut frame, &status.borrow(), &logs);
        })?;
        Ok(ControlFlow::Continue)
    });
    output.exit()?;
    result
}

fn build_scene(
    width: u16,
    height: u16,
    config: &DemoConfig,
    status: &Rc<RefCell<String>>,
) -> ctxmenu::Result<MenuSystem<HeadlessDom>> {
    let mut dom = HeadlessDom::new(Size::new(i32::from(width), i32::from(height)));
    let files = dom.add_surface(None, Bounds::default())?;
    dom.set_text(files, " Files ")?;
    let editor = dom.add_surface(None, Bounds::default())?;
    dom.set_text(editor, " Editor ")?;
    layout_surfaces(&mut dom, width, height);

    let mut system = MenuSystem::new(dom);
    let nested = MenuConfig::new()
        .open_delay(config.open_delay)
        .close_delay(config.close_delay);
    let act = |label: &'static str| {
        let status = status.clone();
        MenuItem::action(label, move || *status.borrow_mut() = format!("activated: {label}"))
    };

    system.attach(
        files,
        vec![
            act("Open"),
            act("Rename"),
            MenuItem::divider(),
            MenuItem::submenu(
                "Sort by",
                vec![act("Name"), act("Date modified"), act("Size")],
                nested.clone(),
            ),
            MenuItem::submenu(
                "Share",
                vec![
                    act("Email"),
                    MenuItem::submenu("Export", vec![act("PDF"), act("PNG")], nested.clone()),
                ],
                nested.clone(),
            ),
            MenuItem::divider(),
            act("Delete"),
        ],
        config
            .menu
            .clone()
            .id("files")
            .callbacks(Callbacks::on_open(|| tracing::info!("files menu opened"))),
    );
    system.attach(
        editor,
        vec![
            act("Cut"),
            act("Copy"),
            act("Paste"),
            MenuItem::divider(),
            MenuItem::submenu(
                "Format",
                vec![act("Bold"), act("Italic"), act("Code")],
                nested,
            ),
        ],
        config
            .menu
            .clone()
            .id("editor")
            .on_close(|| tracing::info!("editor menu closed")),
    );
    Ok(system)
}

/// Split the screen above the status rows into two side-by-side panels.
fn layout_surfaces(dom: &mut HeadlessDom, width: u16, height: u16) {
    dom.set_viewport(Size::new(i32::from(width), i32::from(height)));
    let panel_height = i32::from(height.saturating_sub(STATUS_ROWS));
    let half = i32::from(width / 2);
    let panels: Vec<NodeId> = dom.nodes_with_role(ctxmenu::host::ElementRole::Surface);
    for (i, panel) in panels.into_iter().enumerate() {
        let x = if i == 0 { 0 } else { half };
        let panel_width = if i == 0 { half } else { i32::from(width) - half };
        dom.set_surface_bounds(panel, Bounds::new(x, 0, panel_width, panel_height));
    }
}

fn draw_status(frame: &mut ctxmenu::ui::UiFrame<'_>, status: &str, logs: &LogBufferHandle) {
    let area = frame.area();
    if area.height < STATUS_ROWS {
        return;
    }
    let top = area.y + area.height - STATUS_ROWS;
    let status_row = Rect::new(area.x, top, area.width, 1);
    frame.buffer_mut().set_style(status_row, theme::status_style());
    frame.set_string(status_row, area.x + 1, top, status, theme::status_style());
    for (offset, line) in logs.tail(usize::from(STATUS_ROWS - 1)).iter().enumerate() {
        let y = top + 1 + offset as u16;
        frame.set_string(
            Rect::new(area.x, y, area.width, 1),
            area.x,
            y,
            line,
            theme::log_style(),
        );
    }
}
