use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use ctxmenu::dom::HeadlessDom;
use ctxmenu::event::{MenuEvent, PointerButton};
use ctxmenu::geometry::{Bounds, Point, Size};
use ctxmenu::host::{Host, NodeId};
use ctxmenu::item::MenuItem;
use ctxmenu::menu::{MenuId, MenuSystem};
use ctxmenu::options::MenuConfig;
use ctxmenu::terminal::render_dom;
use ctxmenu::ui::UiFrame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

const VIEWPORT: Size = Size::new(120, 40);

#[derive(Parser, Debug)]
#[command(
    name = "ctxmenu-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Headless benchmark: open a menu tree, hover down to the deepest level, dismiss"
)]
struct BenchCli {
    /// Number of open/hover/close cycles.
    #[arg(short = 'n', long = "iterations", default_value_t = 10_000)]
    iterations: u32,

    /// Sub-menu levels below the root.
    #[arg(short = 'd', long = "depth", default_value_t = 4)]
    depth: usize,

    /// Action items per level, besides the sub-menu opener.
    #[arg(short = 'f', long = "fan-out", default_value_t = 8)]
    fan_out: usize,

    /// Also paint the tree into an offscreen buffer once per cycle.
    #[arg(long = "paint")]
    paint: bool,
}

struct BenchConfig {
    iterations: u32,
    depth: usize,
    fan_out: usize,
    paint: bool,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if cli.iterations == 0 {
            return Err("iterations must be at least 1".to_string());
        }
        if !(1..=32).contains(&cli.depth) {
            return Err("depth must be between 1 and 32".to_string());
        }
        if !(1..=64).contains(&cli.fan_out) {
            return Err("fan-out must be between 1 and 64".to_string());
        }
        Ok(Self {
            iterations: cli.iterations,
            depth: cli.depth,
            fan_out: cli.fan_out,
            paint: cli.paint,
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;
    let stats = run_benchmark(&config).map_err(io::Error::other)?;
    println!("{}", stats.final_report(&config));
    Ok(())
}

/// `fan_out` actions followed by one opener, nested `depth` times.
fn build_level(depth: usize, fan_out: usize) -> Vec<MenuItem> {
    let mut items: Vec<MenuItem> = (0..fan_out)
        .map(|i| MenuItem::action(format!("Action {i}"), || {}))
        .collect();
    if depth > 0 {
        items.push(MenuItem::divider());
        items.push(MenuItem::submenu(
            format!("Level {depth}"),
            build_level(depth - 1, fan_out),
            MenuConfig::new().open_delay(50.0).close_delay(50.0),
        ));
    }
    items
}

fn run_benchmark(config: &BenchConfig) -> ctxmenu::Result<BenchStats> {
    let mut dom = HeadlessDom::new(VIEWPORT);
    let surface = dom.add_surface(None, Bounds::from_parts(Point::default(), VIEWPORT))?;
    let mut system = MenuSystem::new(dom);
    let root = system.attach(
        surface,
        build_level(config.depth, config.fan_out),
        MenuConfig::new(),
    );
    let area = Rect::new(0, 0, VIEWPORT.width as u16, VIEWPORT.height as u16);
    let mut buffer = Buffer::empty(area);
    let mut stats = BenchStats::new();

    for iteration in 0..config.iterations {
        let cycle_start = Instant::now();
        let point = Point::new((iteration % 40) as i32, (iteration % 12) as i32);
        system.dispatch(&MenuEvent::context_menu(surface, point))?;
        let levels = hover_to_deepest(&mut system, root, config.fan_out)?;
        if config.paint {
            buffer.reset();
            let mut frame = UiFrame::from_parts(area, &mut buffer);
            render_dom(&mut frame, system.host(), None);
        }
        let body = system.host().body();
        system.dispatch(&MenuEvent::pointer_down(body, Point::new(119, 39), PointerButton::Primary))?;
        stats.record_cycle(levels, cycle_start.elapsed());

        // Anything still bound besides the root's invocation binding leaked.
        if system.bound_listeners() != 1 || system.pending_timers() != 0 {
            stats.leaks += 1;
        }
    }
    stats.mark_completed();
    Ok(stats)
}

/// Hover the opener at each level and let its delay elapse. Returns how many
/// menus ended up open.
fn hover_to_deepest(
    system: &mut MenuSystem<HeadlessDom>,
    root: MenuId,
    fan_out: usize,
) -> ctxmenu::Result<usize> {
    let opener_index = fan_out + 1;
    let mut current = root;
    let mut levels = 1;
    while let Some(opener) = system.item_node(current, opener_index) {
        hover(system, opener)?;
        system.advance_by(50)?;
        match system.opened_child(current) {
            Some(child) => {
                current = child;
                levels += 1;
            }
            None => break,
        }
    }
    Ok(levels)
}

fn hover(system: &mut MenuSystem<HeadlessDom>, node: NodeId) -> ctxmenu::Result<()> {
    let position = system.host().bounds(node)?.origin();
    system.dispatch(&MenuEvent::pointer_enter(node, position))?;
    Ok(())
}

struct BenchStats {
    start: Instant,
    completed_at: Option<Instant>,
    cycles: u64,
    menus_opened: u64,
    leaks: u64,
    total_cycle_time: Duration,
    fastest_cycle: Duration,
    slowest_cycle: Duration,
}

impl BenchStats {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            completed_at: None,
            cycles: 0,
            menus_opened: 0,
            leaks: 0,
            total_cycle_time: Duration::ZERO,
            fastest_cycle: Duration::MAX,
            slowest_cycle: Duration::ZERO,
        }
    }

    fn elapsed(&self) -> Duration {
        match self.completed_at {
            Some(done) => done.duration_since(self.start),
            None => self.start.elapsed(),
        }
    }

    fn mark_completed(&mut self) {
        self.completed_at = Some(Instant::now());
    }

    fn record_cycle(&mut self, menus: usize, cycle_time: Duration) {
        self.cycles = self.cycles.saturating_add(1);
        self.menus_opened = self.menus_opened.saturating_add(menus as u64);
        self.total_cycle_time += cycle_time;
        self.fastest_cycle = self.fastest_cycle.min(cycle_time);
        self.slowest_cycle = self.slowest_cycle.max(cycle_time);
    }

    fn average_cycle_us(&self) -> f64 {
        if self.cycles == 0 {
            return 0.0;
        }
        (self.total_cycle_time.as_secs_f64() / self.cycles as f64) * 1_000_000.0
    }

    fn final_report(&self, config: &BenchConfig) -> String {
        let elapsed = self.elapsed().as_secs_f64();
        let per_second = |count: u64| {
            if elapsed > 0.0 {
                count as f64 / elapsed
            } else {
                0.0
            }
        };
        let (best, worst) = if self.cycles == 0 {
            (0.0, 0.0)
        } else {
            (
                self.fastest_cycle.as_secs_f64() * 1_000_000.0,
                self.slowest_cycle.as_secs_f64() * 1_000_000.0,
            )
        };

        indoc::formatdoc!(
            r#"
            ctxmenu bench: {cycles} cycles in {elapsed:.2}s
            Tree: depth {depth}, fan-out {fan_out}, paint {paint}
            Cycles/s: {cycles_per_sec:.0} | Menus opened/s: {menus_per_sec:.0}
            Avg cycle: {avg:.1} us | Best: {best:.1} us | Worst: {worst:.1} us
            Cycles with leftover listeners or timers: {leaks}
            "#,
            cycles = self.cycles,
            elapsed = elapsed,
            depth = config.depth,
            fan_out = config.fan_out,
            paint = config.paint,
            cycles_per_sec = per_second(self.cycles),
            menus_per_sec = per_second(self.menus_opened),
            avg = self.average_cycle_us(),
            best = best,
            worst = worst,
            leaks = self.leaks,
        )
    }
}
