use std::io;
use std::time::{Duration, Instant};

use crossterm::event::Event;

use crate::drivers::InputDriver;

pub enum ControlFlow {
    Continue,
    Quit,
}

/// What the loop hands to its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    Input(Event),
    /// Start of a loop iteration. `now_ms` is time since the loop started,
    /// which is what the menu timers run on.
    Tick { now_ms: u64 },
}

/// The demo's main loop: emits a tick at the top of every iteration, then
/// waits up to the poll interval for input and hands it to the handler. The
/// loop never blocks longer than one interval, so sub-menu delays fire even
/// while the mouse is still.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
    started: Instant,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
            started: Instant::now(),
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Run until the handler returns `ControlFlow::Quit`.
    ///
    /// Every iteration starts with a tick, then drains all queued input so a
    /// burst of mouse motion does not fall behind the redraw.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, LoopEvent) -> io::Result<ControlFlow>,
    {
        loop {
            let tick = LoopEvent::Tick {
                now_ms: self.elapsed_ms(),
            };
            if let ControlFlow::Quit = handler(&mut self.driver, tick)? {
                return Ok(());
            }

            if self.driver.poll(self.poll_interval)? {
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, LoopEvent::Input(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
    }
}
