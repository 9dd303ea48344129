use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, MouseEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use super::keyboard::KeyboardNormalizer;
use super::{InputDriver, OutputDriver};
use crate::ui::UiFrame;

/// Reads crossterm events, normalizing keys and collapsing bursts of pointer
/// motion into the most recent position.
///
/// Hovering across a menu produces a move report per cell; only the last one
/// matters for enter/leave tracking. An event read past the end of a burst is
/// held back and returned next.
#[derive(Default)]
pub struct ConsoleInputDriver {
    normalizer: KeyboardNormalizer,
    held: VecDeque<Event>,
}

impl ConsoleInputDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_normalized(&mut self) -> io::Result<Event> {
        loop {
            let evt = crossterm::event::read()?;
            if let Some(normalized) = self.normalizer.normalize(evt) {
                return Ok(normalized);
            }
        }
    }

    /// Starting from `first`, pull events from `next` for as long as they are
    /// motion and return the last motion seen. The first non-motion event is
    /// held for the following read.
    fn coalesce<F>(&mut self, first: Event, mut next: F) -> io::Result<Event>
    where
        F: FnMut(&mut Self) -> io::Result<Option<Event>>,
    {
        if !is_motion(&first) {
            return Ok(first);
        }
        let mut latest = first;
        let mut skipped = 0usize;
        while let Some(evt) = next(self)? {
            if is_motion(&evt) {
                latest = evt;
                skipped += 1;
            } else {
                self.held.push_back(evt);
                break;
            }
        }
        if skipped > 0 {
            tracing::trace!(skipped, "coalesced pointer motion");
        }
        Ok(latest)
    }
}

fn is_motion(evt: &Event) -> bool {
    matches!(
        evt,
        Event::Mouse(m) if matches!(m.kind, MouseEventKind::Moved | MouseEventKind::Drag(_))
    )
}

impl InputDriver for ConsoleInputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        if !self.held.is_empty() {
            return Ok(true);
        }
        crossterm::event::poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        if let Some(evt) = self.held.pop_front() {
            return Ok(evt);
        }
        let first = self.read_normalized()?;
        self.coalesce(first, |driver| {
            if crossterm::event::poll(Duration::ZERO)? {
                driver.read_normalized().map(Some)
            } else {
                Ok(None)
            }
        })
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        if enabled {
            execute!(io::stdout(), EnableMouseCapture)
        } else {
            execute!(io::stdout(), DisableMouseCapture)
        }
    }
}

/// Alternate screen with mouse capture; restored on `exit` or drop.
pub struct ConsoleOutputDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl ConsoleOutputDriver {
    pub fn new() -> io::Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok(Self {
            terminal,
            active: false,
        })
    }

    pub fn size(&self) -> io::Result<(u16, u16)> {
        let size = self.terminal.size()?;
        Ok((size.width, size.height))
    }
}

impl OutputDriver for ConsoleOutputDriver {
    type Backend = CrosstermBackend<Stdout>;

    fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        terminal::enable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            EnterAlternateScreen,
            EnableMouseCapture
        )?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        self.active = true;
        Ok(())
    }

    /// Every restore step runs even if an earlier one fails; the first error
    /// is returned.
    fn exit(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        let steps = [
            execute!(
                self.terminal.backend_mut(),
                DisableMouseCapture,
                LeaveAlternateScreen
            ),
            terminal::disable_raw_mode(),
            self.terminal.show_cursor(),
        ];
        steps.into_iter().collect()
    }

    fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(UiFrame<'_>),
    {
        self.terminal
            .draw(move |frame| f(UiFrame::new(frame)))
            .map(|_| ())
    }
}

impl Drop for ConsoleOutputDriver {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}
