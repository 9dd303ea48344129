use crossterm::event::{Event, KeyCode, KeyEventKind};

/// Filters terminal key reports down to one event per physical press.
///
/// Terminals with the kitty protocol (and Windows consoles) report releases
/// and auto-repeats. A held Escape would otherwise close a menu and then
/// close the next one the user opens before letting go.
#[derive(Debug, Default)]
pub struct KeyboardNormalizer {
    esc_down: bool,
}

impl KeyboardNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&mut self, evt: Event) -> Option<Event> {
        let Event::Key(key) = evt else {
            return Some(evt);
        };
        match key.kind {
            KeyEventKind::Release => {
                if key.code == KeyCode::Esc {
                    self.esc_down = false;
                }
                return None;
            }
            KeyEventKind::Repeat => return None,
            KeyEventKind::Press => {}
        }
        if key.code == KeyCode::Esc {
            if self.esc_down && cfg!(windows) {
                return None;
            }
            self.esc_down = true;
        } else {
            self.esc_down = false;
        }
        Some(Event::Key(key))
    }
}
