//! Menu configuration.
//!
//! Callers describe only what they want to change in a `MenuConfig`; every
//! field is optional. `MenuOptions::resolve` merges that over the literal
//! defaults once, at construction, and the resulting flat `MenuOptions` is
//! what the state machine reads for the rest of the menu's life.

use std::fmt;
use std::rc::Rc;

use crate::constants::{DEFAULT_CLOSE_DELAY_MS, DEFAULT_MENU_ID, DEFAULT_OPEN_DELAY_MS};

pub type Callback = Rc<dyn Fn()>;

/// Open/close notifications. Absent members are no-ops.
#[derive(Clone, Default)]
pub struct Callbacks {
    open: Option<Callback>,
    close: Option<Callback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single-function form: a callback that runs on open.
    pub fn on_open<F: Fn() + 'static>(f: F) -> Self {
        Self::new().with_open(f)
    }

    pub fn with_open<F: Fn() + 'static>(mut self, f: F) -> Self {
        self.open = Some(Rc::new(f));
        self
    }

    pub fn with_close<F: Fn() + 'static>(mut self, f: F) -> Self {
        self.close = Some(Rc::new(f));
        self
    }

    pub(crate) fn fire_open(&self) {
        if let Some(open) = &self.open {
            open();
        }
    }

    pub(crate) fn fire_close(&self) {
        if let Some(close) = &self.close {
            close();
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("open", &self.open.is_some())
            .field("close", &self.close.is_some())
            .finish()
    }
}

/// Whether invocation is suppressed.
#[derive(Clone, Default)]
pub enum Disabled {
    #[default]
    Never,
    Always,
    /// Evaluated on every invocation.
    When(Rc<dyn Fn() -> bool>),
}

impl Disabled {
    pub fn when<F: Fn() -> bool + 'static>(predicate: F) -> Self {
        Disabled::When(Rc::new(predicate))
    }

    pub fn is_disabled(&self) -> bool {
        match self {
            Disabled::Never => false,
            Disabled::Always => true,
            Disabled::When(predicate) => predicate(),
        }
    }
}

impl From<bool> for Disabled {
    fn from(disabled: bool) -> Self {
        if disabled {
            Disabled::Always
        } else {
            Disabled::Never
        }
    }
}

impl fmt::Debug for Disabled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disabled::Never => f.write_str("Never"),
            Disabled::Always => f.write_str("Always"),
            Disabled::When(_) => f.write_str("When(..)"),
        }
    }
}

/// Sub-menu hover delays in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delay {
    pub open_ms: u64,
    pub close_ms: u64,
}

impl Default for Delay {
    fn default() -> Self {
        Self {
            open_ms: DEFAULT_OPEN_DELAY_MS,
            close_ms: DEFAULT_CLOSE_DELAY_MS,
        }
    }
}

impl Delay {
    /// Delays a sub-menu opener uses, read straight from its config.
    pub fn from_config(config: &MenuConfig) -> Self {
        let base = Self::default();
        Self {
            open_ms: config
                .open_delay_ms
                .map(coerce_delay_ms)
                .unwrap_or(base.open_ms),
            close_ms: config
                .close_delay_ms
                .map(coerce_delay_ms)
                .unwrap_or(base.close_ms),
        }
    }
}

/// Turn an arbitrary numeric delay into something the timer queue accepts.
/// NaN, infinities and negatives become zero; fractions are truncated.
pub fn coerce_delay_ms(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    }
}

/// Like `coerce_delay_ms` for textual input; unparsable text becomes zero.
pub fn parse_delay_ms(text: &str) -> u64 {
    text.trim().parse::<f64>().map(coerce_delay_ms).unwrap_or(0)
}

/// Caller-supplied overrides. Unset fields fall back to the defaults.
#[derive(Clone, Default, Debug)]
pub struct MenuConfig {
    pub id: Option<String>,
    pub overlay: Option<bool>,
    pub transfer: Option<bool>,
    pub scrolling: Option<bool>,
    pub disabled: Option<Disabled>,
    pub no_recreate: Option<bool>,
    pub default_on_alt: Option<bool>,
    pub callbacks: Option<Callbacks>,
    pub open_delay_ms: Option<f64>,
    pub close_delay_ms: Option<f64>,
}

impl MenuConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn overlay(mut self, overlay: bool) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn transfer(mut self, transfer: bool) -> Self {
        self.transfer = Some(transfer);
        self
    }

    pub fn scrolling(mut self, scrolling: bool) -> Self {
        self.scrolling = Some(scrolling);
        self
    }

    pub fn disabled(mut self, disabled: impl Into<Disabled>) -> Self {
        self.disabled = Some(disabled.into());
        self
    }

    pub fn no_recreate(mut self, no_recreate: bool) -> Self {
        self.no_recreate = Some(no_recreate);
        self
    }

    pub fn default_on_alt(mut self, default_on_alt: bool) -> Self {
        self.default_on_alt = Some(default_on_alt);
        self
    }

    pub fn callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    pub fn on_open<F: Fn() + 'static>(mut self, f: F) -> Self {
        let callbacks = self.callbacks.take().unwrap_or_default();
        self.callbacks = Some(callbacks.with_open(f));
        self
    }

    pub fn on_close<F: Fn() + 'static>(mut self, f: F) -> Self {
        let callbacks = self.callbacks.take().unwrap_or_default();
        self.callbacks = Some(callbacks.with_close(f));
        self
    }

    pub fn open_delay(mut self, ms: f64) -> Self {
        self.open_delay_ms = Some(ms);
        self
    }

    pub fn close_delay(mut self, ms: f64) -> Self {
        self.close_delay_ms = Some(ms);
        self
    }
}

/// Flat, fully resolved configuration of one menu instance.
#[derive(Clone, Debug)]
pub struct MenuOptions {
    pub id: String,
    pub overlay: bool,
    pub transfer: bool,
    pub scrolling: bool,
    pub disabled: Disabled,
    pub no_recreate: bool,
    pub default_on_alt: bool,
    pub callbacks: Callbacks,
    pub delay: Delay,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            id: DEFAULT_MENU_ID.to_string(),
            overlay: false,
            transfer: false,
            scrolling: false,
            disabled: Disabled::Never,
            no_recreate: false,
            default_on_alt: true,
            callbacks: Callbacks::default(),
            delay: Delay::default(),
        }
    }
}

impl MenuOptions {
    pub fn resolve(config: &MenuConfig) -> Self {
        Self::merge(Self::default(), config)
    }

    /// Options for a sub-menu: its own overrides on top of the defaults, with
    /// the styling id and placement policy inherited from the parent. The
    /// overlay belongs to the root, so nested menus never request one.
    pub fn resolve_nested(parent: &MenuOptions, config: &MenuConfig) -> Self {
        let base = Self {
            id: parent.id.clone(),
            transfer: parent.transfer,
            ..Self::default()
        };
        let mut options = Self::merge(base, config);
        options.overlay = false;
        options.no_recreate = false;
        options
    }

    fn merge(base: Self, config: &MenuConfig) -> Self {
        let options = Self {
            id: config.id.clone().unwrap_or(base.id),
            overlay: config.overlay.unwrap_or(base.overlay),
            transfer: config.transfer.unwrap_or(base.transfer),
            scrolling: config.scrolling.unwrap_or(base.scrolling),
            disabled: config.disabled.clone().unwrap_or(base.disabled),
            no_recreate: config.no_recreate.unwrap_or(base.no_recreate),
            default_on_alt: config.default_on_alt.unwrap_or(base.default_on_alt),
            callbacks: config.callbacks.clone().unwrap_or(base.callbacks),
            delay: Delay::from_config(config),
        };
        if options.no_recreate && !options.overlay {
            tracing::warn!(id = %options.id, "no_recreate has no effect without overlay");
        }
        options
    }

    /// Root menus lock scrolling when they own an overlay or when scrolling
    /// was not explicitly permitted.
    pub fn locks_scroll(&self) -> bool {
        self.overlay || !self.scrolling
    }
}
