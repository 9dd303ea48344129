//! Reference-counted page scroll suspension.
//!
//! The first acquire remembers whether scrolling was enabled and disables
//! it; the last release restores what was remembered. Only root menus
//! acquire, so nested sub-menus never touch the count.

use crate::host::Host;

#[derive(Debug, Default)]
pub struct ScrollLock {
    holders: usize,
    restore_to: Option<bool>,
}

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.holders == 0 {
            let previous = host.scrolling_enabled();
            self.restore_to = Some(previous);
            host.set_scrolling_enabled(false);
            tracing::debug!(previous, "scroll locked");
        }
        self.holders += 1;
    }

    /// Extra releases are ignored.
    pub fn release<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.holders == 0 {
            return;
        }
        self.holders -= 1;
        if self.holders == 0
            && let Some(previous) = self.restore_to.take()
        {
            host.set_scrolling_enabled(previous);
            tracing::debug!(restored = previous, "scroll unlocked");
        }
    }

    /// Drop every holder at once and restore the remembered state.
    pub fn reset<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.holders == 0 {
            return;
        }
        self.holders = 1;
        self.release(host);
    }

    pub fn is_locked(&self) -> bool {
        self.holders > 0
    }

    pub fn holders(&self) -> usize {
        self.holders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::HeadlessDom;
    use crate::geometry::Size;

    #[test]
    fn nested_acquire_restores_only_on_last_release() {
        let mut dom = HeadlessDom::new(Size::new(80, 24));
        let mut lock = ScrollLock::new();
        lock.acquire(&mut dom);
        lock.acquire(&mut dom);
        assert!(!dom.scrolling_enabled());
        lock.release(&mut dom);
        assert!(!dom.scrolling_enabled());
        lock.release(&mut dom);
        assert!(dom.scrolling_enabled());
        assert!(!lock.is_locked());
    }

    #[test]
    fn restores_previous_disabled_state() {
        let mut dom = HeadlessDom::new(Size::new(80, 24));
        dom.set_scrolling_enabled(false);
        let mut lock = ScrollLock::new();
        lock.acquire(&mut dom);
        lock.release(&mut dom);
        assert!(!dom.scrolling_enabled());
        lock.release(&mut dom);
        assert_eq!(lock.holders(), 0);
    }

    #[test]
    fn reset_restores_regardless_of_holder_count() {
        let mut dom = HeadlessDom::new(Size::new(80, 24));
        let mut lock = ScrollLock::new();
        lock.acquire(&mut dom);
        lock.acquire(&mut dom);
        lock.reset(&mut dom);
        assert!(!lock.is_locked());
        assert!(dom.scrolling_enabled());
        lock.reset(&mut dom);
        assert!(dom.scrolling_enabled());
    }
}
