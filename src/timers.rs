//! Cancelable delayed tasks on a logical millisecond clock.
//!
//! The queue never sleeps. Hosts report the current time through
//! `MenuSystem::advance_to`, which pops due tasks in (due time, scheduling
//! order) order and runs them.

use crate::menu::MenuId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    OpenSubmenu { index: usize },
    CloseSubmenu { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    pub id: TimerId,
    pub due_ms: u64,
    pub owner: MenuId,
    pub kind: TimerKind,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    tasks: Vec<Task>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, owner: MenuId, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            due_ms,
            owner,
            kind,
        });
        tracing::trace!(timer = ?id, due_ms, menu = ?owner, ?kind, "scheduled timer");
        id
    }

    /// Safe to call for tasks that already fired or were already canceled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let removed = before != self.tasks.len();
        if removed {
            tracing::trace!(timer = ?id, "canceled timer");
        }
        removed
    }

    pub fn cancel_owned_by(&mut self, owner: MenuId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.owner != owner);
        before - self.tasks.len()
    }

    /// Remove and return the earliest task due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Task> {
        let index = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due_ms <= now_ms)
            .min_by_key(|(_, task)| (task.due_ms, task.id))
            .map(|(index, _)| index)?;
        Some(self.tasks.remove(index))
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.tasks.iter().any(|task| task.id == id)
    }

    pub fn next_due(&self) -> Option<u64> {
        self.tasks.iter().map(|task| task.due_ms).min()
    }

    pub fn pending(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
