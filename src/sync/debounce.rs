//! Debounce coalescer for raw editor changes.

use crate::editor::ChangeKind;

/// Generation number of a scheduled settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    id: TimerId,
    deadline_ms: u64,
    trigger: ChangeKind,
}

/// Collapses bursts of raw changes into a single settle.
///
/// At most one timer is pending. Every change cancels it and schedules a new
/// one with a fresh [`TimerId`], so a settle only happens after `delay_ms` of
/// quiet. The pending timer remembers the kind of the latest change.
#[derive(Debug, Clone)]
pub struct SettleDebouncer {
    delay_ms: u64,
    next_id: u64,
    pending: Option<PendingTimer>,
}

impl SettleDebouncer {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            next_id: 0,
            pending: None,
        }
    }

    /// Cancel any pending timer and schedule a new one from `now_ms`.
    pub fn schedule(&mut self, trigger: ChangeKind, now_ms: u64) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending = Some(PendingTimer {
            id,
            deadline_ms: now_ms.saturating_add(self.delay_ms),
            trigger,
        });
        id
    }

    /// The pending timer if its quiet period has elapsed at `now_ms`.
    pub fn due(&self, now_ms: u64) -> Option<TimerId> {
        let pending = self.pending?;
        (now_ms >= pending.deadline_ms).then_some(pending.id)
    }

    /// When the pending timer fires, if any.
    pub fn deadline(&self) -> Option<u64> {
        self.pending.map(|p| p.deadline_ms)
    }

    /// Clear the pending timer if it is `id`, returning the change that armed it.
    pub fn take(&mut self, id: TimerId) -> Option<ChangeKind> {
        let pending = self.pending.take_if(|p| p.id == id)?;
        Some(pending.trigger)
    }

    /// Drop the pending timer. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
