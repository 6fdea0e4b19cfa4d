//! Game clock with cancellable one shot timers.
//!
//! Every delayed transition of a round (target retraction, spawner cadence, countdown)
//! goes through the [`Scheduler`]. Timers fire strictly in deadline order, ties in the
//! order they were scheduled, and a cancelled timer never fires.

use core::time::Duration;
use std::collections::{BTreeMap, HashMap};

use bevy::prelude::*;

/// Cancellation token returned by [`Scheduler::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    /// Hide the target in `slot`
    Retract { slot: usize },
    /// Try to raise a random target
    SpawnTick,
    /// One second of the round has elapsed
    CountdownTick,
}

/// A timer taken off the queue by [`Scheduler::pop_due`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub handle: TimerHandle,
    /// When the timer was due, at or before the current clock
    pub deadline: Duration,
    pub action: ScheduledAction,
}

#[derive(Resource, Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), ScheduledAction>,
    deadlines: HashMap<u64, Duration>,
}

impl Scheduler {
    pub const fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, action: ScheduledAction) -> TimerHandle {
        self.schedule_after(self.now, delay, action)
    }

    /// Schedules relative to `from` instead of the clock.
    ///
    /// Periodic timers pass the deadline that just fired, so a late frame does not push
    /// every following tick back.
    pub fn schedule_after(
        &mut self,
        from: Duration,
        delay: Duration,
        action: ScheduledAction,
    ) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;

        let deadline = from + delay;
        self.queue.insert((deadline, id), action);
        self.deadlines.insert(id, deadline);
        TimerHandle(id)
    }

    /// Returns `false` when the timer already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let Some(deadline) = self.deadlines.remove(&handle.0) else {
            return false;
        };
        self.queue.remove(&(deadline, handle.0)).is_some()
    }

    pub fn cancel_all(&mut self) {
        if !self.queue.is_empty() {
            tracing::debug!("Cancelling {} pending timers", self.queue.len());
        }
        self.queue.clear();
        self.deadlines.clear();
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.deadlines.contains_key(&handle.0)
    }

    pub fn deadline(&self, handle: TimerHandle) -> Option<Duration> {
        self.deadlines.get(&handle.0).copied()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn count_matching(&self, predicate: impl Fn(&ScheduledAction) -> bool) -> usize {
        self.queue.values().filter(|action| predicate(action)).count()
    }

    pub fn advance(&mut self, delta: Duration) {
        self.now += delta;
    }

    /// Pops the earliest timer whose deadline has passed.
    ///
    /// Call it in a loop after [`Scheduler::advance`]: timers cancelled or scheduled by
    /// the handling of an earlier one are taken into account.
    pub fn pop_due(&mut self) -> Option<FiredTimer> {
        let (&(deadline, id), _) = self.queue.first_key_value()?;
        if deadline > self.now {
            return None;
        }
        let action = self.queue.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        Some(FiredTimer {
            handle: TimerHandle(id),
            deadline,
            action,
        })
    }
}
