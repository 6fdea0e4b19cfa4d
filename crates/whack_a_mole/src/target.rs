use core::time::Duration;

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::scheduler::{ScheduledAction, Scheduler, TimerHandle};

/// One mole slot of the play field.
///
/// A target is either hidden, up (`enabled`) waiting for a click, or sinking after a
/// `hit`. Up and hit are never both set. Each state owns at most one pending retraction
/// timer; every transition cancels the previous one before scheduling its own.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Target {
    slot: usize,
    base_position: Vec3,
    enabled: bool,
    hit: bool,
    pending_retract: Option<TimerHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// The target was up and is now sinking
    Struck,
    /// The target was already down, nothing changed
    AlreadyDown,
}

impl Target {
    pub const fn new(slot: usize, base_position: Vec3) -> Self {
        Self {
            slot,
            base_position,
            enabled: false,
            hit: false,
            pending_retract: None,
        }
    }

    pub const fn slot(&self) -> usize {
        self.slot
    }

    pub const fn base_position(&self) -> Vec3 {
        self.base_position
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub const fn is_hit(&self) -> bool {
        self.hit
    }

    /// Neither up nor sinking, the spawner may raise it.
    pub const fn is_idle(&self) -> bool {
        !self.enabled && !self.hit
    }

    pub fn offset_y(&self, config: &GameConfig) -> f32 {
        config.offset_for(self.enabled, self.hit)
    }

    /// When the target will retract on its own, if a retraction is pending.
    pub fn active_deadline(&self, scheduler: &Scheduler) -> Option<Duration> {
        self.pending_retract
            .and_then(|handle| scheduler.deadline(handle))
    }

    /// Raises an idle target for `active`. Returns `false` and changes nothing when the
    /// target is already up or still sinking.
    pub fn enable(&mut self, active: Duration, scheduler: &mut Scheduler) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.enabled = true;
        self.replace_retract_timer(scheduler, active);
        true
    }

    /// Strikes the target. Only a raised target reacts: it sinks and retracts after
    /// `reaction`, its active retraction timer is cancelled.
    pub fn register_hit(&mut self, reaction: Duration, scheduler: &mut Scheduler) -> HitOutcome {
        if !self.enabled {
            return HitOutcome::AlreadyDown;
        }
        self.enabled = false;
        self.hit = true;
        self.replace_retract_timer(scheduler, reaction);
        HitOutcome::Struck
    }

    /// Hides the target and drops any pending timer. Returns whether anything changed.
    pub fn retract(&mut self, scheduler: &mut Scheduler) -> bool {
        if let Some(handle) = self.pending_retract.take() {
            scheduler.cancel(handle);
        }
        let changed = self.enabled || self.hit;
        self.enabled = false;
        self.hit = false;
        changed
    }

    /// Handles a fired retraction timer. Timers that no longer belong to the current
    /// state are ignored.
    pub fn on_retract_timer(&mut self, handle: TimerHandle, scheduler: &mut Scheduler) -> bool {
        if self.pending_retract != Some(handle) {
            debug!("Ignoring stale retraction of slot {}", self.slot);
            return false;
        }
        self.pending_retract = None;
        self.retract(scheduler)
    }

    fn replace_retract_timer(&mut self, scheduler: &mut Scheduler, delay: Duration) {
        if let Some(previous) = self.pending_retract.take() {
            scheduler.cancel(previous);
        }
        let handle = scheduler.schedule(delay, ScheduledAction::Retract { slot: self.slot });
        self.pending_retract = Some(handle);
    }
}
