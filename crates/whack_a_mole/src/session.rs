use core::time::Duration;

use bevy::prelude::*;
use whack_helpers::restart::Restartable;

use crate::config::{GameConfig, MissPolicy};
use crate::gameplay::GameState;

/// What a resolved click amounts to for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    /// A raised target was struck
    TrueHit,
    /// A target that was no longer up was clicked
    LateHit,
    BackgroundHit,
    Miss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Running { remaining: u32 },
    /// The round just ended, this is reported exactly once per round
    Finished { final_score: u32 },
    Inactive,
}

/// One timed round: countdown, score and spawner cadence.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    remaining_seconds: u32,
    score: u32,
    spawn_interval_ms: u32,
    active: bool,
    rounds_started: u32,
    restart_in_flight: bool,
}

impl Session {
    pub fn start(&mut self, config: &GameConfig) {
        self.remaining_seconds = config.round_seconds;
        self.score = 0;
        self.spawn_interval_ms = config.spawn_interval_base_ms;
        self.active = true;
        self.rounds_started += 1;
        info!(
            "Round {} started: {} s",
            self.rounds_started, self.remaining_seconds
        );
    }

    /// Ends the round early without reporting a final score.
    pub fn abort(&mut self) {
        if self.active {
            info!("Round {} aborted", self.rounds_started);
        }
        self.active = false;
    }

    pub const fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub const fn score(&self) -> u32 {
        self.score
    }

    pub const fn spawn_interval_ms(&self) -> u32 {
        self.spawn_interval_ms
    }

    pub const fn is_active(&self) -> bool {
        self.active
    }

    pub const fn rounds_started(&self) -> u32 {
        self.rounds_started
    }

    pub fn tick_countdown(&mut self) -> Countdown {
        if !self.active {
            return Countdown::Inactive;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return Countdown::Running {
                remaining: self.remaining_seconds,
            };
        }
        self.active = false;
        info!("Round {} over, score {}", self.rounds_started, self.score);
        Countdown::Finished {
            final_score: self.score,
        }
    }

    /// Applies the scoring rules and returns the points awarded. Nothing is awarded
    /// outside of a round.
    pub fn award(&mut self, kind: ScoreKind, config: &GameConfig) -> u32 {
        if !self.active {
            return 0;
        }
        let rules = &config.scoring;
        let points = match kind {
            ScoreKind::TrueHit => {
                self.spawn_interval_ms = self
                    .spawn_interval_ms
                    .saturating_sub(config.spawn_interval_step_ms)
                    .max(config.spawn_interval_floor_ms);
                rules.true_hit
            }
            ScoreKind::LateHit => rules.late_hit.unwrap_or(0),
            ScoreKind::BackgroundHit => rules.background_hit,
            ScoreKind::Miss => match rules.miss {
                MissPolicy::NoScore => 0,
                MissPolicy::StylePoints(points) => points,
            },
        };
        self.score = self.score.saturating_add(points);
        points
    }

    /// Delay before the next spawner tick: the current interval minus a score derived
    /// speedup, never below the configured floor.
    pub fn next_spawn_delay(&self, config: &GameConfig) -> Duration {
        let speedup = self.score / config.score_speedup_divisor.max(1);
        let delay = self
            .spawn_interval_ms
            .saturating_sub(speedup)
            .max(config.spawn_interval_floor_ms);
        Duration::from_millis(delay as u64)
    }

    /// Difficulty shift applied to active durations, zero at the start of a round and
    /// negative as the cadence tightens.
    pub fn speed_base_ms(&self, config: &GameConfig) -> i64 {
        self.spawn_interval_ms as i64 - config.spawn_interval_base_ms as i64
    }

    pub fn finish_restart(&mut self) {
        self.restart_in_flight = false;
    }
}

impl Restartable for Session {
    type State = GameState;

    fn begin_restart(&mut self) -> bool {
        if self.restart_in_flight {
            return false;
        }
        self.restart_in_flight = true;
        true
    }

    fn restart_in_flight(&self) -> bool {
        self.restart_in_flight
    }

    fn restart_state() -> Self::State {
        GameState::Restarting
    }
}
