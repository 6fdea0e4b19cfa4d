use core::ops::RangeInclusive;
use core::time::Duration;

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::scheduler::{ScheduledAction, Scheduler, TimerHandle};
use crate::session::Session;
use crate::target::Target;

/// Random source of the round, seedable so rounds can be replayed in tests.
#[derive(Resource, Deref, DerefMut)]
pub struct GameRng(pub fastrand::Rng);

impl Default for GameRng {
    fn default() -> Self {
        Self(fastrand::Rng::new())
    }
}

impl GameRng {
    pub fn with_seed(seed: u64) -> Self {
        Self(fastrand::Rng::with_seed(seed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnAttempt {
    Raised { slot: usize, active: Duration },
    /// The picked slot was up or sinking, the tick is skipped
    Occupied { slot: usize },
}

/// Uniform pick over the pool, `None` for an empty pool.
pub fn pick_slot(rng: &mut fastrand::Rng, pool_size: usize) -> Option<usize> {
    (pool_size > 0).then(|| rng.usize(0..pool_size))
}

/// Bounds of the time a target stays up, shifted by the current difficulty.
pub fn active_duration_range(session: &Session, config: &GameConfig) -> RangeInclusive<u32> {
    let shift = session.speed_base_ms(config);
    let floor = config.active_duration_floor_ms as i64;
    let low = (config.active_duration_min_ms as i64 + shift).max(floor);
    let high = (config.active_duration_max_ms as i64 + shift).max(low);
    (low as u32)..=(high as u32)
}

/// A single spawn attempt on the picked target, there is no retry on another slot.
pub fn try_raise(
    target: &mut Target,
    rng: &mut fastrand::Rng,
    session: &Session,
    config: &GameConfig,
    scheduler: &mut Scheduler,
) -> SpawnAttempt {
    let slot = target.slot();
    if !target.is_idle() {
        return SpawnAttempt::Occupied { slot };
    }
    let active = Duration::from_millis(rng.u32(active_duration_range(session, config)) as u64);
    target.enable(active, scheduler);
    SpawnAttempt::Raised { slot, active }
}

/// Schedules the following tick while the round lasts, one cadence after `from`.
///
/// `from` is the deadline of the tick being handled, or the round start for the first
/// one.
pub fn schedule_next_tick(
    session: &Session,
    config: &GameConfig,
    scheduler: &mut Scheduler,
    from: Duration,
) -> Option<TimerHandle> {
    session.is_active().then(|| {
        scheduler.schedule_after(
            from,
            session.next_spawn_delay(config),
            ScheduledAction::SpawnTick,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ScoreKind;

    fn started(config: &GameConfig) -> Session {
        let mut session = Session::default();
        session.start(config);
        session
    }

    #[test]
    fn picks_stay_in_the_pool() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..200 {
            let slot = pick_slot(&mut rng, 9);
            assert!(slot.is_some_and(|slot| slot < 9), "slot {slot:?} out of range");
        }
        assert_eq!(pick_slot(&mut rng, 0), None, "empty pool");
    }

    #[test]
    fn active_range_tracks_difficulty() {
        let config = GameConfig::default();
        let mut session = started(&config);
        assert_eq!(active_duration_range(&session, &config), 200..=3000, "base range");

        for _ in 0..10 {
            session.award(ScoreKind::TrueHit, &config);
        }
        assert_eq!(
            active_duration_range(&session, &config),
            150..=2950,
            "shifted by the 50 ms difficulty"
        );
    }

    #[test]
    fn active_range_is_floored() {
        let config = GameConfig {
            spawn_interval_base_ms: 2000,
            spawn_interval_step_ms: 500,
            spawn_interval_floor_ms: 200,
            ..GameConfig::default()
        };
        let mut session = started(&config);
        for _ in 0..4 {
            session.award(ScoreKind::TrueHit, &config);
        }
        // -1800 ms shift
        assert_eq!(
            active_duration_range(&session, &config),
            100..=1200,
            "low bound clamped to the floor"
        );
    }

    #[test]
    fn raises_idle_targets_only() {
        let config = GameConfig::default();
        let session = started(&config);
        let mut scheduler = Scheduler::default();
        let mut rng = fastrand::Rng::with_seed(1);
        let mut target = Target::new(4, Vec3::ZERO);

        let attempt = try_raise(&mut target, &mut rng, &session, &config, &mut scheduler);
        let SpawnAttempt::Raised { slot, active } = attempt else {
            panic!("idle target not raised: {attempt:?}");
        };
        assert_eq!(slot, 4, "slot reported");
        assert!(
            (200..=3000).contains(&active.as_millis()),
            "active time {active:?} out of range"
        );
        assert!(target.is_enabled(), "target up");

        assert_eq!(
            try_raise(&mut target, &mut rng, &session, &config, &mut scheduler),
            SpawnAttempt::Occupied { slot: 4 },
            "busy slot skipped"
        );
        assert_eq!(scheduler.pending(), 1, "single retraction timer");
    }

    #[test]
    fn ticks_stop_with_the_round() {
        let config = GameConfig::default();
        let mut session = started(&config);
        let mut scheduler = Scheduler::default();

        assert!(
            schedule_next_tick(&session, &config, &mut scheduler, Duration::ZERO).is_some(),
            "active round reschedules"
        );
        session.abort();
        assert!(
            schedule_next_tick(&session, &config, &mut scheduler, Duration::ZERO).is_none(),
            "ended round does not"
        );
        assert_eq!(scheduler.pending(), 1, "only the first tick is queued");
    }

    #[test]
    fn next_tick_counts_from_the_fired_deadline() {
        let config = GameConfig::default();
        let session = started(&config);
        let mut scheduler = Scheduler::default();
        scheduler.advance(Duration::from_millis(950));

        let handle = schedule_next_tick(
            &session,
            &config,
            &mut scheduler,
            Duration::from_millis(800),
        );
        assert_eq!(
            handle.and_then(|handle| scheduler.deadline(handle)),
            Some(Duration::from_millis(1600)),
            "late frame does not delay the cadence"
        );
    }
}
