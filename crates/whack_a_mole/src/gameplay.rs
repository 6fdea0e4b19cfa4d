use core::time::Duration;

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::dispatch::HitEvent;
use crate::pool::TargetPool;
use crate::scheduler::{ScheduledAction, Scheduler};
use crate::session::{Countdown, ScoreKind, Session};
use crate::spawner::{self, GameRng, SpawnAttempt};
use crate::target::{HitOutcome, Target};

const COUNTDOWN_STEP: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum GameState {
    #[default]
    Loading,
    LoadFailed,
    Ready,
    Playing,
    Restarting,
    GameOver,
}

#[derive(Debug, Hash, PartialEq, Eq, Clone, SystemSet)]
pub enum GameplaySet {
    /// Turns pointer input into hit events
    Input,
    /// Applies hits and fires timers
    Rules,
    /// Reacts to what the rules decided
    Feedback,
}

/// A click after scoring, consumed by the feedback systems.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ScoredHit {
    pub event: HitEvent,
    pub kind: ScoreKind,
    pub points: u32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundEnded {
    pub final_score: u32,
}

/// Every rule of a round, without rendering, input devices or assets.
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<GameConfig>()
            .init_resource::<Session>()
            .init_resource::<Scheduler>()
            .init_resource::<TargetPool>()
            .init_resource::<GameRng>()
            .add_event::<HitEvent>()
            .add_event::<ScoredHit>()
            .add_event::<RoundEnded>()
            .configure_sets(
                Update,
                (
                    GameplaySet::Input,
                    GameplaySet::Rules,
                    GameplaySet::Feedback,
                )
                    .chain(),
            )
            .add_systems(OnEnter(GameState::Playing), start_round)
            .add_systems(OnExit(GameState::Playing), stop_round)
            .add_systems(OnEnter(GameState::Restarting), finish_restart_transition)
            .add_systems(
                Update,
                (apply_hits, run_timers)
                    .chain()
                    .in_set(GameplaySet::Rules)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

fn start_round(
    mut session: ResMut<Session>,
    config: Res<GameConfig>,
    mut scheduler: ResMut<Scheduler>,
) {
    scheduler.cancel_all();
    session.start(&config);
    session.finish_restart();

    let round_start = scheduler.now();
    scheduler.schedule(COUNTDOWN_STEP, ScheduledAction::CountdownTick);
    spawner::schedule_next_tick(&session, &config, &mut scheduler, round_start);
}

// Leaving a round for any reason drops every pending timer, no late timer can raise
// a target afterwards.
fn stop_round(
    mut session: ResMut<Session>,
    mut scheduler: ResMut<Scheduler>,
    mut targets: Query<&mut Target>,
) {
    session.abort();
    retract_all(&mut scheduler, &mut targets);
}

fn finish_restart_transition(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::Playing);
}

fn retract_all(scheduler: &mut Scheduler, targets: &mut Query<&mut Target>) {
    scheduler.cancel_all();
    for mut target in targets.iter_mut() {
        target.retract(scheduler);
    }
}

fn target_in_slot<'a>(
    pool: &TargetPool,
    targets: &'a mut Query<&mut Target>,
    slot: usize,
) -> Option<Mut<'a, Target>> {
    let entity = pool.target(slot)?;
    targets.get_mut(entity).ok()
}

pub fn apply_hits(
    mut hit_events: EventReader<HitEvent>,
    mut session: ResMut<Session>,
    config: Res<GameConfig>,
    pool: Res<TargetPool>,
    mut scheduler: ResMut<Scheduler>,
    mut targets: Query<&mut Target>,
    mut scored: EventWriter<ScoredHit>,
) {
    for &event in hit_events.read() {
        let kind = match event {
            HitEvent::TargetHit { slot, .. } => {
                let Some(mut target) = target_in_slot(&pool, &mut targets, slot) else {
                    warn!("Hit on slot {slot} which has no target");
                    continue;
                };
                match target.register_hit(config.hit_reaction(), &mut scheduler) {
                    HitOutcome::Struck => ScoreKind::TrueHit,
                    HitOutcome::AlreadyDown => ScoreKind::LateHit,
                }
            }
            HitEvent::BackgroundHit { .. } => ScoreKind::BackgroundHit,
            HitEvent::Miss { .. } => ScoreKind::Miss,
        };

        let points = session.award(kind, &config);
        scored.send(ScoredHit {
            event,
            kind,
            points,
        });
    }
}

pub fn run_timers(
    time: Res<Time>,
    mut scheduler: ResMut<Scheduler>,
    mut session: ResMut<Session>,
    config: Res<GameConfig>,
    pool: Res<TargetPool>,
    mut rng: ResMut<GameRng>,
    mut targets: Query<&mut Target>,
    mut round_ended: EventWriter<RoundEnded>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    scheduler.advance(time.delta());

    // Periodic ticks are rescheduled from their own deadline, so a long frame catches up
    // on every tick it skipped.
    while let Some(fired) = scheduler.pop_due() {
        match fired.action {
            ScheduledAction::Retract { slot } => {
                if let Some(mut target) = target_in_slot(&pool, &mut targets, slot) {
                    target.on_retract_timer(fired.handle, &mut scheduler);
                }
            }
            ScheduledAction::SpawnTick => {
                let picked = spawner::pick_slot(&mut rng, pool.len());
                let target = match picked {
                    Some(slot) => target_in_slot(&pool, &mut targets, slot),
                    None => None,
                };
                if let Some(mut target) = target {
                    match spawner::try_raise(&mut target, &mut rng, &session, &config, &mut scheduler)
                    {
                        SpawnAttempt::Raised { slot, active } => {
                            debug!("Raised slot {slot} for {active:?}");
                        }
                        SpawnAttempt::Occupied { slot } => {
                            debug!("Slot {slot} busy, skipping spawn tick");
                        }
                    }
                }
                spawner::schedule_next_tick(&session, &config, &mut scheduler, fired.deadline);
            }
            ScheduledAction::CountdownTick => match session.tick_countdown() {
                Countdown::Running { .. } => {
                    scheduler.schedule_after(
                        fired.deadline,
                        COUNTDOWN_STEP,
                        ScheduledAction::CountdownTick,
                    );
                }
                Countdown::Finished { final_score } => {
                    retract_all(&mut scheduler, &mut targets);
                    round_ended.send(RoundEnded { final_score });
                    next_state.set(GameState::GameOver);
                }
                Countdown::Inactive => {}
            },
        }
    }
}
