use core::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use whack_a_mole_3d::config::GameConfig;
use whack_a_mole_3d::dispatch::HitEvent;
use whack_a_mole_3d::gameplay::RoundEnded;
use whack_a_mole_3d::pool::TargetPool;
use whack_a_mole_3d::scheduler::{ScheduledAction, Scheduler};
use whack_a_mole_3d::session::Session;
use whack_a_mole_3d::spawner::GameRng;
use whack_a_mole_3d::target::Target;
use whack_a_mole_3d::{CorePlugin, GameState};
use whack_helpers::restart::request_restart;

const STEP: Duration = Duration::from_millis(100);

fn build_app(config: GameConfig) -> App {
    build_app_with_step(config, STEP)
}

// Headless app with one model-less target per slot. The first update has a zero delta.
fn build_app_with_step(config: GameConfig, step: Duration) -> App {
    let positions: Vec<Vec3> = config.slot_positions().collect();

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(step))
        .insert_resource(config)
        .insert_resource(GameRng::with_seed(42))
        .add_plugins(CorePlugin);

    for position in positions {
        let entity = app.world_mut().spawn_empty().id();
        let slot = app
            .world_mut()
            .resource_mut::<TargetPool>()
            .push_target(entity);
        app.world_mut()
            .entity_mut(entity)
            .insert(Target::new(slot, position));
    }
    app
}

// No spawner tick during the first seconds, so only the test raises targets
fn quiet_config() -> GameConfig {
    GameConfig {
        spawn_interval_base_ms: 10_000,
        ..GameConfig::default()
    }
}

fn start(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Playing);
    app.update();
    assert_eq!(state(app), GameState::Playing, "round started");
}

fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

fn target(app: &App, slot: usize) -> Target {
    let entity = app
        .world()
        .resource::<TargetPool>()
        .target(slot)
        .expect("slot exists");
    app.world()
        .get::<Target>(entity)
        .expect("slot has a target")
        .clone()
}

fn raise(app: &mut App, slot: usize, active: Duration) {
    let entity = app
        .world()
        .resource::<TargetPool>()
        .target(slot)
        .expect("slot exists");
    app.world_mut()
        .resource_scope(|world, mut scheduler: Mut<Scheduler>| {
            let mut target = world.get_mut::<Target>(entity).expect("slot has a target");
            assert!(target.enable(active, &mut scheduler), "slot {slot} raised");
        });
}

fn raised_slots(app: &App) -> Vec<usize> {
    let len = app.world().resource::<TargetPool>().len();
    (0..len)
        .filter(|&slot| target(app, slot).is_enabled())
        .collect()
}

fn pending(app: &App, predicate: impl Fn(&ScheduledAction) -> bool) -> usize {
    app.world().resource::<Scheduler>().count_matching(predicate)
}

// Fast spawner, targets stay up long enough to outlive several ticks
fn spawning_config() -> GameConfig {
    GameConfig {
        spawn_interval_base_ms: 300,
        active_duration_min_ms: 2_000,
        active_duration_max_ms: 3_000,
        ..GameConfig::default()
    }
}

fn score(app: &App) -> u32 {
    app.world().resource::<Session>().score()
}

#[test]
fn true_hit_then_late_hit_on_slot_three() {
    let mut app = build_app(quiet_config());
    start(&mut app);
    raise(&mut app, 3, Duration::from_millis(1500));

    let point = Vec3::new(-23.0, 0.0, 3.0);
    app.world_mut()
        .send_event(HitEvent::TargetHit { slot: 3, point });
    app.update();

    assert_eq!(score(&app), 100, "true hit scores");
    assert_eq!(
        app.world().resource::<Session>().spawn_interval_ms(),
        9_995,
        "cadence tightened"
    );
    let struck = target(&app, 3);
    assert!(struck.is_hit() && !struck.is_enabled(), "slot 3 sinking");

    app.world_mut()
        .send_event(HitEvent::TargetHit { slot: 3, point });
    app.update();
    assert_eq!(score(&app), 100, "late hits score nothing by default");

    for _ in 0..5 {
        app.update();
    }
    assert!(target(&app, 3).is_idle(), "hidden after the hit reaction");
    assert_eq!(
        app.world()
            .resource::<Scheduler>()
            .count_matching(|action| matches!(action, ScheduledAction::Retract { .. })),
        0,
        "active timer was cancelled by the hit"
    );
}

#[test]
fn background_and_miss_clicks() {
    let mut app = build_app(quiet_config());
    start(&mut app);

    app.world_mut()
        .send_event(HitEvent::BackgroundHit { point: Vec3::ZERO });
    app.world_mut().send_event(HitEvent::Miss {
        point: Vec3::new(0.0, 0.0, 200.0),
    });
    app.update();

    assert_eq!(score(&app), 1, "one point for the background, none for the miss");
    assert_eq!(
        app.world().resource::<Session>().spawn_interval_ms(),
        10_000,
        "cadence unchanged"
    );
}

#[test]
fn unhit_target_retracts_when_its_time_is_up() {
    let mut app = build_app(quiet_config());
    start(&mut app);
    raise(&mut app, 0, Duration::from_millis(300));

    app.update();
    assert!(target(&app, 0).is_enabled(), "still up");
    for _ in 0..3 {
        app.update();
    }
    assert!(target(&app, 0).is_idle(), "retracted by its own timer");
    assert_eq!(score(&app), 0, "nothing scored");
}

#[test]
fn double_restart_request_resets_once() {
    let mut app = build_app(GameConfig::default());
    start(&mut app);
    raise(&mut app, 5, Duration::from_secs(3));

    let accepted = app
        .world_mut()
        .resource_scope(|world, mut session: Mut<Session>| {
            let mut next_state = world.resource_mut::<NextState<GameState>>();
            (
                request_restart(&mut *session, &mut *next_state),
                request_restart(&mut *session, &mut *next_state),
            )
        });
    assert_eq!(accepted, (true, false), "second request refused");

    app.update();
    assert_ne!(state(&app), GameState::GameOver, "restart is not a game over");
    app.update();
    assert_eq!(state(&app), GameState::Playing, "back in a round");
    assert!(target(&app, 5).is_idle(), "targets retracted by the restart");

    let session = app.world().resource::<Session>();
    assert_eq!(session.rounds_started(), 2, "exactly one reset");
    assert_eq!(session.remaining_seconds(), 30, "countdown reset");
    assert_eq!(session.score(), 0, "score reset");

    let scheduler = app.world().resource::<Scheduler>();
    assert_eq!(
        scheduler.count_matching(|action| *action == ScheduledAction::SpawnTick),
        1,
        "single spawner chain"
    );
    assert_eq!(
        scheduler.count_matching(|action| *action == ScheduledAction::CountdownTick),
        1,
        "single countdown"
    );
}

#[test]
fn round_ends_after_thirty_seconds() {
    let mut app = build_app(GameConfig::default());
    start(&mut app);

    let mut updates = 0;
    while state(&app) == GameState::Playing {
        app.update();
        updates += 1;
        assert!(updates < 400, "round never ended");
    }
    assert_eq!(state(&app), GameState::GameOver, "game over screen");

    let elapsed = app.world().resource::<Scheduler>().now();
    assert!(
        elapsed >= Duration::from_secs(30),
        "ended after {elapsed:?}, before the countdown ran out"
    );
    assert!(
        elapsed < Duration::from_secs(30) + STEP,
        "ended after {elapsed:?}, the countdown lagged behind the clock"
    );

    let events = app.world().resource::<Events<RoundEnded>>();
    let ended: Vec<RoundEnded> = events.get_cursor().read(events).copied().collect();
    let final_score = app.world().resource::<Session>().score();
    assert_eq!(ended, vec![RoundEnded { final_score }], "reported exactly once");

    let pool = app.world().resource::<TargetPool>();
    for slot in 0..pool.len() {
        assert!(target(&app, slot).is_idle(), "slot {slot} retracted");
    }
    assert_eq!(
        app.world().resource::<Scheduler>().pending(),
        0,
        "no timer survives the round"
    );
    assert!(!app.world().resource::<Session>().is_active(), "session inactive");
}

#[test]
fn round_length_does_not_depend_on_the_frame_time() {
    // 300 ms frames never land on a whole second
    let step = Duration::from_millis(300);
    let mut app = build_app_with_step(quiet_config(), step);
    start(&mut app);

    for _ in 0..99 {
        app.update();
    }
    assert_eq!(state(&app), GameState::Playing, "still playing at 29.7 s");
    assert_eq!(
        app.world().resource::<Session>().remaining_seconds(),
        1,
        "one tick per elapsed second"
    );

    app.update();
    assert_eq!(
        app.world().resource::<Scheduler>().now(),
        Duration::from_secs(30),
        "thirty seconds of game time"
    );
    assert!(
        !app.world().resource::<Session>().is_active(),
        "countdown ran out on time"
    );

    app.update();
    assert_eq!(state(&app), GameState::GameOver, "game over screen");
}

#[test]
fn spawn_tick_raises_one_idle_target() {
    let mut app = build_app(spawning_config());
    start(&mut app);

    app.update();
    app.update();
    assert!(raised_slots(&app).is_empty(), "first tick not due yet");

    app.update();
    assert_eq!(raised_slots(&app).len(), 1, "exactly one target up after the first tick");
    assert_eq!(
        pending(&app, |action| matches!(action, ScheduledAction::Retract { .. })),
        1,
        "raised target will retract on its own"
    );
    assert_eq!(
        pending(&app, |action| *action == ScheduledAction::SpawnTick),
        1,
        "next tick queued"
    );
}

#[test]
fn spawn_tick_skips_an_occupied_slot() {
    let mut app = build_app(GameConfig {
        slots: vec![[0.0, 0.0, 0.0]],
        ..spawning_config()
    });
    start(&mut app);
    raise(&mut app, 0, Duration::from_secs(5));

    // Ticks at 300, 600 and 900 ms all pick the only slot
    for _ in 0..9 {
        app.update();
    }
    assert!(target(&app, 0).is_enabled(), "still up from the first raise");
    assert_eq!(
        pending(&app, |action| matches!(action, ScheduledAction::Retract { .. })),
        1,
        "skipped ticks did not raise it again"
    );
    assert_eq!(
        pending(&app, |action| *action == ScheduledAction::SpawnTick),
        1,
        "the spawner keeps ticking after a skip"
    );
}
