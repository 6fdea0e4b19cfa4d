use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use whack_helpers::input::just_pressed_screen_position;
use whack_helpers::restart::{handle_restart, request_restart, sync_restart_button};

use crate::dispatch::dispatch_clicks;
use crate::gameplay::{GameState, GameplaySet};
use crate::session::Session;

#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum Action {
    Start,
    Restart,
}

pub fn create_input_map() -> InputMap<Action> {
    let mut input_map = InputMap::default();

    input_map.insert(Action::Start, KeyCode::Space);
    input_map.insert(Action::Start, KeyCode::Enter);
    input_map.insert(Action::Start, GamepadButton::South);
    input_map.insert(Action::Restart, KeyCode::KeyR);
    input_map.insert(Action::Restart, GamepadButton::Start);

    input_map
}

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<Action>::default())
            .add_systems(Startup, spawn_controls)
            .add_systems(Update, start_round.run_if(in_state(GameState::Ready)))
            .add_systems(
                Update,
                dispatch_clicks
                    .in_set(GameplaySet::Input)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (
                    restart_round,
                    handle_restart::<Session>,
                    sync_restart_button::<Session>,
                )
                    .run_if(in_state(GameState::Playing).or(in_state(GameState::GameOver))),
            );
    }
}

fn spawn_controls(mut commands: Commands) {
    commands.spawn((
        Name::new("Controls"),
        InputManagerBundle::<Action> {
            input_map: create_input_map(),
            ..default()
        },
    ));
}

fn start_round(
    actions: Query<&ActionState<Action>>,
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let pressed_start = actions
        .iter()
        .any(|action_state| action_state.just_pressed(&Action::Start));
    // Leafwing does not map touches, pointers are read directly
    let tapped = just_pressed_screen_position(&buttons, &touches, &windows).is_some();

    if pressed_start || tapped {
        next_state.set(GameState::Playing);
    }
}

fn restart_round(
    actions: Query<&ActionState<Action>>,
    mut session: ResMut<Session>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if actions
        .iter()
        .any(|action_state| action_state.just_pressed(&Action::Restart))
    {
        request_restart(&mut *session, &mut *next_state);
    }
}
