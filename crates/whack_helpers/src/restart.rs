use bevy::prelude::*;
use bevy::state::state::FreelyMutableState;

#[derive(Component)]
pub struct RestartButton;

#[derive(Component)]
pub struct CleanupMarker;

/// A resource owning a round that can be restarted from the UI or the keyboard.
///
/// A restart is a transition through [`Restartable::restart_state`]. While it is in
/// flight every further request is refused, so a double click can never reset the
/// round twice.
pub trait Restartable: Resource {
    type State: States + FreelyMutableState;

    /// Marks a restart as started, returns `false` when one is already in flight.
    fn begin_restart(&mut self) -> bool;
    fn restart_in_flight(&self) -> bool;
    fn restart_state() -> Self::State;
}

/// Requests a restart, returns whether the transition was scheduled.
pub fn request_restart<T: Restartable>(
    restartable: &mut T,
    next_state: &mut NextState<T::State>,
) -> bool {
    if !restartable.begin_restart() {
        debug!("Restart already in flight, ignoring request");
        return false;
    }
    next_state.set(T::restart_state());
    true
}

pub fn handle_restart<T: Restartable>(
    mut next_state: ResMut<NextState<T::State>>,
    mut restartable: ResMut<T>,
    interaction_query: Query<&Interaction, (Changed<Interaction>, With<RestartButton>)>,
) {
    for interaction in &interaction_query {
        if *interaction == Interaction::Pressed {
            request_restart(&mut *restartable, &mut *next_state);
        }
    }
}

// The button stays hidden (and therefore unclickable) until the transition completes
pub fn sync_restart_button<T: Restartable>(
    restartable: Res<T>,
    mut buttons: Query<&mut Visibility, With<RestartButton>>,
) {
    let visibility = if restartable.restart_in_flight() {
        Visibility::Hidden
    } else {
        Visibility::Inherited
    };
    for mut button_visibility in &mut buttons {
        button_visibility.set_if_neq(visibility);
    }
}

pub fn cleanup_marked_entities(mut commands: Commands, query: Query<Entity, With<CleanupMarker>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
