use core::time::Duration;

use bevy::prelude::*;

use crate::FONT;
use crate::restart::CleanupMarker;

const RISE_DISTANCE: f32 = 50.0;

#[derive(Component)]
pub struct FloatingScore {
    timer: Timer,
    initial_position: Vec2,
}

/// Spawns a short lived score label at `position`, given in logical screen pixels.
pub fn spawn_floating_score(
    commands: &mut Commands,
    position: Vec2,
    text: &str,
    color: Srgba,
    asset_server: &AssetServer,
) {
    commands.spawn((
        Text::new(text),
        TextFont {
            font: asset_server.load(FONT),
            font_size: 24.0,
            ..default()
        },
        TextColor(Color::Srgba(color)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(position.x + 20.0),
            top: Val::Px(position.y),
            ..default()
        },
        FloatingScore {
            timer: Timer::new(Duration::from_secs(1), TimerMode::Once),
            initial_position: position,
        },
        CleanupMarker,
    ));
}

pub fn animate_floating_scores(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Node, &mut TextColor, &mut FloatingScore)>,
) {
    for (entity, mut node, mut color, mut floating_score) in &mut query {
        floating_score.timer.tick(time.delta());
        let progress = floating_score.timer.fraction();

        // Drift upwards and fade out
        node.top = Val::Px(RISE_DISTANCE.mul_add(-progress, floating_score.initial_position.y));
        color.0 = color.0.with_alpha(1.0 - progress);

        if floating_score.timer.finished() {
            commands.entity(entity).despawn();
        }
    }
}
