use bevy::color::palettes::css::{RED, YELLOW};
use bevy::prelude::*;
use whack_helpers::floating_score::{animate_floating_scores, spawn_floating_score};

use crate::audio::{SoundClip, SoundRequest};
use crate::dispatch::HitEvent;
use crate::effects::{EffectKind, EffectRequest};
use crate::gameplay::{GameplaySet, RoundEnded, ScoredHit};

pub const MISS_COLOR: Srgba = Srgba::rgb(0.0, 0.6, 1.0);

/// Feedback for one scored click.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub effect: EffectRequest,
    pub sound: SoundClip,
    /// Label of the floating score, only for clicks worth points
    pub popup: Option<String>,
}

pub fn reaction_for(hit: &ScoredHit) -> Reaction {
    let (color, sound) = match hit.event {
        HitEvent::TargetHit { .. } => (RED, SoundClip::Whack),
        HitEvent::BackgroundHit { .. } => (YELLOW, SoundClip::Thud),
        HitEvent::Miss { .. } => (MISS_COLOR, SoundClip::Whoosh),
    };

    Reaction {
        effect: EffectRequest {
            kind: EffectKind::Explosion,
            position: hit.event.point(),
            color,
        },
        sound,
        popup: (hit.points > 0).then(|| format!("+{}", hit.points)),
    }
}

pub struct ReactionsPlugin;

impl Plugin for ReactionsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (route_reactions, announce_round_end).in_set(GameplaySet::Feedback),
        )
        .add_systems(Update, animate_floating_scores);
    }
}

fn route_reactions(
    mut commands: Commands,
    mut scored: EventReader<ScoredHit>,
    mut effects: EventWriter<EffectRequest>,
    mut sounds: EventWriter<SoundRequest>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    asset_server: Res<AssetServer>,
) {
    for hit in scored.read() {
        let reaction = reaction_for(hit);
        effects.send(reaction.effect);
        sounds.send(SoundRequest(reaction.sound));

        let Some(text) = reaction.popup else {
            continue;
        };
        let screen_position = cameras.get_single().ok().and_then(|(camera, transform)| {
            camera
                .world_to_viewport(transform, reaction.effect.position)
                .ok()
        });
        if let Some(position) = screen_position {
            spawn_floating_score(
                &mut commands,
                position,
                &text,
                reaction.effect.color,
                &asset_server,
            );
        }
    }
}

fn announce_round_end(
    mut round_ended: EventReader<RoundEnded>,
    mut sounds: EventWriter<SoundRequest>,
) {
    for _ in round_ended.read() {
        sounds.send(SoundRequest(SoundClip::GameOver));
    }
}
