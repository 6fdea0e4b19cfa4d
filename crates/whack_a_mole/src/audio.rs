use bevy::prelude::*;
use bevy_asset_loader::prelude::*;
use bevy_kira_audio::prelude::*;
use strum::EnumIter;

use crate::gameplay::{GameState, GameplaySet};

/// One of the fixed feedback sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum SoundClip {
    Whack,
    Thud,
    Whoosh,
    GameOver,
}

impl SoundClip {
    pub const fn volume(self) -> f64 {
        match self {
            Self::Whack => 0.8,
            Self::Thud => 0.5,
            Self::Whoosh => 0.4,
            Self::GameOver => 0.7,
        }
    }

    pub const fn playback_rate(self) -> f64 {
        match self {
            Self::Whack | Self::GameOver => 1.0,
            Self::Thud => 0.9,
            Self::Whoosh => 1.2,
        }
    }
}

/// Fire and forget, nothing waits on playback.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundRequest(pub SoundClip);

#[derive(AssetCollection, Resource)]
pub struct AudioAssets {
    #[asset(path = "audio/whack.ogg")]
    whack: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/thud.ogg")]
    thud: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/whoosh.ogg")]
    whoosh: Handle<bevy_kira_audio::prelude::AudioSource>,
    #[asset(path = "audio/game_over.ogg")]
    game_over: Handle<bevy_kira_audio::prelude::AudioSource>,
}

impl AudioAssets {
    fn clip(&self, clip: SoundClip) -> Handle<bevy_kira_audio::prelude::AudioSource> {
        match clip {
            SoundClip::Whack => self.whack.clone_weak(),
            SoundClip::Thud => self.thud.clone_weak(),
            SoundClip::Whoosh => self.whoosh.clone_weak(),
            SoundClip::GameOver => self.game_over.clone_weak(),
        }
    }
}

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(AudioPlugin)
            .add_event::<SoundRequest>()
            .configure_loading_state(
                LoadingStateConfig::new(GameState::Loading).load_collection::<AudioAssets>(),
            )
            .add_systems(
                Update,
                play_requested_sounds
                    .in_set(GameplaySet::Feedback)
                    .run_if(resource_exists::<AudioAssets>),
            );
    }
}

fn play_requested_sounds(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    mut requests: EventReader<SoundRequest>,
) {
    for &SoundRequest(clip) in requests.read() {
        audio
            .play(audio_assets.clip(clip))
            .with_volume(clip.volume())
            .with_playback_rate(clip.playback_rate());
    }
}
