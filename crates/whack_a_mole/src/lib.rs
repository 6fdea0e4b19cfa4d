pub mod audio;
pub mod config;
pub mod dispatch;
pub mod effects;
pub mod gameplay;
pub mod inputs;
pub mod pool;
pub mod reactions;
pub mod scene;
pub mod scheduler;
pub mod session;
pub mod spawner;
pub mod target;
pub mod ui;

use bevy::prelude::*;
use whack_helpers::restart::cleanup_marked_entities;
use whack_helpers::welcome_screen::{despawn_welcome_screen, spawn_welcome_screen};

use crate::config::GameConfig;
pub use crate::gameplay::{CorePlugin, GameState};

const TITLE: &str = "Whack a Mole";

pub fn run() {
    whack_helpers::get_default_app(TITLE)
        .insert_resource(GameConfig::load_or_default())
        .add_plugins(GamePlugin)
        .run();
}

/// The full game: round rules plus scene, input, feedback and HUD.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(CorePlugin)
            .add_plugins(scene::ScenePlugin)
            .add_plugins(audio::GameAudioPlugin)
            .add_plugins(effects::EffectsPlugin)
            .add_plugins(reactions::ReactionsPlugin)
            .add_plugins(inputs::InputPlugin)
            .add_plugins(ui::UIPlugin)
            .add_systems(OnEnter(GameState::Ready), show_welcome)
            .add_systems(OnExit(GameState::Ready), despawn_welcome_screen)
            .add_systems(OnEnter(GameState::Restarting), cleanup_marked_entities);
    }
}

fn show_welcome(mut commands: Commands, asset_server: Res<AssetServer>, config: Res<GameConfig>) {
    let hint = format!(
        "Whack the moles before they hide. You have {} seconds.",
        config.round_seconds
    );
    spawn_welcome_screen(&mut commands, &asset_server, TITLE, &hint);
}
