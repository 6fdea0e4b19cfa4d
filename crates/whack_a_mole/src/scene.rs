use bevy::prelude::*;
use bevy::render::camera::ScalingMode;
use bevy_asset_loader::prelude::*;

use crate::config::GameConfig;
use crate::gameplay::GameState;
use crate::pool::{TargetPool, index_target_parts};
use crate::target::Target;

const CAMERA_POSITION: Vec3 = Vec3::new(-33.0, 33.0, -66.0);
const CAMERA_FOCUS: Vec3 = Vec3::new(0.0, 10.0, 0.0);
const VIEW_HEIGHT: f32 = 100.0;
const HIT_MORPH: &str = "hit";

#[derive(AssetCollection, Resource)]
pub struct SceneAssets {
    #[asset(path = "models/mole.glb#Scene0")]
    mole: Handle<Scene>,
    #[asset(path = "models/environment.glb#Scene0")]
    environment: Handle<Scene>,
}

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 400.0,
        })
        .add_loading_state(
            LoadingState::new(GameState::Loading)
                .continue_to_state(GameState::Ready)
                .on_failure_continue_to_state(GameState::LoadFailed)
                .load_collection::<SceneAssets>(),
        )
        .add_systems(Startup, setup)
        .add_systems(OnExit(GameState::Loading), spawn_level)
        .add_systems(OnEnter(GameState::LoadFailed), report_load_failure)
        .add_systems(Update, (animate_targets, sync_hit_pose));
    }
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Projection::Orthographic(OrthographicProjection {
            scaling_mode: ScalingMode::FixedVertical {
                viewport_height: VIEW_HEIGHT,
            },
            ..OrthographicProjection::default_3d()
        }),
        Transform::from_translation(CAMERA_POSITION).looking_at(CAMERA_FOCUS, Vec3::Y),
    ));

    // Cool back light and warm front light
    commands.spawn((
        PointLight {
            color: Color::Srgba(Srgba::rgb_u8(0x98, 0xBC, 0xFF)),
            intensity: 4_000_000.0,
            range: 100.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(60.0, 20.0, 60.0),
    ));
    commands.spawn((
        PointLight {
            color: Color::Srgba(Srgba::rgb_u8(0xFF, 0xF4, 0xCA)),
            intensity: 5_000_000.0,
            range: 100.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(-50.0, 50.0, -50.0),
    ));
}

fn spawn_level(
    mut commands: Commands,
    assets: Option<Res<SceneAssets>>,
    config: Res<GameConfig>,
    mut pool: ResMut<TargetPool>,
) {
    let Some(assets) = assets else {
        return;
    };

    commands.spawn((
        Name::new("Environment"),
        SceneRoot(assets.environment.clone()),
        Transform::from_scale(Vec3::splat(config.model_scale)),
    ));

    for base_position in config.slot_positions() {
        let entity = commands.spawn_empty().id();
        let slot = pool.push_target(entity);
        let hidden = base_position + Vec3::Y * config.hidden_offset;
        commands
            .entity(entity)
            .insert((
                Name::new(format!("Mole {slot}")),
                Target::new(slot, base_position),
                SceneRoot(assets.mole.clone()),
                Transform::from_translation(hidden)
                    .with_scale(Vec3::splat(config.model_scale)),
            ))
            .observe(index_target_parts);
    }
    info!("Spawned {} targets", pool.len());
}

fn report_load_failure(mut app_exit: EventWriter<AppExit>) {
    error!("Game assets failed to load");
    app_exit.send(AppExit::error());
}

/// Moves `current` towards `goal` by at most `max_step`.
pub fn approach(current: f32, goal: f32, max_step: f32) -> f32 {
    let delta = goal - current;
    if delta.abs() <= max_step {
        goal
    } else {
        current + max_step.copysign(delta)
    }
}

fn animate_targets(
    time: Res<Time>,
    config: Res<GameConfig>,
    mut targets: Query<(&Target, &mut Transform)>,
) {
    let max_step = config.raise_speed * time.delta_secs();
    for (target, mut transform) in &mut targets {
        let goal = target.base_position().y + target.offset_y(&config);
        transform.translation.y = approach(transform.translation.y, goal, max_step);
    }
}

pub const fn hit_pose_weight(hit: bool) -> f32 {
    if hit { 1.0 } else { 0.0 }
}

pub fn morph_index(names: &[String], morph: &str) -> Option<usize> {
    names.iter().position(|name| name == morph)
}

// Models without a "hit" morph target keep their pose
fn sync_hit_pose(
    targets: Query<(Entity, &Target), Changed<Target>>,
    children: Query<&Children>,
    mut morphs: Query<&mut MorphWeights>,
    meshes: Res<Assets<Mesh>>,
) {
    for (root, target) in &targets {
        let weight = hit_pose_weight(target.is_hit());
        for part in children.iter_descendants(root) {
            let Ok(mut morph) = morphs.get_mut(part) else {
                continue;
            };
            let index = morph
                .first_mesh()
                .and_then(|mesh| meshes.get(mesh))
                .and_then(Mesh::morph_target_names)
                .and_then(|names| morph_index(names, HIT_MORPH));
            if let Some(current) = index.and_then(|index| morph.weights_mut().get_mut(index)) {
                *current = weight;
            }
        }
    }
}
