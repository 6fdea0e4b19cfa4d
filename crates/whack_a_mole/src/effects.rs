use core::time::Duration;

use bevy::prelude::*;
use strum::{Display, EnumIter};
use whack_helpers::restart::CleanupMarker;

use crate::gameplay::GameplaySet;
use crate::spawner::GameRng;

/// Particle burst presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum EffectKind {
    Explosion,
    Hit,
    Shot,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstPreset {
    pub count: usize,
    pub size: f32,
    pub speed: f32,
    pub lifetime: Duration,
}

impl EffectKind {
    pub const fn preset(self) -> BurstPreset {
        match self {
            Self::Explosion => BurstPreset {
                count: 150,
                size: 2.0,
                speed: 35.0,
                lifetime: Duration::from_millis(1000),
            },
            Self::Hit => BurstPreset {
                count: 120,
                size: 1.8,
                speed: 69.0,
                lifetime: Duration::from_millis(300),
            },
            Self::Shot => BurstPreset {
                count: 75,
                size: 1.5,
                speed: 150.0,
                lifetime: Duration::from_millis(100),
            },
        }
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EffectRequest {
    pub kind: EffectKind,
    pub position: Vec3,
    pub color: Srgba,
}

/// A burst particle. Clicks pass through particles.
#[derive(Component)]
pub struct Particle {
    lifetime: Timer,
    velocity: Vec3,
    initial_scale: f32,
}

impl Particle {
    pub fn new(preset: &BurstPreset, velocity: Vec3) -> Self {
        Self {
            lifetime: Timer::new(preset.lifetime, TimerMode::Once),
            velocity,
            initial_scale: preset.size,
        }
    }
}

#[derive(Resource)]
struct ParticleMesh(Handle<Mesh>);

pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<EffectRequest>()
            .add_systems(Startup, setup_particle_mesh)
            .add_systems(
                Update,
                (spawn_bursts.in_set(GameplaySet::Feedback), update_particles),
            );
    }
}

fn setup_particle_mesh(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    commands.insert_resource(ParticleMesh(meshes.add(Cuboid::from_length(1.0))));
}

/// Start position of a particle: inside a unit cube centred on the burst origin.
pub fn particle_offset(rng: &mut fastrand::Rng) -> Vec3 {
    Vec3::new(rng.f32(), rng.f32(), rng.f32()) - Vec3::splat(0.5)
}

/// Each axis uniform in `[-speed / 2, speed / 2]`.
pub fn particle_velocity(rng: &mut fastrand::Rng, speed: f32) -> Vec3 {
    (Vec3::new(rng.f32(), rng.f32(), rng.f32()) - Vec3::splat(0.5)) * speed
}

fn spawn_bursts(
    mut commands: Commands,
    mut requests: EventReader<EffectRequest>,
    mut rng: ResMut<GameRng>,
    particle_mesh: Option<Res<ParticleMesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(particle_mesh) = particle_mesh else {
        return;
    };

    for request in requests.read() {
        let preset = request.kind.preset();
        let material = materials.add(StandardMaterial {
            base_color: Color::Srgba(request.color),
            emissive: request.color.into(),
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            ..default()
        });

        for _ in 0..preset.count {
            let offset = particle_offset(&mut rng);
            commands.spawn((
                Particle::new(&preset, particle_velocity(&mut rng, preset.speed)),
                Mesh3d(particle_mesh.0.clone()),
                MeshMaterial3d(material.clone()),
                Transform::from_translation(request.position + offset)
                    .with_scale(Vec3::splat(preset.size)),
                CleanupMarker,
            ));
        }
    }
}

fn update_particles(
    mut commands: Commands,
    time: Res<Time>,
    mut particles: Query<(Entity, &mut Transform, &mut Particle)>,
) {
    for (entity, mut transform, mut particle) in &mut particles {
        particle.lifetime.tick(time.delta());

        transform.translation += particle.velocity * time.delta_secs();

        // Shrink linearly over the lifetime
        let life_factor = 1.0 - particle.lifetime.fraction();
        transform.scale = Vec3::splat(particle.initial_scale * life_factor);

        if particle.lifetime.finished() {
            commands.entity(entity).despawn();
        }
    }
}
