use bevy::picking::mesh_picking::ray_cast::{MeshRayCast, RayCastSettings};
use bevy::prelude::*;
use whack_helpers::input::just_pressed_pointer_ray;

use crate::config::GameConfig;
use crate::effects::Particle;
use crate::pool::TargetPool;

/// Classification of one click.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum HitEvent {
    TargetHit { slot: usize, point: Vec3 },
    BackgroundHit { point: Vec3 },
    /// Nothing was hit, `point` lies at the miss distance along the ray
    Miss { point: Vec3 },
}

impl HitEvent {
    pub const fn point(&self) -> Vec3 {
        match *self {
            Self::TargetHit { point, .. }
            | Self::BackgroundHit { point }
            | Self::Miss { point } => point,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub point: Vec3,
    pub distance: f32,
}

/// Closest intersection along the ray. Equal distances keep the first one reported.
pub fn nearest_hit(hits: impl IntoIterator<Item = RayHit>) -> Option<RayHit> {
    hits.into_iter()
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Effect entities are not clickable, a click goes through a live burst.
pub fn is_clickable(effects: &Query<(), With<Particle>>, entity: Entity) -> bool {
    !effects.contains(entity)
}

pub fn classify(
    nearest: Option<RayHit>,
    ray: Ray3d,
    pool: &TargetPool,
    miss_distance: f32,
) -> HitEvent {
    match nearest {
        Some(hit) => match pool.owner_of(hit.entity) {
            Some(slot) => HitEvent::TargetHit {
                slot,
                point: hit.point,
            },
            None => HitEvent::BackgroundHit { point: hit.point },
        },
        None => HitEvent::Miss {
            point: ray.get_point(miss_distance),
        },
    }
}

pub fn dispatch_clicks(
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut ray_cast: MeshRayCast,
    effects: Query<(), With<Particle>>,
    pool: Res<TargetPool>,
    config: Res<GameConfig>,
    mut hit_events: EventWriter<HitEvent>,
) {
    let Some(ray) = just_pressed_pointer_ray(&buttons, &touches, &windows, &cameras) else {
        return;
    };
    let ray = match ray {
        Ok(ray) => ray,
        Err(err) => {
            debug!("Click ignored: {err}");
            return;
        }
    };

    let clickable = |entity| is_clickable(&effects, entity);
    let settings = RayCastSettings::default().with_filter(&clickable);
    let hits = ray_cast.cast_ray(ray, &settings);
    let nearest = nearest_hit(hits.iter().map(|(entity, hit)| RayHit {
        entity: *entity,
        point: hit.point,
        distance: hit.distance,
    }));

    hit_events.send(classify(nearest, ray, &pool, config.miss_distance));
}
