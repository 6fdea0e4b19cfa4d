use std::collections::HashMap;

use bevy::prelude::*;
use bevy::scene::SceneInstanceReady;

use crate::target::Target;

/// The fixed set of target slots and the index from intersectable entities to the
/// slot owning them.
///
/// Parts of a target model are registered once its scene instance is ready, so an
/// entity that is not indexed yet is treated like any other piece of background.
#[derive(Resource, Debug, Default)]
pub struct TargetPool {
    slots: Vec<Entity>,
    owners: HashMap<Entity, usize>,
}

impl TargetPool {
    /// Registers the root entity of the next slot and returns its index.
    pub fn push_target(&mut self, entity: Entity) -> usize {
        let slot = self.slots.len();
        self.slots.push(entity);
        self.owners.insert(entity, slot);
        slot
    }

    /// Marks `part` as belonging to `slot`. Unknown slots are refused.
    pub fn register_part(&mut self, part: Entity, slot: usize) -> bool {
        if slot >= self.slots.len() {
            return false;
        }
        self.owners.insert(part, slot);
        true
    }

    pub fn owner_of(&self, entity: Entity) -> Option<usize> {
        self.owners.get(&entity).copied()
    }

    pub fn target(&self, slot: usize) -> Option<Entity> {
        self.slots.get(slot).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Observer run when a target's model has been spawned: indexes every descendant.
pub fn index_target_parts(
    trigger: Trigger<SceneInstanceReady>,
    targets: Query<&Target>,
    children: Query<&Children>,
    mut pool: ResMut<TargetPool>,
) {
    let root = trigger.entity();
    let Ok(target) = targets.get(root) else {
        warn!("Scene ready on {root:?} which is not a target");
        return;
    };

    let mut parts = 0;
    for part in children.iter_descendants(root) {
        if pool.register_part(part, target.slot()) {
            parts += 1;
        }
    }
    debug!("Indexed {parts} parts for slot {}", target.slot());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_resolve_to_their_slot() {
        let mut pool = TargetPool::default();
        let first = pool.push_target(Entity::from_raw(10));
        let second = pool.push_target(Entity::from_raw(20));
        assert_eq!((first, second), (0, 1), "slots are allocated in order");

        assert!(pool.register_part(Entity::from_raw(21), second), "known slot");
        assert_eq!(pool.owner_of(Entity::from_raw(21)), Some(1), "mesh of slot 1");
        assert_eq!(pool.owner_of(Entity::from_raw(10)), Some(0), "root of slot 0");
        assert_eq!(pool.target(1), Some(Entity::from_raw(20)), "slot lookup");
    }

    #[test]
    fn unindexed_entities_have_no_owner() {
        let mut pool = TargetPool::default();
        pool.push_target(Entity::from_raw(1));
        assert_eq!(pool.owner_of(Entity::from_raw(99)), None, "background entity");
        assert!(!pool.register_part(Entity::from_raw(2), 5), "unknown slot refused");
        assert_eq!(pool.owner_of(Entity::from_raw(2)), None, "refused part not indexed");
    }
}
