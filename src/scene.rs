//! Drop bookkeeping: the drop → trail side-table and the node operations
//! every behavior goes through.
//!
//! ## Design
//!
//! Drops and trail nodes are plain ECS entities.  The [`DropRegistry`]
//! resource is the single source of truth for which drops are alive and which
//! trail node belongs to which drop.  [`Scene`] bundles the registry with
//! `Commands` so behaviors can create, update, and remove nodes without
//! knowing about each other.
//!
//! Removal is idempotent.  [`Scene::remove_drop`] deletes the registry record
//! immediately, before the despawn command is applied, so a second removal in
//! the same frame (ground cull and wind check racing, or the deferred timeout
//! firing after a cull) is a lookup miss and does nothing.  Entity
//! generations make stale handles miss as well, even once the index has been
//! reused.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

// ── Components ───────────────────────────────────────────────────────────────

/// A live rain drop: one physics body, optionally followed by a trail node.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RainDrop {
    /// Process-unique, monotonically increasing drop number.
    pub serial: u64,
    /// Elapsed app time when the drop was created.
    pub spawned_at: Duration,
}

impl RainDrop {
    pub fn age(&self, now: Duration) -> Duration {
        now.saturating_sub(self.spawned_at)
    }
}

/// Companion visual node that draws a drop's trail.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailNode {
    pub owner: Entity,
}

/// One line segment, drawn from `start` (older) to `end` (newer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
}

/// Segments currently shown by a trail node.  Rewritten every frame.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct TrailLines(pub Vec<Segment>);

/// Line colour (opacity folded into alpha) of a trail node.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct TrailStyle {
    pub color: Color,
}

/// One-shot removal scheduled when a drop is spawned.
///
/// There is no cancellation: the removal fires at `due` even if the drop is
/// already gone, in which case it is a no-op.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredRemoval {
    pub target: Entity,
    /// Elapsed app time at which the removal fires.
    pub due: Duration,
}

impl DeferredRemoval {
    pub fn is_due(&self, now: Duration) -> bool {
        now >= self.due
    }
}

/// Why a drop left the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// Its height dropped below the ground threshold.
    BelowGround,
    /// It outlived the emitter's deletion interval.
    Expired,
}

// ── Resources ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropRecord {
    pub serial: u64,
    pub trail: Option<Entity>,
}

/// Side-table of live drops and their trail nodes.
#[derive(Resource, Debug, Default)]
pub struct DropRegistry {
    drops: HashMap<Entity, DropRecord>,
    next_serial: u64,
}

impl DropRegistry {
    /// Hand out the next drop serial.  Never repeats within a process.
    pub fn next_serial(&mut self) -> u64 {
        let serial = self.next_serial;
        self.next_serial += 1;
        serial
    }

    pub fn insert(&mut self, drop: Entity, serial: u64) {
        self.drops.insert(drop, DropRecord { serial, trail: None });
    }

    pub fn contains(&self, drop: Entity) -> bool {
        self.drops.contains_key(&drop)
    }

    pub fn record(&self, drop: Entity) -> Option<DropRecord> {
        self.drops.get(&drop).copied()
    }

    pub fn trail_of(&self, drop: Entity) -> Option<Entity> {
        self.drops.get(&drop).and_then(|record| record.trail)
    }

    /// Link `trail` to `drop`.  Returns `false` (and links nothing) when the
    /// drop is not alive.
    pub fn link_trail(&mut self, drop: Entity, trail: Entity) -> bool {
        match self.drops.get_mut(&drop) {
            Some(record) => {
                record.trail = Some(trail);
                true
            }
            None => false,
        }
    }

    pub fn unlink_trail(&mut self, drop: Entity) -> Option<Entity> {
        self.drops
            .get_mut(&drop)
            .and_then(|record| record.trail.take())
    }

    pub fn remove(&mut self, drop: Entity) -> Option<DropRecord> {
        self.drops.remove(&drop)
    }

    pub fn len(&self) -> usize {
        self.drops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }
}

/// Running counters, updated only when something actually changes.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RainStats {
    pub spawned: u64,
    pub culled: u64,
    pub expired: u64,
    /// Largest number of simultaneously live drops seen so far.
    pub peak_live: usize,
}

// ── Scene ────────────────────────────────────────────────────────────────────

/// Node operations shared by all behaviors.
#[derive(SystemParam)]
pub struct Scene<'w, 's> {
    commands: Commands<'w, 's>,
    registry: ResMut<'w, DropRegistry>,
    stats: ResMut<'w, RainStats>,
}

impl Scene<'_, '_> {
    /// Spawn a drop entity carrying `bundle` and register it.
    pub fn spawn_drop(&mut self, spawned_at: Duration, bundle: impl Bundle) -> Entity {
        let serial = self.registry.next_serial();
        let drop = self
            .commands
            .spawn((RainDrop { serial, spawned_at }, bundle))
            .id();
        self.registry.insert(drop, serial);
        self.stats.spawned += 1;
        self.stats.peak_live = self.stats.peak_live.max(self.registry.len());
        debug!("drop #{} spawned as {:?}", serial, drop);
        drop
    }

    /// Remove `drop` once `delay` has passed after `now`, whatever happened
    /// to it in the meantime.
    pub fn schedule_removal(&mut self, drop: Entity, now: Duration, delay: Duration) {
        self.commands.spawn(DeferredRemoval {
            target: drop,
            due: now + delay,
        });
    }

    /// Create the trail node for `owner`.
    ///
    /// Returns `None` without creating anything when `owner` is no longer a
    /// live drop, so a trail can never outlive its drop.
    pub fn attach_trail(&mut self, owner: Entity, style: TrailStyle) -> Option<Entity> {
        if !self.registry.contains(owner) {
            return None;
        }
        self.release_trail(owner);
        let trail = self
            .commands
            .spawn((TrailNode { owner }, TrailLines::default(), style))
            .id();
        self.registry.link_trail(owner, trail);
        Some(trail)
    }

    pub fn trail_of(&self, owner: Entity) -> Option<Entity> {
        self.registry.trail_of(owner)
    }

    /// Replace the segments shown by `owner`'s trail node, if it has one.
    pub fn redraw_trail(&mut self, owner: Entity, segments: Vec<Segment>) {
        if let Some(trail) = self.registry.trail_of(owner) {
            self.insert(trail, TrailLines(segments));
        }
    }

    /// Despawn `owner`'s trail node and forget the link.  No-op without one.
    pub fn release_trail(&mut self, owner: Entity) {
        if let Some(trail) = self.registry.unlink_trail(owner) {
            self.despawn(trail);
        }
    }

    /// Remove a drop and its trail node.
    ///
    /// Returns `true` only for the call that actually removed the drop; every
    /// later call for the same handle is a silent no-op.
    pub fn remove_drop(&mut self, drop: Entity, cause: RemovalCause) -> bool {
        let Some(record) = self.registry.remove(drop) else {
            return false;
        };
        if let Some(trail) = record.trail {
            self.despawn(trail);
        }
        self.despawn(drop);
        match cause {
            RemovalCause::BelowGround => self.stats.culled += 1,
            RemovalCause::Expired => self.stats.expired += 1,
        }
        debug!("drop #{} removed ({:?})", record.serial, cause);
        true
    }

    /// Drop the registry record of a drop that was despawned without going
    /// through [`Scene::remove_drop`], taking its trail node with it.
    pub fn forget(&mut self, drop: Entity) {
        if let Some(DropRecord {
            trail: Some(trail), ..
        }) = self.registry.remove(drop)
        {
            self.despawn(trail);
        }
    }

    /// Insert components on `entity` if it still exists.
    pub fn insert(&mut self, entity: Entity, bundle: impl Bundle) {
        if let Ok(mut node) = self.commands.get_entity(entity) {
            node.try_insert(bundle);
        }
    }

    pub fn despawn(&mut self, entity: Entity) {
        if let Ok(mut node) = self.commands.get_entity(entity) {
            node.try_despawn();
        }
    }
}

// ── Systems ──────────────────────────────────────────────────────────────────

/// Fire every deferred removal whose deadline has passed.
pub fn deferred_removal_system(
    mut scene: Scene,
    time: Res<Time>,
    pending: Query<(Entity, &DeferredRemoval)>,
) {
    let now = time.elapsed();
    for (entity, removal) in pending.iter() {
        if removal.is_due(now) {
            scene.remove_drop(removal.target, RemovalCause::Expired);
            scene.despawn(entity);
        }
    }
}

/// Clean up registry records (and trail nodes) of drops despawned by
/// anything other than [`Scene::remove_drop`].
pub fn forget_removed_drops(mut scene: Scene, mut removed: RemovedComponents<RainDrop>) {
    for drop in removed.read() {
        scene.forget(drop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Distinct entity handles for registry tests.
    fn entities<const N: usize>() -> [Entity; N] {
        let mut world = World::new();
        std::array::from_fn(|_| world.spawn_empty().id())
    }

    #[test]
    fn serials_are_monotonic() {
        let mut registry = DropRegistry::default();
        let a = registry.next_serial();
        let b = registry.next_serial();
        let c = registry.next_serial();
        assert!(a < b && b < c);
    }

    #[test]
    fn link_trail_requires_live_drop() {
        let [drop, trail] = entities();
        let mut registry = DropRegistry::default();
        assert!(!registry.link_trail(drop, trail));
        assert_eq!(registry.trail_of(drop), None);

        registry.insert(drop, 0);
        assert!(registry.link_trail(drop, trail));
        assert_eq!(registry.trail_of(drop), Some(trail));
    }

    #[test]
    fn remove_is_a_miss_the_second_time() {
        let [drop, trail] = entities();
        let mut registry = DropRegistry::default();
        registry.insert(drop, 7);
        registry.link_trail(drop, trail);

        let record = registry.remove(drop).expect("first removal finds the drop");
        assert_eq!(record.serial, 7);
        assert_eq!(record.trail, Some(trail));
        assert!(registry.remove(drop).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn unlink_leaves_drop_alive() {
        let [drop, trail] = entities();
        let mut registry = DropRegistry::default();
        registry.insert(drop, 0);
        registry.link_trail(drop, trail);
        assert_eq!(registry.unlink_trail(drop), Some(trail));
        assert_eq!(registry.unlink_trail(drop), None);
        assert!(registry.contains(drop));
    }

    #[test]
    fn deferred_removal_fires_at_deadline() {
        let [target] = entities();
        let removal = DeferredRemoval {
            target,
            due: Duration::from_millis(4000),
        };
        assert!(!removal.is_due(Duration::from_millis(3999)));
        assert!(removal.is_due(Duration::from_millis(4000)));
        assert!(removal.is_due(Duration::from_millis(4100)));
    }

    #[test]
    fn drop_age_saturates() {
        let drop = RainDrop {
            serial: 0,
            spawned_at: Duration::from_millis(500),
        };
        assert_eq!(drop.age(Duration::from_millis(200)), Duration::ZERO);
        assert_eq!(drop.age(Duration::from_millis(1500)), Duration::from_secs(1));
    }
}
