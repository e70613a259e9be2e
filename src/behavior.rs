//! Per-entity behaviors driven by the frame loop.
//!
//! A behavior is a component that reacts to three moments in its entity's
//! life: being attached, every frame while attached, and being detached.
//! [`BehaviorAppExt::add_behavior`] registers one generic driver system per
//! moment; the drivers build a [`Host`] view of the entity and call into the
//! behavior.
//!
//! | Set                     | Driver                  | Calls         |
//! |-------------------------|-------------------------|---------------|
//! | `BehaviorSet::Detach`   | `detach_behaviors::<B>` | `on_detach`   |
//! | `BehaviorSet::Attach`   | `attach_behaviors::<B>` | `on_attach`   |
//! | `BehaviorSet::Frame`    | `drive_behaviors::<B>`  | `on_frame`    |
//!
//! The sets run in that order, followed by `BehaviorSet::Timers`.  Within
//! `Frame` the relative order of different behavior types is unspecified, so
//! behaviors sharing an entity must not depend on each other's order.

use crate::scene::Scene;
use bevy::ecs::component::Mutable;
use bevy::prelude::*;
use std::time::Duration;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorSet {
    Detach,
    Attach,
    Frame,
    Timers,
}

/// What a behavior sees of its entity for one call.
pub struct Host<'a, 'w, 's> {
    pub entity: Entity,
    /// World position of the entity this frame.
    pub position: Vec3,
    /// Time since the previous frame.
    pub delta: Duration,
    /// Time since app start.
    pub elapsed: Duration,
    pub scene: &'a mut Scene<'w, 's>,
}

pub trait Behavior: Component<Mutability = Mutable> {
    /// Called once, on the first frame the component is seen on its entity.
    fn on_attach(&mut self, _host: &mut Host<'_, '_, '_>) {}

    /// Called every frame while attached, including the attach frame.
    fn on_frame(&mut self, _host: &mut Host<'_, '_, '_>) {}

    /// Called after the component left `entity`, either removed on its own
    /// or with the entity.  The component data is already gone.
    fn on_detach(_entity: Entity, _scene: &mut Scene<'_, '_>) {}
}

pub fn attach_behaviors<B: Behavior>(
    mut scene: Scene,
    time: Res<Time>,
    mut query: Query<(Entity, &Transform, &mut B), Added<B>>,
) {
    for (entity, transform, mut behavior) in query.iter_mut() {
        let mut host = Host {
            entity,
            position: transform.translation,
            delta: time.delta(),
            elapsed: time.elapsed(),
            scene: &mut scene,
        };
        behavior.on_attach(&mut host);
    }
}

pub fn drive_behaviors<B: Behavior>(
    mut scene: Scene,
    time: Res<Time>,
    mut query: Query<(Entity, &Transform, &mut B)>,
) {
    for (entity, transform, mut behavior) in query.iter_mut() {
        let mut host = Host {
            entity,
            position: transform.translation,
            delta: time.delta(),
            elapsed: time.elapsed(),
            scene: &mut scene,
        };
        behavior.on_frame(&mut host);
    }
}

pub fn detach_behaviors<B: Behavior>(mut scene: Scene, mut removed: RemovedComponents<B>) {
    for entity in removed.read() {
        B::on_detach(entity, &mut scene);
    }
}

pub trait BehaviorAppExt {
    /// Drive `B` through attach, frame, and detach on every entity carrying it.
    fn add_behavior<B: Behavior>(&mut self) -> &mut Self;
}

impl BehaviorAppExt for App {
    fn add_behavior<B: Behavior>(&mut self) -> &mut Self {
        self.add_systems(
            Update,
            (
                detach_behaviors::<B>.in_set(BehaviorSet::Detach),
                attach_behaviors::<B>.in_set(BehaviorSet::Attach),
                drive_behaviors::<B>.in_set(BehaviorSet::Frame),
            ),
        )
    }
}
