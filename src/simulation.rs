//! Rain simulation plugin: wires every behavior into the frame loop.

use crate::behavior::{BehaviorAppExt, BehaviorSet};
use crate::emitter::Emitter;
use crate::ground::GroundCull;
use crate::scene::{deferred_removal_system, forget_removed_drops, DropRegistry, RainStats};
use crate::trail::TrailRenderer;
use crate::wind::WindForce;
use bevy::prelude::*;

/// Headless core of the simulation: behaviors, registry, and timers.
///
/// Needs only `MinimalPlugins`; physics and rendering are added separately
/// by the binary.
pub struct RainPlugin;

impl Plugin for RainPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DropRegistry>()
            .init_resource::<RainStats>()
            .configure_sets(
                Update,
                (
                    BehaviorSet::Detach,
                    BehaviorSet::Attach,
                    BehaviorSet::Frame,
                    BehaviorSet::Timers,
                )
                    .chain(),
            )
            .add_behavior::<Emitter>()
            .add_behavior::<WindForce>()
            .add_behavior::<TrailRenderer>()
            .add_behavior::<GroundCull>()
            .add_systems(
                Update,
                (
                    forget_removed_drops.in_set(BehaviorSet::Detach),
                    deferred_removal_system.in_set(BehaviorSet::Timers),
                ),
            );
    }
}
