//! One-shot wind push applied to a drop when it is created.

use crate::behavior::{Behavior, Host};
use crate::constants::{GROUND_LEVEL, WIND_FORCE, WIND_IMPULSE_STEP, WIND_STD};
use crate::scene::RemovalCause;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::Rng;

/// Nominal wind force with one-sided random jitter.
///
/// Once per drop, each axis of `force` is scaled by `1 - U(0,1) * std` and the
/// result is given to the drop's body at the body's position.  Jitter only
/// ever weakens the nominal force.  The emitter applies it while spawning;
/// `on_attach` covers drops spawned any other way.
///
/// The component also repeats the ground check every frame, so a drop is
/// removed below `ground_level` even if the frame's [`crate::ground::GroundCull`]
/// check has not run yet.  Whichever runs first removes the drop; the other
/// is a no-op.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct WindForce {
    pub force: Vec3,
    pub std: f32,
    pub ground_level: f32,
    applied: Option<Vec3>,
}

impl Default for WindForce {
    fn default() -> Self {
        Self::new(Vec3::from_array(WIND_FORCE), WIND_STD)
    }
}

impl WindForce {
    pub fn new(force: Vec3, std: f32) -> Self {
        Self {
            force,
            std,
            ground_level: GROUND_LEVEL,
            applied: None,
        }
    }

    pub fn with_ground_level(mut self, ground_level: f32) -> Self {
        self.ground_level = ground_level;
        self
    }

    /// Force actually applied; `None` until then.
    pub fn applied(&self) -> Option<Vec3> {
        self.applied
    }

    /// Draw the jittered force, remember it, and turn it into a one-step
    /// impulse at `position`.
    pub fn apply(&mut self, position: Vec3, rng: &mut impl Rng) -> ExternalImpulse {
        let force = jittered_force(self.force, self.std, rng);
        self.applied = Some(force);
        // Point and centre of mass coincide: pure push, no spin.
        ExternalImpulse::at_point(force * WIND_IMPULSE_STEP, position, position)
    }
}

/// Scale every axis of `nominal` by its own draw of `1 - U(0,1) * std`.
pub fn jittered_force(nominal: Vec3, std: f32, rng: &mut impl Rng) -> Vec3 {
    let mut axis = |value: f32| value * (1.0 - rng.gen::<f32>() * std);
    Vec3::new(axis(nominal.x), axis(nominal.y), axis(nominal.z))
}

impl Behavior for WindForce {
    fn on_attach(&mut self, host: &mut Host<'_, '_, '_>) {
        // Drops from an emitter already got their push in the spawn bundle.
        if self.applied.is_some() {
            return;
        }
        let impulse = self.apply(host.position, &mut rand::thread_rng());
        host.scene.insert(host.entity, impulse);
    }

    fn on_frame(&mut self, host: &mut Host<'_, '_, '_>) {
        if host.position.y < self.ground_level {
            host.scene.remove_drop(host.entity, RemovalCause::BelowGround);
        }
    }
}
