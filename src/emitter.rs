//! Rain emitter: spawns batches of drops around its own position.
//!
//! ## Design
//!
//! The [`Emitter`] behavior is throttled: it spawns at most one batch per
//! `emission_interval`, regardless of frame rate, and the first batch goes out
//! on the first frame.  Each batch samples `particle_count` positions:
//!
//! ```text
//! angle ~ U(0, 2π)
//! x = cos(angle) · U(0,1) · radius
//! y = (2 · U(0,1) − 1) · radius
//! z = sin(angle) · U(0,1) · radius
//! ```
//!
//! so the spawn volume is a disk in x/z stretched into a band of height
//! `2 · radius` along y.
//!
//! Every drop is spawned with its own copies of the emitter's [`WindForce`],
//! [`GroundCull`], and (optionally) [`TrailRenderer`] templates, and a
//! deferred removal `deletion_interval` later that fires whether or not the
//! drop already hit the ground.  The wind impulse, the trail history, and the
//! trail node are all set up in the spawn frame, before the body is stepped.

use crate::behavior::{Behavior, Host};
use crate::config::RainConfig;
use crate::constants::{
    DELETION_INTERVAL_MS, EMISSION_INTERVAL_MS, EMISSION_RADIUS, PARTICLE_COUNT, PARTICLE_MASS,
    PARTICLE_METALNESS, PARTICLE_OPACITY, PARTICLE_RADIUS, PARTICLE_ROUGHNESS,
};
use crate::error::RainResult;
use crate::ground::GroundCull;
use crate::trail::TrailRenderer;
use crate::wind::WindForce;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;
use std::time::Duration;

// ── Components ───────────────────────────────────────────────────────────────

/// Material parameters of a drop sphere, read by the renderer.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct DropAppearance {
    pub radius: f32,
    pub color: Color,
    pub opacity: f32,
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for DropAppearance {
    fn default() -> Self {
        Self {
            radius: PARTICLE_RADIUS,
            color: Color::srgb_u8(0x9C, 0xE3, 0xF9),
            opacity: PARTICLE_OPACITY,
            metalness: PARTICLE_METALNESS,
            roughness: PARTICLE_ROUGHNESS,
        }
    }
}

/// Fires at most once per interval; the very first call always fires.
#[derive(Debug, Clone)]
pub struct Throttle {
    timer: Timer,
    primed: bool,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            timer: Timer::new(interval, TimerMode::Repeating),
            primed: false,
        }
    }

    /// Advance by `delta` and report whether the throttled action may run.
    pub fn ready(&mut self, delta: Duration) -> bool {
        if !self.primed {
            self.primed = true;
            return true;
        }
        self.timer.tick(delta).just_finished()
    }
}

#[derive(Component, Debug, Clone)]
#[require(Transform)]
pub struct Emitter {
    pub particle_count: usize,
    pub emission_radius: f32,
    pub deletion_interval: Duration,
    pub mass: f32,
    pub appearance: DropAppearance,
    pub wind: WindForce,
    pub ground: GroundCull,
    /// Drops spawn without a trail when `None`.
    pub trail: Option<TrailRenderer>,
    throttle: Throttle,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new(
            PARTICLE_COUNT,
            Duration::from_millis(EMISSION_INTERVAL_MS),
            Duration::from_millis(DELETION_INTERVAL_MS),
            EMISSION_RADIUS,
        )
    }
}

impl Emitter {
    pub fn new(
        particle_count: usize,
        emission_interval: Duration,
        deletion_interval: Duration,
        emission_radius: f32,
    ) -> Self {
        let ground = GroundCull::default();
        Self {
            particle_count,
            emission_radius,
            deletion_interval,
            mass: PARTICLE_MASS,
            appearance: DropAppearance::default(),
            wind: WindForce::default().with_ground_level(ground.ground_level),
            ground,
            trail: Some(TrailRenderer::default()),
            throttle: Throttle::new(emission_interval),
        }
    }

    /// Build an emitter and its drop templates from a validated config.
    pub fn from_config(config: &RainConfig) -> RainResult<Self> {
        let ground = GroundCull {
            ground_level: config.ground.level,
        };
        let trail = if config.trail.enabled {
            Some(TrailRenderer::new(
                config.trail.length,
                config.trail.opacity,
                config.trail_color()?,
            ))
        } else {
            None
        };
        Ok(Self {
            particle_count: config.emitter.particle_count,
            emission_radius: config.emitter.emission_radius,
            deletion_interval: config.emitter.deletion_interval(),
            mass: config.drop.mass,
            appearance: DropAppearance {
                radius: config.drop.radius,
                color: config.drop_color()?,
                opacity: config.drop.opacity,
                metalness: config.drop.metalness,
                roughness: config.drop.roughness,
            },
            wind: WindForce::new(config.wind.force(), config.wind.std)
                .with_ground_level(ground.ground_level),
            ground,
            trail,
            throttle: Throttle::new(config.emitter.emission_interval()),
        })
    }

    pub fn with_ground_level(mut self, ground_level: f32) -> Self {
        self.ground.ground_level = ground_level;
        self.wind.ground_level = ground_level;
        self
    }

    /// Spawn one drop with its wind push, trail history, and trail node set
    /// up from `position`, so the first physics step already sees them.
    fn spawn_drop(
        &self,
        host: &mut Host<'_, '_, '_>,
        position: Vec3,
        rng: &mut impl Rng,
    ) -> Entity {
        // The wind check must use the same threshold as the cull.
        let mut wind = self.wind.clone().with_ground_level(self.ground.ground_level);
        let impulse = wind.apply(position, rng);
        let drop = host.scene.spawn_drop(
            host.elapsed,
            (
                Transform::from_translation(position),
                self.appearance,
                RigidBody::Dynamic,
                Collider::ball(self.appearance.radius),
                ColliderMassProperties::Mass(self.mass),
                wind,
                impulse,
                self.ground,
            ),
        );
        if let Some(template) = &self.trail {
            let mut trail = template.clone();
            trail.reset(position);
            host.scene.attach_trail(drop, trail.style());
            host.scene.insert(drop, trail);
        }
        host.scene
            .schedule_removal(drop, host.elapsed, self.deletion_interval);
        drop
    }
}

/// Random spawn offset inside the emission volume of `radius`.
pub fn spawn_offset(rng: &mut impl Rng, radius: f32) -> Vec3 {
    let angle = rng.gen_range(0.0..TAU);
    Vec3::new(
        angle.cos() * rng.gen::<f32>() * radius,
        (2.0 * rng.gen::<f32>() - 1.0) * radius,
        angle.sin() * rng.gen::<f32>() * radius,
    )
}

impl Behavior for Emitter {
    fn on_frame(&mut self, host: &mut Host<'_, '_, '_>) {
        if !self.throttle.ready(host.delta) {
            return;
        }
        let mut rng = rand::thread_rng();
        for _ in 0..self.particle_count {
            let position = host.position + spawn_offset(&mut rng, self.emission_radius);
            self.spawn_drop(host, position, &mut rng);
        }
    }
}

/// Startup system: place one emitter configured from [`RainConfig`].
pub fn spawn_emitter_from_config(mut commands: Commands, config: Res<RainConfig>) {
    match Emitter::from_config(&config) {
        Ok(emitter) => {
            let position = Vec3::from_array(config.emitter.position);
            info!(
                "Emitter at {:?}: {} drops every {} ms",
                position, emitter.particle_count, config.emitter.emission_interval_ms
            );
            commands.spawn((emitter, Transform::from_translation(position)));
        }
        Err(err) => error!("Emitter not spawned: {}", err),
    }
}
