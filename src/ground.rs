use crate::behavior::{Behavior, Host};
use crate::constants::GROUND_LEVEL;
use crate::scene::RemovalCause;
use bevy::prelude::*;

/// Removes its drop, trail included, once the drop falls below `ground_level`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct GroundCull {
    pub ground_level: f32,
}

impl Default for GroundCull {
    fn default() -> Self {
        Self {
            ground_level: GROUND_LEVEL,
        }
    }
}

impl GroundCull {
    pub fn is_below(&self, position: Vec3) -> bool {
        position.y < self.ground_level
    }
}

impl Behavior for GroundCull {
    fn on_frame(&mut self, host: &mut Host<'_, '_, '_>) {
        if self.is_below(host.position) {
            host.scene.remove_drop(host.entity, RemovalCause::BelowGround);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_strict() {
        let cull = GroundCull { ground_level: -3.0 };
        assert!(!cull.is_below(Vec3::new(0.0, -3.0, 0.0)));
        assert!(cull.is_below(Vec3::new(0.0, -3.001, 0.0)));
        assert!(!cull.is_below(Vec3::new(100.0, 10.0, -100.0)));
    }
}
