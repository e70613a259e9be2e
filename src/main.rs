use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier3d::prelude::*;

use rainfall::config::{self, RainConfig};
use rainfall::emitter;
use rainfall::graphics;
use rainfall::rendering::RainRenderPlugin;
use rainfall::simulation::RainPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Rainfall".into(),
                resolution: WindowResolution::new(1200, 680),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        // Compiled defaults; load_rain_config overwrites them from
        // assets/rain.toml (or $RAINFALL_CONFIG) in the Startup schedule.
        .insert_resource(RainConfig::default())
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        .add_plugins((RainPlugin, RainRenderPlugin))
        .add_systems(
            Startup,
            (
                // Load config first so every other startup system sees the final values.
                config::load_rain_config,
                graphics::setup_camera,
                graphics::setup_light,
                emitter::spawn_emitter_from_config.after(config::load_rain_config),
            ),
        )
        .run();
}
