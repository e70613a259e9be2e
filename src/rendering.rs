//! Rendering systems: drop spheres, trail lines, and the stats overlay.
//!
//! ## System Responsibilities
//!
//! | System                      | Schedule | Purpose                                  |
//! |-----------------------------|----------|------------------------------------------|
//! | `configure_trail_gizmos`    | Startup  | Apply `trail.width` to the trail gizmos  |
//! | `setup_stats_text`          | Startup  | Spawn the stats text node                |
//! | `attach_drop_mesh_system`   | Update   | Give new drops a sphere mesh + material  |
//! | `draw_trails_system`        | Update   | Draw every trail node's segments         |
//! | `stats_display_system`      | Update   | Refresh live/spawned/culled/expired text |
//!
//! Drops are spawned by the emitter with only a [`DropAppearance`]; the mesh
//! and material are attached one frame later, which is imperceptible at
//! 60 Hz.  Meshes and materials are cached per distinct appearance so a batch
//! of identical drops shares one of each.

use crate::config::{load_rain_config, RainConfig};
use crate::emitter::DropAppearance;
use crate::scene::{DropRegistry, RainStats, TrailLines, TrailStyle};
use bevy::prelude::*;
use std::collections::HashMap;

/// Screen pixels per world unit of `trail.width`.
const TRAIL_PIXELS_PER_UNIT: f32 = 40.0;

/// Gizmo group for trail lines so their width is set independently.
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct TrailGizmos;

/// Mesh and material handles shared by drops with the same appearance.
#[derive(Resource, Default)]
pub struct DropAssets {
    meshes: HashMap<u32, Handle<Mesh>>,
    materials: HashMap<[u32; 8], Handle<StandardMaterial>>,
}

#[derive(Component)]
pub struct StatsTextDisplay;

pub struct RainRenderPlugin;

impl Plugin for RainRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DropAssets>()
            .init_gizmo_group::<TrailGizmos>()
            .add_systems(
                Startup,
                (
                    configure_trail_gizmos.after(load_rain_config),
                    setup_stats_text,
                ),
            )
            .add_systems(
                Update,
                (
                    attach_drop_mesh_system,
                    draw_trails_system,
                    stats_display_system,
                ),
            );
    }
}

impl DropAppearance {
    fn cache_key(&self) -> [u32; 8] {
        let color = self.color.to_srgba();
        [
            self.radius.to_bits(),
            color.red.to_bits(),
            color.green.to_bits(),
            color.blue.to_bits(),
            color.alpha.to_bits(),
            self.opacity.to_bits(),
            self.metalness.to_bits(),
            self.roughness.to_bits(),
        ]
    }

    fn material(&self) -> StandardMaterial {
        StandardMaterial {
            base_color: self.color.with_alpha(self.opacity),
            metallic: self.metalness,
            perceptual_roughness: self.roughness,
            alpha_mode: AlphaMode::Blend,
            ..default()
        }
    }
}

// ── Startup systems ───────────────────────────────────────────────────────────

pub fn configure_trail_gizmos(mut store: ResMut<GizmoConfigStore>, config: Res<RainConfig>) {
    let (gizmo, _) = store.config_mut::<TrailGizmos>();
    gizmo.line.width = (config.trail.width * TRAIL_PIXELS_PER_UNIT).max(1.0);
}

pub fn setup_stats_text(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            StatsTextDisplay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Live: 0 | Spawned: 0 | Culled: 0 | Expired: 0"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.6, 0.9, 1.0)),
            ));
        });
}

// ── Update systems ────────────────────────────────────────────────────────────

/// Attach `Mesh3d` + `MeshMaterial3d` to every newly-spawned drop.
pub fn attach_drop_mesh_system(
    mut commands: Commands,
    mut cache: ResMut<DropAssets>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    query: Query<(Entity, &DropAppearance), Added<DropAppearance>>,
) {
    let cache = &mut *cache;
    for (entity, appearance) in query.iter() {
        let mesh = cache
            .meshes
            .entry(appearance.radius.to_bits())
            .or_insert_with(|| meshes.add(Sphere::new(appearance.radius)))
            .clone();
        let material = cache
            .materials
            .entry(appearance.cache_key())
            .or_insert_with(|| materials.add(appearance.material()))
            .clone();
        commands
            .entity(entity)
            .try_insert((Mesh3d(mesh), MeshMaterial3d(material)));
    }
}

pub fn draw_trails_system(
    mut gizmos: Gizmos<TrailGizmos>,
    trails: Query<(&TrailLines, &TrailStyle)>,
) {
    for (lines, style) in trails.iter() {
        for segment in &lines.0 {
            gizmos.line(segment.start, segment.end, style.color);
        }
    }
}

pub fn stats_display_system(
    stats: Res<RainStats>,
    registry: Res<DropRegistry>,
    parent_query: Query<&Children, With<StatsTextDisplay>>,
    mut text_query: Query<&mut Text>,
) {
    if !stats.is_changed() && !registry.is_changed() {
        return;
    }
    for children in parent_query.iter() {
        for child in children.iter() {
            if let Ok(mut text) = text_query.get_mut(child) {
                *text = Text::new(format!(
                    "Live: {} | Spawned: {} | Culled: {} | Expired: {} | Peak: {}",
                    registry.len(),
                    stats.spawned,
                    stats.culled,
                    stats.expired,
                    stats.peak_live
                ));
            }
        }
    }
}
