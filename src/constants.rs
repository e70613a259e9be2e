//! Centralised emitter, drop, trail, and wind defaults.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place.  [`crate::config::RainConfig::default`] reads every
//! value from this module; `assets/rain.toml` overrides them at startup.

// ── Emitter ───────────────────────────────────────────────────────────────────

/// Drops spawned per emission tick.
///
/// Steady-state drop count is roughly
/// `PARTICLE_COUNT × DELETION_INTERVAL_MS / EMISSION_INTERVAL_MS` when nothing
/// reaches the ground first (200 with the defaults).
pub const PARTICLE_COUNT: usize = 25;

/// Minimum time between two emission ticks (milliseconds).
pub const EMISSION_INTERVAL_MS: u64 = 500;

/// Age at which a drop is force-removed even if it never reached the ground
/// (milliseconds).
pub const DELETION_INTERVAL_MS: u64 = 4000;

/// Radius of the spawn region around the emitter (world units).
pub const EMISSION_RADIUS: f32 = 4.0;

/// Default emitter position when the config file does not set one.
pub const EMITTER_POSITION: [f32; 3] = [0.0, 6.0, 0.0];

// ── Drop appearance and body ──────────────────────────────────────────────────

pub const PARTICLE_RADIUS: f32 = 0.01;
pub const PARTICLE_MASS: f32 = 0.001;
pub const PARTICLE_COLOR: &str = "#9CE3F9";
pub const PARTICLE_OPACITY: f32 = 0.45;
pub const PARTICLE_METALNESS: f32 = 0.0;
pub const PARTICLE_ROUGHNESS: f32 = 1.0;

// ── Trail ─────────────────────────────────────────────────────────────────────

/// Number of recorded positions per trail; `TRAIL_LENGTH - 1` segments are drawn.
pub const TRAIL_LENGTH: usize = 2;
pub const TRAIL_WIDTH: f32 = 0.05;
pub const TRAIL_OPACITY: f32 = 0.85;
pub const TRAIL_COLOR: &str = "#9CE3F9";

// ── Ground ────────────────────────────────────────────────────────────────────

/// Drops whose `y` falls below this height are removed together with their trail.
pub const GROUND_LEVEL: f32 = -3.0;

// ── Wind ──────────────────────────────────────────────────────────────────────

/// Nominal wind force (newtons) applied once when a drop is created.
pub const WIND_FORCE: [f32; 3] = [0.01, 0.0, 0.01];

/// Jitter fraction: each axis is scaled by `1 - U(0,1) * WIND_STD`.
pub const WIND_STD: f32 = 0.05;

/// Duration the one-shot wind force acts for when turned into an impulse (s).
///
/// Matches one step of a 60 Hz physics integrator, so the drop receives the
/// same momentum as a force that is applied for a single step and then cleared.
pub const WIND_IMPULSE_STEP: f32 = 1.0 / 60.0;

// ── Config file ───────────────────────────────────────────────────────────────

/// Default location of the runtime config file.
pub const CONFIG_PATH: &str = "assets/rain.toml";

/// Environment variable that overrides [`CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "RAINFALL_CONFIG";
