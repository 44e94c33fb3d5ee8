//! Simulation constants and default tuning parameters.
//!
//! Distances are world units, speeds are units per tick and angles are radians.
//! The values most worth tuning have a matching field in [`crate::config::Tuning`].

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Height of the ground plane.
pub const GROUND_LEVEL: f64 = 0.0;

// --- Health ---

/// Maximum (and respawn) tank health.
pub const MAX_HEALTH: f64 = 100.0;

// --- Tank body ---

/// Tank collision-sphere radius.
pub const TANK_RADIUS: f64 = 2.0;

/// Height of the turret pivot above the hull origin.
pub const TURRET_HEIGHT: f64 = 1.2;

/// Barrel length from the turret pivot to the muzzle.
pub const BARREL_LENGTH: f64 = 2.0;

/// Lowest barrel pitch (slight depression).
pub const MIN_ELEVATION: f64 = -0.1;

/// Highest barrel pitch.
pub const MAX_ELEVATION: f64 = 0.8;

// --- Player drive ---

/// Direct-drive speed for non-primary player tanks.
pub const PLAYER_SPEED: f64 = 0.3;

/// Top speed of the inertial (primary) drive, forwards or backwards.
pub const PLAYER_MAX_SPEED: f64 = 0.4;

/// Peak acceleration of the inertial drive.
pub const PLAYER_MAX_ACCELERATION: f64 = 0.02;

/// Fraction of the gap to the target acceleration closed each tick.
pub const ACCELERATION_EASE: f64 = 0.2;

/// Velocity multiplier applied each tick with no throttle input.
pub const DRAG: f64 = 0.92;

/// Speeds below this snap to zero when coasting.
pub const STOP_SPEED: f64 = 0.001;

/// Hull yaw rate at full input.
pub const HULL_TURN_RATE: f64 = 0.03;

/// Turret yaw rate at full input (also the base AI turret rate).
pub const TURRET_TURN_RATE: f64 = 0.04;

/// Barrel pitch rate at full input (also the AI pitch rate).
pub const PITCH_RATE: f64 = 0.02;

// --- Autopilot ---

/// Cruise speed of pattern-driven tanks.
pub const AI_SPEED: f64 = 0.2;

/// Heading rate of the circular orbit pattern.
pub const CIRCLE_TURN_RATE: f64 = 0.01;

/// Peak lateral heading offset of the zigzag pattern.
pub const ZIGZAG_AMPLITUDE: f64 = 0.6;

/// Phase advance per tick of the zigzag oscillation.
pub const ZIGZAG_FREQUENCY: f64 = 0.05;

/// Bounds on ticks between heading re-rolls (zigzag and random walk).
pub const HEADING_CHANGE_MIN_TICKS: u64 = 90;
pub const HEADING_CHANGE_MAX_TICKS: u64 = 300;

/// Heading rate used by random walk when turning toward a new heading.
pub const WANDER_TURN_RATE: f64 = 0.03;

/// Distance at which a patrol waypoint counts as reached.
pub const PATROL_CAPTURE_RADIUS: f64 = 5.0;

/// Side-length bounds of the generated patrol square.
pub const PATROL_SQUARE_MIN: f64 = 100.0;
pub const PATROL_SQUARE_MAX: f64 = 300.0;

/// Ticks of suspended movement after a physical collision.
pub const RECOVERY_TICKS: u32 = 45;

/// Maximum deviation from the reversed heading when recovery ends.
pub const RECOVERY_HEADING_JITTER: f64 = 0.5;

/// Distance from the arena centre where the homeward pull begins.
pub const HOME_PULL_START: f64 = 100.0;

/// Distance past `HOME_PULL_START` over which the pull grows to full strength.
pub const HOME_PULL_SPAN: f64 = 400.0;

/// Cap on the homeward bias.
pub const HOME_PULL_MAX: f64 = 0.85;

/// Bias above which the pull can override the pattern outright.
pub const HOME_OVERRIDE_BIAS: f64 = 0.3;

// --- Pursuit ---

/// Pursuit likelihood (aggressiveness plus grudge) needed to chase a target.
pub const PURSUIT_THRESHOLD: f64 = 0.6;

/// Added pursuit likelihood when the target is the tank's last attacker.
pub const GRUDGE_PURSUIT_BOOST: f64 = 0.3;

/// Preferred engagement distance: base plus a tactical-IQ share.
pub const PURSUIT_RANGE_BASE: f64 = 100.0;
pub const PURSUIT_RANGE_IQ: f64 = 50.0;

/// Distance from the preferred range within which pursuers slow down to aim.
pub const PURSUIT_HOLD_BAND: f64 = 20.0;

/// Heading rate while pursuing.
pub const PURSUIT_TURN_RATE: f64 = 0.04;

/// Tactical IQ above which pursuers flank instead of facing the target.
pub const FLANK_IQ: f64 = 0.7;

/// Flanking offset from the bearing to the target.
pub const FLANK_ANGLE: f64 = std::f64::consts::FRAC_PI_3;

/// Tactical IQ above which pursuers sometimes halt for a steadier shot.
pub const STOP_AND_SHOOT_IQ: f64 = 0.8;
pub const STOP_AND_SHOOT_CHANCE: f64 = 0.017;

// --- Targeting ---

/// Radius within which autopilots look for targets.
pub const ACQUISITION_RANGE: f64 = 150.0;

/// Maximum distance at which autopilots open fire.
pub const FIRE_RANGE: f64 = 120.0;

/// Per-tick chance that a ready autopilot in range pulls the trigger.
pub const FIRE_CHANCE: f64 = 0.02;

/// Aim jitter (radians) for a zero-accuracy gunner at point-blank range.
pub const BASE_JITTER: f64 = 0.05;

/// Distance over which aim jitter doubles.
pub const JITTER_DISTANCE_SCALE: f64 = 100.0;

/// Line-of-sight ray sampling step.
pub const LOS_SAMPLE_STEP: f64 = 5.0;

// --- Weapons ---

/// Ticks between shots.
pub const RELOAD_TICKS: u32 = 120;

/// Reload floor for fast-firing personalities.
pub const MIN_RELOAD_TICKS: u32 = 60;

/// Muzzle speeds by control variant.
pub const PLAYER_MUZZLE_SPEED: f64 = 2.0;
pub const REMOTE_MUZZLE_SPEED: f64 = 2.0;
pub const AI_MUZZLE_SPEED: f64 = 1.6;

/// Shell collision-sphere radius.
pub const SHELL_RADIUS: f64 = 0.2;

/// Shell lifetime budget in ticks.
pub const SHELL_LIFETIME_TICKS: u32 = 300;

/// Downward acceleration applied to shells each tick.
pub const GRAVITY: f64 = 0.005;

/// Minimum ticks between two accepted shots by the same tank.
pub const FIRE_DEDUP_TICKS: u64 = 5;

// --- Damage ---

/// Damage of a body hit.
pub const BASE_DAMAGE: f64 = 25.0;

/// Cap on the damage a single hit may deal.
pub const MAX_DAMAGE_PER_HIT: f64 = 50.0;

/// Impact heights (relative to the hull origin) separating hit zones.
pub const TURRET_HIT_HEIGHT: f64 = 1.0;
pub const TRACKS_HIT_HEIGHT: f64 = 0.4;

/// Damage multipliers per hit zone.
pub const TURRET_DAMAGE_MULTIPLIER: f64 = 1.25;
pub const BODY_DAMAGE_MULTIPLIER: f64 = 1.0;
pub const TRACKS_DAMAGE_MULTIPLIER: f64 = 0.75;

// --- Respawn ---

/// Delay before a destroyed autopilot tank respawns.
pub const RESPAWN_DELAY_TICKS: u64 = 300;

/// Ring on which autopilot tanks respawn by default.
pub const SPAWN_RING_MIN: f64 = 200.0;
pub const SPAWN_RING_MAX: f64 = 800.0;
