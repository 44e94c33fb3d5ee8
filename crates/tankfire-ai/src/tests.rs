//! Tests for aiming, target selection, movement patterns and profiles.

use std::f64::consts::{FRAC_PI_2, PI};

use glam::DVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tankfire_core::components::{Autopilot, MovementPattern, Personality, Recovery};
use tankfire_core::config::Tuning;
use tankfire_core::constants::*;
use tankfire_core::enums::PatternKind;
use tankfire_core::types::{forward_from_yaw, horizontal_distance, TankId};

use crate::patterns::{drive, home_bias, make_pattern, step_pattern, PatternInput};
use crate::profiles::{gunnery_profile, roll_personality};
use crate::pursuit::{ideal_range, pursue, wants_to_pursue, PursuitInput};
use crate::targeting::*;

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(7)
}

fn input(position: DVec3, heading: f64, tick: u64) -> PatternInput {
    PatternInput {
        position,
        heading,
        tick,
        speed: AI_SPEED,
        capture_radius: PATROL_CAPTURE_RADIUS,
    }
}

fn aim_params(jitter: f64) -> AimParams {
    AimParams {
        turret_rate: TURRET_TURN_RATE,
        pitch_rate: PITCH_RATE,
        jitter,
        min_elevation: MIN_ELEVATION,
        max_elevation: MAX_ELEVATION,
        muzzle_speed: AI_MUZZLE_SPEED,
        gravity: GRAVITY,
        turret_height: TURRET_HEIGHT,
    }
}

// ---- Angles ----

#[test]
fn test_normalize_angle_range() {
    for i in -40..=40 {
        let angle = i as f64 * 0.37;
        let n = normalize_angle(angle);
        assert!(n > -PI && n <= PI, "{angle} normalized to {n}");
        assert!((angle.sin() - n.sin()).abs() < 1e-9 && (angle.cos() - n.cos()).abs() < 1e-9);
    }
    assert_eq!(normalize_angle(PI), PI);
    assert_eq!(normalize_angle(-PI), PI, "-pi maps onto the closed end");
    assert_eq!(normalize_angle(f64::NAN), 0.0);
}

#[test]
fn test_yaw_to_convention() {
    assert!((yaw_to(DVec3::ZERO, DVec3::Z) - 0.0).abs() < 1e-12);
    assert!((yaw_to(DVec3::ZERO, DVec3::X) - FRAC_PI_2).abs() < 1e-12);
    assert!((yaw_to(DVec3::ZERO, -DVec3::X) + FRAC_PI_2).abs() < 1e-12);
}

#[test]
fn test_step_toward_angle_bounded_shortest_arc() {
    let stepped = step_toward_angle(0.0, 1.0, 0.1);
    assert!((stepped - 0.1).abs() < 1e-12);

    // From just below +pi to just above -pi is a short hop across the seam.
    let stepped = step_toward_angle(PI - 0.05, -PI + 0.05, 0.5);
    assert!((normalize_angle(stepped) - (-PI + 0.05)).abs() < 1e-9);
    assert!(stepped > PI - 0.05, "took the short way round, got {stepped}");

    let snapped = step_toward_angle(0.3, 0.35, 0.1);
    assert!((snapped - 0.35).abs() < 1e-12, "small errors close in one step");
}

// ---- Pitch ----

#[test]
fn test_required_pitch_flat_and_clamped() {
    let no_gravity = required_pitch(0.0, 50.0, 2.0, 0.0, MIN_ELEVATION, MAX_ELEVATION);
    assert!(no_gravity.abs() < 1e-12, "level target without gravity needs no pitch");

    let with_gravity = required_pitch(0.0, 50.0, 2.0, GRAVITY, MIN_ELEVATION, MAX_ELEVATION);
    assert!(with_gravity > 0.0, "gravity drop is compensated");

    let steep = required_pitch(100.0, 1.0, 2.0, GRAVITY, MIN_ELEVATION, MAX_ELEVATION);
    assert_eq!(steep, MAX_ELEVATION);
    let below = required_pitch(-100.0, 1.0, 2.0, 0.0, MIN_ELEVATION, MAX_ELEVATION);
    assert_eq!(below, MIN_ELEVATION);
}

#[test]
fn test_required_pitch_lands_on_target() {
    // Simulate the shell with the same Euler step the sim uses.
    let speed = 2.0;
    let distance = 80.0;
    let pitch = required_pitch(0.0, distance, speed, GRAVITY, -1.0, 1.0);
    let mut pos = DVec3::ZERO;
    let mut vel = DVec3::new(0.0, pitch.sin(), pitch.cos()) * speed;
    while pos.y >= 0.0 {
        pos += vel;
        vel.y -= GRAVITY;
    }
    assert!(
        (pos.z - distance).abs() < 2.0 * speed + 1.0,
        "landed at {} for target at {distance}",
        pos.z
    );
}

// ---- Aiming ----

#[test]
fn test_aim_turret_rate_bounded() {
    let mut rng = rng();
    let state = AimState {
        position: DVec3::ZERO,
        hull_yaw: 0.0,
        turret_yaw: 0.0,
        barrel_pitch: 0.0,
    };
    let update = aim(&state, DVec3::new(50.0, 0.0, 0.0), &aim_params(0.0), &mut rng);
    assert!((update.turret_yaw - TURRET_TURN_RATE).abs() < 1e-12);
    assert!(
        (normalize_angle(FRAC_PI_2 - update.turret_yaw) - (FRAC_PI_2 - TURRET_TURN_RATE)).abs() < 1e-9,
        "one step leaves the rest of the quarter turn"
    );
    assert!(update.barrel_pitch.abs() <= PITCH_RATE + 1e-12);
}

#[test]
fn test_aim_converges_relative_to_hull() {
    let mut rng = rng();
    let mut state = AimState {
        position: DVec3::ZERO,
        hull_yaw: FRAC_PI_2,
        turret_yaw: 0.0,
        barrel_pitch: 0.0,
    };
    let target = DVec3::new(0.0, 0.0, 60.0);
    let mut update = aim(&state, target, &aim_params(0.0), &mut rng);
    for _ in 0..200 {
        state.turret_yaw = update.turret_yaw;
        state.barrel_pitch = update.barrel_pitch;
        update = aim(&state, target, &aim_params(0.0), &mut rng);
    }
    assert!((update.turret_yaw + FRAC_PI_2).abs() < 1e-9);
    assert!(
        (state.turret_yaw + FRAC_PI_2).abs() < 1e-9,
        "turret must cancel the hull yaw, got {}",
        state.turret_yaw
    );
    assert!(state.barrel_pitch > 0.0 && state.barrel_pitch <= MAX_ELEVATION);
}

#[test]
fn test_aim_jitter_stays_bounded() {
    let mut rng = rng();
    let state = AimState {
        position: DVec3::ZERO,
        hull_yaw: 0.0,
        turret_yaw: 0.0,
        barrel_pitch: 0.0,
    };
    for _ in 0..100 {
        let update = aim(&state, DVec3::new(0.0, 0.0, 40.0), &aim_params(0.3), &mut rng);
        assert!(update.turret_yaw.abs() <= TURRET_TURN_RATE + 1e-12);
        assert!(update.barrel_pitch >= MIN_ELEVATION && update.barrel_pitch <= MAX_ELEVATION);
    }
}

#[test]
fn test_should_fire_gates() {
    let mut rng = rng();
    assert!(!should_fire(false, 10.0, 100.0, 1.0, &mut rng), "not loaded");
    assert!(!should_fire(true, 150.0, 100.0, 1.0, &mut rng), "out of range");
    assert!(!should_fire(true, 10.0, 100.0, 0.0, &mut rng), "zero chance");
    assert!(should_fire(true, 10.0, 100.0, 1.0, &mut rng));
    assert!(!should_fire(true, f64::NAN, 100.0, 1.0, &mut rng));
}

// ---- Target selection ----

fn candidate(id: u32, x: f64, health: f64) -> TargetCandidate {
    TargetCandidate {
        id: TankId(id),
        position: DVec3::new(x, 0.0, 0.0),
        health,
        destroyed: health <= 0.0,
        visible: true,
    }
}

fn selection() -> SelectionParams {
    SelectionParams {
        acquisition_range: 100.0,
        tactical_iq: 0.5,
        last_attacker: None,
        current_target: None,
    }
}

#[test]
fn test_select_nearest_live_target() {
    let candidates = [
        candidate(1, 0.0, 100.0),
        candidate(2, 30.0, 100.0),
        candidate(3, 10.0, 0.0),
        candidate(4, 500.0, 10.0),
    ];
    let chosen = select_target(TankId(1), DVec3::ZERO, &candidates, &selection());
    assert_eq!(chosen.map(|c| c.id), Some(TankId(2)), "self, wrecks and far tanks skipped");
}

#[test]
fn test_select_prefers_attacker_and_skips_hidden() {
    let mut hidden = candidate(2, 5.0, 100.0);
    hidden.visible = false;
    let candidates = [hidden, candidate(3, 40.0, 100.0), candidate(4, 50.0, 100.0)];
    let params = SelectionParams {
        last_attacker: Some(TankId(4)),
        ..selection()
    };
    let chosen = select_target(TankId(1), DVec3::ZERO, &candidates, &params);
    assert_eq!(chosen.map(|c| c.id), Some(TankId(4)));
}

#[test]
fn test_select_none_when_alone() {
    assert!(select_target(TankId(1), DVec3::ZERO, &[], &selection()).is_none());
}

// ---- Patterns ----

#[test]
fn test_patrol_advances_and_cycles() {
    let mut rng = rng();
    let mut pattern = MovementPattern::Patrol {
        waypoints: vec![DVec3::new(10.0, 0.0, 0.0), DVec3::new(-10.0, 0.0, 0.0)],
        index: 0,
    };
    let mut position = DVec3::new(10.0, 0.0, 0.0);
    let mut heading = 0.0;

    let step = step_pattern(&mut pattern, &input(position, heading, 0), &mut rng);
    assert!(matches!(pattern, MovementPattern::Patrol { index: 1, .. }));
    assert!((step.heading + FRAC_PI_2).abs() < 1e-12, "heads for (-10, 0, 0)");

    let mut advances = 0;
    let mut last_index = 1;
    for tick in 1..5_000 {
        let step = step_pattern(&mut pattern, &input(position, heading, tick), &mut rng);
        heading = step.heading;
        position += DVec3::new(heading.sin(), 0.0, heading.cos()) * step.speed;
        if let MovementPattern::Patrol { index, .. } = &pattern {
            if *index != last_index {
                advances += 1;
                last_index = *index;
            }
        }
    }
    assert!(advances >= 10, "patrol should keep cycling, advanced {advances} times");
    assert!(position.x.abs() <= 10.0 + AI_SPEED, "stays between the waypoints");
}

#[test]
fn test_patrol_empty_waypoints_drives_straight() {
    let mut rng = rng();
    let mut pattern = MovementPattern::Patrol {
        waypoints: Vec::new(),
        index: 3,
    };
    let step = step_pattern(&mut pattern, &input(DVec3::ZERO, 0.4, 0), &mut rng);
    assert_eq!(step.heading, 0.4);
    assert_eq!(step.speed, AI_SPEED);
}

#[test]
fn test_circle_heading_monotonic() {
    let mut rng = rng();
    let mut pattern = make_pattern(PatternKind::Circle, DVec3::ZERO, 0, &mut rng);
    let mut heading = 0.0;
    for tick in 0..1_000 {
        let step = step_pattern(&mut pattern, &input(DVec3::ZERO, heading, tick), &mut rng);
        assert!(step.heading > heading);
        heading = step.heading;
    }
}

#[test]
fn test_zigzag_oscillates_about_base() {
    let mut rng = rng();
    let mut pattern = MovementPattern::Zigzag {
        base_heading: 1.0,
        phase: 0.0,
        next_change_tick: u64::MAX,
    };
    for tick in 0..500 {
        let step = step_pattern(&mut pattern, &input(DVec3::ZERO, 0.0, tick), &mut rng);
        assert!((step.heading - 1.0).abs() <= ZIGZAG_AMPLITUDE + 1e-12);
    }
}

#[test]
fn test_heading_rerolls_on_schedule() {
    let mut rng = rng();
    let mut pattern = MovementPattern::RandomWalk {
        target_heading: 0.0,
        next_change_tick: 10,
    };
    step_pattern(&mut pattern, &input(DVec3::ZERO, 0.0, 9), &mut rng);
    assert!(matches!(
        pattern,
        MovementPattern::RandomWalk { next_change_tick: 10, .. }
    ));
    step_pattern(&mut pattern, &input(DVec3::ZERO, 0.0, 10), &mut rng);
    match pattern {
        MovementPattern::RandomWalk { next_change_tick, .. } => {
            assert!(next_change_tick >= 10 + HEADING_CHANGE_MIN_TICKS);
            assert!(next_change_tick <= 10 + HEADING_CHANGE_MAX_TICKS);
        }
        _ => panic!("pattern kind changed"),
    }
}

#[test]
fn test_make_patrol_square_around_spawn() {
    let mut rng = rng();
    let spawn = DVec3::new(100.0, 0.0, -50.0);
    match make_pattern(PatternKind::Patrol, spawn, 0, &mut rng) {
        MovementPattern::Patrol { waypoints, index } => {
            assert_eq!(index, 0);
            assert_eq!(waypoints.len(), 4);
            let centroid = waypoints.iter().copied().sum::<DVec3>() / 4.0;
            assert!((centroid - spawn).length() < 1e-9);
            let side = (waypoints[0] - waypoints[1]).length();
            assert!((PATROL_SQUARE_MIN..=PATROL_SQUARE_MAX).contains(&side));
        }
        other => panic!("expected a patrol, got {other:?}"),
    }
}

// ---- Recovery ----

#[test]
fn test_recovery_suspends_then_reverses() {
    let mut rng = rng();
    let mut autopilot = Autopilot::new(
        MovementPattern::Circle { turn_rate: 0.01 },
        Personality::default(),
    );
    autopilot.recovery = Some(Recovery {
        remaining: 3,
        prior_heading: 0.0,
    });

    for tick in 0..2 {
        let step = drive(&mut autopilot, &input(DVec3::ZERO, 0.0, tick), &mut rng);
        assert_eq!(step.speed, 0.0, "movement suspended during recovery");
        assert!(autopilot.is_recovering());
    }
    let step = drive(&mut autopilot, &input(DVec3::ZERO, 0.0, 2), &mut rng);
    assert!(!autopilot.is_recovering());
    assert!(
        step.heading.abs() >= PI - RECOVERY_HEADING_JITTER - 1e-9,
        "new heading {} should face roughly backwards",
        step.heading
    );

    let step = drive(&mut autopilot, &input(DVec3::ZERO, step.heading, 3), &mut rng);
    assert_eq!(step.speed, AI_SPEED, "pattern resumes after recovery");
}

// ---- Homeward pull ----

#[test]
fn test_home_bias_grows_with_distance() {
    assert_eq!(home_bias(DVec3::ZERO), 0.0);
    assert_eq!(home_bias(DVec3::new(HOME_PULL_START, 0.0, 0.0)), 0.0);
    let halfway = DVec3::new(0.0, 0.0, -(HOME_PULL_START + HOME_PULL_SPAN * 0.5));
    assert!((home_bias(halfway) - 0.5).abs() < 1e-12);
    assert_eq!(home_bias(DVec3::new(5000.0, 0.0, 5000.0)), HOME_PULL_MAX);
}

#[test]
fn test_distant_orbit_drifts_home() {
    let mut rng = rng();
    let mut autopilot = Autopilot::new(
        MovementPattern::Circle { turn_rate: CIRCLE_TURN_RATE },
        Personality::default(),
    );
    let start = DVec3::new(600.0, 0.0, 0.0);
    let mut position = start;
    let mut heading = 0.0;
    for tick in 0..3000 {
        let step = drive(&mut autopilot, &input(position, heading, tick), &mut rng);
        heading = normalize_angle(step.heading);
        position += forward_from_yaw(heading) * step.speed;
    }
    let distance = horizontal_distance(position, DVec3::ZERO);
    assert!(distance < 450.0, "orbit should have crept toward the centre, ended {distance} out");
}

#[test]
fn test_patrol_ignores_homeward_pull() {
    let far = DVec3::new(700.0, 0.0, 700.0);
    let pattern = MovementPattern::Patrol {
        waypoints: vec![DVec3::new(900.0, 0.0, 700.0)],
        index: 0,
    };
    let mut autopilot = Autopilot::new(pattern.clone(), Personality::default());
    let mut plain = pattern;
    let mut rng = rng();
    let driven = drive(&mut autopilot, &input(far, 0.3, 0), &mut rng);
    let expected = step_pattern(&mut plain, &input(far, 0.3, 0), &mut rng);
    assert_eq!(driven, expected);
}

// ---- Pursuit ----

fn gunner(aggressiveness: f64, tactical_iq: f64) -> Personality {
    Personality {
        aggressiveness,
        tactical_iq,
        ..Personality::default()
    }
}

fn chase(heading: f64, target: DVec3) -> PursuitInput {
    PursuitInput {
        position: DVec3::ZERO,
        heading,
        target,
        speed: AI_SPEED,
    }
}

#[test]
fn test_pursuit_needs_aggression_or_grudge() {
    let mut rng = rng();
    assert!(!wants_to_pursue(&gunner(0.5, 0.5), false, &mut rng));
    assert!(wants_to_pursue(&gunner(0.5, 0.5), true, &mut rng), "grudge tips the balance");
    assert!(wants_to_pursue(&gunner(0.9, 0.3), false, &mut rng));
    assert!(!wants_to_pursue(&gunner(0.2, 0.9), true, &mut rng));
}

#[test]
fn test_ideal_range_follows_iq() {
    assert_eq!(ideal_range(0.0), PURSUIT_RANGE_BASE);
    assert_eq!(ideal_range(1.0), PURSUIT_RANGE_BASE + PURSUIT_RANGE_IQ);
    assert_eq!(ideal_range(3.0), ideal_range(1.0));
}

#[test]
fn test_pursuer_closes_on_distant_target() {
    let mut rng = rng();
    let step = pursue(&gunner(0.9, 0.5), &chase(0.0, DVec3::new(0.0, 0.0, 300.0)), &mut rng);
    assert!(step.heading.abs() < 1e-12, "already facing the target");
    assert_eq!(step.speed, AI_SPEED);

    let step = pursue(&gunner(0.9, 0.5), &chase(FRAC_PI_2, DVec3::new(0.0, 0.0, 300.0)), &mut rng);
    assert!((step.heading - (FRAC_PI_2 - PURSUIT_TURN_RATE)).abs() < 1e-12, "turn is rate-limited");
}

#[test]
fn test_clever_pursuer_backs_off_when_crowded() {
    let mut rng = rng();
    let step = pursue(&gunner(0.9, 0.6), &chase(0.0, DVec3::new(0.0, 0.0, 40.0)), &mut rng);
    assert!(step.heading.abs() < 1e-12, "keeps facing the target");
    assert!((step.speed + AI_SPEED * 1.2).abs() < 1e-12, "reverses away, got {}", step.speed);
}

#[test]
fn test_dull_pursuer_pushes_in() {
    let mut rng = rng();
    let step = pursue(&gunner(0.9, 0.3), &chase(0.0, DVec3::new(0.0, 0.0, 40.0)), &mut rng);
    assert!(step.speed > 0.0);
}

#[test]
fn test_flanker_swings_to_favoured_side() {
    let mut rng = rng();
    let target = DVec3::new(0.0, 0.0, 140.0);
    let step = pursue(&gunner(0.9, 0.75), &chase(0.1, target), &mut rng);
    assert!((step.heading - (0.1 + PURSUIT_TURN_RATE)).abs() < 1e-12);
    assert!((step.speed - AI_SPEED * 0.6).abs() < 1e-12, "slows inside the hold band");

    let step = pursue(&gunner(0.9, 0.75), &chase(-0.1, target), &mut rng);
    assert!((step.heading - (-0.1 - PURSUIT_TURN_RATE)).abs() < 1e-12);
}

// ---- Profiles ----

#[test]
fn test_personality_traits_in_unit_range() {
    let mut rng = rng();
    for difficulty in [-1.0, 0.0, 0.3, 0.9, 2.0] {
        let p = roll_personality(difficulty, &mut rng);
        for value in [p.accuracy, p.aggressiveness, p.fire_rate, p.tactical_iq] {
            assert!((0.0..=1.0).contains(&value));
        }
    }
}

#[test]
fn test_gunnery_profile_scales_with_traits() {
    let tuning = Tuning::default();
    let rookie = gunnery_profile(
        &Personality {
            accuracy: 0.0,
            aggressiveness: 0.0,
            fire_rate: 0.0,
            tactical_iq: 0.0,
        },
        &tuning,
    );
    let ace = gunnery_profile(
        &Personality {
            accuracy: 1.0,
            aggressiveness: 1.0,
            fire_rate: 1.0,
            tactical_iq: 1.0,
        },
        &tuning,
    );
    assert!(rookie.jitter > ace.jitter);
    assert_eq!(ace.jitter, 0.0);
    assert!(rookie.reload_ticks > ace.reload_ticks);
    assert!(ace.reload_ticks >= MIN_RELOAD_TICKS);
    assert!(ace.fire_chance > rookie.fire_chance);
    assert!(ace.fire_range > rookie.fire_range);
    assert!(ace.turret_rate > rookie.turret_rate);
}
