//! End-to-end tuning runs against the simulated drive.
//!
//! Verifies:
//! 1. Reference ramp plan, kV / kStatic recovery and the dead-band bias.
//! 2. kA recovery through both phases with a dynamic plant.
//! 3. Stop at any tick leaves equal-length series and zero power.
//! 4. Gate scenarios driven by raw signal scripts.

use drivetune::gate::Phase;
use drivetune::operator::{ScriptedOperator, SignalScript};
use drivetune::scheduler::TickClock;
use drivetune::TuningSession;
use drivetune_common::config::{PlantConfig, TuningConfig};
use drivetune_common::drive::DriveHandle;
use drivetune_common::signals::{SignalSource, Signals};
use drivetune_common::telemetry::BufferedTelemetry;
use drivetune_sim::SimDrive;
use proptest::prelude::*;

// ─── Helpers ────────────────────────────────────────────────────────

const RATED: f64 = 30.0;
const TICK_LIMIT: u64 = 100_000;

fn config(tick_period_s: f64) -> TuningConfig {
    TuningConfig {
        max_power: 0.7,
        distance: 100.0,
        tick_period_s,
    }
}

fn drive(plant: PlantConfig, dt: f64) -> SimDrive {
    SimDrive::with_rated_velocity(RATED, plant, dt)
}

/// Signal source that can be told the phase the session reached.
trait Operator: SignalSource {
    fn observe(&mut self, _phase: Phase) {}
}

impl Operator for ScriptedOperator {
    fn observe(&mut self, phase: Phase) {
        ScriptedOperator::observe(self, phase);
    }
}

impl Operator for SignalScript {}

/// Run `session` to completion, putting the robot back at rest when asked.
fn run_session(
    session: &mut TuningSession,
    operator: &mut dyn Operator,
    drive: &mut SimDrive,
    telemetry: &mut BufferedTelemetry,
    dt: f64,
) -> u64 {
    let mut clock = TickClock::simulated(dt);
    while clock.ticks() < TICK_LIMIT {
        let signals = operator.poll();
        let phase = session.tick(clock.now(), &signals, drive, telemetry);
        if phase == Phase::AwaitAccelConfirm {
            drive.place_at_rest();
        }
        operator.observe(phase);
        if session.is_finished() {
            break;
        }
        clock.advance();
    }
    clock.ticks()
}

fn run_scripted(
    fit_static: bool,
    fit_accel: bool,
    plant: PlantConfig,
    dt: f64,
) -> (TuningSession, SimDrive, BufferedTelemetry) {
    let mut session = TuningSession::new(config(dt)).unwrap();
    let mut sim = drive(plant, dt);
    let mut telemetry = BufferedTelemetry::new();
    let mut operator = ScriptedOperator::new(fit_static, fit_accel);
    run_session(&mut session, &mut operator, &mut sim, &mut telemetry, dt);
    (session, sim, telemetry)
}

// ─── Test 1: ramp test recovery ────────────────────────────────────

#[test]
fn test_ramp_recovers_kv_and_kstatic_at_reference_tick() {
    // Low friction keeps the dead band to the first ~1.4% of the ramp.
    let plant = PlantConfig {
        kv: 0.03,
        k_static: 0.01,
        ka: 0.0,
    };
    let (session, sim, telemetry) = run_scripted(true, false, plant, 0.02);

    let plan = session.plan().unwrap();
    assert!((plan.max_vel - 21.0).abs() < 1e-9);
    assert!((plan.final_vel - 14.7).abs() < 1e-9);
    assert!((plan.accel - 1.08045).abs() < 1e-9);
    assert!((plan.ramp_time - 13.605).abs() < 1e-3);

    let ramp = session.ramp_result().unwrap();
    assert!((ramp.kv - 0.03).abs() / 0.03 < 0.01, "kV = {}", ramp.kv);
    // Each sample is taken before that tick's command, so the intercept
    // lags by about (du/dt)·dt/2 = 0.0005 at 0.02 s ticks.
    assert!(
        (ramp.k_static - 0.01).abs() / 0.01 < 0.05,
        "kStatic = {}",
        ramp.k_static
    );
    assert!(ramp.r_square > 0.999);

    assert_eq!(session.phase(), Phase::Idle);
    assert!(session.accel_result().is_none());
    assert_eq!(sim.last_commanded_power(), Some(0.0));
    assert!(telemetry.contains("kV = 0.030"));
    assert!(telemetry.contains("kStatic = 0.01"));
}

#[test]
fn test_ramp_fit_biased_by_static_dead_band() {
    // Below kStatic the robot stands still. Those samples sit at v = 0 and
    // pull the fitted line toward the origin: kV reads high and kStatic low.
    let plant = PlantConfig {
        kv: 0.03,
        k_static: 0.1,
        ka: 0.0,
    };
    let (session, _, telemetry) = run_scripted(true, false, plant, 0.01);

    let series = session.ramp_series().unwrap();
    assert!(series.positions().iter().all(|&p| p >= 0.0));
    let stationary = series.powers().iter().filter(|&&u| u <= 0.1).count();
    assert!(stationary > 0);
    assert!(series.positions()[..stationary].iter().all(|&p| p == 0.0));

    let ramp = session.ramp_result().unwrap();
    assert!(ramp.kv > 0.03 && ramp.kv < 0.03 * 1.06, "kV = {}", ramp.kv);
    assert!(
        ramp.k_static < 0.1 && ramp.k_static > 0.1 * 0.75,
        "kStatic = {}",
        ramp.k_static
    );
    assert!(ramp.r_square > 0.99);
    assert!(telemetry.contains("Quasi-static ramp up test complete"));
}

#[test]
fn test_ramp_samples_are_well_formed() {
    let plant = PlantConfig {
        kv: 0.03,
        k_static: 0.1,
        ka: 0.0,
    };
    let (session, _, _) = run_scripted(false, false, plant, 0.02);
    let series = session.ramp_series().unwrap();
    let plan = session.plan().unwrap();

    assert_eq!(series.times()[0], 0.0);
    assert!(series.times().windows(2).all(|w| w[0] < w[1]));
    assert!(*series.times().last().unwrap() <= plan.ramp_time);
    assert!(series.powers().iter().all(|&p| p <= plan.max_power + 1e-12));
    assert_eq!(session.ramp_result().unwrap().k_static, 0.0);
}

// ─── Test 2: both phases on a dynamic plant ─────────────────────────

#[test]
fn test_constant_power_phase_recovers_ka() {
    let plant = PlantConfig {
        kv: 0.03,
        k_static: 0.01,
        ka: 0.003,
    };
    let (session, sim, telemetry) = run_scripted(true, true, plant, 0.005);

    let ramp = session.ramp_result().unwrap();
    assert!((ramp.kv - 0.03).abs() / 0.03 < 0.01, "kV = {}", ramp.kv);

    let accel = session.accel_result().unwrap();
    assert!((accel.ka - 0.003).abs() / 0.003 < 0.05, "kA = {}", accel.ka);

    let series = session.accel_series().unwrap();
    assert!(series.powers().iter().all(|&p| p == 0.7));
    assert_eq!(sim.last_commanded_power(), Some(0.0));
    assert!(telemetry.contains("Constant power test complete"));
    assert!(telemetry.contains("kA = 0.00"));

    let report = session.report();
    assert!(report.fit_intercept && report.fit_accel);
    assert_eq!(report.accel_samples, series.len());
    assert!(report.error.is_none());
}

// ─── Test 3: cancellation at any tick ───────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_stop_at_any_tick_cleans_up(stop_at in 0u64..1600, fit_accel in any::<bool>()) {
        let dt = 0.02;
        let mut session = TuningSession::new(config(dt)).unwrap();
        let mut sim = drive(PlantConfig { kv: 0.03, k_static: 0.05, ka: 0.002 }, dt);
        let mut telemetry = BufferedTelemetry::new();
        let mut operator = ScriptedOperator::new(true, fit_accel);
        let stop = operator.stop_flag();
        let mut clock = TickClock::simulated(dt);

        while !session.is_finished() && clock.ticks() < TICK_LIMIT {
            if clock.ticks() == stop_at {
                stop.store(true, std::sync::atomic::Ordering::SeqCst);
            }
            let signals = operator.poll();
            let phase = session.tick(clock.now(), &signals, &mut sim, &mut telemetry);
            if phase == Phase::AwaitAccelConfirm {
                sim.place_at_rest();
            }
            operator.observe(phase);
            clock.advance();
        }

        prop_assert!(session.is_finished());
        prop_assert_eq!(sim.last_commanded_power().unwrap_or(0.0), 0.0);
        for series in [session.ramp_series(), session.accel_series()].into_iter().flatten() {
            prop_assert_eq!(series.times().len(), series.positions().len());
            prop_assert_eq!(series.times().len(), series.powers().len());
            prop_assert!(series.times().windows(2).all(|w| w[0] < w[1]));
        }
    }
}

#[test]
fn test_stop_on_first_ramp_tick_reports_no_coefficients() {
    let dt = 0.02;
    let mut session = TuningSession::new(config(dt)).unwrap();
    let mut sim = drive(PlantConfig::default(), dt);
    let mut telemetry = BufferedTelemetry::new();

    let mut script = SignalScript::default()
        .hold(Signals::started(), 1)
        .press(Signals::confirm(), 1)
        .press(Signals::confirm(), 1)
        .hold(Signals::stop(), 1);
    run_session(&mut session, &mut script, &mut sim, &mut telemetry, dt);

    assert_eq!(session.phase(), Phase::Idle);
    // Only the entry-tick sample was taken.
    assert_eq!(session.ramp_series().unwrap().len(), 1);
    assert!(session.ramp_result().is_none());
    assert_eq!(sim.last_commanded_power(), Some(0.0));
}

// ─── Test 4: gate scenarios ─────────────────────────────────────────

#[test]
fn test_single_press_does_not_confirm_two_states() {
    let dt = 0.02;
    let mut session = TuningSession::new(config(dt)).unwrap();
    let mut sim = drive(PlantConfig::default(), dt);
    let mut telemetry = BufferedTelemetry::new();
    let mut clock = TickClock::simulated(dt);

    let mut script = SignalScript::default()
        .hold(Signals::started(), 2)
        .press(Signals::confirm(), 30)
        .hold(Signals::started(), 30);

    let mut phases = Vec::new();
    while script.remaining() > 0 {
        let signals = script.poll();
        phases.push(session.tick(clock.now(), &signals, &mut sim, &mut telemetry));
        clock.advance();
    }

    assert_eq!(*phases.last().unwrap(), Phase::AwaitRampConfirm);
    assert!(session.fit_intercept());
    assert!(!phases.contains(&Phase::RunRamp));
    assert!(sim.power_log().is_empty());
    assert_eq!(sim.position_estimate(), 0.0);
}

#[test]
fn test_decline_accel_ends_after_ramp_report() {
    let plant = PlantConfig {
        kv: 0.03,
        k_static: 0.1,
        ka: 0.0,
    };
    let (session, _, telemetry) = run_scripted(false, false, plant, 0.02);
    assert!(telemetry.contains("Would you like to fit kA?"));
    assert!(!telemetry.contains("Place the robot back in its starting position"));
    assert!(session.accel_series().is_none());
    assert!(!session.fit_accel());
}

#[test]
fn test_report_written_as_json() {
    let plant = PlantConfig {
        kv: 0.03,
        k_static: 0.1,
        ka: 0.0,
    };
    let (session, _, _) = run_scripted(true, false, plant, 0.02);

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("report.json");
    std::fs::write(&path, serde_json::to_string_pretty(&session.report()).unwrap()).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["phase"], "Idle");
    assert_eq!(json["fit_intercept"], true);
    assert_eq!(json["config"]["max_power"], 0.7);
    assert!(json["ramp"]["kv"].as_f64().unwrap() > 0.0);
    assert!(json["accel"].is_null());
    assert!(json["plan"]["ramp_time"].as_f64().unwrap() > 13.0);
}
