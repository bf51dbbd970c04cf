//! # drivetune Binary
//!
//! Runs the feedforward tuning routine or the debug teleop loop against the
//! simulation backend.
//!
//! # Usage
//!
//! ```bash
//! # Tune with defaults, fitting kStatic and kA, and save a JSON report
//! drivetune tune --fit-static --fit-accel --report report.json
//!
//! # Use a config file and verbose logging
//! drivetune --config config/drivetune.toml -v tune
//!
//! # Debug teleop loop for 500 ticks, paced in real time
//! drivetune --realtime teleop --ticks 500
//! ```

#![deny(warnings)]

use clap::{Parser, Subcommand};
use drivetune::gate::Phase;
use drivetune::operator::ScriptedOperator;
use drivetune::scheduler::TickClock;
use drivetune::{TeleopLoop, TuningSession};
use drivetune_common::prelude::*;
use drivetune_sim::{SimDrive, SimMechanisms};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// drivetune - feedforward tuner and debug teleop for a tank drive robot
#[derive(Parser, Debug)]
#[command(name = "drivetune")]
#[command(version)]
#[command(about = "Feedforward identification (kV, kStatic, kA) and debug teleop")]
#[command(long_about = None)]
struct Args {
    /// Path to drivetune.toml. Built-in defaults are used when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    /// Pace ticks against the wall clock instead of running as fast as possible
    #[arg(long)]
    realtime: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the feedforward tuning routine with a scripted operator
    Tune {
        /// Answer "yes" to fitting kStatic
        #[arg(long)]
        fit_static: bool,

        /// Answer "yes" to the constant-power test (kA)
        #[arg(long)]
        fit_accel: bool,

        /// Write the session report as JSON
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },
    /// Run the debug teleop loop
    Teleop {
        /// Number of ticks to run
        #[arg(long, default_value_t = 500)]
        ticks: u64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("drivetune failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Tracing comes up before the config error is reported so it gets logged.
    let config = load_config(args.config.as_deref());
    let log_level = config
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level)?;
    let config = config?;

    info!(
        "{} v{} starting...",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION")
    );

    let stop = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        handler_flag.store(true, Ordering::SeqCst);
    })?;

    match args.command {
        Command::Tune {
            fit_static,
            fit_accel,
            report,
        } => run_tune(
            &config,
            fit_static,
            fit_accel,
            report.as_deref(),
            args.realtime,
            stop,
        ),
        Command::Teleop { ticks } => run_teleop(&config, ticks, args.realtime, &stop),
    }
}

fn load_config(path: Option<&Path>) -> Result<DrivetuneConfig, ConfigError> {
    match path {
        Some(path) => DrivetuneConfig::load_validated(path),
        None => {
            let config = DrivetuneConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn tick_clock(period: f64, realtime: bool) -> TickClock {
    if realtime {
        TickClock::realtime(period)
    } else {
        TickClock::simulated(period)
    }
}

fn run_tune(
    config: &DrivetuneConfig,
    fit_static: bool,
    fit_accel: bool,
    report_path: Option<&Path>,
    realtime: bool,
    stop: Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let period = config.tuning.tick_period_s;
    let mut drive = SimDrive::new(&config.drive, config.sim, period);
    let mut session = TuningSession::new(config.tuning)?;
    let mut operator = ScriptedOperator::new(fit_static, fit_accel).with_stop_flag(stop);
    let mut telemetry = TracingTelemetry::new();
    let mut clock = tick_clock(period, realtime);

    info!(
        "Tuning against simulated drive: rated velocity {:.3}, plant {:?}",
        config.drive.max_rated_velocity(),
        config.sim
    );

    loop {
        let signals = operator.poll();
        let phase = session.tick(clock.now(), &signals, &mut drive, &mut telemetry);
        if phase == Phase::AwaitAccelConfirm {
            drive.place_at_rest();
        }
        operator.observe(phase);
        if session.is_finished() {
            break;
        }
        clock.advance();
    }

    info!("Tuning finished after {} ticks ({:.2}s)", clock.ticks(), clock.now());
    if let Some(ramp) = session.ramp_result() {
        info!(
            "kV = {:.5}, kStatic = {:.5} (R^2 = {:.4})",
            ramp.kv, ramp.k_static, ramp.r_square
        );
    }
    if let Some(accel) = session.accel_result() {
        info!("kA = {:.5} (R^2 = {:.4})", accel.ka, accel.r_square);
    }

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&session.report())?;
        std::fs::write(path, json)?;
        info!("Report written to {}", path.display());
    }
    Ok(())
}

fn run_teleop(
    config: &DrivetuneConfig,
    ticks: u64,
    realtime: bool,
    stop: &AtomicBool,
) -> Result<(), Box<dyn std::error::Error>> {
    let period = config.tuning.tick_period_s;
    let mut teleop = TeleopLoop::new(config.teleop)?;
    let mut mechanisms = SimMechanisms::new();
    let mut telemetry = TracingTelemetry::new();
    let mut clock = tick_clock(period, realtime);

    while clock.ticks() < ticks {
        if stop.load(Ordering::SeqCst) {
            warn!("Teleop interrupted at tick {}", clock.ticks());
            break;
        }
        teleop.tick(&mut mechanisms, &mut telemetry);
        mechanisms.step(period);
        clock.advance();
    }

    for motor in MotorId::ALL {
        mechanisms.set_motor_power(motor, 0.0);
    }
    mechanisms.set_lift_power(0.0);
    info!(
        "Teleop finished after {} ticks: lift at {}, bucket at {:.2}",
        teleop.ticks(),
        mechanisms.lift_position(),
        mechanisms.bucket_position()
    );
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args, level: LogLevel) -> Result<(), Box<dyn std::error::Error>> {
    let level = if args.verbose {
        LogLevel::Debug
    } else {
        level
    };

    let filter = EnvFilter::from_default_env().add_directive(level.as_directive().parse()?);

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}
