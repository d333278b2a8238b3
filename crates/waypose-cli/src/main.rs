//! `waypose` – console demo for the geofenced sensor-fusion controller.
//!
//! Runs the full pipeline against simulated drivers:
//!
//! 1. Loads [`ControllerConfig`](config::ControllerConfig) from a TOML file
//!    (first CLI argument, defaults applied when absent).
//! 2. Assembles a scripted walk through the service area with a brief GPS
//!    dropout and an out-of-bounds excursion.
//! 3. Ticks the control loop at the configured rate, rendering status and
//!    sensor lines to the console.
//! 4. Maps **Ctrl-C** (and `q` on stdin) to a clean shutdown; `r` triggers
//!    the manual GPS restart.

mod config;

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use colored::Colorize;
use tracing::warn;

use waypose_hal::sim::{SimCompass, SimLocation, SimRig, SimSensor};
use waypose_runtime::{ControlLoop, PresentationSink, format_reading, init_tracing};
use waypose_types::{
    ControllerStatus, EventPayload, PositionFix, SensorKind, StatusEvent, Vec3,
};

fn main() {
    init_tracing();
    print_banner();

    // ── Configuration ─────────────────────────────────────────────────────
    let path: Option<PathBuf> = std::env::args().nth(1).map(PathBuf::from);
    let cfg = match config::load(path.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            std::process::exit(1);
        }
    };
    let tick_hz = if cfg.tick_hz > 0.0 { cfg.tick_hz } else { 10.0 };
    let dt = 1.0 / tick_hz;

    // ── Shutdown flag + Ctrl-C handler ────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "Ctrl-C received, shutting down ...".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "failed to install Ctrl-C handler");
    }

    // ── Operator input (r = restart GPS, q = quit) ────────────────────────
    let commands = spawn_stdin_reader();

    // ── Simulated walk ────────────────────────────────────────────────────
    let stack = demo_rig().build();
    let sink = ConsoleSink::new(tick_hz.round().max(1.0) as usize);
    let mut lp = ControlLoop::new(
        stack.aggregator,
        stack.location,
        stack.compass,
        cfg.motion(),
        Box::new(sink),
    );

    println!(
        "  Bounds: lat [{:.2}, {:.2}]  lon [{:.2}, {:.2}]",
        cfg.min_lat, cfg.max_lat, cfg.min_lon, cfg.max_lon
    );
    println!("  Commands: {} restart GPS, {} quit\n", "r".bold(), "q".bold());

    lp.start();
    while !shutdown.load(Ordering::SeqCst) {
        match commands.try_recv() {
            Ok(Command::Restart) => lp.restart(),
            Ok(Command::Quit) => break,
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {}
        }
        lp.tick(dt);
        thread::sleep(Duration::from_secs_f32(dt));
    }

    lp.shutdown();
    println!("{}", "Goodbye.".green());
}

fn print_banner() {
    println!();
    println!("  {}", "waypose".bold().cyan());
    println!("  geofenced sensor-fusion demo (simulated drivers)");
    println!();
}

// ────────────────────────────────────────────────────────────────────────────
// Demo scenario
// ────────────────────────────────────────────────────────────────────────────

/// A scripted session: two settle polls, a short walk inside the bounds,
/// one dropped `(0, 0)` echo, a detour past the fence, then back inside.
fn demo_rig() -> SimRig {
    let mut fixes = vec![PositionFix::new(28.46, -16.25)];
    for i in 1..40 {
        fixes.push(PositionFix::new(28.46 + 0.001 * i as f32, -16.25));
    }
    fixes.push(PositionFix::new(0.0, 0.0)); // stale platform echo
    fixes.push(PositionFix::new(29.50, -16.25)); // outside the fence
    fixes.push(PositionFix::new(29.50, -16.25));
    fixes.push(PositionFix::new(28.50, -16.25)); // back inside

    // Lean the device forward for a while, then level out.
    let mut accel = vec![Vec3::new(0.0, -0.95, -0.6); 120];
    accel.push(Vec3::new(0.0, -1.0, 0.02)); // inside the deadband: halt

    let mut headings = Vec::new();
    for i in 0..90 {
        headings.push(i as f32); // slow turn toward east
    }

    SimRig::new()
        .with_idle_sensors()
        .with_sensor_driver(SimSensor::scripted(SensorKind::Accelerometer, accel))
        .with_location(
            SimLocation::new()
                .with_init_delay(2)
                .with_fixes(fixes),
        )
        .with_compass(SimCompass::scripted(headings))
}

// ────────────────────────────────────────────────────────────────────────────
// Operator input
// ────────────────────────────────────────────────────────────────────────────

enum Command {
    Restart,
    Quit,
}

/// Read stdin lines on a background thread so the tick loop never blocks.
fn spawn_stdin_reader() -> mpsc::Receiver<Command> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let cmd = match line.trim() {
                "r" | "restart" => Command::Restart,
                "q" | "quit" => Command::Quit,
                _ => continue,
            };
            if tx.send(cmd).is_err() {
                break;
            }
        }
    });
    rx
}

// ────────────────────────────────────────────────────────────────────────────
// Console sink
// ────────────────────────────────────────────────────────────────────────────

/// Renders the event stream as console lines: status transitions and
/// accepted fixes as they happen, plus a sensor panel once per second.
struct ConsoleSink {
    readings: BTreeMap<SensorKind, (String, bool)>,
    poses_seen: usize,
    hud_every: usize,
}

impl ConsoleSink {
    fn new(hud_every: usize) -> Self {
        Self {
            readings: BTreeMap::new(),
            poses_seen: 0,
            hud_every,
        }
    }

    fn print_status(status: &ControllerStatus) {
        let line = status.to_string();
        let painted = match status {
            ControllerStatus::SignalOk | ControllerStatus::GpsActive => line.green(),
            ControllerStatus::Failed => line.red().bold(),
            ControllerStatus::OutOfBounds { .. } | ControllerStatus::ReceivingZero => {
                line.yellow()
            }
            _ => line.cyan(),
        };
        println!("  [status] {painted}");
    }

    fn print_hud(&self) {
        for (line, available) in self.readings.values() {
            if *available {
                println!("    {line}");
            } else {
                println!("    {}", line.red());
            }
        }
        println!();
    }
}

impl PresentationSink for ConsoleSink {
    fn on_event(&mut self, event: &StatusEvent) {
        match &event.payload {
            EventPayload::StatusChanged(status) => Self::print_status(status),
            EventPayload::FixAccepted(fix) => {
                println!(
                    "  [fix]    lat {:.4}  lon {:.4}",
                    fix.latitude, fix.longitude
                );
            }
            EventPayload::SensorSample(reading) => {
                self.readings
                    .insert(reading.kind, (format_reading(reading), reading.available));
            }
            EventPayload::PoseUpdated(pose) => {
                self.poses_seen += 1;
                if self.poses_seen % self.hud_every == 0 {
                    println!(
                        "  [pose]   ({:.2}, {:.2}, {:.2})",
                        pose.position.x, pose.position.y, pose.position.z
                    );
                    self.print_hud();
                }
            }
        }
    }
}
