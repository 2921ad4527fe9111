/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Host-side simulator for the tickmux scheduler.
//!
//! Stands in for the firmware's interrupt binding: a wall-clock loop calls
//! `Scheduler::tick()` at the configured resolution, the way the counter
//! overflow vector does on the device.  A periodic heartbeat, a one-shot,
//! and a cancelled timer exercise the registration surface end to end.

use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};

use tickmux::clock::sim::SimCounter;
use tickmux::config::SchedulerConfig;
use tickmux::scheduler::Scheduler;

// ── CLI argument definition ───────────────────────────────────────────────────

/// tickmux host simulator.
///
/// Example:
///   tickmux-sim -d 3000 -b 500 -o 1500 --config examples/scheduler.yaml
#[derive(Debug, Parser)]
#[command(
    name = "tickmux-sim",
    about = "Drives the tickmux scheduler from a wall-clock tick loop",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML scheduler configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// How long to run the tick loop, in milliseconds.
    #[arg(short = 'd', long = "duration-ms", default_value_t = 3_000)]
    duration_ms: u32,

    /// Heartbeat period, in milliseconds.
    #[arg(short = 'b', long = "heartbeat-ms", default_value_t = 500)]
    heartbeat_ms: u32,

    /// One-shot delay, in milliseconds.
    #[arg(short = 'o', long = "oneshot-ms", default_value_t = 1_500)]
    oneshot_ms: u32,
}

// ── Tick accounting ───────────────────────────────────────────────────────────

/// Number of whole ticks the loop runs for `duration_ms` at `tick_micros`.
fn ticks_for(duration_ms: u32, tick_micros: u32) -> u64 {
    (duration_ms as u64 * 1_000) / tick_micros as u64
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("tickmux-sim starting up...");

    let cli = Cli::parse();

    info!(
        duration_ms = cli.duration_ms,
        heartbeat_ms = cli.heartbeat_ms,
        oneshot_ms = cli.oneshot_ms,
        config = ?cli.config,
        "Configuration"
    );

    // ── Load scheduler configuration ──────────────────────────────────────────
    let config = match &cli.config {
        Some(path) => match SchedulerConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load scheduler configuration: {:#}", e);
                process::exit(1);
            }
        },
        None => {
            warn!("No configuration file provided, using default scheduler settings");
            SchedulerConfig::default()
        }
    };

    // ── Build the scheduler and register the demo timers ──────────────────────
    let mut scheduler = Scheduler::new(SimCounter::new(1), &config);

    let heartbeats = Arc::new(AtomicU32::new(0));
    let beat_counter = Arc::clone(&heartbeats);
    if let Err(e) = scheduler.schedule_every(cli.heartbeat_ms, move || {
        let n = beat_counter.fetch_add(1, Ordering::Relaxed) + 1;
        info!(beat = n, "heartbeat");
    }) {
        error!("Failed to schedule heartbeat: {e}");
        process::exit(1);
    }

    let oneshot_fired = Arc::new(AtomicU32::new(0));
    let oneshot_counter = Arc::clone(&oneshot_fired);
    if let Err(e) = scheduler.schedule_after(cli.oneshot_ms, move || {
        oneshot_counter.fetch_add(1, Ordering::Relaxed);
        info!("one-shot fired");
    }) {
        error!("Failed to schedule one-shot: {e}");
        process::exit(1);
    }

    // A timer that is cancelled before it can ever fire.
    let cancelled = match scheduler.schedule_every(cli.duration_ms.saturating_mul(2), || {
        warn!("cancelled timer fired – this should never happen");
    }) {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to schedule cancellable timer: {e}");
            process::exit(1);
        }
    };
    if let Err(e) = scheduler.cancel(cancelled) {
        error!("Failed to cancel timer: {e}");
        process::exit(1);
    }

    info!(
        active = scheduler.active_count(),
        capacity = scheduler.capacity(),
        "Timers registered"
    );

    // ── Tick loop ─────────────────────────────────────────────────────────────
    // This loop is the stand-in for the counter overflow interrupt: one
    // tick() per tick period, strictly ordered, never nested.
    let total_ticks = ticks_for(cli.duration_ms, config.tick_micros);
    let tick_period = Duration::from_micros(config.tick_micros as u64);

    for _ in 0..total_ticks {
        thread::sleep(tick_period);
        scheduler.tick();
    }

    // ── Summary ───────────────────────────────────────────────────────────────
    info!(
        ticks = total_ticks,
        heartbeats = heartbeats.load(Ordering::Relaxed),
        oneshot_fired = oneshot_fired.load(Ordering::Relaxed),
        active = scheduler.active_count(),
        "Run complete"
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
