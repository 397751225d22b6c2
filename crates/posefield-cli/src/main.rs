//! `posefield` – demo host for the PoseField pipeline.
//!
//! Wires the full stack together the way a real deployment would:
//!
//! 1. Loads `~/.posefield/config.toml` (defaults when absent).
//! 2. Spawns the ingestion channel and a synthetic sensor fleet feeding it.
//! 3. Runs the frame orchestrator at the configured cadence, submitting
//!    draw records to a console render sink.
//! 4. Ctrl-C stops the frame loop and exits.

mod console_sink;
mod sensor_sim;

use colored::Colorize;
use tracing::info;

use posefield_runtime::{FrameOrchestrator, config, ingest, shared_registry, telemetry};

#[tokio::main]
async fn main() {
    telemetry::init_tracing();
    print_banner();

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            println!("  No config file; using defaults.");
            config::FieldConfig::default()
        }
        Err(e) => {
            println!("{}: {e}", "Config error".red());
            println!("  Using default configuration.");
            config::FieldConfig::default()
        }
    };
    info!(?cfg, "starting posefield");

    // ── Registry + ingestion + synthetic sensors ──────────────────────────
    let registry = shared_registry();
    let (tx, merge_task) = ingest::ingest_channel(registry.clone(), ingest::DEFAULT_CAPACITY);
    let fleet = sensor_sim::spawn_fleet(&tx, sensor_sim::demo_fleet());
    println!(
        "  Simulating {} device(s); {} goes silent to show the staleness fade.\n",
        fleet.len(),
        "imu-gamma".bold()
    );

    // ── Frame loop ────────────────────────────────────────────────────────
    let report_every = cfg.frame_rate_hz.max(1) as u64;
    let mut orchestrator = FrameOrchestrator::new(registry, cfg);
    let mut sink = console_sink::ConsoleSink::new(report_every);

    tokio::select! {
        _ = orchestrator.run(&mut sink) => {}
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("{}", "⚠  Ctrl-C received – stopping frame loop.".yellow().bold());
        }
    }

    for task in fleet {
        task.abort();
    }
    drop(tx);
    let _ = merge_task.await;
    println!("{}", "  ✓ Exiting posefield.".green());
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!(
        "  {} {}",
        "PoseField".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Live sensor poses with spring relaxation");
    println!();
}
