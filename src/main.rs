//! Marga - track-following vehicle on a simulated course
//!
//! ```text
//! marga [config.toml] [--lockstep] [--dump-path <file>]
//! marga --config <config.toml>
//! ```
//!
//! Without `--lockstep` every component runs on its own thread, paced by
//! the configured tick periods. `--lockstep` runs the same components
//! deterministically as fast as possible.

use marga::core::HaltReason;
use marga::core::PathSegment;
use marga::error::Error;
use marga::{App, AppConfig, LockstepRunner, Result};
use std::env;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const DEFAULT_CONFIG: &str = "marga.toml";

/// Parse config path from command line arguments.
///
/// Supports:
/// - `marga <path>` (positional)
/// - `marga --config <path>` (flag-based)
/// - `marga -c <path>` (short flag)
fn parse_config_path(args: &[String]) -> Option<String> {
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return Some(args[1].clone());
    }

    None
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn load_config(args: &[String]) -> Result<AppConfig> {
    match parse_config_path(args) {
        Some(path) => AppConfig::load(&path),
        None if Path::new(DEFAULT_CONFIG).exists() => AppConfig::load(DEFAULT_CONFIG),
        None => Ok(AppConfig::default()),
    }
}

fn dump_path(path: &str, segments: &[PathSegment]) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(segments)?)?;
    log::info!("Wrote {} path segments to {}", segments.len(), path);
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config = load_config(&args)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("Marga v{} starting...", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Course: {:?}, {} lap(s), path recording {}",
        config.simulation.course,
        config.laps(),
        if config.navigation.path_recording {
            "on"
        } else {
            "off"
        }
    );

    let lockstep = args.iter().any(|a| a == "--lockstep");
    let dump = flag_value(&args, "--dump-path");

    let (halt, segments) = if lockstep {
        let report = LockstepRunner::new(&config)?.run();
        log::info!(
            "Lockstep run: {} ticks, finish ticks {:?}, {} commands, {} advice",
            report.ticks,
            report.finish_ticks,
            report.commands.len(),
            report.advice.len()
        );
        (report.halt, report.path_log)
    } else {
        let running = Arc::new(AtomicBool::new(true));
        let r = Arc::clone(&running);
        ctrlc::set_handler(move || {
            log::info!("Received shutdown signal");
            r.store(false, Ordering::Relaxed);
        })
        .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

        let app = App::new(config)?;
        let summary = app.run(running)?;
        log::info!(
            "Threaded run: {} ticks in {:.2?}, {} commands, {} sequence gaps",
            summary.sim_ticks,
            summary.elapsed,
            summary.navigation.commands,
            summary.sequence_gaps
        );
        (summary.halt, summary.path_log)
    };

    if let Some(path) = dump {
        dump_path(&path, &segments)?;
    }

    match halt {
        Some(HaltReason::Fault { component, message }) => Err(Error::Other(format!(
            "{} failed: {}",
            component, message
        ))),
        Some(reason) => {
            log::info!("Marga stopped: {}", reason);
            Ok(())
        }
        None => {
            log::warn!("Marga stopped at the tick limit");
            Ok(())
        }
    }
}
