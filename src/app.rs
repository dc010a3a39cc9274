//! Threaded application supervisor
//!
//! Spawns the component threads, watches the halt latch and the operator's
//! run flag, then joins everything and reports why the run ended.

use crate::config::AppConfig;
use crate::core::display::{DisplaySink, LogDisplay};
use crate::core::halt::{HaltReason, SystemHalt};
use crate::core::types::PathSegment;
use crate::error::Result;
use crate::fusion::FusionStats;
use crate::navigation::NavStats;
use crate::router::RouterStats;
use crate::sim::VehiclePose;
use crate::threads::{HALT_POLL, TickerStats, spawn_threads};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// What happened during a threaded run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub halt: Option<HaltReason>,
    pub elapsed: Duration,
    pub router: RouterStats,
    pub fusion: FusionStats,
    pub navigation: NavStats,
    pub ticker: TickerStats,
    pub laps_completed: u32,
    pub sim_ticks: u64,
    pub sequence_gaps: u64,
    pub path_log: Vec<PathSegment>,
    pub lap_times: Vec<u64>,
    pub pose: VehiclePose,
}

/// Threaded driver
pub struct App {
    config: AppConfig,
    halt: Arc<SystemHalt>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            halt: Arc::new(SystemHalt::new()),
        })
    }

    /// Halt latch shared with the component threads
    pub fn halt_handle(&self) -> Arc<SystemHalt> {
        Arc::clone(&self.halt)
    }

    /// Run with components writing to the log
    pub fn run(&self, running: Arc<AtomicBool>) -> Result<RunSummary> {
        self.run_with_display(running, |source| Box::new(LogDisplay::new(source)))
    }

    /// Run until the system halts or `running` is cleared
    pub fn run_with_display<F>(&self, running: Arc<AtomicBool>, display: F) -> Result<RunSummary>
    where
        F: FnMut(&'static str) -> Box<dyn DisplaySink>,
    {
        let started = Instant::now();
        let handles = spawn_threads(&self.config, Arc::clone(&self.halt), display)?;
        log::info!("All threads running");

        while !self.halt.is_halted() {
            if !running.load(Ordering::Relaxed) {
                self.halt.trigger(HaltReason::Shutdown);
                break;
            }
            thread::sleep(HALT_POLL);
        }

        let components = handles.join()?;
        let elapsed = started.elapsed();
        let halt = self.halt.reason();
        match &halt {
            Some(HaltReason::Fault { .. }) | Some(HaltReason::Collision { .. }) => {
                log::warn!("Run ended after {:.2?}: {:?}", elapsed, halt);
            }
            _ => log::info!("Run ended after {:.2?}: {:?}", elapsed, halt),
        }

        Ok(RunSummary {
            halt,
            elapsed,
            router: components.router.stats(),
            fusion: components.fusion.stats(),
            navigation: components.navigation.stats(),
            ticker: components.ticker,
            laps_completed: components.navigation.laps_completed(),
            sim_ticks: components.harness.ticks(),
            sequence_gaps: components.fusion.gaps() + components.navigation.gaps(),
            path_log: components.mapper.log().to_vec(),
            lap_times: components.mapper.lap_times().to_vec(),
            pose: components.harness.pose(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::display::NullDisplay;

    #[test]
    fn test_cleared_run_flag_shuts_down() {
        let app = App::new(AppConfig::default()).unwrap();
        let running = Arc::new(AtomicBool::new(false));
        let summary = app
            .run_with_display(running, |_| Box::new(NullDisplay))
            .unwrap();
        assert_eq!(summary.halt, Some(HaltReason::Shutdown));
        assert_eq!(summary.laps_completed, 0);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = AppConfig::default();
        config.simulation.speed_factor = 0.0;
        assert!(App::new(config).is_err());
    }
}
