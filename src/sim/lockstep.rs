//! Deterministic single-threaded driver
//!
//! Runs the router, fusion, navigation and mapping components against the
//! simulation harness without threads. After every simulation tick all
//! queued frames are pumped through the components until every mailbox is
//! empty, so a run is a pure function of the configuration.
//!
//! Motor commands are applied straight to the harness and take effect on
//! the following tick, the same ordering the threaded driver gives when the
//! loops keep up.

use super::{SimEvent, SimulationHarness, VehiclePose};
use crate::config::AppConfig;
use crate::core::display::{DisplaySink, LogDisplay};
use crate::core::halt::HaltReason;
use crate::core::link::{SimulatedTransport, TransportLink};
use crate::core::mailbox::{MailboxReceiver, MailboxSender, OverflowPolicy, mailbox};
use crate::core::types::{ActuatorCommand, MessageType, PathSegment, SensorFrame};
use crate::error::Result;
use crate::fusion::DistanceFusion;
use crate::mapping::{PathMapper, SpeedAdvice};
use crate::navigation::{NavAction, NavigationController};
use crate::router::Router;
use std::time::Duration;

/// Outcome of a lockstep run
#[derive(Debug, Clone)]
pub struct LockstepReport {
    /// `None` when the tick limit ran out first
    pub halt: Option<HaltReason>,
    pub ticks: u64,
    /// Tick on which each finish line was crossed
    pub finish_ticks: Vec<u64>,
    pub commands: Vec<ActuatorCommand>,
    pub advice: Vec<SpeedAdvice>,
    pub path_log: Vec<PathSegment>,
    pub lap_times: Vec<u64>,
    pub polls: u64,
    pub pose: VehiclePose,
}

/// Single-threaded pump over all components
pub struct LockstepRunner {
    harness: SimulationHarness,
    router: Router,
    fusion: DistanceFusion,
    navigation: NavigationController,
    mapper: PathMapper,
    transport: SimulatedTransport,
    fusion_rx: MailboxReceiver<SensorFrame>,
    nav_tx: MailboxSender<SensorFrame>,
    nav_rx: MailboxReceiver<SensorFrame>,
    map_tx: MailboxSender<SensorFrame>,
    map_rx: MailboxReceiver<SensorFrame>,
    ticks_per_nav_tick: u64,
    max_ticks: u64,
    ticks: u64,
    finish_ticks: Vec<u64>,
    commands: Vec<ActuatorCommand>,
    advice: Vec<SpeedAdvice>,
    halt: Option<HaltReason>,
}

impl LockstepRunner {
    /// Runner whose components write to the log
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_display(config, |source| Box::new(LogDisplay::new(source)))
    }

    /// Runner with a display sink per component
    pub fn with_display<F>(config: &AppConfig, mut display: F) -> Result<Self>
    where
        F: FnMut(&'static str) -> Box<dyn DisplaySink>,
    {
        config.validate()?;
        let capacity = config.mailbox.capacity;
        // A full mailbox can never drain while the only thread is sending
        let no_wait = Some(Duration::ZERO);
        let (fusion_tx, fusion_rx) = mailbox("fusion", capacity, OverflowPolicy::Block, no_wait);
        let (nav_tx, nav_rx) = mailbox("navigation", capacity, OverflowPolicy::Block, no_wait);
        let (map_tx, map_rx) = mailbox("mapping", capacity, OverflowPolicy::Block, no_wait);

        let laps = config.laps();
        Ok(Self {
            harness: SimulationHarness::new(&config.simulation, laps, display("simulation"))?,
            router: Router::new(fusion_tx, nav_tx.clone()),
            fusion: DistanceFusion::new(&config.fusion, display("fusion")),
            navigation: NavigationController::new(&config.navigation, laps, display("navigation")),
            mapper: PathMapper::new(&config.mapping, display("mapping")),
            transport: SimulatedTransport::new(),
            fusion_rx,
            nav_tx,
            nav_rx,
            map_tx,
            map_rx,
            ticks_per_nav_tick: config.simulation.ticks_per_nav_tick(),
            max_ticks: config.simulation.max_ticks,
            ticks: 0,
            finish_ticks: Vec::new(),
            commands: Vec::new(),
            advice: Vec::new(),
            halt: None,
        })
    }

    /// Run one simulation tick and pump to quiescence
    ///
    /// # Returns
    /// The halt reason once the run is over
    pub fn step(&mut self) -> Result<Option<HaltReason>> {
        if self.halt.is_some() {
            return Ok(self.halt.clone());
        }
        self.ticks += 1;

        let outcome = self.harness.tick();
        match outcome.event {
            Some(SimEvent::Collision(cell)) => {
                self.halt = Some(HaltReason::Collision {
                    x: cell.x,
                    y: cell.y,
                });
            }
            Some(SimEvent::Finish { .. }) | Some(SimEvent::Complete { .. }) => {
                self.finish_ticks.push(self.ticks);
            }
            None => {}
        }

        for frame in outcome.frames {
            self.router.dispatch(frame)?;
        }
        if self.ticks % self.ticks_per_nav_tick == 0 {
            self.nav_tx.send(SensorFrame::signal(MessageType::NavTimer))?;
        }
        self.pump()?;
        Ok(self.halt.clone())
    }

    /// Step until a halt or the tick limit
    pub fn run(&mut self) -> LockstepReport {
        while self.halt.is_none() && self.ticks < self.max_ticks {
            if let Err(e) = self.step() {
                log::error!("Lockstep run failed at tick {}: {}", self.ticks, e);
                self.halt = Some(HaltReason::Fault {
                    component: "lockstep",
                    message: e.to_string(),
                });
            }
        }
        if self.halt.is_none() {
            log::warn!("Tick limit {} reached", self.max_ticks);
        }
        self.report()
    }

    fn pump(&mut self) -> Result<()> {
        loop {
            let mut progressed = false;

            while let Some(frame) = self.fusion_rx.try_recv() {
                progressed = true;
                if let Some(out) = self.fusion.process(frame)? {
                    self.nav_tx.send(out)?;
                }
            }

            while let Some(frame) = self.nav_rx.try_recv() {
                progressed = true;
                let actions = self.navigation.handle(frame)?;
                self.perform(actions)?;
            }

            while let Some(frame) = self.map_rx.try_recv() {
                progressed = true;
                if let Some(advice) = self.mapper.handle(frame)? {
                    self.advice.push(advice);
                    let seq = self.mapper.next_seq();
                    self.nav_tx.send(advice.to_frame(seq))?;
                }
            }

            if !progressed {
                return Ok(());
            }
        }
    }

    fn perform(&mut self, actions: Vec<NavAction>) -> Result<()> {
        for action in actions {
            match action {
                NavAction::Actuate(cmd) => {
                    self.commands.push(cmd);
                    self.harness.apply_command(cmd);
                }
                NavAction::Map(frame) => {
                    self.map_tx.send(frame)?;
                }
                NavAction::PollTelemetry => self.transport.request_telemetry()?,
                NavAction::RunComplete { laps } => {
                    self.halt.get_or_insert(HaltReason::CourseComplete { laps });
                }
            }
        }
        Ok(())
    }

    /// Snapshot of the run so far
    pub fn report(&self) -> LockstepReport {
        LockstepReport {
            halt: self.halt.clone(),
            ticks: self.ticks,
            finish_ticks: self.finish_ticks.clone(),
            commands: self.commands.clone(),
            advice: self.advice.clone(),
            path_log: self.mapper.log().to_vec(),
            lap_times: self.mapper.lap_times().to_vec(),
            polls: self.transport.polls(),
            pose: self.harness.pose(),
        }
    }

    pub fn harness(&self) -> &SimulationHarness {
        &self.harness
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn mapper(&self) -> &PathMapper {
        &self.mapper
    }

    pub fn fusion(&self) -> &DistanceFusion {
        &self.fusion
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::display::NullDisplay;
    use crate::core::types::PathState;
    use crate::sim::CourseTemplate;

    fn runner(config: &AppConfig) -> LockstepRunner {
        LockstepRunner::with_display(config, |_| Box::new(NullDisplay)).unwrap()
    }

    #[test]
    fn test_straight_course_completes() {
        let config = AppConfig::default();
        let mut runner = runner(&config);
        let report = runner.run();

        assert_eq!(report.halt, Some(HaltReason::CourseComplete { laps: 1 }));
        assert_eq!(report.finish_ticks, vec![101]);
        assert_eq!(report.ticks, 101);
        // One straight command, one stop at the finish
        assert_eq!(report.commands.len(), 2);
        assert!(report.commands[1].is_stop());
        assert_eq!(report.polls, 50);
    }

    #[test]
    fn test_step_after_halt_is_idle() {
        let config = AppConfig::default();
        let mut runner = runner(&config);
        runner.run();
        let ticks = runner.harness().ticks();
        assert!(runner.step().unwrap().is_some());
        assert_eq!(runner.harness().ticks(), ticks);
    }

    #[test]
    fn test_tick_limit() {
        let mut config = AppConfig::default();
        config.simulation.max_ticks = 20;
        let report = runner(&config).run();
        assert_eq!(report.halt, None);
        assert_eq!(report.ticks, 20);
        // Still driving the first straight
        assert_eq!(report.path_log.len(), 1);
        assert_eq!(report.path_log[0].state, PathState::Halt);
    }

    #[test]
    fn test_every_course_ends() {
        for template in [
            CourseTemplate::Straight,
            CourseTemplate::LeftTurn,
            CourseTemplate::RightTurn,
            CourseTemplate::LeftBranch,
            CourseTemplate::SpaceRight,
            CourseTemplate::Intersection,
        ] {
            let mut config = AppConfig::default();
            config.simulation.course = template;
            config.simulation.max_ticks = 2_000;
            let report = runner(&config).run();
            assert!(
                matches!(
                    report.halt,
                    Some(HaltReason::CourseComplete { .. } | HaltReason::Collision { .. })
                ),
                "{:?} ended with {:?} after {} ticks",
                template,
                report.halt,
                report.ticks
            );
        }
    }
}
