//! Thread-per-component runtime
//!
//! Each component runs on its own named thread and owns its state; the
//! only coordination is through bounded mailboxes and the shared
//! [`SystemHalt`] latch:
//!
//! ```text
//!            ┌──────── SimTimer ───────┐
//!   ticker ──┤                         ▼
//!            │             simulation ─► inbound ─► router ─┬─► fusion ─┐
//!            │                  ▲                           │           │
//!            │                  │ MotorSend                 ▼           │
//!            └─ NavTimer ─────► navigation ◄───────────────┴───────────┘
//!                               │       ▲
//!                     map event ▼       │ UpdateSpeed
//!                                mapping
//! ```
//!
//! Threads return their component when they stop so the supervisor can
//! report on it.

mod ticker;
mod worker;

pub use ticker::{TickerStats, run_ticker};
pub use worker::{HALT_POLL, run_loop};

use crate::config::AppConfig;
use crate::core::display::DisplaySink;
use crate::core::halt::{HaltReason, SystemHalt};
use crate::core::link::{ActuatorLink, MailboxActuator, SimulatedTransport, TransportLink};
use crate::core::mailbox::{Delivery, OverflowPolicy, mailbox};
use crate::error::{Error, Result};
use crate::fusion::DistanceFusion;
use crate::mapping::PathMapper;
use crate::navigation::{NavAction, NavigationController};
use crate::router::Router;
use crate::sim::{SimEvent, SimulationHarness};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Longest wait on a send that closes a cycle between loops
const CYCLE_SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// Components handed back by stopped threads
pub struct Components {
    pub router: Router,
    pub fusion: DistanceFusion,
    pub navigation: NavigationController,
    pub mapper: PathMapper,
    pub harness: SimulationHarness,
    pub ticker: TickerStats,
}

/// Thread handles for the running system
pub struct ThreadHandles {
    pub router: JoinHandle<Router>,
    pub fusion: JoinHandle<DistanceFusion>,
    pub navigation: JoinHandle<NavigationController>,
    pub mapping: JoinHandle<PathMapper>,
    pub simulation: JoinHandle<SimulationHarness>,
    pub ticker: JoinHandle<TickerStats>,
}

impl ThreadHandles {
    /// Wait for every thread to stop
    pub fn join(self) -> Result<Components> {
        Ok(Components {
            ticker: join("ticker", self.ticker)?,
            harness: join("simulation", self.simulation)?,
            router: join("router", self.router)?,
            fusion: join("fusion", self.fusion)?,
            navigation: join("navigation", self.navigation)?,
            mapper: join("mapping", self.mapping)?,
        })
    }
}

fn join<T>(name: &str, handle: JoinHandle<T>) -> Result<T> {
    handle
        .join()
        .map_err(|_| Error::Other(format!("{} thread panicked", name)))
}

/// Spawn a named thread; on failure, halt the threads already running
fn spawn<T, F>(name: &'static str, halt: &SystemHalt, f: F) -> Result<JoinHandle<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(name.into())
        .spawn(f)
        .map_err(|e| {
            let message = format!("Failed to spawn {} thread: {}", name, e);
            halt.trigger(HaltReason::Fault {
                component: name,
                message: message.clone(),
            });
            Error::Other(message)
        })
}

/// Build every component, wire the mailboxes and spawn all threads
///
/// `display` supplies one sink per component, called with the component
/// name.
pub fn spawn_threads<F>(
    config: &AppConfig,
    halt: Arc<SystemHalt>,
    mut display: F,
) -> Result<ThreadHandles>
where
    F: FnMut(&'static str) -> Box<dyn DisplaySink>,
{
    let laps = config.laps();
    let capacity = config.mailbox.capacity;
    let policy = config.mailbox.overflow;
    let timeout = config.mailbox.send_timeout();

    let (inbound_tx, inbound_rx) = mailbox("inbound", capacity, policy, timeout);
    let (fusion_tx, fusion_rx) = mailbox("fusion", capacity, policy, timeout);
    let (nav_tx, nav_rx) = mailbox("navigation", capacity, policy, timeout);
    let (map_tx, map_rx) = mailbox("mapping", capacity, policy, timeout);
    let (sim_tx, sim_rx) = mailbox("simulation", capacity, policy, timeout);

    // Build components up front so configuration errors surface before any
    // thread starts
    let mut harness = SimulationHarness::new(&config.simulation, laps, display("simulation"))?;
    let mut router = Router::new(fusion_tx, nav_tx.clone());
    let mut fusion = DistanceFusion::new(&config.fusion, display("fusion"));
    let mut navigation = NavigationController::new(&config.navigation, laps, display("navigation"));
    let mut mapper = PathMapper::new(&config.mapping, display("mapping"));

    // Senders that close a cycle never wait forever
    let cycle_timeout = Some(timeout.map_or(CYCLE_SEND_TIMEOUT, |t| t.min(CYCLE_SEND_TIMEOUT)));
    let mut actuator = MailboxActuator::new(
        sim_tx
            .with_policy(OverflowPolicy::Block)
            .with_timeout(cycle_timeout),
    );
    let advice_tx = nav_tx
        .with_policy(OverflowPolicy::Block)
        .with_timeout(cycle_timeout);
    let ticker_nav = nav_tx.with_policy(OverflowPolicy::DropNewest);
    let ticker_sim = sim_tx.with_policy(OverflowPolicy::DropNewest);

    let halt_router = Arc::clone(&halt);
    let router_handle = spawn("router", &halt, move || {
        run_loop("router", &inbound_rx, &halt_router, |frame| {
            router.dispatch(frame).map(|_| ())
        });
        router
    })?;

    let halt_fusion = Arc::clone(&halt);
    let fusion_handle = spawn("fusion", &halt, move || {
        run_loop("fusion", &fusion_rx, &halt_fusion, |frame| {
            if let Some(out) = fusion.process(frame)? {
                nav_tx.send(out)?;
            }
            Ok(())
        });
        fusion
    })?;

    let halt_nav = Arc::clone(&halt);
    let navigation_handle = spawn("navigation", &halt, move || {
        let mut transport = SimulatedTransport::new();
        run_loop("navigation", &nav_rx, &halt_nav, |frame| {
            for action in navigation.handle(frame)? {
                match action {
                    NavAction::Actuate(cmd) => actuator.send(cmd)?,
                    NavAction::Map(event) => {
                        map_tx.send(event)?;
                    }
                    NavAction::PollTelemetry => transport.request_telemetry()?,
                    NavAction::RunComplete { laps } => {
                        halt_nav.trigger(HaltReason::CourseComplete { laps });
                    }
                }
            }
            Ok(())
        });
        navigation
    })?;

    let halt_map = Arc::clone(&halt);
    let mapping_handle = spawn("mapping", &halt, move || {
        run_loop("mapping", &map_rx, &halt_map, |frame| {
            if let Some(advice) = mapper.handle(frame)? {
                let seq = mapper.next_seq();
                if advice_tx.send(advice.to_frame(seq))? != Delivery::Queued {
                    log::warn!("Speed advice {} lost", advice.speed);
                }
            }
            Ok(())
        });
        mapper
    })?;

    let halt_sim = Arc::clone(&halt);
    let simulation_handle = spawn("simulation", &halt, move || {
        run_loop("simulation", &sim_rx, &halt_sim, |frame| {
            let Some(outcome) = harness.handle(frame)? else {
                return Ok(());
            };
            for out in outcome.frames {
                inbound_tx.send(out)?;
            }
            if let Some(SimEvent::Collision(cell)) = outcome.event {
                halt_sim.trigger(HaltReason::Collision {
                    x: cell.x,
                    y: cell.y,
                });
            }
            Ok(())
        });
        harness
    })?;

    let halt_ticker = Arc::clone(&halt);
    let nav_period = config.simulation.nav_tick_interval();
    let sim_period = config.simulation.tick_interval();
    let ticker_handle = spawn("ticker", &halt, move || {
        run_ticker(ticker_nav, nav_period, ticker_sim, sim_period, &halt_ticker)
    })?;

    Ok(ThreadHandles {
        router: router_handle,
        fusion: fusion_handle,
        navigation: navigation_handle,
        mapping: mapping_handle,
        simulation: simulation_handle,
        ticker: ticker_handle,
    })
}
