//! Periodic timer ticks for the navigation and simulation loops

use super::worker::HALT_POLL;
use crate::core::halt::SystemHalt;
use crate::core::mailbox::{Delivery, MailboxSender};
use crate::core::types::{MessageType, SensorFrame};
use std::thread;
use std::time::{Duration, Instant};

/// Tick counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickerStats {
    pub nav_ticks: u64,
    pub sim_ticks: u64,
    /// Ticks discarded because the target mailbox was full
    pub dropped: u64,
}

/// One periodic stream
struct Schedule {
    target: MailboxSender<SensorFrame>,
    kind: MessageType,
    period: Duration,
    due: Instant,
}

impl Schedule {
    fn new(target: MailboxSender<SensorFrame>, kind: MessageType, period: Duration) -> Self {
        Self {
            target,
            kind,
            period,
            due: Instant::now() + period,
        }
    }
}

/// Post timer frames until the system halts
///
/// Senders should carry the `DropNewest` policy so a slow consumer loses
/// ticks instead of stalling the other stream.
pub fn run_ticker(
    nav: MailboxSender<SensorFrame>,
    nav_period: Duration,
    sim: MailboxSender<SensorFrame>,
    sim_period: Duration,
    halt: &SystemHalt,
) -> TickerStats {
    log::info!(
        "Ticker started (navigation {:?}, simulation {:?})",
        nav_period,
        sim_period
    );
    let mut stats = TickerStats::default();
    let mut schedules = [
        Schedule::new(nav, MessageType::NavTimer, nav_period),
        Schedule::new(sim, MessageType::SimTimer, sim_period),
    ];

    'outer: while !halt.is_halted() {
        let now = Instant::now();
        for schedule in schedules.iter_mut() {
            if now < schedule.due {
                continue;
            }
            schedule.due += schedule.period;
            match schedule.target.send(SensorFrame::signal(schedule.kind)) {
                Ok(Delivery::Dropped) | Ok(Delivery::Evicted) => stats.dropped += 1,
                Ok(Delivery::Queued) => match schedule.kind {
                    MessageType::NavTimer => stats.nav_ticks += 1,
                    _ => stats.sim_ticks += 1,
                },
                Err(e) => {
                    log::debug!("Ticker stopping: {}", e);
                    break 'outer;
                }
            }
        }

        let next_due = schedules
            .iter()
            .map(|s| s.due)
            .min()
            .unwrap_or(now + HALT_POLL);
        let wait = next_due.saturating_duration_since(Instant::now());
        thread::sleep(wait.min(HALT_POLL));
    }

    log::info!(
        "Ticker stopped ({} navigation, {} simulation, {} dropped)",
        stats.nav_ticks,
        stats.sim_ticks,
        stats.dropped
    );
    stats
}
