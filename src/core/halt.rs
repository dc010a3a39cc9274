//! Terminal system state shared by all loops

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Why the system stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaltReason {
    /// A loop hit a fatal error
    Fault {
        component: &'static str,
        message: String,
    },
    /// Simulated vehicle drove into a wall
    Collision { x: i32, y: i32 },
    /// Final lap finished
    CourseComplete { laps: u32 },
    /// Operator requested shutdown
    Shutdown,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::Fault { component, message } => {
                write!(f, "fault in {}: {}", component, message)
            }
            HaltReason::Collision { x, y } => write!(f, "collision at ({}, {})", x, y),
            HaltReason::CourseComplete { laps } => write!(f, "course complete ({} laps)", laps),
            HaltReason::Shutdown => write!(f, "shutdown requested"),
        }
    }
}

/// Latch observed by every loop; the first reason wins
#[derive(Debug, Default)]
pub struct SystemHalt {
    halted: AtomicBool,
    reason: Mutex<Option<HaltReason>>,
}

impl SystemHalt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the halted state; returns false if already halted
    pub fn trigger(&self, reason: HaltReason) -> bool {
        let mut slot = self.reason.lock();
        if slot.is_some() {
            log::debug!("Ignoring halt ({}), already halted", reason);
            return false;
        }
        log::info!("System halted: {}", reason);
        *slot = Some(reason);
        self.halted.store(true, Ordering::Release);
        true
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    pub fn reason(&self) -> Option<HaltReason> {
        self.reason.lock().clone()
    }
}
