//! Inbound frame router
//!
//! Classifies frames from the transport link by tag and hands each one,
//! unmodified, to the single loop responsible for it:
//!
//! | Tags | Destination |
//! |------|-------------|
//! | `IrLeft`, `IrFront`, `IrRight` | distance fusion |
//! | `MotorRead`, `AccRead`, `Distance`, `FrontValue`, `FinishLine`, `RunStart`, `RunStop` | navigation |
//!
//! Anything else is dropped without error.

use crate::core::mailbox::MailboxSender;
use crate::core::types::{MessageType, SensorFrame};
use crate::error::Result;

/// Consumer of a routed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Fusion,
    Navigation,
}

/// Routing decision for a raw tag
pub fn route(tag: u8) -> Option<Destination> {
    match MessageType::try_from(tag).ok()? {
        MessageType::IrLeft | MessageType::IrFront | MessageType::IrRight => {
            Some(Destination::Fusion)
        }
        MessageType::MotorRead
        | MessageType::AccRead
        | MessageType::Distance
        | MessageType::FrontValue
        | MessageType::FinishLine
        | MessageType::RunStart
        | MessageType::RunStop => Some(Destination::Navigation),
        _ => None,
    }
}

/// Routed and dropped frame counts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RouterStats {
    pub to_fusion: u64,
    pub to_navigation: u64,
    pub dropped: u64,
}

/// Dispatches inbound frames into consumer mailboxes
pub struct Router {
    fusion: MailboxSender<SensorFrame>,
    navigation: MailboxSender<SensorFrame>,
    stats: RouterStats,
}

impl Router {
    pub fn new(
        fusion: MailboxSender<SensorFrame>,
        navigation: MailboxSender<SensorFrame>,
    ) -> Self {
        Self {
            fusion,
            navigation,
            stats: RouterStats::default(),
        }
    }

    /// Forward one frame; returns where it went
    pub fn dispatch(&mut self, frame: SensorFrame) -> Result<Option<Destination>> {
        let destination = route(frame.tag);
        match destination {
            Some(Destination::Fusion) => {
                self.fusion.send(frame)?;
                self.stats.to_fusion += 1;
            }
            Some(Destination::Navigation) => {
                self.navigation.send(frame)?;
                self.stats.to_navigation += 1;
            }
            None => {
                self.stats.dropped += 1;
                log::debug!("Router dropping {}", frame);
            }
        }
        Ok(destination)
    }

    pub fn stats(&self) -> RouterStats {
        self.stats
    }
}
