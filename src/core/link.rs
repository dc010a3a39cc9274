//! Links to the drive hardware
//!
//! The control core never talks to a bus directly. Telemetry polls go out
//! through a [`TransportLink`] and motor commands through an
//! [`ActuatorLink`]; the simulator and tests supply their own
//! implementations.

use crate::core::mailbox::MailboxSender;
use crate::core::types::{ActuatorCommand, SensorFrame};
use crate::error::Result;

/// Inbound sensor link
pub trait TransportLink: Send {
    /// Ask the hardware for a fresh encoder/accelerometer reading
    fn request_telemetry(&mut self) -> Result<()>;
}

/// Outbound motor link
pub trait ActuatorLink: Send {
    fn send(&mut self, cmd: ActuatorCommand) -> Result<()>;
}

/// Transport for the simulated vehicle
///
/// The simulator publishes encoder frames on its own tick, so polls are
/// only counted.
#[derive(Debug, Default)]
pub struct SimulatedTransport {
    polls: u64,
}

impl SimulatedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl TransportLink for SimulatedTransport {
    fn request_telemetry(&mut self) -> Result<()> {
        self.polls += 1;
        log::trace!("Telemetry poll #{}", self.polls);
        Ok(())
    }
}

/// Delivers motor commands as `MotorSend` frames into a mailbox
pub struct MailboxActuator {
    target: MailboxSender<SensorFrame>,
}

impl MailboxActuator {
    pub fn new(target: MailboxSender<SensorFrame>) -> Self {
        Self { target }
    }
}

impl ActuatorLink for MailboxActuator {
    fn send(&mut self, cmd: ActuatorCommand) -> Result<()> {
        self.target.send(cmd.to_frame())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mailbox::{OverflowPolicy, mailbox};
    use crate::core::types::RadiusCode;

    #[test]
    fn test_mailbox_actuator_wraps_frame() {
        let (tx, rx) = mailbox("sim", 4, OverflowPolicy::Block, None);
        let mut link = MailboxActuator::new(tx);
        let cmd = ActuatorCommand::new(1, 20, RadiusCode(5));
        link.send(cmd).unwrap();

        let frame = rx.try_recv().unwrap();
        assert_eq!(ActuatorCommand::from_frame(&frame).unwrap(), cmd);
    }
}
