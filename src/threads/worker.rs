//! Mailbox-driven loop shared by every component thread

use crate::core::halt::{HaltReason, SystemHalt};
use crate::core::mailbox::MailboxReceiver;
use crate::core::types::SensorFrame;
use crate::error::Result;
use std::time::Duration;

/// How often a blocked loop looks at the halt flag
pub const HALT_POLL: Duration = Duration::from_millis(50);

/// Receive and handle frames until the system halts
///
/// A handler error halts the whole system with a fault naming `component`.
/// Frames still queued when the halt is seen are handled before returning;
/// errors at that point are only logged.
///
/// # Returns
/// Number of frames handled before the halt
pub fn run_loop<F>(
    component: &'static str,
    rx: &MailboxReceiver<SensorFrame>,
    halt: &SystemHalt,
    mut handle: F,
) -> u64
where
    F: FnMut(SensorFrame) -> Result<()>,
{
    log::info!("{} thread started", component);
    let mut handled = 0u64;

    while !halt.is_halted() {
        match rx.recv_timeout(HALT_POLL) {
            Ok(Some(frame)) => {
                handled += 1;
                if let Err(e) = handle(frame) {
                    log::error!("{} failed on {}: {}", component, frame, e);
                    halt.trigger(HaltReason::Fault {
                        component,
                        message: e.to_string(),
                    });
                }
            }
            Ok(None) => continue,
            Err(e) => {
                halt.trigger(HaltReason::Fault {
                    component,
                    message: e.to_string(),
                });
                break;
            }
        }
    }

    // Frames queued before the halt are still handled so final events land
    let mut drained = 0usize;
    while let Some(frame) = rx.try_recv() {
        drained += 1;
        if let Err(e) = handle(frame) {
            log::debug!("{} dropped {} after halt: {}", component, frame, e);
        }
    }
    log::info!(
        "{} thread stopped ({} handled, {} drained)",
        component,
        handled,
        drained
    );
    handled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mailbox::{OverflowPolicy, mailbox};
    use crate::core::types::MessageType;
    use crate::error::Error;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_handler_error_halts_system() {
        let (tx, rx) = mailbox("test", 4, OverflowPolicy::Block, None);
        let halt = SystemHalt::new();
        tx.send(SensorFrame::signal(MessageType::NavTimer)).unwrap();
        tx.send(SensorFrame::signal(MessageType::SimTimer)).unwrap();
        tx.send(SensorFrame::signal(MessageType::SimTimer)).unwrap();

        let handled = run_loop("test", &rx, &halt, |frame| {
            if frame.tag == MessageType::SimTimer as u8 {
                Err(Error::Other("boom".into()))
            } else {
                Ok(())
            }
        });

        assert_eq!(handled, 2);
        assert!(rx.is_empty());
        match halt.reason() {
            Some(HaltReason::Fault { component, message }) => {
                assert_eq!(component, "test");
                assert!(message.contains("boom"));
            }
            other => panic!("expected fault, got {:?}", other),
        }
    }

    #[test]
    fn test_external_halt_stops_idle_loop() {
        let (_tx, rx) = mailbox::<SensorFrame>("idle", 4, OverflowPolicy::Block, None);
        let halt = Arc::new(SystemHalt::new());
        let loop_halt = Arc::clone(&halt);
        let handle = thread::spawn(move || run_loop("idle", &rx, &loop_halt, |_| Ok(())));

        thread::sleep(Duration::from_millis(20));
        halt.trigger(HaltReason::Shutdown);
        assert_eq!(handle.join().unwrap(), 0);
    }

    #[test]
    fn test_closed_mailbox_is_a_fault() {
        let (tx, rx) = mailbox::<SensorFrame>("orphan", 4, OverflowPolicy::Block, None);
        drop(tx);
        let halt = SystemHalt::new();
        run_loop("orphan", &rx, &halt, |_| Ok(()));
        assert!(matches!(halt.reason(), Some(HaltReason::Fault { .. })));
    }
}
