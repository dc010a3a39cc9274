//! Core abstractions: frames, mailboxes, links and shared state

pub mod display;
pub mod halt;
pub mod link;
pub mod mailbox;
pub mod sequence;
pub mod types;

pub use display::{DisplaySink, LogDisplay, NullDisplay, RecordingDisplay};
pub use halt::{HaltReason, SystemHalt};
pub use link::{ActuatorLink, MailboxActuator, SimulatedTransport, TransportLink};
pub use mailbox::{Delivery, MailboxReceiver, MailboxSender, OverflowPolicy, mailbox};
pub use sequence::{GapPolicy, SequenceCheck, SequenceTracker};
pub use types::{
    ActuatorCommand, FusedDistance, MessageType, PathSegment, PathState, RadiusCode, RunMode,
    SensorFrame, Side, Steering,
};
