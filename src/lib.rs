//! Marga - control core for a track-following vehicle
//!
//! Fuses infrared range samples into steering commands, records the course
//! on a learning lap and replays it to slow down ahead of turns. A virtual
//! course with ray-cast rangers stands in for the hardware.
//!
//! ## Components
//!
//! - [`router`]: classifies inbound frames by tag
//! - [`fusion`]: raw IR samples to fused side distances and front readings
//! - [`navigation`]: steering state machine and motor commands
//! - [`mapping`]: path log and replay speed advice
//! - [`sim`]: virtual course, kinematics and the lockstep driver
//!
//! Components are plain state machines. [`threads`] and [`app`] run them on
//! one thread each, connected by bounded mailboxes; [`sim::LockstepRunner`]
//! runs them deterministically on the calling thread.

pub mod app;
pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod fusion;
pub mod mapping;
pub mod navigation;
pub mod router;
pub mod sim;
pub mod threads;

// Re-export commonly used types
pub use app::{App, RunSummary};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use sim::{LockstepReport, LockstepRunner};
