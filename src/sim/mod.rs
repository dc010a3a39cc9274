//! Simulated vehicle on a virtual course
//!
//! Stands in for the drive hardware. Every tick the harness moves the
//! vehicle one cell according to the last intercepted motor command, reports
//! an encoder reading, checks for walls and the finish line, and ray-casts
//! the three rangers. Range readings are encoded back into raw IR samples so
//! they travel the same router and fusion path as hardware samples.
//!
//! ```text
//!        MotorSend ──► apply_command ──► steering
//!                                           │
//!   SimTimer ──► tick ──► move ──► wall? ──► Collision (frozen)
//!                                   │
//!                              finish? ──► FinishLine, reset or freeze
//!                                   │
//!                                 scan ──► MotorRead, IrLeft, IrRight, IrFront
//! ```

pub mod course;
pub mod grid;
pub mod lockstep;
pub mod noise;
pub mod raycast;

pub use course::{CourseTemplate, VirtualCourse};
pub use grid::{Cell, Heading};
pub use lockstep::{LockstepReport, LockstepRunner};
pub use noise::RangeNoise;
pub use raycast::{RangeScan, RangerLayout, ray_cast};

use crate::config::SimulationConfig;
use crate::constants::DISPLAY_ROW_STATUS;
use crate::core::display::DisplaySink;
use crate::core::sequence::{GapPolicy, SequenceCheck, SequenceTracker};
use crate::core::types::{ActuatorCommand, MessageType, SensorFrame, Side, Steering};
use crate::error::{Error, Result};
use crate::fusion::magnitude_for_distance;

const COMPONENT: &str = "simulation";

/// Position and heading of the simulated vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehiclePose {
    pub position: Cell,
    pub heading: Heading,
    /// Cells travelled since the start of the lap
    pub segment: u32,
}

/// Harness lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimStatus {
    Running,
    /// Hit a wall; pose frozen
    Crashed,
    /// Final lap finished; pose frozen
    Finished,
}

/// Terminal or lap event raised by a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    Collision(Cell),
    /// Finish line crossed with laps remaining
    Finish { lap: u32 },
    /// Final finish line crossed
    Complete { laps: u32 },
}

/// Frames and event produced by one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub frames: Vec<SensorFrame>,
    pub event: Option<SimEvent>,
}

/// Virtual course, vehicle kinematics and ray-cast rangers
pub struct SimulationHarness {
    course: VirtualCourse,
    layout: RangerLayout,
    start: VehiclePose,
    pose: VehiclePose,
    /// `None` while stopped
    steering: Option<Steering>,
    status: SimStatus,
    laps: u32,
    laps_completed: u32,
    ticks: u64,
    noise: RangeNoise,
    motor_seq: u8,
    left_seq: u8,
    front_seq: u8,
    right_seq: u8,
    command_seq: SequenceTracker,
    display: Box<dyn DisplaySink>,
}

impl SimulationHarness {
    /// Generate the configured course and place the vehicle at the start
    pub fn new(
        config: &SimulationConfig,
        laps: u32,
        display: Box<dyn DisplaySink>,
    ) -> Result<Self> {
        let course = VirtualCourse::generate(config.course);
        let start = VehiclePose {
            position: Cell::new(config.start_x, config.start_y),
            heading: Heading::from_degrees(config.start_heading)?,
            segment: 0,
        };
        let mut harness = Self {
            course,
            layout: RangerLayout {
                look_ahead: config.look_ahead,
                diagonal_look_ahead: config.diagonal_look_ahead,
                max_range: config.max_range,
            },
            start,
            pose: start,
            steering: Some(Steering::Straight),
            status: SimStatus::Running,
            laps: laps.max(1),
            laps_completed: 0,
            ticks: 0,
            noise: RangeNoise::new(config.random_seed, config.range_noise_stddev),
            motor_seq: 0,
            left_seq: 0,
            front_seq: 0,
            right_seq: 0,
            command_seq: SequenceTracker::new("motor-command", GapPolicy::Resync),
            display,
        };
        harness.course.draw(harness.display.as_mut());
        log::info!(
            "Simulating {:?} course, start {} heading {}°, {} lap(s)",
            config.course,
            start.position,
            start.heading.degrees(),
            harness.laps
        );
        Ok(harness)
    }

    /// Handle one frame from the simulation mailbox
    ///
    /// # Returns
    /// The tick outcome for `SimTimer`, `None` for intercepted commands
    pub fn handle(&mut self, frame: SensorFrame) -> Result<Option<TickOutcome>> {
        match frame.kind() {
            Ok(MessageType::SimTimer) => Ok(Some(self.tick())),
            Ok(MessageType::MotorSend) => {
                self.apply_command(ActuatorCommand::from_frame(&frame)?);
                Ok(None)
            }
            _ => Err(Error::UnexpectedMessage {
                component: COMPONENT,
                tag: frame.tag,
            }),
        }
    }

    /// Intercept a motor command; it takes effect on the next tick
    ///
    /// Returns false when the harness is frozen and the command was ignored.
    pub fn apply_command(&mut self, cmd: ActuatorCommand) -> bool {
        if self.status != SimStatus::Running {
            log::debug!("Ignoring command #{} after stop", cmd.sequence);
            return false;
        }
        match self.command_seq.observe(cmd.sequence) {
            Ok(SequenceCheck::Gap { missed, .. }) => {
                log::warn!("Command #{} follows {} lost command(s)", cmd.sequence, missed);
            }
            Ok(_) => {}
            Err(e) => log::warn!("Command #{}: {}", cmd.sequence, e),
        }
        self.steering = (!cmd.is_stop()).then(|| cmd.radius.decode());
        log::trace!("Steering now {:?}", self.steering);
        true
    }

    /// Advance the simulation by one step
    pub fn tick(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if self.status != SimStatus::Running {
            return outcome;
        }
        self.ticks += 1;

        let moved = self.drive();
        let encoder = u8::from(moved);
        outcome.frames.push(SensorFrame::new(
            MessageType::MotorRead,
            next(&mut self.motor_seq),
            encoder,
            encoder,
        ));
        let position = self.pose.position;
        self.display.draw_pixel(position.x, position.y);

        if self.course.is_wall(position) {
            log::warn!("Vehicle hit a wall at {} after {} ticks", position, self.ticks);
            self.display.print_line("Car Crashed", DISPLAY_ROW_STATUS);
            self.status = SimStatus::Crashed;
            outcome.event = Some(SimEvent::Collision(position));
            return outcome;
        }

        if self.course.is_finish(position) {
            self.laps_completed += 1;
            outcome
                .frames
                .push(SensorFrame::signal(MessageType::FinishLine));
            if self.laps_completed >= self.laps {
                log::info!("Course finished after {} ticks", self.ticks);
                self.status = SimStatus::Finished;
                outcome.event = Some(SimEvent::Complete {
                    laps: self.laps_completed,
                });
                return outcome;
            }
            log::info!(
                "Lap {} finished after {} ticks, back to start",
                self.laps_completed,
                self.ticks
            );
            outcome.event = Some(SimEvent::Finish {
                lap: self.laps_completed,
            });
            self.pose = self.start;
            self.course.draw(self.display.as_mut());
        }

        let scan = self.scan();
        let left = self.ir_frame(MessageType::IrLeft, scan.left);
        let right = self.ir_frame(MessageType::IrRight, scan.right);
        let front = self.ir_frame(MessageType::IrFront, scan.front);
        outcome.frames.extend([left, right, front]);
        outcome
    }

    /// Apply the current steering; returns true if the vehicle changed cell
    fn drive(&mut self) -> bool {
        let pose = &mut self.pose;
        match self.steering {
            None => false,
            Some(Steering::Straight) => {
                pose.position = pose.position.advance(pose.heading, 1);
                pose.segment += 1;
                true
            }
            Some(Steering::Turn(side, _)) => {
                let heading = match side {
                    Side::Left => pose.heading.left(),
                    Side::Right => pose.heading.right(),
                };
                pose.position = pose.position.advance(heading, 1);
                pose.heading = heading;
                pose.segment += 1;
                true
            }
            Some(Steering::Spin(side)) => {
                pose.heading = match side {
                    Side::Left => pose.heading.left(),
                    Side::Right => pose.heading.right(),
                };
                false
            }
        }
    }

    /// Ranger readings for the current pose
    pub fn scan(&self) -> RangeScan {
        self.layout
            .scan(&self.course, self.pose.position, self.pose.heading)
    }

    fn ir_frame(&mut self, kind: MessageType, distance: u32) -> SensorFrame {
        let distance = self.noise.apply(f64::from(distance));
        let magnitude = magnitude_for_distance(distance);
        let seq = match kind {
            MessageType::IrLeft => &mut self.left_seq,
            MessageType::IrRight => &mut self.right_seq,
            _ => &mut self.front_seq,
        };
        SensorFrame::new(
            kind,
            next(seq),
            (magnitude >> 8) as u8,
            (magnitude & 0xFF) as u8,
        )
    }

    /// Move the vehicle without a tick
    pub fn place(&mut self, position: Cell, heading: Heading) {
        self.pose.position = position;
        self.pose.heading = heading;
    }

    pub fn pose(&self) -> VehiclePose {
        self.pose
    }

    pub fn status(&self) -> SimStatus {
        self.status
    }

    pub fn steering(&self) -> Option<Steering> {
        self.steering
    }

    pub fn course(&self) -> &VirtualCourse {
        &self.course
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn laps_completed(&self) -> u32 {
        self.laps_completed
    }

    /// Gaps seen in the intercepted command sequence
    pub fn command_gaps(&self) -> u64 {
        self.command_seq.gaps()
    }
}

fn next(counter: &mut u8) -> u8 {
    let seq = *counter;
    *counter = counter.wrapping_add(1);
    seq
}
