//! Navigation controller
//!
//! Turns fused distances and front readings into motor commands. The
//! controller is a small state machine:
//!
//! ```text
//!            front < front_safe_zone (enabled)
//!   Normal ─────────────────────────────────► Pivot
//!     ▲  ◄───────────────────────────────────   │
//!     │   front clears, or pivot_limit reached   │
//!     │                                          │
//!     │ run start          front < limit (disabled), finish, stop
//!     └──────────── Halted ◄────────────────────┘
//! ```
//!
//! A pivot that has not cleared after `pivot_limit` front samples commits:
//! the controller drives straight on the current heading and ignores side
//! distances for the next `pivot_hold` samples.
//!
//! Commands are edge-triggered: a distance event only produces a command
//! when the radius code differs from the last one sent. Every command sent
//! for a new steering zone also announces a path transition to the mapper
//! when path recording is on.

pub mod zone;

pub use zone::{SteeringZone, classify};

use crate::config::NavigationConfig;
use crate::constants::{
    DISPLAY_ROW_ACCEL, DISPLAY_ROW_FRONT, DISPLAY_ROW_HEARTBEAT, DISPLAY_ROW_STATUS,
    DISPLAY_ROW_STEERING, HEARTBEAT_EVERY,
};
use crate::core::display::DisplaySink;
use crate::core::sequence::SequenceTracker;
use crate::core::types::{ActuatorCommand, MessageType, PathState, RadiusCode, SensorFrame, Side};
use crate::error::{Error, Result};

const COMPONENT: &str = "navigation";

/// Drive state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveState {
    Normal,
    /// Spinning away from a front obstacle
    Pivot,
    Halted,
}

/// Side effect requested by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    /// Send to the actuator link
    Actuate(ActuatorCommand),
    /// Forward to the path mapper
    Map(SensorFrame),
    /// Poll the transport link for telemetry
    PollTelemetry,
    /// Final lap done, vehicle stopped
    RunComplete { laps: u32 },
}

/// Controller counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NavStats {
    pub commands: u64,
    pub transitions: u64,
    pub pivots: u64,
    pub polls: u64,
}

/// Steering decision engine
pub struct NavigationController {
    config: NavigationConfig,
    state: DriveState,
    enabled: bool,
    zone: SteeringZone,
    /// Radius of the last command sent; `None` forces the next one out
    last_radius: Option<RadiusCode>,
    last_turn: Side,
    /// Front samples seen since the pivot started
    pivot_samples: u32,
    /// Distance samples still ignored after a committed pivot
    hold: u32,
    straight_speed: u8,
    turn_speed: u8,
    /// Path state last announced to the mapper
    recorded: Option<(PathState, u8)>,
    command_seq: u8,
    map_seq: u8,
    distance_seq: SequenceTracker,
    front_seq: SequenceTracker,
    accel_seq: SequenceTracker,
    timer_ticks: u32,
    laps: u32,
    laps_completed: u32,
    stats: NavStats,
    display: Box<dyn DisplaySink>,
}

impl NavigationController {
    /// Create a controller for a run of `laps` laps
    pub fn new(config: &NavigationConfig, laps: u32, display: Box<dyn DisplaySink>) -> Self {
        Self {
            state: DriveState::Normal,
            enabled: config.auto_start,
            zone: SteeringZone::Straight,
            last_radius: None,
            last_turn: Side::Left,
            pivot_samples: 0,
            hold: 0,
            straight_speed: config.straight_speed,
            turn_speed: config.turn_speed,
            recorded: None,
            command_seq: 0,
            map_seq: 0,
            distance_seq: SequenceTracker::new("fused-distance", config.gap_policy),
            front_seq: SequenceTracker::new("front", config.gap_policy),
            accel_seq: SequenceTracker::new("accelerometer", config.gap_policy),
            timer_ticks: 0,
            laps: laps.max(1),
            laps_completed: 0,
            stats: NavStats::default(),
            display,
            config: config.clone(),
        }
    }

    /// Handle one event from the navigation mailbox
    pub fn handle(&mut self, frame: SensorFrame) -> Result<Vec<NavAction>> {
        let kind = frame.kind().map_err(|_| Error::UnexpectedMessage {
            component: COMPONENT,
            tag: frame.tag,
        })?;

        let mut actions = Vec::new();
        match kind {
            MessageType::Distance => self.on_distance(frame, &mut actions)?,
            MessageType::FrontValue => self.on_front(frame, &mut actions)?,
            MessageType::NavTimer => self.on_timer(&mut actions),
            MessageType::UpdateSpeed => self.on_update_speed(frame.value2),
            MessageType::AccRead => {
                self.accel_seq.observe(frame.sequence)?;
                self.display.print_line(
                    &format!("Acc: {}, {}", frame.value1, frame.value2),
                    DISPLAY_ROW_ACCEL,
                );
            }
            MessageType::MotorRead => {
                if self.config.path_recording {
                    actions.push(NavAction::Map(frame));
                }
            }
            MessageType::FinishLine => self.on_finish(&mut actions),
            MessageType::RunStart => self.start(),
            MessageType::RunStop => self.stop(&mut actions),
            _ => {
                return Err(Error::UnexpectedMessage {
                    component: COMPONENT,
                    tag: frame.tag,
                });
            }
        }
        Ok(actions)
    }

    fn on_distance(&mut self, frame: SensorFrame, actions: &mut Vec<NavAction>) -> Result<()> {
        self.distance_seq.observe(frame.sequence)?;

        let zone = classify(frame.value1, frame.value2, &self.config);
        if let Some(side) = zone.side() {
            self.last_turn = side;
        }
        if zone != self.zone {
            log::debug!(
                "Zone {:?} -> {:?} (left {}, right {})",
                self.zone,
                zone,
                frame.value1,
                frame.value2
            );
            self.zone = zone;
        }

        if self.hold > 0 {
            self.hold -= 1;
            return Ok(());
        }
        if !self.enabled || self.state != DriveState::Normal {
            return Ok(());
        }
        let radius = zone.radius_code(&self.config);
        if self.last_radius == Some(radius) {
            return Ok(());
        }

        let speed = if zone == SteeringZone::Straight {
            self.straight_speed
        } else {
            self.turn_speed
        };
        let cmd = self.command(speed, radius);
        self.display.print_line(
            &format!("S: {} {} {}", cmd.sequence, speed, radius.0),
            DISPLAY_ROW_STEERING,
        );
        actions.push(NavAction::Actuate(cmd));

        if self.config.path_recording {
            let recorded = zone.path_state(&self.config);
            if self.recorded != Some(recorded) {
                self.recorded = Some(recorded);
                self.stats.transitions += 1;
                actions.push(NavAction::Map(self.map_frame(
                    recorded.0.transition_type(),
                    recorded.1,
                )));
            }
        }
        Ok(())
    }

    fn on_front(&mut self, frame: SensorFrame, actions: &mut Vec<NavAction>) -> Result<()> {
        self.front_seq.observe(frame.sequence)?;
        let value = frame.value2;
        self.display.print_line(
            &format!("F: {} {}", value, u8::from(self.state == DriveState::Pivot)),
            DISPLAY_ROW_FRONT,
        );

        if self.state == DriveState::Pivot && self.config.pivot_limit > 0 {
            self.pivot_samples += 1;
            if self.pivot_samples >= self.config.pivot_limit {
                self.commit_heading(actions);
                return Ok(());
            }
        }

        if value >= self.config.front_safe_zone {
            if self.state == DriveState::Pivot {
                log::debug!("Front clear ({}), resuming", value);
                self.state = DriveState::Normal;
            }
            return Ok(());
        }

        if self.enabled {
            if self.state == DriveState::Normal {
                // Spin away from the side the last turn went to
                let radius = RadiusCode::spin(self.last_turn.opposite());
                log::info!("Front obstacle at {}, pivoting", value);
                self.state = DriveState::Pivot;
                self.pivot_samples = 0;
                self.stats.pivots += 1;
                let cmd = self.command(self.config.pivot_speed, radius);
                actions.push(NavAction::Actuate(cmd));
            }
        } else if self.state != DriveState::Halted {
            self.display.print_line("Halt", DISPLAY_ROW_STATUS);
            self.halt(actions);
        }
        Ok(())
    }

    /// Leave a pivot that did not clear and drive on
    fn commit_heading(&mut self, actions: &mut Vec<NavAction>) {
        log::info!(
            "Pivot still blocked after {} samples, driving on",
            self.pivot_samples
        );
        self.state = DriveState::Normal;
        self.hold = self.config.pivot_hold;
        let cmd = self.command(self.straight_speed, RadiusCode::STRAIGHT);
        self.display.print_line(
            &format!("S: {} {} {}", cmd.sequence, cmd.speed, cmd.radius.0),
            DISPLAY_ROW_STEERING,
        );
        actions.push(NavAction::Actuate(cmd));
    }

    fn on_timer(&mut self, actions: &mut Vec<NavAction>) {
        self.timer_ticks = self.timer_ticks.wrapping_add(1);
        self.stats.polls += 1;
        actions.push(NavAction::PollTelemetry);
        if self.timer_ticks % HEARTBEAT_EVERY == 0 {
            self.display.print_line(
                &format!("Timer Messages {}", self.timer_ticks),
                DISPLAY_ROW_HEARTBEAT,
            );
        }
    }

    fn on_update_speed(&mut self, speed: u8) {
        if speed == 0 {
            log::warn!("Ignoring zero speed update");
            return;
        }
        log::debug!("Speed update: {}", speed);
        self.straight_speed = speed;
        self.turn_speed = speed;
    }

    fn on_finish(&mut self, actions: &mut Vec<NavAction>) {
        self.laps_completed += 1;
        log::info!("Lap {} of {} complete", self.laps_completed, self.laps);

        if self.config.path_recording {
            actions.push(NavAction::Map(self.map_frame(MessageType::MapHalt, 0)));
        }

        if self.laps_completed < self.laps {
            if self.config.path_recording {
                actions.push(NavAction::Map(self.map_frame(MessageType::UpdateRunMap, 0)));
            }
            // Next lap starts from scratch
            self.recorded = None;
            self.last_radius = None;
            self.hold = 0;
            self.state = DriveState::Normal;
            self.straight_speed = self.config.straight_speed;
            self.turn_speed = self.config.turn_speed;
            return;
        }

        self.halt(actions);
        if self.config.path_recording {
            actions.push(NavAction::Map(self.map_frame(MessageType::PrintMap, 0)));
        }
        actions.push(NavAction::RunComplete {
            laps: self.laps_completed,
        });
    }

    /// Enable driving
    pub fn start(&mut self) {
        log::info!("Run started");
        self.enabled = true;
        if self.state == DriveState::Halted {
            self.state = DriveState::Normal;
        }
        self.last_radius = None;
        self.hold = 0;
    }

    /// Disable driving and stop the motors
    pub fn stop(&mut self, actions: &mut Vec<NavAction>) {
        log::info!("Run stopped");
        self.enabled = false;
        self.halt(actions);
    }

    fn halt(&mut self, actions: &mut Vec<NavAction>) {
        self.state = DriveState::Halted;
        let cmd = ActuatorCommand::stop(self.next_command_seq());
        self.stats.commands += 1;
        self.last_radius = None;
        actions.push(NavAction::Actuate(cmd));
    }

    fn command(&mut self, speed: u8, radius: RadiusCode) -> ActuatorCommand {
        let cmd = ActuatorCommand::new(self.next_command_seq(), speed, radius);
        self.last_radius = Some(radius);
        self.stats.commands += 1;
        log::debug!("Command #{}: speed {} radius {}", cmd.sequence, speed, radius.0);
        cmd
    }

    fn next_command_seq(&mut self) -> u8 {
        let seq = self.command_seq;
        self.command_seq = self.command_seq.wrapping_add(1);
        seq
    }

    fn map_frame(&mut self, kind: MessageType, radius: u8) -> SensorFrame {
        let frame = SensorFrame::new(kind, self.map_seq, 0, radius);
        self.map_seq = self.map_seq.wrapping_add(1);
        frame
    }

    pub fn state(&self) -> DriveState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn zone(&self) -> SteeringZone {
        self.zone
    }

    /// Cached (straight, turn) speeds
    pub fn speeds(&self) -> (u8, u8) {
        (self.straight_speed, self.turn_speed)
    }

    pub fn laps_completed(&self) -> u32 {
        self.laps_completed
    }

    pub fn stats(&self) -> NavStats {
        self.stats
    }

    /// Sequence gaps across the fused, front and accelerometer streams
    pub fn gaps(&self) -> u64 {
        self.distance_seq.gaps() + self.front_seq.gaps() + self.accel_seq.gaps()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::display::{NullDisplay, RecordingDisplay};
    use crate::core::sequence::GapPolicy;

    fn controller() -> NavigationController {
        NavigationController::new(&NavigationConfig::default(), 1, Box::new(NullDisplay))
    }

    fn distance(seq: u8, left: u8, right: u8) -> SensorFrame {
        SensorFrame::new(MessageType::Distance, seq, left, right)
    }

    fn front(seq: u8, value: u8) -> SensorFrame {
        SensorFrame::new(MessageType::FrontValue, seq, 0, value)
    }

    fn commands(actions: &[NavAction]) -> Vec<ActuatorCommand> {
        actions
            .iter()
            .filter_map(|a| match a {
                NavAction::Actuate(cmd) => Some(*cmd),
                _ => None,
            })
            .collect()
    }

    fn map_frames(actions: &[NavAction]) -> Vec<SensorFrame> {
        actions
            .iter()
            .filter_map(|a| match a {
                NavAction::Map(frame) => Some(*frame),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_repeated_zone_sends_one_command() {
        let mut nav = controller();
        let mut sent = Vec::new();
        for seq in 0..10 {
            sent.extend(commands(&nav.handle(distance(seq, 8, 8)).unwrap()));
        }
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].radius, RadiusCode::STRAIGHT);
        assert_eq!(sent[0].speed, 20);
    }

    #[test]
    fn test_zone_change_sends_new_command() {
        let mut nav = controller();
        nav.handle(distance(0, 15, 15)).unwrap();
        let actions = nav.handle(distance(1, 30, 15)).unwrap();
        let cmds = commands(&actions);
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].radius, RadiusCode(5));
        assert_eq!(cmds[0].speed, 10);
        assert_eq!(cmds[0].sequence, 1);

        let transitions = map_frames(&actions);
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].kind().unwrap(), MessageType::MapTurnLeft);
        assert_eq!(transitions[0].value2, 5);
    }

    #[test]
    fn test_hard_turn_transition_carries_radius() {
        let mut nav = controller();
        let actions = nav.handle(distance(0, 5, 30)).unwrap();
        assert_eq!(commands(&actions)[0].radius, RadiusCode(128));
        let transition = map_frames(&actions)[0];
        assert_eq!(transition.kind().unwrap(), MessageType::MapTurnRight);
        assert_eq!(transition.value2, 0);
    }

    #[test]
    fn test_disabled_controller_is_silent() {
        let config = NavigationConfig {
            auto_start: false,
            ..NavigationConfig::default()
        };
        let mut nav = NavigationController::new(&config, 1, Box::new(NullDisplay));
        assert!(nav.handle(distance(0, 30, 15)).unwrap().is_empty());

        nav.start();
        let cmds = commands(&nav.handle(distance(1, 30, 15)).unwrap());
        assert_eq!(cmds.len(), 1);
    }

    #[test]
    fn test_front_obstacle_pivots_away_from_last_turn() {
        let mut nav = controller();
        nav.handle(distance(0, 30, 15)).unwrap(); // slight left

        let cmds = commands(&nav.handle(front(0, 12)).unwrap());
        assert_eq!(nav.state(), DriveState::Pivot);
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].radius, RadiusCode::SPIN_RIGHT);
        assert_eq!(cmds[0].speed, 20);

        // Still blocked: no repeat, and distance events are suppressed
        assert!(commands(&nav.handle(front(1, 10)).unwrap()).is_empty());
        assert!(commands(&nav.handle(distance(1, 15, 30)).unwrap()).is_empty());

        // Clear reading resumes and the pending zone goes out
        nav.handle(front(2, 60)).unwrap();
        assert_eq!(nav.state(), DriveState::Normal);
        let cmds = commands(&nav.handle(distance(2, 15, 30)).unwrap());
        assert_eq!(cmds[0].radius, RadiusCode(133));
    }

    #[test]
    fn test_front_obstacle_while_disabled_halts() {
        let display = RecordingDisplay::new();
        let config = NavigationConfig {
            auto_start: false,
            ..NavigationConfig::default()
        };
        let mut nav = NavigationController::new(&config, 1, Box::new(display.clone()));
        let cmds = commands(&nav.handle(front(0, 5)).unwrap());
        assert_eq!(nav.state(), DriveState::Halted);
        assert!(cmds[0].is_stop());
        assert_eq!(display.last_line(DISPLAY_ROW_STATUS).as_deref(), Some("Halt"));

        // Only the transition into halted emits
        assert!(commands(&nav.handle(front(1, 5)).unwrap()).is_empty());
    }

    #[test]
    fn test_update_speed_applies_to_next_command() {
        let mut nav = controller();
        nav.handle(distance(0, 15, 15)).unwrap();
        nav.handle(SensorFrame::new(MessageType::UpdateSpeed, 0, 0, 30))
            .unwrap();
        assert_eq!(nav.speeds(), (30, 30));

        let cmds = commands(&nav.handle(distance(1, 30, 15)).unwrap());
        assert_eq!(cmds[0].speed, 30);
    }

    #[test]
    fn test_timer_polls_transport() {
        let display = RecordingDisplay::new();
        let mut nav =
            NavigationController::new(&NavigationConfig::default(), 1, Box::new(display.clone()));
        let mut polls = 0;
        for _ in 0..20 {
            let actions = nav.handle(SensorFrame::signal(MessageType::NavTimer)).unwrap();
            polls += actions
                .iter()
                .filter(|a| matches!(a, NavAction::PollTelemetry))
                .count();
        }
        assert_eq!(polls, 20);
        assert_eq!(display.lines(DISPLAY_ROW_HEARTBEAT).len(), 2);
    }

    #[test]
    fn test_encoder_frames_forwarded() {
        let mut nav = controller();
        let encoder = SensorFrame::new(MessageType::MotorRead, 0, 1, 1);
        assert_eq!(nav.handle(encoder).unwrap(), vec![NavAction::Map(encoder)]);
    }

    #[test]
    fn test_single_lap_finish_halts() {
        let mut nav = controller();
        nav.handle(distance(0, 8, 8)).unwrap();
        let actions = nav.handle(SensorFrame::signal(MessageType::FinishLine)).unwrap();

        assert_eq!(nav.state(), DriveState::Halted);
        assert!(commands(&actions)[0].is_stop());
        let kinds: Vec<_> = map_frames(&actions)
            .iter()
            .map(|f| f.kind().unwrap())
            .collect();
        assert_eq!(kinds, vec![MessageType::MapHalt, MessageType::PrintMap]);
        assert!(actions.contains(&NavAction::RunComplete { laps: 1 }));
    }

    #[test]
    fn test_two_lap_finish_switches_to_replay() {
        let config = NavigationConfig {
            two_lap: true,
            ..NavigationConfig::default()
        };
        let mut nav = NavigationController::new(&config, 2, Box::new(NullDisplay));
        nav.handle(distance(0, 8, 8)).unwrap();

        let actions = nav.handle(SensorFrame::signal(MessageType::FinishLine)).unwrap();
        assert!(commands(&actions).is_empty());
        let kinds: Vec<_> = map_frames(&actions)
            .iter()
            .map(|f| f.kind().unwrap())
            .collect();
        assert_eq!(kinds, vec![MessageType::MapHalt, MessageType::UpdateRunMap]);
        assert_eq!(nav.state(), DriveState::Normal);

        // Same zone is announced again on the new lap
        let actions = nav.handle(distance(1, 8, 8)).unwrap();
        assert_eq!(commands(&actions).len(), 1);
        assert_eq!(
            map_frames(&actions)[0].kind().unwrap(),
            MessageType::MapStraight
        );
    }

    #[test]
    fn test_run_stop_and_start() {
        let mut nav = controller();
        nav.handle(distance(0, 8, 8)).unwrap();
        let actions = nav.handle(SensorFrame::signal(MessageType::RunStop)).unwrap();
        assert!(commands(&actions)[0].is_stop());
        assert!(!nav.is_enabled());

        nav.handle(SensorFrame::signal(MessageType::RunStart)).unwrap();
        assert_eq!(nav.state(), DriveState::Normal);
        let cmds = commands(&nav.handle(distance(1, 8, 8)).unwrap());
        assert_eq!(cmds[0].radius, RadiusCode::STRAIGHT);
        assert_eq!(cmds[0].speed, 20);
    }

    #[test]
    fn test_blocked_pivot_commits_to_heading() {
        let mut nav = controller();
        nav.handle(distance(0, 15, 30)).unwrap(); // slight right
        let cmds = commands(&nav.handle(front(0, 5)).unwrap());
        assert_eq!(cmds[0].radius, RadiusCode::SPIN_LEFT);

        assert!(commands(&nav.handle(front(1, 5)).unwrap()).is_empty());
        assert!(commands(&nav.handle(front(2, 5)).unwrap()).is_empty());
        let cmds = commands(&nav.handle(front(3, 5)).unwrap());
        assert_eq!(nav.state(), DriveState::Normal);
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].radius, RadiusCode::STRAIGHT);
        assert_eq!(cmds[0].speed, 20);

        // Side distances are ignored while the new heading is held
        for seq in 1..=5 {
            assert!(nav.handle(distance(seq, 30, 15)).unwrap().is_empty());
        }
        let cmds = commands(&nav.handle(distance(6, 30, 15)).unwrap());
        assert_eq!(cmds[0].radius, RadiusCode(5));
        assert_eq!(nav.stats().pivots, 1);
    }

    #[test]
    fn test_clear_front_inside_limit_resumes_without_command() {
        let mut nav = controller();
        nav.handle(front(0, 5)).unwrap();
        assert!(commands(&nav.handle(front(1, 40)).unwrap()).is_empty());
        assert_eq!(nav.state(), DriveState::Normal);
        // No hold after a pivot that cleared on its own
        assert_eq!(commands(&nav.handle(distance(0, 8, 8)).unwrap()).len(), 1);
    }

    #[test]
    fn test_pivot_without_limit_waits_for_clear_front() {
        let config = NavigationConfig {
            pivot_limit: 0,
            ..NavigationConfig::default()
        };
        let mut nav = NavigationController::new(&config, 1, Box::new(NullDisplay));
        nav.handle(front(0, 5)).unwrap();
        for seq in 1..50 {
            assert!(commands(&nav.handle(front(seq, 5)).unwrap()).is_empty());
        }
        assert_eq!(nav.state(), DriveState::Pivot);
    }

    #[test]
    fn test_dropped_distance_frame_counted_once() {
        let mut nav = controller();
        for seq in [0, 1, 3, 4, 5] {
            nav.handle(distance(seq, 8, 8)).unwrap();
        }
        for seq in 0..5 {
            nav.handle(front(seq, 80)).unwrap();
        }
        assert_eq!(nav.gaps(), 1);
    }

    #[test]
    fn test_dropped_front_frame_halts_under_halt_policy() {
        let config = NavigationConfig {
            gap_policy: GapPolicy::Halt,
            ..NavigationConfig::default()
        };
        let mut nav = NavigationController::new(&config, 1, Box::new(NullDisplay));
        nav.handle(front(0, 80)).unwrap();
        nav.handle(front(1, 80)).unwrap();
        let err = nav.handle(front(3, 80)).unwrap_err();
        assert!(matches!(
            err,
            Error::SequenceGap {
                channel: "front",
                expected: 2,
                actual: 3
            }
        ));
        assert_eq!(nav.gaps(), 1);
    }

    #[test]
    fn test_unexpected_message_is_fatal() {
        let mut nav = controller();
        let err = nav
            .handle(SensorFrame::new(MessageType::IrLeft, 0, 1, 1))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedMessage {
                component: "navigation",
                tag: 55
            }
        ));

        let unknown = SensorFrame {
            tag: 99,
            sequence: 0,
            value1: 0,
            value2: 0,
        };
        assert!(nav.handle(unknown).is_err());
    }
}
