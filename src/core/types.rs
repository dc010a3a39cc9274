//! Core types shared by all control loops
//!
//! Every message that crosses a mailbox is a [`SensorFrame`]: a 4-byte
//! record `[tag, sequence, value1, value2]` whose tag comes from the
//! catalog in [`crate::constants`]. Keeping a single frame shape lets the
//! router forward frames without decoding their payload.

use crate::constants::*;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    NavTimer = MSG_NAV_TIMER,
    UpdateSpeed = MSG_UPDATE_SPEED,
    SimTimer = MSG_SIM_TIMER,
    Distance = MSG_DISTANCE,
    FrontValue = MSG_FRONT_VALUE,
    MapStraight = MSG_MAP_STRAIGHT,
    MapTurnLeft = MSG_MAP_TURN_LEFT,
    MapTurnRight = MSG_MAP_TURN_RIGHT,
    MapHalt = MSG_MAP_HALT,
    PrintMap = MSG_PRINT_MAP,
    UpdateRunMap = MSG_UPDATE_RUN_MAP,
    FinishLine = MSG_FINISH_LINE,
    RunStart = MSG_RUN_START,
    RunStop = MSG_RUN_STOP,
    MotorSend = MSG_MOTOR_SEND,
    MotorRead = MSG_MOTOR_READ,
    AccRead = MSG_ACC_READ,
    IrLeft = MSG_IR_LEFT,
    IrFront = MSG_IR_FRONT,
    IrRight = MSG_IR_RIGHT,
}

impl TryFrom<u8> for MessageType {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        let kind = match tag {
            MSG_NAV_TIMER => Self::NavTimer,
            MSG_UPDATE_SPEED => Self::UpdateSpeed,
            MSG_SIM_TIMER => Self::SimTimer,
            MSG_DISTANCE => Self::Distance,
            MSG_FRONT_VALUE => Self::FrontValue,
            MSG_MAP_STRAIGHT => Self::MapStraight,
            MSG_MAP_TURN_LEFT => Self::MapTurnLeft,
            MSG_MAP_TURN_RIGHT => Self::MapTurnRight,
            MSG_MAP_HALT => Self::MapHalt,
            MSG_PRINT_MAP => Self::PrintMap,
            MSG_UPDATE_RUN_MAP => Self::UpdateRunMap,
            MSG_FINISH_LINE => Self::FinishLine,
            MSG_RUN_START => Self::RunStart,
            MSG_RUN_STOP => Self::RunStop,
            MSG_MOTOR_SEND => Self::MotorSend,
            MSG_MOTOR_READ => Self::MotorRead,
            MSG_ACC_READ => Self::AccRead,
            MSG_IR_LEFT => Self::IrLeft,
            MSG_IR_FRONT => Self::IrFront,
            MSG_IR_RIGHT => Self::IrRight,
            other => return Err(Error::UnknownMessageType(other)),
        };
        Ok(kind)
    }
}

/// Fixed-size message exchanged between loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorFrame {
    pub tag: u8,
    pub sequence: u8,
    pub value1: u8,
    pub value2: u8,
}

impl SensorFrame {
    /// Wire size in bytes
    pub const SIZE: usize = 4;

    pub fn new(kind: MessageType, sequence: u8, value1: u8, value2: u8) -> Self {
        Self {
            tag: kind as u8,
            sequence,
            value1,
            value2,
        }
    }

    /// Frame without payload (timers, run control)
    pub fn signal(kind: MessageType) -> Self {
        Self::new(kind, 0, 0, 0)
    }

    /// Decode the tag against the catalog
    pub fn kind(&self) -> Result<MessageType> {
        MessageType::try_from(self.tag)
    }

    /// 10-bit magnitude carried by a raw IR sample
    pub fn magnitude(&self) -> u16 {
        (u16::from(self.value1 & 0x03) << 8) | u16::from(self.value2)
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        [self.tag, self.sequence, self.value1, self.value2]
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes {
            [tag, sequence, value1, value2] => Ok(Self {
                tag: *tag,
                sequence: *sequence,
                value1: *value1,
                value2: *value2,
            }),
            _ => Err(Error::InvalidPacket(format!(
                "sensor frame must be {} bytes, got {}",
                Self::SIZE,
                bytes.len()
            ))),
        }
    }
}

impl fmt::Display for SensorFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Ok(kind) => write!(
                f,
                "{:?}#{} [{}, {}]",
                kind, self.sequence, self.value1, self.value2
            ),
            Err(_) => write!(
                f,
                "tag {}#{} [{}, {}]",
                self.tag, self.sequence, self.value1, self.value2
            ),
        }
    }
}

/// Side of the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Decoded steering request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steering {
    Straight,
    /// Turn with the given radius toward a side
    Turn(Side, u8),
    /// Rotate in place toward a side
    Spin(Side),
}

/// Radius byte of an actuator command
///
/// | Code | Meaning |
/// |------|---------|
/// | 0 | spin left |
/// | 1-126 | left turn, radius = code |
/// | 127 | straight |
/// | 128 | spin right |
/// | 129-255 | right turn, radius = code - 128 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RadiusCode(pub u8);

impl RadiusCode {
    pub const STRAIGHT: Self = Self(RADIUS_STRAIGHT);
    pub const SPIN_LEFT: Self = Self(RADIUS_SPIN_LEFT);
    pub const SPIN_RIGHT: Self = Self(RADIUS_SPIN_RIGHT);

    /// Encode a turn of `radius` toward `side`
    ///
    /// A radius of 0 encodes a spin.
    pub fn turn(side: Side, radius: u8) -> Self {
        let radius = radius.min(RADIUS_STRAIGHT - 1);
        match side {
            Side::Left => Self(radius),
            Side::Right => Self(RADIUS_RIGHT_OFFSET + radius),
        }
    }

    pub fn spin(side: Side) -> Self {
        Self::turn(side, 0)
    }

    pub fn decode(self) -> Steering {
        match self.0 {
            RADIUS_STRAIGHT => Steering::Straight,
            RADIUS_SPIN_LEFT => Steering::Spin(Side::Left),
            RADIUS_SPIN_RIGHT => Steering::Spin(Side::Right),
            r if r < RADIUS_STRAIGHT => Steering::Turn(Side::Left, r),
            r => Steering::Turn(Side::Right, r - RADIUS_RIGHT_OFFSET),
        }
    }
}

/// Speed and steering command for the drive motors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorCommand {
    pub sequence: u8,
    pub speed: u8,
    pub radius: RadiusCode,
}

impl ActuatorCommand {
    /// Wire size in bytes
    pub const SIZE: usize = 3;

    pub fn new(sequence: u8, speed: u8, radius: RadiusCode) -> Self {
        Self {
            sequence,
            speed,
            radius,
        }
    }

    /// Zero speed, wheels straight
    pub fn stop(sequence: u8) -> Self {
        Self::new(sequence, 0, RadiusCode::STRAIGHT)
    }

    pub fn is_stop(&self) -> bool {
        self.speed == 0
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        [self.sequence, self.speed, self.radius.0]
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes {
            [sequence, speed, radius] => Ok(Self::new(*sequence, *speed, RadiusCode(*radius))),
            _ => Err(Error::InvalidPacket(format!(
                "actuator command must be {} bytes, got {}",
                Self::SIZE,
                bytes.len()
            ))),
        }
    }

    /// Carry the command inside a `MotorSend` frame
    pub fn to_frame(&self) -> SensorFrame {
        SensorFrame::new(
            MessageType::MotorSend,
            self.sequence,
            self.speed,
            self.radius.0,
        )
    }

    pub fn from_frame(frame: &SensorFrame) -> Result<Self> {
        if frame.tag != MSG_MOTOR_SEND {
            return Err(Error::InvalidPacket(format!(
                "expected motor command frame, got {}",
                frame
            )));
        }
        Ok(Self::new(frame.sequence, frame.value1, RadiusCode(frame.value2)))
    }
}

/// Fused left/right distance estimate in centimeters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FusedDistance {
    pub left: u8,
    pub right: u8,
}

impl FusedDistance {
    pub fn to_frame(self, sequence: u8) -> SensorFrame {
        SensorFrame::new(MessageType::Distance, sequence, self.left, self.right)
    }
}

/// Motion recorded for one stretch of the path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathState {
    Straight,
    TurnLeft,
    TurnRight,
    Halt,
}

impl PathState {
    pub fn is_turn(self) -> bool {
        matches!(self, PathState::TurnLeft | PathState::TurnRight)
    }

    /// Transition message announcing entry into this state
    pub fn transition_type(self) -> MessageType {
        match self {
            PathState::Straight => MessageType::MapStraight,
            PathState::TurnLeft => MessageType::MapTurnLeft,
            PathState::TurnRight => MessageType::MapTurnRight,
            PathState::Halt => MessageType::MapHalt,
        }
    }

    pub fn from_transition(kind: MessageType) -> Option<Self> {
        match kind {
            MessageType::MapStraight => Some(PathState::Straight),
            MessageType::MapTurnLeft => Some(PathState::TurnLeft),
            MessageType::MapTurnRight => Some(PathState::TurnRight),
            MessageType::MapHalt => Some(PathState::Halt),
            _ => None,
        }
    }
}

/// One entry of the path log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    pub state: PathState,
    /// Distance units travelled in this state
    pub length: u32,
    pub radius: u8,
}

/// Lap role of the path mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// First lap: transitions are appended to the path log
    #[default]
    Learning,
    /// Later laps: the log is read ahead to time speed changes
    Replay,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_catalog() {
        assert_eq!(MessageType::try_from(55).unwrap(), MessageType::IrLeft);
        assert_eq!(MessageType::try_from(10).unwrap(), MessageType::Distance);
        assert!(matches!(
            MessageType::try_from(200),
            Err(Error::UnknownMessageType(200))
        ));
    }

    #[test]
    fn test_frame_magnitude() {
        let frame = SensorFrame::new(MessageType::IrLeft, 0, 0x02, 0x10);
        assert_eq!(frame.magnitude(), 0x210);

        // Bits above the 10-bit sample are ignored
        let frame = SensorFrame::new(MessageType::IrLeft, 0, 0xFF, 0xFF);
        assert_eq!(frame.magnitude(), 1023);
    }

    #[test]
    fn test_frame_bytes() {
        let frame = SensorFrame::new(MessageType::MotorRead, 7, 1, 2);
        assert_eq!(frame.to_bytes(), [53, 7, 1, 2]);
        assert_eq!(SensorFrame::from_bytes(&[53, 7, 1, 2]).unwrap(), frame);
        assert!(SensorFrame::from_bytes(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_radius_code_decode() {
        assert_eq!(RadiusCode(127).decode(), Steering::Straight);
        assert_eq!(RadiusCode(0).decode(), Steering::Spin(Side::Left));
        assert_eq!(RadiusCode(128).decode(), Steering::Spin(Side::Right));
        assert_eq!(RadiusCode(5).decode(), Steering::Turn(Side::Left, 5));
        assert_eq!(RadiusCode(133).decode(), Steering::Turn(Side::Right, 5));
        assert_eq!(RadiusCode(255).decode(), Steering::Turn(Side::Right, 127));
    }

    #[test]
    fn test_radius_code_encode() {
        assert_eq!(RadiusCode::turn(Side::Left, 5), RadiusCode(5));
        assert_eq!(RadiusCode::turn(Side::Right, 5), RadiusCode(133));
        assert_eq!(RadiusCode::spin(Side::Right), RadiusCode::SPIN_RIGHT);
        // Left radius can never collide with the straight code
        assert_eq!(RadiusCode::turn(Side::Left, 200), RadiusCode(126));
    }

    #[test]
    fn test_actuator_command_frame() {
        let cmd = ActuatorCommand::new(3, 20, RadiusCode(133));
        let frame = cmd.to_frame();
        assert_eq!(frame.tag, MSG_MOTOR_SEND);
        assert_eq!(ActuatorCommand::from_frame(&frame).unwrap(), cmd);
        assert_eq!(cmd.to_bytes(), [3, 20, 133]);

        let not_motor = SensorFrame::signal(MessageType::NavTimer);
        assert!(ActuatorCommand::from_frame(&not_motor).is_err());
    }

    #[test]
    fn test_stop_command() {
        let cmd = ActuatorCommand::stop(9);
        assert!(cmd.is_stop());
        assert_eq!(cmd.radius, RadiusCode::STRAIGHT);
    }

    #[test]
    fn test_path_state_transitions() {
        for state in [
            PathState::Straight,
            PathState::TurnLeft,
            PathState::TurnRight,
            PathState::Halt,
        ] {
            assert_eq!(
                PathState::from_transition(state.transition_type()),
                Some(state)
            );
        }
        assert_eq!(PathState::from_transition(MessageType::PrintMap), None);
        assert!(PathState::TurnLeft.is_turn());
        assert!(!PathState::Halt.is_turn());
    }
}
