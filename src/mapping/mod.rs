//! Path mapper
//!
//! Records the course on the learning lap and uses the recording to change
//! speed ahead of turns on the replay lap.
//!
//! # Learning
//!
//! Every path transition closes the segment being driven and appends it to
//! the [`PathLog`] as `{state, length, radius}`. Length is measured from the
//! wheel encoders: the mean of both wheels on a straight, the inside wheel
//! on a turn. The mapper starts in `Halt`, so the first record of a lap is a
//! zero-length halt and `log[cursor]` is always the segment being driven.
//!
//! A transition only closes the segment once the new state has lasted
//! `min_segment_samples` encoder samples. Until then it is a candidate: a
//! newer transition replaces it and the distance it covered stays with the
//! current segment. A confirmed candidate keeps the distance covered since
//! it was announced. Transitions into or out of `Halt` close at once.
//!
//! # Replay
//!
//! ```text
//!   log[cursor]          log[cursor + 1]
//!   Straight 30  ──────► TurnLeft r5
//!        travelled 25 ──► remaining 5 <= margin ──► UpdateSpeed(sharp)
//! ```
//!
//! Exactly one turn advice is sent per transition. Entering a long straight
//! sends the straight speed.

pub mod path_log;

pub use path_log::{Append, LogOverflow, PathLog};

use crate::config::MappingConfig;
use crate::constants::RADIUS_UNSET;
use crate::core::display::DisplaySink;
use crate::core::types::{MessageType, PathSegment, PathState, RunMode, SensorFrame};
use crate::error::{Error, Result};

const COMPONENT: &str = "mapping";

/// Why a speed change was advised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceKind {
    /// Slow down for the upcoming turn
    TurnAhead,
    /// Speed up on a long straight
    Straightaway,
}

/// Speed change for the navigation controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedAdvice {
    pub speed: u8,
    pub kind: AdviceKind,
}

impl SpeedAdvice {
    pub fn to_frame(self, sequence: u8) -> SensorFrame {
        SensorFrame::new(MessageType::UpdateSpeed, sequence, 0, self.speed)
    }
}

/// Distance covered in `state` given both wheel distances
pub fn segment_distance(state: PathState, left: u32, right: u32) -> u32 {
    match state {
        PathState::Straight => (left + right) / 2,
        PathState::TurnLeft => left,
        PathState::TurnRight => right,
        PathState::Halt => 0,
    }
}

/// Transition waiting for confirmation
#[derive(Debug, Clone, Copy)]
struct Candidate {
    state: PathState,
    radius: u8,
    left: u32,
    right: u32,
    samples: u32,
}

/// Learning/replay path state machine
pub struct PathMapper {
    config: MappingConfig,
    mode: RunMode,
    state: PathState,
    radius: u8,
    left: u32,
    right: u32,
    candidate: Option<Candidate>,
    log: PathLog,
    cursor: usize,
    /// Turn advice not yet sent for the current segment
    advice_pending: bool,
    speed: u8,
    /// Estimated time per lap
    lap_times: Vec<u64>,
    out_seq: u8,
    display: Box<dyn DisplaySink>,
}

impl PathMapper {
    pub fn new(config: &MappingConfig, display: Box<dyn DisplaySink>) -> Self {
        Self {
            mode: RunMode::Learning,
            state: PathState::Halt,
            radius: RADIUS_UNSET,
            left: 0,
            right: 0,
            candidate: None,
            log: PathLog::new(config.capacity, config.overflow),
            cursor: 0,
            advice_pending: true,
            speed: config.cruise_speed.max(1),
            lap_times: vec![0],
            out_seq: 0,
            display,
            config: config.clone(),
        }
    }

    /// Handle one event from the mapping mailbox
    ///
    /// # Returns
    /// Speed advice for the navigation controller, if any
    pub fn handle(&mut self, frame: SensorFrame) -> Result<Option<SpeedAdvice>> {
        let kind = frame.kind().map_err(|_| Error::UnexpectedMessage {
            component: COMPONENT,
            tag: frame.tag,
        })?;

        if let Some(state) = PathState::from_transition(kind) {
            return self.announce(state, frame.value2);
        }

        match kind {
            MessageType::MotorRead => self.on_encoder(frame.value1, frame.value2),
            MessageType::UpdateRunMap => {
                self.switch_to_replay();
                Ok(None)
            }
            MessageType::PrintMap => {
                self.print_map();
                Ok(None)
            }
            _ => Err(Error::UnexpectedMessage {
                component: COMPONENT,
                tag: frame.tag,
            }),
        }
    }

    fn on_encoder(&mut self, left: u8, right: u8) -> Result<Option<SpeedAdvice>> {
        if let Some(time) = self.lap_times.last_mut() {
            *time += u64::from(right) * 100 / u64::from(self.speed);
        }

        if let Some(candidate) = self.candidate.as_mut() {
            candidate.left += u32::from(left);
            candidate.right += u32::from(right);
            candidate.samples += 1;
            if candidate.samples < self.config.min_segment_samples {
                return Ok(None);
            }
            let confirmed = *candidate;
            self.candidate = None;
            let advice = self.transition(confirmed.state, confirmed.radius)?;
            self.left = confirmed.left;
            self.right = confirmed.right;
            return Ok(advice);
        }

        self.left += u32::from(left);
        self.right += u32::from(right);
        if self.mode != RunMode::Replay || self.state == PathState::Halt {
            return Ok(None);
        }
        Ok(self.turn_ahead())
    }

    /// Take a transition from navigation, closing the segment now or once
    /// the new state has held
    fn announce(&mut self, state: PathState, radius: u8) -> Result<Option<SpeedAdvice>> {
        if let Some(dropped) = self.candidate.take() {
            log::debug!(
                "{:?} lasted {} sample(s), staying {:?}",
                dropped.state,
                dropped.samples,
                self.state
            );
            self.left += dropped.left;
            self.right += dropped.right;
        }

        if self.config.min_segment_samples == 0
            || state == PathState::Halt
            || self.state == PathState::Halt
        {
            return self.transition(state, radius);
        }
        if state == self.state && radius == self.radius {
            return Ok(None);
        }
        self.candidate = Some(Candidate {
            state,
            radius,
            left: 0,
            right: 0,
            samples: 0,
        });
        Ok(None)
    }

    fn turn_ahead(&mut self) -> Option<SpeedAdvice> {
        if !self.advice_pending {
            return None;
        }
        let next = *self.log.get(self.cursor + 1)?;
        if !next.state.is_turn() {
            return None;
        }
        let current = self.log.get(self.cursor)?;

        // Wheel average whatever the current state
        let travelled = (self.left + self.right) / 2;
        let remaining = i64::from(current.length) - i64::from(travelled);
        if remaining > i64::from(self.config.turn_margin) {
            return None;
        }

        self.advice_pending = false;
        let speed = if next.radius > self.config.min_wide_radius {
            self.config.wide_turn_speed
        } else {
            self.config.sharp_turn_speed
        };
        log::info!(
            "{:?} r{} in {} units, advising speed {}",
            next.state,
            next.radius,
            remaining,
            speed
        );
        Some(self.advise(speed, AdviceKind::TurnAhead))
    }

    fn transition(&mut self, state: PathState, radius: u8) -> Result<Option<SpeedAdvice>> {
        self.advice_pending = true;

        if self.mode == RunMode::Learning {
            let segment = PathSegment {
                state: self.state,
                length: segment_distance(self.state, self.left, self.right),
                radius: self.radius,
            };
            log::debug!("Recorded {:?}", segment);
            self.log.append(segment)?;
        }

        log::debug!("Path {:?} -> {:?} (radius {})", self.state, state, radius);
        self.state = state;
        self.radius = radius;
        self.left = 0;
        self.right = 0;
        self.cursor += 1;

        match (state, self.mode) {
            (PathState::Halt, RunMode::Learning) => {
                self.log.append(PathSegment {
                    state: PathState::Halt,
                    length: 0,
                    radius,
                })?;
                Ok(None)
            }
            (PathState::Straight, RunMode::Replay) if self.config.straight_boost => {
                let long_straight = self
                    .log
                    .get(self.cursor)
                    .is_some_and(|segment| segment.length > self.config.min_straight);
                if long_straight {
                    let speed = self.config.straight_speed;
                    Ok(Some(self.advise(speed, AdviceKind::Straightaway)))
                } else {
                    Ok(None)
                }
            }
            _ => Ok(None),
        }
    }

    fn advise(&mut self, speed: u8, kind: AdviceKind) -> SpeedAdvice {
        self.speed = speed.max(1);
        SpeedAdvice { speed, kind }
    }

    /// Switch to replay and rewind the cursor
    pub fn switch_to_replay(&mut self) {
        if self.mode == RunMode::Replay {
            log::warn!("Already replaying, rewinding cursor only");
        } else {
            log::info!("Switching to replay ({} segments)", self.log.len());
        }
        self.mode = RunMode::Replay;
        self.cursor = 0;
        self.candidate = None;
        self.left = 0;
        self.right = 0;
        self.advice_pending = true;
        self.speed = self.config.cruise_speed.max(1);
        self.lap_times.push(0);
    }

    fn print_map(&mut self) {
        self.display.clear();
        let mut row = 0u8;
        for (index, segment) in self.log.segments().enumerate() {
            self.display.print_line(
                &format!(
                    "{}:{:?} {} {}",
                    self.log.first_index() + index,
                    segment.state,
                    segment.length,
                    segment.radius
                ),
                row,
            );
            row = row.saturating_add(1);
        }
        let times = self
            .lap_times
            .iter()
            .enumerate()
            .map(|(lap, time)| format!("T{}:{}", lap + 1, time))
            .collect::<Vec<_>>()
            .join(" ");
        self.display.print_line(&times, row);
        log::info!(
            "Path log: {} segments ({} dropped), lap times {}",
            self.log.len(),
            self.log.dropped(),
            times
        );
    }

    /// Next sequence number for advice frames
    pub fn next_seq(&mut self) -> u8 {
        let seq = self.out_seq;
        self.out_seq = self.out_seq.wrapping_add(1);
        seq
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn state(&self) -> PathState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn log(&self) -> &PathLog {
        &self.log
    }

    pub fn lap_times(&self) -> &[u64] {
        &self.lap_times
    }
}
