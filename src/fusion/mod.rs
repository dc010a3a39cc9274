//! Distance fusion for the IR rangers
//!
//! Raw samples from the three rangers arrive as `IrLeft`, `IrFront` and
//! `IrRight` frames. Each channel is sequence-checked on its own. Side
//! samples are averaged until both sides have contributed, then a single
//! `Distance` frame goes to navigation. Front samples pass through one at a
//! time as `FrontValue` frames.
//!
//! ```text
//! IrLeft  ──┐ sum/count ──┐
//!           │             ├─► Distance {left avg, right avg}
//! IrRight ──┘ sum/count ──┘
//! IrFront ──────────────────► FrontValue {0, distance}
//! ```
//!
//! A sample whose magnitude is zero means "no reading" and is dropped
//! before any counter moves.

pub mod calibration;

pub use calibration::{distance_for_magnitude, magnitude_for_distance};

use crate::config::FusionConfig;
use crate::constants::{DISPLAY_ROW_IR_FRONT, DISPLAY_ROW_IR_LEFT, DISPLAY_ROW_IR_RIGHT};
use crate::core::display::DisplaySink;
use crate::core::sequence::SequenceTracker;
use crate::core::types::{FusedDistance, MessageType, SensorFrame};
use crate::error::{Error, Result};

const COMPONENT: &str = "fusion";

/// Running sum of one side channel
#[derive(Debug, Default, Clone, Copy)]
struct SideAccumulator {
    sum: u32,
    count: u32,
}

impl SideAccumulator {
    fn add(&mut self, distance: u16) {
        self.sum += u32::from(distance);
        self.count += 1;
    }

    fn average(&self) -> u8 {
        (self.sum / self.count.max(1)).min(u32::from(u8::MAX)) as u8
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Fusion counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FusionStats {
    pub samples: u64,
    /// Zero-magnitude samples dropped
    pub no_reading: u64,
    pub fused: u64,
    pub front: u64,
}

/// Converts raw IR samples into fused distance frames
pub struct DistanceFusion {
    left_seq: SequenceTracker,
    front_seq: SequenceTracker,
    right_seq: SequenceTracker,
    left: SideAccumulator,
    right: SideAccumulator,
    /// Outbound counters, one per stream navigation checks
    distance_out: u8,
    front_out: u8,
    stats: FusionStats,
    display: Box<dyn DisplaySink>,
}

impl DistanceFusion {
    pub fn new(config: &FusionConfig, display: Box<dyn DisplaySink>) -> Self {
        Self {
            left_seq: SequenceTracker::new("ir-left", config.gap_policy),
            front_seq: SequenceTracker::new("ir-front", config.gap_policy),
            right_seq: SequenceTracker::new("ir-right", config.gap_policy),
            left: SideAccumulator::default(),
            right: SideAccumulator::default(),
            distance_out: 0,
            front_out: 0,
            stats: FusionStats::default(),
            display,
        }
    }

    /// Process one raw sample
    ///
    /// # Returns
    /// The frame to forward to navigation, if this sample completed one
    pub fn process(&mut self, frame: SensorFrame) -> Result<Option<SensorFrame>> {
        let kind = frame.kind()?;
        let (row, label) = match kind {
            MessageType::IrLeft => (DISPLAY_ROW_IR_LEFT, "IR1"),
            MessageType::IrFront => (DISPLAY_ROW_IR_FRONT, "IR2"),
            MessageType::IrRight => (DISPLAY_ROW_IR_RIGHT, "IR3"),
            _ => {
                return Err(Error::UnexpectedMessage {
                    component: COMPONENT,
                    tag: frame.tag,
                });
            }
        };

        let magnitude = frame.magnitude();
        if magnitude == 0 {
            self.stats.no_reading += 1;
            log::trace!("{}: no reading", label);
            return Ok(None);
        }
        self.stats.samples += 1;

        match kind {
            MessageType::IrLeft => self.left_seq.observe(frame.sequence)?,
            MessageType::IrFront => self.front_seq.observe(frame.sequence)?,
            _ => self.right_seq.observe(frame.sequence)?,
        };

        let distance = distance_for_magnitude(magnitude);
        self.display.print_line(
            &format!("{}:{},{},{}", label, frame.value1, frame.value2, distance),
            row,
        );

        let output = match kind {
            MessageType::IrLeft => {
                self.left.add(distance);
                self.try_fuse()
            }
            MessageType::IrRight => {
                self.right.add(distance);
                self.try_fuse()
            }
            _ => {
                self.stats.front += 1;
                let value = distance.min(u16::from(u8::MAX)) as u8;
                let seq = next(&mut self.front_out);
                Some(SensorFrame::new(MessageType::FrontValue, seq, 0, value))
            }
        };

        if let Some(out) = &output {
            log::debug!("fusion -> {}", out);
        }
        Ok(output)
    }

    fn try_fuse(&mut self) -> Option<SensorFrame> {
        if self.left.count == 0 || self.right.count == 0 {
            return None;
        }
        let fused = FusedDistance {
            left: self.left.average(),
            right: self.right.average(),
        };
        self.left.reset();
        self.right.reset();
        self.stats.fused += 1;
        Some(fused.to_frame(next(&mut self.distance_out)))
    }

    pub fn stats(&self) -> FusionStats {
        self.stats
    }

    /// Sequence gaps across all input channels
    pub fn gaps(&self) -> u64 {
        self.left_seq.gaps() + self.front_seq.gaps() + self.right_seq.gaps()
    }

    /// Samples currently held for (left, right)
    pub fn pending(&self) -> (u32, u32) {
        (self.left.count, self.right.count)
    }
}

fn next(counter: &mut u8) -> u8 {
    let seq = *counter;
    *counter = counter.wrapping_add(1);
    seq
}
