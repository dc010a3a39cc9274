//! Bounded path log
//!
//! Segments are addressed by their global append index. Under
//! [`LogOverflow::EvictOldest`] the oldest segments disappear but the
//! remaining ones keep their indices, so a replay cursor stays aligned.

use crate::core::types::PathSegment;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Behavior when appending to a full log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOverflow {
    /// Keep the first `capacity` segments, count the rest as dropped
    #[default]
    Saturate,
    /// Discard the oldest segment
    EvictOldest,
    /// Fail with `Error::PathLogFull`
    Halt,
}

/// What happened to an appended segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Append {
    Stored,
    Dropped,
    /// Stored after evicting the oldest segment
    Evicted,
}

#[derive(Debug, Clone)]
pub struct PathLog {
    segments: VecDeque<PathSegment>,
    capacity: usize,
    overflow: LogOverflow,
    /// Global index of `segments[0]`
    offset: usize,
    dropped: usize,
}

impl PathLog {
    pub fn new(capacity: usize, overflow: LogOverflow) -> Self {
        Self {
            segments: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            overflow,
            offset: 0,
            dropped: 0,
        }
    }

    pub fn append(&mut self, segment: PathSegment) -> Result<Append> {
        if self.segments.len() < self.capacity {
            self.segments.push_back(segment);
            return Ok(Append::Stored);
        }

        match self.overflow {
            LogOverflow::Saturate => {
                self.dropped += 1;
                log::warn!(
                    "Path log full ({} segments), dropping {:?}",
                    self.capacity,
                    segment
                );
                Ok(Append::Dropped)
            }
            LogOverflow::EvictOldest => {
                self.segments.pop_front();
                self.offset += 1;
                self.segments.push_back(segment);
                Ok(Append::Evicted)
            }
            LogOverflow::Halt => Err(Error::PathLogFull {
                capacity: self.capacity,
            }),
        }
    }

    /// Segment at global index `index`
    pub fn get(&self, index: usize) -> Option<&PathSegment> {
        index
            .checked_sub(self.offset)
            .and_then(|local| self.segments.get(local))
    }

    /// Segments currently held, oldest first
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    pub fn to_vec(&self) -> Vec<PathSegment> {
        self.segments.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Segments rejected under `Saturate`
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Global index of the oldest held segment
    pub fn first_index(&self) -> usize {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PathState;

    fn segment(length: u32) -> PathSegment {
        PathSegment {
            state: PathState::Straight,
            length,
            radius: 127,
        }
    }

    fn fill(log: &mut PathLog, count: u32) {
        for i in 0..count {
            log.append(segment(i)).unwrap();
        }
    }

    #[test]
    fn test_saturate_keeps_prefix() {
        let mut log = PathLog::new(20, LogOverflow::Saturate);
        fill(&mut log, 20);
        assert_eq!(log.append(segment(99)).unwrap(), Append::Dropped);
        assert_eq!(log.len(), 20);
        assert_eq!(log.dropped(), 1);
        assert_eq!(log.get(19).unwrap().length, 19);
        assert!(log.get(20).is_none());
    }

    #[test]
    fn test_evict_oldest_preserves_indices() {
        let mut log = PathLog::new(3, LogOverflow::EvictOldest);
        fill(&mut log, 5);
        assert_eq!(log.len(), 3);
        assert_eq!(log.first_index(), 2);
        assert!(log.get(1).is_none());
        assert_eq!(log.get(2).unwrap().length, 2);
        assert_eq!(log.get(4).unwrap().length, 4);
    }

    #[test]
    fn test_halt_policy_errors() {
        let mut log = PathLog::new(2, LogOverflow::Halt);
        fill(&mut log, 2);
        assert!(matches!(
            log.append(segment(2)),
            Err(Error::PathLogFull { capacity: 2 })
        ));
        assert_eq!(log.len(), 2);
    }
}
