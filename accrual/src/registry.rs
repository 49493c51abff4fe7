//! Global rate registry.
//!
//! Holds the single global rate new depositors are offered. The rate may only
//! ever go down: every accepted update is strictly below the current value.
//! Accepted changes are kept as an append-only list of segments so indexers
//! and snapshots can reconstruct when each rate was in force.

use crate::error::AccrualError;
use drip_types::{Rate, Timestamp};
use serde::{Deserialize, Serialize};

/// A period during which one global rate was in force.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSegment {
    /// The scaled per-second rate during this segment.
    pub rate: Rate,
    /// When this rate became effective.
    pub start: Timestamp,
    /// When this rate was superseded (None if still active).
    pub end: Option<Timestamp>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RateRegistry {
    segments: Vec<RateSegment>,
}

impl RateRegistry {
    pub fn new(initial_rate: Rate, genesis: Timestamp) -> Self {
        Self {
            segments: vec![RateSegment {
                rate: initial_rate,
                start: genesis,
                end: None,
            }],
        }
    }

    /// The rate currently in force.
    pub fn current_rate(&self) -> Rate {
        self.segments.last().map(|s| s.rate).unwrap_or(Rate::ZERO)
    }

    /// Every accepted rate, oldest first.
    pub fn segments(&self) -> &[RateSegment] {
        &self.segments
    }

    /// Replace the global rate with a strictly smaller one.
    ///
    /// Returns the previous rate. On rejection nothing changes.
    pub fn set_global_rate(&mut self, new_rate: Rate, at: Timestamp) -> Result<Rate, AccrualError> {
        let current = self.current_rate();
        if new_rate >= current {
            return Err(AccrualError::RateIncreaseRejected {
                current,
                attempted: new_rate,
            });
        }
        if let Some(last) = self.segments.last_mut() {
            if at < last.start {
                return Err(AccrualError::InvariantViolation(format!(
                    "rate change at {} precedes current segment start {}",
                    at, last.start
                )));
            }
            last.end = Some(at);
        }
        self.segments.push(RateSegment {
            rate: new_rate,
            start: at,
            end: None,
        });
        Ok(current)
    }
}

impl Default for RateRegistry {
    fn default() -> Self {
        Self::new(Rate::ZERO, Timestamp::EPOCH)
    }
}
