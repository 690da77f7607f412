use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::{Field, Time};
use crate::timer::CountdownState;

/// Every change the countdown controller makes is published as an Event.
/// The presentation layer renders from them; the latest one always carries
/// the authoritative remaining time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A countdown run began. `time_left` re-affirms the dialled value.
    CountdownStarted {
        run_id: u64,
        total_ms: u64,
        time_left: Time,
        at: DateTime<Utc>,
    },
    /// Display refresh, roughly once per second while running.
    CountdownTick {
        run_id: u64,
        remaining_ms: u64,
        time_left: Time,
        at: DateTime<Utc>,
    },
    /// The run's total duration elapsed; the controller is idle again.
    CountdownFinished {
        run_id: u64,
        at: DateTime<Utc>,
    },
    /// The user stopped the countdown.
    CountdownStopped {
        run_id: u64,
        at: DateTime<Utc>,
    },
    /// A dial field was changed.
    TimeAdjusted {
        field: Field,
        delta: i64,
        time_left: Time,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: CountdownState,
        run_id: u64,
        time_left: Time,
        remaining_ms: u64,
        total_ms: u64,
        sweep_angle: f32,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The time value published by this event.
    ///
    /// Finish and stop always publish zero.
    pub fn time_left(&self) -> Time {
        match self {
            Event::CountdownStarted { time_left, .. }
            | Event::CountdownTick { time_left, .. }
            | Event::TimeAdjusted { time_left, .. }
            | Event::StateSnapshot { time_left, .. } => *time_left,
            Event::CountdownFinished { .. } | Event::CountdownStopped { .. } => Time::default(),
        }
    }

    /// Run the event belongs to, if it is tied to one.
    pub fn run_id(&self) -> Option<u64> {
        match self {
            Event::CountdownStarted { run_id, .. }
            | Event::CountdownTick { run_id, .. }
            | Event::CountdownFinished { run_id, .. }
            | Event::CountdownStopped { run_id, .. }
            | Event::StateSnapshot { run_id, .. } => Some(*run_id),
            Event::TimeAdjusted { .. } => None,
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::CountdownStarted { at, .. }
            | Event::CountdownTick { at, .. }
            | Event::CountdownFinished { at, .. }
            | Event::CountdownStopped { at, .. }
            | Event::TimeAdjusted { at, .. }
            | Event::StateSnapshot { at, .. } => *at,
        }
    }

    /// True for events after which no further ticks of the run will follow.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::CountdownFinished { .. } | Event::CountdownStopped { .. }
        )
    }
}
