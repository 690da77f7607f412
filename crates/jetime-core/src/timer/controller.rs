//! Countdown controller.
//!
//! The controller is a state machine over a monotonic millisecond timeline.
//! It does not use internal threads: whoever owns it feeds it the current
//! time through [`CountdownController::start`] and
//! [`CountdownController::tick`], and should wake up at
//! [`CountdownController::next_deadline_ms`]. See
//! [`CountdownService`](super::CountdownService) for a tokio driver.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --tick--> Running
//! Running --finish | stop--> Idle
//! Running --start--> Running   (previous run is cancelled)
//! ```
//!
//! ## Usage
//!
//! ```
//! use jetime_core::timer::CountdownController;
//! use jetime_core::Time;
//!
//! let mut countdown = CountdownController::with_time(Time::new(0, 0, 2));
//! countdown.start(0);
//! let tick = countdown.tick(1000).unwrap();
//! assert_eq!(tick.time_left(), Time::new(0, 0, 1));
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::schedule::{CountdownSchedule, ScheduleSignal, DEFAULT_TICK_INTERVAL_MS};
use crate::events::Event;
use crate::time::{Field, Time};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Idle,
    Running,
}

/// Owns the remaining time and the running flag.
///
/// `total_ms` is nonzero exactly while a schedule is active. It is both the
/// running flag and the denominator for the progress ring.
#[derive(Debug, Clone)]
pub struct CountdownController {
    time_left: Time,
    total_ms: u64,
    schedule: Option<CountdownSchedule>,
    run_id: u64,
    tick_interval_ms: u64,
}

impl Default for CountdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownController {
    /// Idle controller showing `00:00:00`.
    pub fn new() -> Self {
        Self::with_time(Time::default())
    }

    /// Idle controller with a pre-dialled time, wrapped into a single day.
    pub fn with_time(time: Time) -> Self {
        Self {
            time_left: Time::from_millis(time.to_millis()),
            total_ms: 0,
            schedule: None,
            run_id: 0,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }

    /// Override the tick period used by subsequent runs.
    pub fn with_tick_interval(mut self, interval_ms: u64) -> Self {
        self.tick_interval_ms = interval_ms.max(1);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Latest published time value.
    pub fn time_left(&self) -> Time {
        self.time_left
    }

    /// Duration of the active run in milliseconds, 0 when idle.
    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    pub fn state(&self) -> CountdownState {
        if self.total_ms > 0 {
            CountdownState::Running
        } else {
            CountdownState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == CountdownState::Running
    }

    /// Identifier of the most recent run. Incremented by every `start`.
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    /// Remaining milliseconds as shown, 0 when idle.
    pub fn remaining_ms(&self) -> u64 {
        if self.is_running() {
            self.time_left.to_millis()
        } else {
            0
        }
    }

    /// When the owner should call [`tick`](Self::tick) next.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.schedule.as_ref().and_then(|s| s.next_deadline_ms())
    }

    /// Fraction of the run still remaining, 0.0 when idle.
    ///
    /// Not clamped: adjusting the dial upwards mid-run pushes it past 1.0.
    pub fn remaining_fraction(&self) -> f64 {
        if self.total_ms == 0 {
            return 0.0;
        }
        self.time_left.to_millis() as f64 / self.total_ms as f64
    }

    /// Progress ring sweep in degrees.
    pub fn sweep_angle(&self) -> f32 {
        (360.0 * self.remaining_fraction()) as f32
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state(),
            run_id: self.run_id,
            time_left: self.time_left,
            remaining_ms: self.remaining_ms(),
            total_ms: self.total_ms,
            sweep_angle: self.sweep_angle(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a run from the current time value.
    ///
    /// Any active run is cancelled first, so its pending ticks are never
    /// observed. Starting from zero finishes on the spot.
    pub fn start(&mut self, now_ms: u64) -> Vec<Event> {
        if self.schedule.take().is_some() {
            debug!(run_id = self.run_id, "replacing active countdown");
        }

        // Published time and total must describe the same duration.
        self.time_left = Time::from_millis(self.time_left.to_millis());
        self.total_ms = self.time_left.to_millis();
        self.run_id += 1;
        debug!(run_id = self.run_id, total_ms = self.total_ms, "countdown started");

        let mut events = vec![Event::CountdownStarted {
            run_id: self.run_id,
            total_ms: self.total_ms,
            time_left: self.time_left,
            at: Utc::now(),
        }];

        if self.total_ms == 0 {
            events.push(self.finish());
        } else {
            self.schedule = Some(CountdownSchedule::new(
                now_ms,
                self.total_ms,
                self.tick_interval_ms,
            ));
        }
        events
    }

    /// Cancel the active run and reset the display to zero.
    pub fn stop(&mut self) -> Event {
        if self.schedule.take().is_some() {
            debug!(run_id = self.run_id, "countdown stopped");
        }
        self.time_left = Time::default();
        self.total_ms = 0;
        Event::CountdownStopped {
            run_id: self.run_id,
            at: Utc::now(),
        }
    }

    /// Change one dial field.
    ///
    /// Callers are expected to do this only while idle. The controller does
    /// not check: mid-run the displayed value changes and the run continues.
    pub fn adjust(&mut self, field: Field, delta: i64) -> Event {
        let adjusted = self.time_left.with_delta(field, delta);
        self.time_left = Time::from_millis(adjusted.to_millis());
        debug!(%field, delta, time_left = %self.time_left, "time adjusted");
        Event::TimeAdjusted {
            field,
            delta,
            time_left: self.time_left,
            at: Utc::now(),
        }
    }

    pub fn adjust_hours(&mut self, delta: i64) -> Event {
        self.adjust(Field::Hours, delta)
    }

    pub fn adjust_minutes(&mut self, delta: i64) -> Event {
        self.adjust(Field::Minutes, delta)
    }

    pub fn adjust_seconds(&mut self, delta: i64) -> Event {
        self.adjust(Field::Seconds, delta)
    }

    /// Call at or after [`next_deadline_ms`](Self::next_deadline_ms).
    /// Returns the tick or finish event that became due, if any.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        let signal = self.schedule.as_mut()?.poll(now_ms)?;
        match signal {
            ScheduleSignal::Tick {
                millis_until_finished,
            } => {
                self.time_left = Time::from_millis(millis_until_finished);
                Some(Event::CountdownTick {
                    run_id: self.run_id,
                    remaining_ms: millis_until_finished,
                    time_left: self.time_left,
                    at: Utc::now(),
                })
            }
            ScheduleSignal::Finish => Some(self.finish()),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish(&mut self) -> Event {
        self.schedule = None;
        self.time_left = Time::default();
        self.total_ms = 0;
        debug!(run_id = self.run_id, "countdown finished");
        Event::CountdownFinished {
            run_id: self.run_id,
            at: Utc::now(),
        }
    }
}
