//! Repeating tick plus one-shot finish, cancelable as a unit.
//!
//! A schedule knows nothing about clocks. The owner feeds it timestamps on a
//! monotonic millisecond timeline and asks when it next needs to be woken.
//! Cancelling a schedule is simply dropping it.

/// Default tick period.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// What a schedule has to report at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleSignal {
    /// A tick boundary passed. `millis_until_finished` is measured from the
    /// nominal boundary, not from the actual wake-up time.
    Tick { millis_until_finished: u64 },
    /// The total duration elapsed. Reported once.
    Finish,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownSchedule {
    origin_ms: u64,
    total_ms: u64,
    interval_ms: u64,
    /// Number of tick boundaries already reported.
    ticks_reported: u64,
    finished: bool,
}

impl CountdownSchedule {
    /// A zero interval is bumped to 1ms.
    pub fn new(origin_ms: u64, total_ms: u64, interval_ms: u64) -> Self {
        Self {
            origin_ms,
            total_ms,
            interval_ms: interval_ms.max(1),
            ticks_reported: 0,
            finished: false,
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn finish_at_ms(&self) -> u64 {
        self.origin_ms.saturating_add(self.total_ms)
    }

    /// Timestamp of the next boundary worth waking up for.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        if self.finished {
            return None;
        }
        let next_tick = self
            .ticks_reported
            .saturating_add(1)
            .saturating_mul(self.interval_ms);
        if next_tick < self.total_ms {
            Some(self.origin_ms.saturating_add(next_tick))
        } else {
            Some(self.finish_at_ms())
        }
    }

    /// Report what is due at `now_ms`.
    ///
    /// Several tick boundaries passed since the last poll collapse into one
    /// tick for the latest boundary. Finish wins over any pending tick.
    pub fn poll(&mut self, now_ms: u64) -> Option<ScheduleSignal> {
        if self.finished {
            return None;
        }
        let elapsed = now_ms.saturating_sub(self.origin_ms);
        if elapsed >= self.total_ms {
            self.finished = true;
            return Some(ScheduleSignal::Finish);
        }
        let due = elapsed / self.interval_ms;
        if due <= self.ticks_reported {
            return None;
        }
        self.ticks_reported = due;
        Some(ScheduleSignal::Tick {
            millis_until_finished: self.total_ms - due * self.interval_ms,
        })
    }
}
