mod controller;
mod schedule;
mod service;

pub use controller::{CountdownController, CountdownState};
pub use schedule::{CountdownSchedule, ScheduleSignal, DEFAULT_TICK_INTERVAL_MS};
pub use service::{CountdownHandle, CountdownService, CountdownView, Intent};
