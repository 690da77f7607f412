//! # Jetime Core Library
//!
//! This library provides the core logic for the Jetime countdown timer: the
//! user dials in hours, minutes and seconds, starts the countdown and watches
//! it tick down to zero. Rendering is left to a front-end (the `jetime-cli`
//! binary in this workspace) that only reads published values and forwards
//! three intents: start, stop and adjust a field.
//!
//! ## Architecture
//!
//! - **Time**: Immutable hours/minutes/seconds value with millisecond
//!   conversion and a non-carrying dial adjustment policy
//! - **Countdown Controller**: A wall-clock-based state machine that requires
//!   the caller to invoke `tick()` at the deadlines it reports
//! - **Countdown Service**: A tokio task that owns the controller and
//!   serializes intents and timer wake-ups
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Time`]: Duration value published after every change
//! - [`CountdownController`]: Core countdown state machine
//! - [`CountdownService`]: Async driver exposing watch/broadcast channels
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod storage;
pub mod time;
pub mod timer;

pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use storage::Config;
pub use time::{Field, FieldDelta, Time};
pub use timer::{
    CountdownController, CountdownHandle, CountdownService, CountdownState, CountdownView, Intent,
};
