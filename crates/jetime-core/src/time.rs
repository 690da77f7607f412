//! Duration value decomposed into hours, minutes and seconds.
//!
//! [`Time`] is the value the countdown publishes after every change. It is
//! never mutated in place by the controller: every tick and every dial
//! adjustment produces a fresh value.
//!
//! ## Field adjustment
//!
//! [`Time::with_field_delta`] does not carry between fields. After adding
//! the deltas, fields are checked in the order hours, minutes, seconds and
//! only the first one found out of range is reset to zero:
//!
//! ```text
//! 00:00:59 + 1s  -> 00:00:00   (seconds reset, minutes untouched)
//! 00:00:00 - 1h  -> 00:00:00   (hours never go negative)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const MS_PER_SECOND: u64 = 1000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// One of the three dial fields of a [`Time`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Hours,
    Minutes,
    Seconds,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Hours => "hours",
            Field::Minutes => "minutes",
            Field::Seconds => "seconds",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "hh" | "hour" | "hours" => Ok(Field::Hours),
            "m" | "mm" | "minute" | "minutes" => Ok(Field::Minutes),
            "s" | "ss" | "second" | "seconds" => Ok(Field::Seconds),
            other => Err(ValidationError::InvalidValue {
                field: "field".into(),
                message: format!("expected hours, minutes or seconds, got '{other}'"),
            }),
        }
    }
}

/// Per-field deltas for [`Time::with_field_delta`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldDelta {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl FieldDelta {
    pub fn hours(delta: i64) -> Self {
        Self {
            hours: delta,
            ..Self::default()
        }
    }

    pub fn minutes(delta: i64) -> Self {
        Self {
            minutes: delta,
            ..Self::default()
        }
    }

    pub fn seconds(delta: i64) -> Self {
        Self {
            seconds: delta,
            ..Self::default()
        }
    }

    pub fn for_field(field: Field, delta: i64) -> Self {
        match field {
            Field::Hours => Self::hours(delta),
            Field::Minutes => Self::minutes(delta),
            Field::Seconds => Self::seconds(delta),
        }
    }
}

/// A duration split into hours, minutes and seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Time {
    hours: u32,
    minutes: u32,
    seconds: u32,
}

impl Time {
    /// Build a value from raw fields. No normalisation is applied.
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Decompose a millisecond count.
    ///
    /// Sub-second remainders are dropped and hours wrap at 24, so the result
    /// always lies within `00:00:00..=23:59:59`.
    pub fn from_millis(ms: u64) -> Self {
        Self {
            hours: ((ms / MS_PER_HOUR) % 24) as u32,
            minutes: ((ms / MS_PER_MINUTE) % 60) as u32,
            seconds: ((ms / MS_PER_SECOND) % 60) as u32,
        }
    }

    pub fn to_millis(&self) -> u64 {
        let minutes = u64::from(self.hours) * 60 + u64::from(self.minutes);
        let seconds = minutes * 60 + u64::from(self.seconds);
        seconds * MS_PER_SECOND
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn is_zero(&self) -> bool {
        self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }

    /// Add per-field deltas and apply the first-offender reset.
    ///
    /// Hours only have a lower bound. Minutes and seconds must stay within
    /// `0..=59`. Only the first out-of-range field (hours, then minutes, then
    /// seconds) is reset to zero; a later offender keeps its computed value
    /// unless an unsigned field cannot hold it, in which case it is zero.
    pub fn with_field_delta(&self, delta: FieldDelta) -> Self {
        let mut hours = i64::from(self.hours).saturating_add(delta.hours);
        let mut minutes = i64::from(self.minutes).saturating_add(delta.minutes);
        let mut seconds = i64::from(self.seconds).saturating_add(delta.seconds);

        if hours < 0 {
            hours = 0;
        } else if !(0..=59).contains(&minutes) {
            minutes = 0;
        } else if !(0..=59).contains(&seconds) {
            seconds = 0;
        }

        Self {
            hours: to_field(hours),
            minutes: to_field(minutes),
            seconds: to_field(seconds),
        }
    }

    /// Single-field shorthand for [`Time::with_field_delta`].
    pub fn with_delta(&self, field: Field, delta: i64) -> Self {
        self.with_field_delta(FieldDelta::for_field(field, delta))
    }
}

fn to_field(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

impl FromStr for Time {
    type Err = ValidationError;

    /// Accepts `HH:MM:SS`, `MM:SS` or a bare second count, up to `23:59:59`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let numbers = parts
            .iter()
            .map(|part| {
                part.trim()
                    .parse::<u32>()
                    .map_err(|_| ValidationError::InvalidValue {
                        field: "time".into(),
                        message: format!("'{part}' is not a whole number in '{s}'"),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (hours, minutes, seconds) = match numbers.as_slice() {
            [secs] => (0, 0, *secs),
            [mins, secs] => (0, *mins, *secs),
            [hrs, mins, secs] => (*hrs, *mins, *secs),
            _ => {
                return Err(ValidationError::InvalidValue {
                    field: "time".into(),
                    message: format!("expected HH:MM:SS, MM:SS or SS, got '{s}'"),
                })
            }
        };

        if numbers.len() >= 2 && seconds > 59 {
            return Err(ValidationError::OutOfRange {
                field: "seconds".into(),
                value: i64::from(seconds),
                min: 0,
                max: 59,
            });
        }
        if numbers.len() == 3 && minutes > 59 {
            return Err(ValidationError::OutOfRange {
                field: "minutes".into(),
                value: i64::from(minutes),
                min: 0,
                max: 59,
            });
        }

        // Anything a day or longer would wrap once it reaches a countdown.
        let time = Self::new(hours, minutes, seconds);
        let whole_hours = time.to_millis() / MS_PER_HOUR;
        if whole_hours > 23 {
            return Err(ValidationError::OutOfRange {
                field: "hours".into(),
                value: i64::try_from(whole_hours).unwrap_or(i64::MAX),
                min: 0,
                max: 23,
            });
        }

        Ok(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn from_millis_decomposes_fields() {
        let t = Time::from_millis(90_000);
        assert_eq!(t.hours(), 0);
        assert_eq!(t.minutes(), 1);
        assert_eq!(t.seconds(), 30);
    }

    #[test]
    fn from_millis_wraps_hours_at_a_day() {
        let t = Time::from_millis(25 * MS_PER_HOUR + 2 * MS_PER_MINUTE + 3 * MS_PER_SECOND);
        assert_eq!(t, Time::new(1, 2, 3));
    }

    #[test]
    fn from_millis_drops_sub_second_remainder() {
        assert_eq!(Time::from_millis(1999), Time::new(0, 0, 1));
        assert_eq!(Time::from_millis(999), Time::default());
    }

    #[test]
    fn default_is_zero() {
        assert!(Time::default().is_zero());
        assert_eq!(Time::default().to_millis(), 0);
    }

    #[test]
    fn to_millis_keeps_hours_past_a_day() {
        assert_eq!(Time::new(30, 0, 0).to_millis(), 30 * MS_PER_HOUR);
    }

    #[test]
    fn negative_hours_reset_to_zero() {
        let t = Time::new(0, 5, 5).with_field_delta(FieldDelta::hours(-1));
        assert_eq!(t, Time::new(0, 5, 5));
    }

    #[test]
    fn hours_have_no_upper_bound() {
        let t = Time::new(23, 0, 0).with_delta(Field::Hours, 1);
        assert_eq!(t.hours(), 24);
    }

    #[test]
    fn minutes_overflow_resets_minutes_only() {
        let t = Time::new(2, 0, 7).with_field_delta(FieldDelta::minutes(60));
        assert_eq!(t, Time::new(2, 0, 7));
    }

    #[test]
    fn seconds_do_not_carry_into_minutes() {
        let t = Time::new(0, 4, 59).with_delta(Field::Seconds, 1);
        assert_eq!(t, Time::new(0, 4, 0));
    }

    #[test]
    fn negative_seconds_reset_to_zero() {
        let t = Time::new(0, 1, 0).with_delta(Field::Seconds, -1);
        assert_eq!(t, Time::new(0, 1, 0));
    }

    #[test]
    fn only_first_offender_is_reset() {
        // Minutes are the first offender; seconds keep their computed value.
        let t = Time::new(0, 59, 59).with_field_delta(FieldDelta {
            hours: 0,
            minutes: 1,
            seconds: 1,
        });
        assert_eq!(t.minutes(), 0);
        assert_eq!(t.seconds(), 60);
    }

    #[test]
    fn unrepresentable_later_offender_becomes_zero() {
        let t = Time::new(0, 0, 0).with_field_delta(FieldDelta {
            hours: -1,
            minutes: 0,
            seconds: -5,
        });
        assert_eq!(t, Time::default());
    }

    #[test]
    fn display_pads_to_two_digits() {
        assert_eq!(Time::new(1, 2, 3).to_string(), "01:02:03");
        assert_eq!(Time::new(0, 0, 0).to_string(), "00:00:00");
        assert_eq!(Time::new(123, 0, 9).to_string(), "123:00:09");
    }

    #[test]
    fn parse_accepts_all_forms() {
        assert_eq!("01:02:03".parse::<Time>().unwrap(), Time::new(1, 2, 3));
        assert_eq!("5:30".parse::<Time>().unwrap(), Time::new(0, 5, 30));
        assert_eq!("45".parse::<Time>().unwrap(), Time::new(0, 0, 45));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<Time>().is_err());
        assert!("1:2:3:4".parse::<Time>().is_err());
        assert!("aa:00".parse::<Time>().is_err());
        assert!("00:60".parse::<Time>().is_err());
        assert!("00:61:00".parse::<Time>().is_err());
    }

    #[test]
    fn parse_rejects_a_day_or_more() {
        assert_eq!(
            "25:00:00".parse::<Time>().unwrap_err(),
            ValidationError::OutOfRange {
                field: "hours".into(),
                value: 25,
                min: 0,
                max: 23,
            }
        );
        assert!("1440:00".parse::<Time>().is_err());
        assert!("86400".parse::<Time>().is_err());
        assert_eq!("23:59:59".parse::<Time>().unwrap(), Time::new(23, 59, 59));
        assert_eq!("90:00".parse::<Time>().unwrap(), Time::new(0, 90, 0));
    }

    #[test]
    fn field_parses_short_and_long_names() {
        assert_eq!("h".parse::<Field>().unwrap(), Field::Hours);
        assert_eq!("Minutes".parse::<Field>().unwrap(), Field::Minutes);
        assert_eq!("ss".parse::<Field>().unwrap(), Field::Seconds);
        assert!("days".parse::<Field>().is_err());
    }

    #[test]
    fn serde_uses_field_names() {
        let json = serde_json::to_value(Time::new(1, 2, 3)).unwrap();
        assert_eq!(json["hours"], 1);
        assert_eq!(json["minutes"], 2);
        assert_eq!(json["seconds"], 3);
        assert_eq!(serde_json::to_value(Field::Minutes).unwrap(), "minutes");
    }

    proptest! {
        #[test]
        fn millis_round_trip_within_a_day(secs in 0u64..86_400) {
            let ms = secs * 1000;
            prop_assert_eq!(Time::from_millis(ms).to_millis(), ms);
        }

        #[test]
        fn from_millis_is_always_normalised(ms in any::<u64>()) {
            let t = Time::from_millis(ms);
            prop_assert!(t.hours() < 24);
            prop_assert!(t.minutes() < 60);
            prop_assert!(t.seconds() < 60);
        }
    }
}
