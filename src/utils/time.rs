use std::{fmt::Display, str::FromStr};

use anyhow::{anyhow, bail};
use chrono::{DateTime, Local, Timelike};

/// Wall-clock time with hour/minute precision and no date component.
/// Always normalized into [00:00, 23:59].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Option<TimeOfDay> {
        if hour > 23 || minute > 59 {
            None
        } else {
            Some(TimeOfDay { hour, minute })
        }
    }

    /// Truncates a full timestamp to minute precision.
    pub fn from_datetime(value: DateTime<Local>) -> TimeOfDay {
        TimeOfDay {
            hour: value.hour() as u8,
            minute: value.minute() as u8,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn minute_of_day(&self) -> u32 {
        self.hour as u32 * 60 + self.minute as u32
    }

    /// Adds signed hour/minute deltas, carrying minutes into hours and
    /// wrapping hours modulo 24. Callers compare the result against the base
    /// value to detect a day crossing.
    pub fn add_offset(&self, hours: i32, minutes: i32) -> TimeOfDay {
        let total = self.minute_of_day() as i32 + hours * 60 + minutes;
        let total = total.rem_euclid(24 * 60);
        TimeOfDay {
            hour: (total / 60) as u8,
            minute: (total % 60) as u8,
        }
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = anyhow::Error;

    /// Accepts "H:MM"/"HH:MM", bare minutes ("5", "45"), or colonless
    /// hour-minute digits ("815", "0815").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > 5 {
            bail!("time \"{s}\" cannot be longer than 5 characters");
        }

        let (hour, minute) = match s.split_once(':') {
            Some((hour, minute)) => {
                if minute.contains(':') {
                    bail!("time \"{s}\" contains more than one colon");
                }
                (hour, minute)
            }
            None if s.len() >= 3 => s.split_at(s.len() - 2),
            None => ("0", s),
        };

        let hour = hour
            .parse::<u8>()
            .map_err(|e| anyhow!("can't parse hours of \"{s}\": {e}"))?;
        let minute = minute
            .parse::<u8>()
            .map_err(|e| anyhow!("can't parse minutes of \"{s}\": {e}"))?;

        TimeOfDay::new(hour, minute)
            .ok_or_else(|| anyhow!("time \"{s}\" is outside of the range 00:00..23:59"))
    }
}

/// Renders the difference from `from` to `to` as a human sentence, like
/// "1 hour 30 minutes". `to` is treated as occurring on the same or the next
/// day, so the result is never negative. Equal times produce an empty string.
pub fn format_duration(from: TimeOfDay, to: TimeOfDay) -> String {
    let mut to_minutes = to.minute_of_day();
    if to_minutes < from.minute_of_day() {
        to_minutes += 24 * 60;
    }

    let difference = to_minutes - from.minute_of_day();
    let hours = difference / 60;
    let minutes = difference % 60;

    let mut clauses = Vec::new();
    if hours > 0 {
        clauses.push(format!("{hours} hour{}", if hours == 1 { "" } else { "s" }));
    }
    if minutes > 0 {
        clauses.push(format!(
            "{minutes} minute{}",
            if minutes == 1 { "" } else { "s" }
        ));
    }
    clauses.join(" ")
}
