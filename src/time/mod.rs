use crate::cd::{FRAMES_PER_MINUTE, FRAMES_PER_SECOND};
use crate::time::error::{CueTimeError, CueTimeResult};
use chrono::TimeDelta;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub mod error;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

lazy_static! {
    static ref MSF_PATTERN: Regex =
        Regex::new(r"^(-)?\s*(\d*)\s*(?:[:.]\s*(\d*))?\s*(?:[:.]\s*(\d*))?$").unwrap();
}

/// A position or length on a disc, counted in CD frames (1/75 s).
///
/// The value is stored as a signed total frame count so arithmetic and
/// ordering never have to look at the minute/second/frame split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CueTime(i64);

impl CueTime {
    pub const ZERO: CueTime = CueTime(0);
    pub const MAX: CueTime = CueTime(i32::MAX as i64);
    pub const MIN: CueTime = CueTime(-(i32::MAX as i64));

    pub fn from_frames(total_frames: i64) -> CueTimeResult<Self> {
        Self::checked(total_frames as i128)
    }

    pub fn from_msf(minutes: i64, seconds: i64, frames: i64) -> CueTimeResult<Self> {
        let total = minutes as i128 * FRAMES_PER_MINUTE as i128
            + seconds as i128 * FRAMES_PER_SECOND as i128
            + frames as i128;
        Self::checked(total)
    }

    fn checked(total: i128) -> CueTimeResult<Self> {
        if total > Self::MAX.0 as i128 || total < Self::MIN.0 as i128 {
            return Err(CueTimeError::Overflow(total));
        }
        Ok(Self(total as i64))
    }

    pub fn total_frames(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Whole minutes of the absolute value.
    pub fn minutes(&self) -> i64 {
        self.0.abs() / FRAMES_PER_MINUTE
    }

    pub fn seconds(&self) -> i64 {
        self.0.abs() % FRAMES_PER_MINUTE / FRAMES_PER_SECOND
    }

    pub fn frames(&self) -> i64 {
        self.0.abs() % FRAMES_PER_SECOND
    }

    pub fn checked_add(self, other: CueTime) -> CueTimeResult<Self> {
        Self::checked(self.0 as i128 + other.0 as i128)
    }

    pub fn checked_sub(self, other: CueTime) -> CueTimeResult<Self> {
        Self::checked(self.0 as i128 - other.0 as i128)
    }

    /// Wall-clock length of this time, rounded to the nearest nanosecond.
    pub fn to_duration(&self) -> TimeDelta {
        let nanos = div_round(self.0 as i128 * NANOS_PER_SECOND, FRAMES_PER_SECOND as i128);
        TimeDelta::nanoseconds(nanos as i64)
    }

    /// Converts a wall-clock duration to the nearest frame.
    pub fn from_duration(duration: TimeDelta) -> CueTimeResult<Self> {
        let nanos = match duration.num_nanoseconds() {
            Some(nanos) => nanos as i128,
            // Beyond ~292 years, which is far outside the frame range anyway.
            None => return Err(CueTimeError::Overflow(duration.num_seconds() as i128)),
        };
        Self::checked(div_round(nanos * FRAMES_PER_SECOND as i128, NANOS_PER_SECOND))
    }
}

fn div_round(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

impl Display for CueTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_negative() {
            write!(f, "-")?;
        }
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.minutes(),
            self.seconds(),
            self.frames()
        )
    }
}

impl FromStr for CueTime {
    type Err = CueTimeError;

    /// Parses `mm:ss:ff`. Missing trailing components count as zero, so
    /// `"4:30"` is four and a half minutes, and empty components such as
    /// `"01::05"` are accepted. Seconds and frames are not range checked,
    /// only the resulting total is.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let captures = MSF_PATTERN
            .captures(trimmed)
            .ok_or_else(|| CueTimeError::InvalidFormat(s.to_string()))?;

        if !trimmed.chars().any(|c| c.is_ascii_digit()) {
            return Err(CueTimeError::InvalidFormat(s.to_string()));
        }

        let mut parts = [0i128; 3];
        for (slot, group) in parts.iter_mut().zip(2..=4) {
            if let Some(digits) = captures.get(group).map(|m| m.as_str()) {
                if !digits.is_empty() {
                    *slot = digits
                        .parse::<u64>()
                        .map_err(|_| CueTimeError::Overflow(i128::MAX))?
                        as i128;
                }
            }
        }

        let total = parts[0] * FRAMES_PER_MINUTE as i128
            + parts[1] * FRAMES_PER_SECOND as i128
            + parts[2];
        let total = if captures.get(1).is_some() {
            -total
        } else {
            total
        };

        Self::checked(total)
    }
}
