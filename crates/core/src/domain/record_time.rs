use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// A lap record, a non-negative duration in whole seconds.
///
/// Parsed from and rendered as `HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordTime(i64);

impl RecordTime {
    pub fn from_seconds(seconds: i64) -> Result<Self, DomainError> {
        if seconds >= 0 {
            Ok(Self(seconds))
        } else {
            Err(DomainError::NegativeRecordTime(seconds))
        }
    }

    pub fn seconds(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
    }
}

impl FromStr for RecordTime {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidRecordTime(s.to_string());

        let mut parts = s.split(':');
        let (hours, minutes, seconds) = match (parts.next(), parts.next(), parts.next(), parts.next())
        {
            (Some(h), Some(m), Some(sec), None) => (h, m, sec),
            _ => return Err(invalid()),
        };

        let hours: i64 = hours.parse().map_err(|_| invalid())?;
        let minutes: i64 = minutes.parse().map_err(|_| invalid())?;
        let seconds: i64 = seconds.parse().map_err(|_| invalid())?;

        if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
            return Err(invalid());
        }

        Self::from_seconds(hours * 3600 + minutes * 60 + seconds)
    }
}
