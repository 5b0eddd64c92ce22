use std::fmt;
use thiserror::Error;

/// A position in the source audio, in seconds.
///
/// Always finite. Negative values can be represented; rejecting them is left to
/// the caller since a negative end is still meaningful for range checks.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeOffset(f64);

impl TimeOffset {
    pub fn from_seconds(seconds: f64) -> Option<Self> {
        seconds.is_finite().then_some(Self(seconds))
    }

    pub fn as_seconds(self) -> f64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0.0
    }
}

impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("invalid time format: '{0}' (expected seconds, mm:ss or hh:mm:ss)")]
    InvalidTimeFormat(String),
}

/// Parse a time notation into seconds.
///
/// Accepted forms, tried in order: a bare number (`90`, `12.5`), `mm:ss` and
/// `hh:mm:ss`. Hours and minutes must be integers, seconds may be fractional.
pub fn parse_time(text: &str) -> Result<TimeOffset, TimeParseError> {
    let trimmed = text.trim();

    let seconds = match trimmed.parse::<f64>() {
        Ok(seconds) => Some(seconds),
        Err(_) => {
            let fields: Vec<&str> = trimmed.split(':').map(str::trim).collect();
            match fields.as_slice() {
                [minutes, seconds] => match (whole(minutes), fractional(seconds)) {
                    (Some(m), Some(s)) => Some(m * 60.0 + s),
                    _ => None,
                },
                [hours, minutes, seconds] => {
                    match (whole(hours), whole(minutes), fractional(seconds)) {
                        (Some(h), Some(m), Some(s)) => Some(h * 3600.0 + m * 60.0 + s),
                        _ => None,
                    }
                }
                _ => None,
            }
        }
    };

    seconds
        .and_then(TimeOffset::from_seconds)
        .ok_or_else(|| TimeParseError::InvalidTimeFormat(text.to_owned()))
}

/// A signed run of digits of any length. Kept as `f64` so long hour counts
/// are not capped by an integer type.
fn whole(field: &str) -> Option<f64> {
    let digits = field.strip_prefix(['+', '-']).unwrap_or(field);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    fractional(field)
}

fn fractional(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}
