use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::session::SessionError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const WHOLE_SECOND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Identity of a round. Set once by `start_round`, never edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInfo {
    pub date: NaiveDate,
    pub course: String,
    pub player: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lie {
    Tee,
    Fairway,
    Rough,
    Sand,
    Green,
    Holed,
}

impl Lie {
    pub const ALL: [Lie; 6] = [
        Lie::Tee,
        Lie::Fairway,
        Lie::Rough,
        Lie::Sand,
        Lie::Green,
        Lie::Holed,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Lie::Tee => "Tee",
            Lie::Fairway => "Fairway",
            Lie::Rough => "Rough",
            Lie::Sand => "Sand",
            Lie::Green => "Green",
            Lie::Holed => "Holed",
        }
    }
}

impl fmt::Display for Lie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lie {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Lie::ALL
            .into_iter()
            .find(|lie| lie.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| SessionError::UnknownLie(trimmed.to_string()))
    }
}

/// Hole number, always within `1..=18`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Hole(u8);

impl Hole {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 18;

    /// # Errors
    ///
    /// Will return `Err` if `n` is outside `1..=18`
    pub fn new(n: i64) -> Result<Self, SessionError> {
        match u8::try_from(n) {
            Ok(h) if (Self::FIRST..=Self::LAST).contains(&h) => Ok(Self(h)),
            _ => Err(SessionError::HoleOutOfRange(n)),
        }
    }

    #[must_use]
    pub fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Hole {
    type Error = SessionError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<Hole> for u8 {
    fn from(hole: Hole) -> Self {
        hole.0
    }
}

impl fmt::Display for Hole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved location, from the device's GPS or a click on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub timestamp: NaiveDateTime,
    pub hole: Hole,
    pub lie: Lie,
    pub lat: f64,
    pub lon: f64,
}

impl Shot {
    /// Microsecond precision; the fraction is left off when it is zero.
    #[must_use]
    pub fn timestamp_string(&self) -> String {
        let format = if self.timestamp.nanosecond() / 1_000 == 0 {
            WHOLE_SECOND_FORMAT
        } else {
            TIMESTAMP_FORMAT
        };
        self.timestamp.format(format).to_string()
    }
}
