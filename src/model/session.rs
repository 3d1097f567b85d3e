use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::export::ExportedRound;
use super::round::{Coordinate, Hole, Lie, RoundInfo, Shot};

/// Reasons a shot (or its form input) is turned away. None of these change
/// session state; the caller shows them as a warning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No active round. Start a round first.")]
    NoActiveRound,
    #[error("No GPS yet. Tap 'Get GPS' or enter a location first.")]
    NoLocation,
    #[error("'{0}' is not a hole number")]
    InvalidHole(String),
    #[error("hole {0} is not between 1 and 18")]
    HoleOutOfRange(i64),
    #[error("unknown lie '{0}'")]
    UnknownLie(String),
}

/// State of one user's round. Reused across rounds; `end_round` puts it back
/// to its initial empty state.
#[derive(Debug, Default, Clone)]
pub struct RoundSession {
    active: bool,
    info: Option<RoundInfo>,
    shots: Vec<Shot>,
    pending: Option<Coordinate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundSnapshot {
    pub active: bool,
    pub info: Option<RoundInfo>,
    pub shots: Vec<Shot>,
    pub pending: Option<Coordinate>,
}

impl RoundSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn info(&self) -> Option<&RoundInfo> {
        self.info.as_ref()
    }

    #[must_use]
    pub fn shots(&self) -> &[Shot] {
        &self.shots
    }

    #[must_use]
    pub fn pending_location(&self) -> Option<Coordinate> {
        self.pending
    }

    /// Starts a round, replacing any round already in progress.
    pub fn start_round(
        &mut self,
        date: Option<NaiveDate>,
        course: impl Into<String>,
        player: impl Into<String>,
    ) -> RoundInfo {
        let info = RoundInfo {
            date: date.unwrap_or_else(|| Local::now().date_naive()),
            course: course.into(),
            player: player.into(),
        };
        if self.active {
            debug!(dropped_shots = self.shots.len(), "replacing active round");
        }
        self.info = Some(info.clone());
        self.shots.clear();
        self.active = true;
        info!(player = %info.player, course = %info.course, date = %info.date, "round started");
        info
    }

    pub fn set_pending_location(&mut self, lat: f64, lon: f64) {
        debug!(lat, lon, "pending location set");
        self.pending = Some(Coordinate { lat, lon });
    }

    pub fn clear_pending_location(&mut self) {
        self.pending = None;
    }

    /// # Errors
    ///
    /// Will return `Err` if no round is active or no location has been resolved yet
    pub fn log_shot(&mut self, hole: Hole, lie: Lie) -> Result<Shot, SessionError> {
        self.log_shot_at(hole, lie, Local::now().naive_local())
    }

    /// Same as [`RoundSession::log_shot`] with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Will return `Err` if no round is active or no location has been resolved yet
    pub fn log_shot_at(
        &mut self,
        hole: Hole,
        lie: Lie,
        timestamp: NaiveDateTime,
    ) -> Result<Shot, SessionError> {
        if !self.active {
            return Err(SessionError::NoActiveRound);
        }
        // the pending coordinate carries over to the next shot
        let Coordinate { lat, lon } = self.pending.ok_or(SessionError::NoLocation)?;
        let shot = Shot {
            timestamp,
            hole,
            lie,
            lat,
            lon,
        };
        self.shots.push(shot.clone());
        info!(hole = %hole, lie = %lie, count = self.shots.len(), "shot logged");
        Ok(shot)
    }

    /// Ends the round. Returns the export payload when at least one shot was
    /// logged; the session is reset either way.
    pub fn end_round(&mut self) -> Option<ExportedRound> {
        let info = self.info.take();
        let shots = std::mem::take(&mut self.shots);
        self.active = false;

        let payload = match info {
            Some(info) if !shots.is_empty() => Some(ExportedRound::new(info, &shots)),
            _ => None,
        };
        info!(shots = shots.len(), "round ended");
        payload
    }

    #[must_use]
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            active: self.active,
            info: self.info.clone(),
            shots: self.shots.clone(),
            pending: self.pending,
        }
    }
}
