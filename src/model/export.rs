use serde::Serialize;
use serde_json::{Value, json};
use std::collections::VecDeque;

use super::round::{DATE_FORMAT, RoundInfo, Shot};

/// One sheet row: the shot's fields followed by the round's.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotRow {
    pub timestamp: String,
    pub hole: u8,
    pub lie: String,
    pub lat: f64,
    pub lon: f64,
    pub date: String,
    pub course: String,
    pub player: String,
}

impl ShotRow {
    pub const COLUMNS: [&'static str; 8] = [
        "timestamp", "hole", "lie", "lat", "lon", "date", "course", "player",
    ];

    #[must_use]
    pub fn new(shot: &Shot, info: &RoundInfo) -> Self {
        Self {
            timestamp: shot.timestamp_string(),
            hole: shot.hole.number(),
            lie: shot.lie.to_string(),
            lat: shot.lat,
            lon: shot.lon,
            date: info.date.format(DATE_FORMAT).to_string(),
            course: info.course.clone(),
            player: info.player.clone(),
        }
    }

    /// Cell values in `COLUMNS` order, as the Sheets API expects them.
    #[must_use]
    pub fn cells(&self) -> Vec<Value> {
        vec![
            json!(self.timestamp),
            json!(self.hole),
            json!(self.lie),
            json!(self.lat),
            json!(self.lon),
            json!(self.date),
            json!(self.course),
            json!(self.player),
        ]
    }
}

/// Payload produced by ending a round with at least one shot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedRound {
    pub info: RoundInfo,
    pub rows: Vec<ShotRow>,
}

impl ExportedRound {
    #[must_use]
    pub fn new(info: RoundInfo, shots: &[Shot]) -> Self {
        let rows = shots.iter().map(|s| ShotRow::new(s, &info)).collect();
        Self { info, rows }
    }

    #[must_use]
    pub fn values(&self) -> Vec<Vec<Value>> {
        self.rows.iter().map(ShotRow::cells).collect()
    }
}

/// Ended rounds whose push to the sheet failed, oldest first.
#[derive(Debug, Default)]
pub struct ExportQueue {
    pending: VecDeque<ExportedRound>,
}

impl ExportQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, round: ExportedRound) {
        self.pending.push_back(round);
    }

    /// Puts a round back at the head after a failed retry.
    pub fn requeue_front(&mut self, round: ExportedRound) {
        self.pending.push_front(round);
    }

    pub fn pop(&mut self) -> Option<ExportedRound> {
        self.pending.pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn pending_rows(&self) -> usize {
        self.pending.iter().map(|r| r.rows.len()).sum()
    }
}
