pub mod auth;
pub mod client;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::model::ExportedRound;

pub use auth::{ServiceAccountAuth, ServiceAccountKey, TokenSource};
pub use client::{GoogleSheetsSink, SheetsConfig};

/// Everything that can go wrong pushing a round to the sheet. The caller
/// treats all of them the same way: the round is kept for a retry.
#[derive(Error, Debug, Clone)]
pub enum ExportError {
    #[error("credentials error: {0}")]
    Credentials(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("spreadsheet {0} not found")]
    SheetNotFound(String),
    #[error("sheets service returned {status}: {body}")]
    Service { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for ExportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendSummary {
    pub updated_range: Option<String>,
    pub updated_rows: usize,
}

/// Destination for finished rounds.
#[async_trait]
pub trait SheetSink: Send + Sync {
    /// Appends every row of `round` in a single call.
    ///
    /// # Errors
    /// Returns an error if the rows could not be appended.
    async fn export(&self, round: &ExportedRound) -> Result<AppendSummary, ExportError>;
}

/// Writes rows to the log instead of a sheet. Used with `--dry-run`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl SheetSink for LogSink {
    async fn export(&self, round: &ExportedRound) -> Result<AppendSummary, ExportError> {
        for row in &round.rows {
            info!(
                timestamp = %row.timestamp,
                hole = row.hole,
                lie = %row.lie,
                lat = row.lat,
                lon = row.lon,
                date = %row.date,
                course = %row.course,
                player = %row.player,
                "dry-run row"
            );
        }
        Ok(AppendSummary {
            updated_range: None,
            updated_rows: round.rows.len(),
        })
    }
}
