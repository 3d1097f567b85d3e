#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shot_logger::AppState;
use shot_logger::controller::sheets::{AppendSummary, ExportError, SheetSink};
use shot_logger::model::ExportedRound;

/// Keeps every round it is handed. Flip `failing` to make exports error out,
/// or set `fail_next` to fail only that many upcoming calls.
#[derive(Default)]
pub struct RecordingSink {
    pub exported: Mutex<Vec<ExportedRound>>,
    pub attempts: Mutex<usize>,
    pub failing: AtomicBool,
    pub fail_next: AtomicUsize,
    pub delay: Mutex<Duration>,
}

impl RecordingSink {
    pub fn failing() -> Self {
        let sink = Self::default();
        sink.failing.store(true, Ordering::SeqCst);
        sink
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn exported(&self) -> Vec<ExportedRound> {
        self.exported.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }

    /// Every export sleeps this long before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }
}

#[async_trait]
impl SheetSink for RecordingSink {
    async fn export(&self, round: &ExportedRound) -> Result<AppendSummary, ExportError> {
        *self.attempts.lock().unwrap() += 1;
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let fail_once = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail_once || self.failing.load(Ordering::SeqCst) {
            return Err(ExportError::Service {
                status: 503,
                body: "backend unavailable".to_string(),
            });
        }
        self.exported.lock().unwrap().push(round.clone());
        Ok(AppendSummary {
            updated_range: Some(format!("'Sheet1'!A1:H{}", round.rows.len())),
            updated_rows: round.rows.len(),
        })
    }
}

pub fn state_with(sink: Arc<RecordingSink>) -> AppState {
    AppState::new(sink)
}

pub fn round_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
}

pub fn tee_time(minute: u32) -> NaiveDateTime {
    round_date()
        .and_hms_opt(8, minute, 0)
        .expect("valid time")
}
