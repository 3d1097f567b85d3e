pub mod http_handlers;

use actix_web::{HttpResponse, web};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::controller::sheets::{AppendSummary, ExportError, SheetSink};
use crate::model::{ExportQueue, RoundSession};

pub use http_handlers::{end_round, index, log_shot, retry_exports, set_location, start_round};

/// Shared by every handler through `web::Data`.
pub struct AppState {
    pub session: Mutex<RoundSession>,
    pub queue: Mutex<ExportQueue>,
    /// Held for a whole `retry_pending` drain so retries never interleave.
    retry_guard: Mutex<()>,
    pub sink: Arc<dyn SheetSink>,
}

impl AppState {
    #[must_use]
    pub fn new(sink: Arc<dyn SheetSink>) -> Self {
        Self {
            session: Mutex::new(RoundSession::new()),
            queue: Mutex::new(ExportQueue::new()),
            retry_guard: Mutex::new(()),
            sink,
        }
    }
}

/// Registers the round form routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/round/start", web::post().to(start_round))
        .route("/round/location", web::post().to(set_location))
        .route("/round/shot", web::post().to(log_shot))
        .route("/round/end", web::post().to(end_round))
        .route("/exports/retry", web::post().to(retry_exports))
        .route("/health", web::get().to(HttpResponse::Ok));
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOutcome {
    /// The round had no shots; nothing to push.
    NothingToExport,
    Exported(AppendSummary),
}

/// Ends the active round and pushes its shots. The session is reset before
/// the export is attempted; on failure the payload goes to the retry queue
/// and the error is returned.
///
/// # Errors
///
/// Will return `Err` if the export fails
pub async fn finish_round(state: &AppState) -> Result<EndOutcome, ExportError> {
    let payload = state.session.lock().await.end_round();
    let Some(payload) = payload else {
        return Ok(EndOutcome::NothingToExport);
    };

    match state.sink.export(&payload).await {
        Ok(summary) => Ok(EndOutcome::Exported(summary)),
        Err(e) => {
            error!(error = %e, rows = payload.rows.len(), "export failed, round queued for retry");
            state.queue.lock().await.push(payload);
            Err(e)
        }
    }
}

/// Retries queued rounds oldest first and stops at the first failure, which
/// stays at the head of the queue. Returns how many rounds went out.
/// Concurrent calls run one after another.
///
/// # Errors
///
/// Will return `Err` with the first failure; rounds exported before it stay exported
pub async fn retry_pending(state: &AppState) -> Result<usize, ExportError> {
    let _guard = state.retry_guard.lock().await;
    let mut exported = 0;
    loop {
        let Some(payload) = state.queue.lock().await.pop() else {
            break;
        };
        if let Err(e) = state.sink.export(&payload).await {
            warn!(error = %e, exported, "retry stopped");
            state.queue.lock().await.requeue_front(payload);
            return Err(e);
        }
        exported += 1;
    }
    if exported > 0 {
        info!(exported, "queued rounds exported");
    }
    Ok(exported)
}
