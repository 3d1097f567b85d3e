use actix_web::web::{self, Data};
use actix_web::{HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::warn;

use super::{AppState, EndOutcome, finish_round, retry_pending};
use crate::model::{DATE_FORMAT, Hole, Lie, SessionError};
use crate::view::index::{Notice, render_index_template};

#[derive(Debug, Deserialize)]
pub struct StartForm {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub player: String,
}

#[derive(Debug, Deserialize)]
pub struct LocationForm {
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lon: String,
}

#[derive(Debug, Deserialize)]
pub struct ShotForm {
    #[serde(default)]
    pub hole: String,
    #[serde(default)]
    pub lie: String,
}

async fn render_page(state: &AppState, notices: &[Notice]) -> HttpResponse {
    let snapshot = state.session.lock().await.snapshot();
    let pending_exports = state.queue.lock().await.len();
    let markup = render_index_template(&snapshot, pending_exports, notices);
    HttpResponse::Ok()
        .content_type("text/html")
        .body(markup.into_string())
}

fn parse_coordinate(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_shot_form(form: &ShotForm) -> Result<(Hole, Lie), SessionError> {
    let hole_str = form.hole.trim();
    let hole = hole_str
        .parse::<i64>()
        .map_err(|_| SessionError::InvalidHole(hole_str.to_string()))
        .and_then(Hole::new)?;
    let lie = form.lie.parse::<Lie>()?;
    Ok((hole, lie))
}

pub async fn index(
    query: web::Query<HashMap<String, String>>,
    state: Data<AppState>,
) -> impl Responder {
    let json = match query.get("json").map(String::as_str) {
        Some("1") => true,
        Some(other) => other.parse().unwrap_or(false),
        None => false,
    };

    if json {
        let snapshot = state.session.lock().await.snapshot();
        let queue = state.queue.lock().await;
        return HttpResponse::Ok().json(json!({
            "round": snapshot,
            "pending_exports": queue.len(),
            "pending_rows": queue.pending_rows(),
        }));
    }

    render_page(&state, &[]).await
}

pub async fn start_round(form: web::Form<StartForm>, state: Data<AppState>) -> impl Responder {
    let date_str = form.date.trim();
    let date = if date_str.is_empty() {
        None
    } else {
        match NaiveDate::parse_from_str(date_str, DATE_FORMAT) {
            Ok(d) => Some(d),
            Err(e) => {
                warn!(date = date_str, error = %e, "bad round date");
                let notice = Notice::warning(format!("'{date_str}' is not a date (YYYY-MM-DD)."));
                return render_page(&state, &[notice]).await;
            }
        }
    };

    let info = state
        .session
        .lock()
        .await
        .start_round(date, form.course.trim(), form.player.trim());
    let notice = Notice::success(format!(
        "✅ Round started: {} at {} on {}",
        info.player, info.course, info.date
    ));
    render_page(&state, &[notice]).await
}

pub async fn set_location(form: web::Form<LocationForm>, state: Data<AppState>) -> impl Responder {
    let notice = {
        let mut session = state.session.lock().await;
        match (parse_coordinate(&form.lat), parse_coordinate(&form.lon)) {
            (Some(lat), Some(lon)) => {
                session.set_pending_location(lat, lon);
                Notice::success(format!("GPS captured: {lat:.6}, {lon:.6}"))
            }
            _ => {
                session.clear_pending_location();
                Notice::warning("Could not fetch GPS coordinates.")
            }
        }
    };
    render_page(&state, &[notice]).await
}

pub async fn log_shot(form: web::Form<ShotForm>, state: Data<AppState>) -> impl Responder {
    let notice = match parse_shot_form(&form) {
        Ok((hole, lie)) => match state.session.lock().await.log_shot(hole, lie) {
            Ok(shot) => Notice::success(format!(
                "✅ Shot logged for Hole {}: {}",
                shot.hole, shot.lie
            )),
            Err(e) => Notice::warning(e.to_string()),
        },
        Err(e) => Notice::warning(e.to_string()),
    };
    render_page(&state, &[notice]).await
}

pub async fn end_round(state: Data<AppState>) -> impl Responder {
    let mut notices = Vec::new();
    match finish_round(&state).await {
        Ok(EndOutcome::Exported(_)) => {
            notices.push(Notice::success("🏁 Round pushed to Google Sheet!"));
        }
        Ok(EndOutcome::NothingToExport) => {}
        Err(e) => notices.push(Notice::error(format!(
            "Push to Google Sheet failed: {e}. The round's shots were kept and can be retried."
        ))),
    }
    notices.push(Notice::success("🏁 Round ended."));
    render_page(&state, &notices).await
}

pub async fn retry_exports(state: Data<AppState>) -> impl Responder {
    let notice = match retry_pending(&state).await {
        Ok(0) => Notice::info("Nothing waiting to be pushed."),
        Ok(n) => Notice::success(format!("🏁 {n} round(s) pushed to Google Sheet!")),
        Err(e) => Notice::error(format!("Push to Google Sheet failed again: {e}")),
    };
    render_page(&state, &[notice]).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_accept_zero_and_reject_junk() {
        assert_eq!(parse_coordinate("0"), Some(0.0));
        assert_eq!(parse_coordinate(" -121.95 "), Some(-121.95));
        assert_eq!(parse_coordinate(""), None);
        assert_eq!(parse_coordinate("NaN"), None);
    }

    #[test]
    fn shot_form_validation() {
        let form = ShotForm {
            hole: "7".into(),
            lie: "sand".into(),
        };
        assert_eq!(parse_shot_form(&form).unwrap(), (Hole::new(7).unwrap(), Lie::Sand));

        let form = ShotForm {
            hole: "19".into(),
            lie: "Tee".into(),
        };
        assert_eq!(parse_shot_form(&form), Err(SessionError::HoleOutOfRange(19)));

        let form = ShotForm {
            hole: " abc ".into(),
            lie: "Tee".into(),
        };
        assert_eq!(
            parse_shot_form(&form),
            Err(SessionError::InvalidHole("abc".into()))
        );

        let form = ShotForm {
            hole: String::new(),
            lie: "Tee".into(),
        };
        assert_eq!(parse_shot_form(&form), Err(SessionError::InvalidHole(String::new())));
    }
}
