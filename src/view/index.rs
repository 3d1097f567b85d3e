use maud::{DOCTYPE, Markup, html};

use crate::model::{DATE_FORMAT, Hole, Lie, RoundSnapshot, Shot};

pub const PAGE_TITLE: &str = "GPS Shot Logger";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeKind {
    fn css_class(self) -> &'static str {
        match self {
            NoticeKind::Success => "notice notice-success",
            NoticeKind::Info => "notice notice-info",
            NoticeKind::Warning => "notice notice-warning",
            NoticeKind::Error => "notice notice-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

#[must_use]
pub fn render_index_template(
    snapshot: &RoundSnapshot,
    pending_exports: usize,
    notices: &[Notice],
) -> Markup {
    html! {
        (DOCTYPE)
        head {
            meta charset="UTF-8";
            meta name="viewport" content="width=device-width, initial-scale=1.0";
            link rel="stylesheet" type="text/css" href="/static/styles.css";
            title { (PAGE_TITLE) }
            script src="/static/round.js" defer {}
        }
        body {
            h1 { (PAGE_TITLE) }
            div id="notices" {
                @for notice in notices {
                    div class=(notice.kind.css_class()) { (notice.text) }
                }
            }
            @if let (true, Some(info)) = (snapshot.active, snapshot.info.as_ref()) {
                div class="notice notice-info" id="round-banner" {
                    "Round Active: " (info.player) " at " (info.course) " (" (info.date.format(DATE_FORMAT).to_string()) ")"
                }
                (render_location_form(snapshot))
                (render_shot_form())
            } @else {
                (render_start_form())
            }
            @if !snapshot.shots.is_empty() {
                (render_shots_table(&snapshot.shots))
            }
            @if snapshot.active {
                h2 { "End Round" }
                form method="post" action="/round/end" {
                    button type="submit" id="end-round" { "End Round" }
                }
            }
            @if pending_exports > 0 {
                div id="pending-exports" {
                    p { (pending_exports) " round(s) waiting to be pushed to the sheet." }
                    form method="post" action="/exports/retry" {
                        button type="submit" { "Retry push" }
                    }
                }
            }
        }
    }
}

fn render_start_form() -> Markup {
    html! {
        h2 { "Start Round" }
        form method="post" action="/round/start" id="start-round" {
            label { "Round Date " input type="date" name="date"; }
            label { "Course Name " input type="text" name="course"; }
            label { "Player Name " input type="text" name="player"; }
            button type="submit" { "Start Round" }
        }
    }
}

fn render_location_form(snapshot: &RoundSnapshot) -> Markup {
    html! {
        h2 { "Location" }
        @if let Some(c) = snapshot.pending {
            p id="pending-location" { "GPS: " (format!("{:.6}, {:.6}", c.lat, c.lon)) }
        } @else {
            p id="pending-location" { "No location yet." }
        }
        form method="post" action="/round/location" id="location-form" {
            label { "Lat " input type="number" name="lat" step="any" value=[snapshot.pending.map(|c| c.lat)]; }
            label { "Lon " input type="number" name="lon" step="any" value=[snapshot.pending.map(|c| c.lon)]; }
            button type="button" id="get-gps" { "Get GPS" }
            button type="submit" { "Use this location" }
        }
    }
}

fn render_shot_form() -> Markup {
    html! {
        h2 { "Log Shots" }
        form method="post" action="/round/shot" id="shot-form" {
            label {
                "Hole Number "
                input type="number" name="hole" min=(Hole::FIRST) max=(Hole::LAST) step="1" value=(Hole::FIRST);
            }
            label {
                "Lie "
                select name="lie" {
                    @for lie in Lie::ALL {
                        option value=(lie.as_str()) { (lie.as_str()) }
                    }
                }
            }
            button type="submit" { "Log Shot" }
        }
    }
}

fn render_shots_table(shots: &[Shot]) -> Markup {
    html! {
        h3 { "Shots This Round" }
        table id="shots" {
            thead {
                tr {
                    th { "timestamp" }
                    th { "hole" }
                    th { "lie" }
                    th { "lat" }
                    th { "lon" }
                }
            }
            tbody {
                @for shot in shots {
                    tr {
                        td { (shot.timestamp_string()) }
                        td { (shot.hole.number()) }
                        td { (shot.lie.as_str()) }
                        td { (shot.lat) }
                        td { (shot.lon) }
                    }
                }
            }
        }
    }
}
