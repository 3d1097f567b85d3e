use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::auth::TokenSource;
use super::{AppendSummary, ExportError, SheetSink};
use crate::model::ExportedRound;

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";
/// Spreadsheet used when `--sheet-id` is not given.
pub const DEFAULT_SHEET_ID: &str = "1OQg0xPkaHa-ZaSN9T0eTDKV5O_NnC7ZIRJWbgRqTuI0";

#[derive(Clone, Debug)]
pub struct SheetsConfig {
    pub api_base: String,
    pub spreadsheet_id: String,
    pub timeout: Duration,
}

impl SheetsConfig {
    #[must_use]
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
    #[serde(default)]
    index: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    #[serde(default)]
    updates: Option<AppendUpdates>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_range: Option<String>,
    updated_rows: Option<usize>,
}

/// Appends rounds to the first worksheet of a Google spreadsheet.
#[derive(Clone)]
pub struct GoogleSheetsSink {
    client: reqwest::Client,
    config: SheetsConfig,
    auth: Arc<dyn TokenSource>,
}

impl GoogleSheetsSink {
    /// # Errors
    ///
    /// Will return `Err` if the http client can't be built
    pub fn new(config: SheetsConfig, auth: Arc<dyn TokenSource>) -> Result<Self, ExportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            config,
            auth,
        })
    }

    fn spreadsheet_url(&self, extra: &[&str]) -> Result<Url, ExportError> {
        let base = self.config.api_base.trim_end_matches('/');
        let mut url = Url::parse(base)
            .map_err(|e| ExportError::Network(format!("invalid sheets api base '{base}': {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ExportError::Network(format!("invalid sheets api base '{base}'")))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.config.spreadsheet_id.as_str()])
            .extend(extra);
        Ok(url)
    }

    async fn check_status(&self, resp: Response) -> Result<Response, ExportError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => ExportError::SheetNotFound(self.config.spreadsheet_id.clone()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ExportError::Auth(format!("{status}: {body}"))
            }
            _ => ExportError::Service {
                status: status.as_u16(),
                body,
            },
        })
    }

    /// Title of the worksheet with the lowest index.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the spreadsheet can't be read or has no worksheets
    pub async fn first_sheet_title(&self, token: &str) -> Result<String, ExportError> {
        let url = self.spreadsheet_url(&[])?;
        let resp = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("fields", "sheets.properties")])
            .send()
            .await?;
        let meta: SpreadsheetMeta = self.check_status(resp).await?.json().await?;
        meta.sheets
            .into_iter()
            .map(|s| s.properties)
            .min_by_key(|p| p.index)
            .map(|p| p.title)
            .ok_or_else(|| ExportError::SheetNotFound(self.config.spreadsheet_id.clone()))
    }
}

/// A1 range covering a whole worksheet, quoted so titles with spaces work.
#[must_use]
pub fn sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

#[async_trait]
impl SheetSink for GoogleSheetsSink {
    #[instrument(skip_all, fields(sheet = %self.config.spreadsheet_id, rows = round.rows.len()))]
    async fn export(&self, round: &ExportedRound) -> Result<AppendSummary, ExportError> {
        let token = self.auth.access_token(&self.client).await?;
        let title = self.first_sheet_title(&token).await?;
        debug!(%title, "appending to worksheet");

        let append_segment = format!("{}:append", sheet_range(&title));
        let url = self.spreadsheet_url(&["values", append_segment.as_str()])?;
        let body = json!({
            "majorDimension": "ROWS",
            "values": round.values(),
        });
        let resp = self
            .client
            .post(url)
            .bearer_auth(&token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&body)
            .send()
            .await?;
        let resp = self.check_status(resp).await?;

        let parsed: AppendResponse = match resp.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                // rows are in; only the summary is unreadable
                warn!(error = %e, "could not read append response");
                AppendResponse { updates: None }
            }
        };
        let updates = parsed.updates;
        let summary = AppendSummary {
            updated_range: updates.as_ref().and_then(|u| u.updated_range.clone()),
            updated_rows: updates
                .and_then(|u| u.updated_rows)
                .unwrap_or(round.rows.len()),
        };
        info!(rows = summary.updated_rows, range = ?summary.updated_range, "round appended");
        Ok(summary)
    }
}
