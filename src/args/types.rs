use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::controller::sheets::client::{DEFAULT_API_BASE, DEFAULT_SHEET_ID};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address the web form listens on.
    #[arg(long, env = "SHOT_LOGGER_BIND", value_name = "ADDR", default_value = "0.0.0.0:8081")]
    pub bind: String,

    /// Id of the Google spreadsheet rounds are appended to.
    #[arg(
        long,
        env = "SHEET_ID",
        value_name = "SHEET_ID",
        default_value = DEFAULT_SHEET_ID,
        value_parser = crate::args::validation::check_sheet_id
    )]
    pub sheet_id: String,

    /// Service-account key file (json with client_email and private_key).
    #[arg(
        short = 'c',
        long,
        env = "GCP_SERVICE_ACCOUNT_FILE",
        value_name = "CREDENTIALS_JSON",
        value_parser = crate::args::validation::check_credentials_file
    )]
    pub credentials: Option<PathBuf>,

    /// Base url of the Sheets API. Only changed for testing.
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_BASE)]
    pub sheets_api_base: String,

    /// Timeout for each request to the Sheets API, in seconds.
    #[arg(long, value_name = "SECONDS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log rows instead of pushing them to the sheet.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub enum ExportTarget {
    DryRun,
    Sheet { credentials: PathBuf },
}

#[derive(Debug, Clone)]
pub struct CleanArgs {
    pub bind: String,
    pub sheet_id: String,
    pub sheets_api_base: String,
    pub timeout: Duration,
    pub target: ExportTarget,
}

impl Args {
    /// # Errors
    ///
    /// Will return `Err` if no credentials were given and this is not a dry run
    pub fn into_clean(self) -> Result<CleanArgs, String> {
        let target = match (self.dry_run, self.credentials) {
            (true, _) => ExportTarget::DryRun,
            (false, Some(credentials)) => ExportTarget::Sheet { credentials },
            (false, None) => {
                return Err(
                    "--credentials (or GCP_SERVICE_ACCOUNT_FILE) is required unless --dry-run is set."
                        .to_string(),
                );
            }
        };
        if self.timeout_secs == 0 {
            return Err("--timeout-secs must be greater than zero.".to_string());
        }
        Ok(CleanArgs {
            bind: self.bind,
            sheet_id: self.sheet_id,
            sheets_api_base: self.sheets_api_base,
            timeout: Duration::from_secs(self.timeout_secs),
            target,
        })
    }
}
