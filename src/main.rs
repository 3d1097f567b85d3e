use actix_files::Files;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use shot_logger::AppError;
use shot_logger::args::{self, CleanArgs, types::ExportTarget};
use shot_logger::controller::round::{self, AppState};
use shot_logger::controller::sheets::{
    GoogleSheetsSink, LogSink, ServiceAccountAuth, ServiceAccountKey, SheetSink, SheetsConfig,
};

fn build_sink(args: &CleanArgs) -> Result<Arc<dyn SheetSink>, AppError> {
    match &args.target {
        ExportTarget::DryRun => {
            info!("dry run: rounds are logged, not pushed");
            Ok(Arc::new(LogSink))
        }
        ExportTarget::Sheet { credentials } => {
            let key = ServiceAccountKey::from_file(credentials)?;
            let auth = ServiceAccountAuth::new(key)?;
            info!(client_email = auth.client_email(), sheet = %args.sheet_id, "pushing rounds to google sheets");
            let config = SheetsConfig {
                api_base: args.sheets_api_base.clone(),
                timeout: args.timeout,
                ..SheetsConfig::new(args.sheet_id.as_str())
            };
            Ok(Arc::new(GoogleSheetsSink::new(config, Arc::new(auth))?))
        }
    }
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    let directive = "shot_logger=info"
        .parse::<Directive>()
        .map_err(|e| AppError::Config(format!("log filter: {e}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .init();

    let args = args::args_checks()?;

    let sink = build_sink(&args)?;
    let state = Data::new(AppState::new(sink));

    info!(bind = %args.bind, "starting shot logger");
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(round::routes)
            .service(Files::new("/static", "./static"))
    })
    .bind(args.bind.as_str())?
    .run()
    .await?;
    Ok(())
}
