use thiserror::Error;

use crate::controller::sheets::ExportError;

/// Startup failures surfaced by `main`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<String> for AppError {
    fn from(e: String) -> Self {
        Self::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_pick_the_right_variant() {
        let err: AppError = "--timeout-secs must be greater than zero.".to_string().into();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(
            err.to_string(),
            "config error: --timeout-secs must be greater than zero."
        );

        let err: AppError = std::io::Error::new(std::io::ErrorKind::AddrInUse, "taken").into();
        assert!(matches!(err, AppError::Io(_)));

        let err: AppError = ExportError::SheetNotFound("abc".to_string()).into();
        assert_eq!(err.to_string(), "spreadsheet abc not found");
    }
}
