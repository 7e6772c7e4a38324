use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScopeError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    #[error("Spreadsheet error: {0}")]
    Xlsx(String),

    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Unknown dealer: {0}")]
    UnknownDealer(String),

    #[error("Unknown order: {0}")]
    UnknownOrder(String),

    #[error("Unknown date range preset: {0}")]
    UnknownPreset(String),

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ScopeError>;
