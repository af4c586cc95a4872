use thiserror::Error;

#[derive(Error, Debug)]
pub enum VanillaOpsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid policy '{name}': {reason}")]
    InvalidPolicy { name: String, reason: String },

    #[error("Month {0} is outside 1-12")]
    InvalidMonth(u32),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, VanillaOpsError>;
