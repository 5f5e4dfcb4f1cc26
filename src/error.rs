use thiserror::Error;

/// Errors raised while loading, reconciling or exporting count records
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A record the engine must process lacks `item_id`, `location` or `variance`
    #[error("record {index}: required field `{field}` is missing")]
    MissingField { field: &'static str, index: usize },

    /// A `cycle_date` could not be read as a calendar date
    #[error("record {index}: cycle_date `{value}` is not a calendar date")]
    DataFormat { index: usize, value: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("report export error: {0}")]
    Export(#[from] csv::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReconcileError {
    /// True for errors caused by the caller's data or parameters
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::DataFormat { .. } | Self::InvalidParameter(_)
        )
    }
}

pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;
