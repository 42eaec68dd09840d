use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid settings, or a database that cannot be opened.
    #[error("configuration error: {0}")]
    Config(String),
    #[error("external service error: {0}")]
    ExternalService(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("persistence error: {0}")]
    Persistence(#[from] upkeep_db::DbError),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Process exit status for a run that failed with this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 2,
            AppError::ExternalService(_) | AppError::Http(_) | AppError::Persistence(_) => 1,
        }
    }
}
