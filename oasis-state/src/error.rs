use thiserror::Error;

/// Errors from the state layer
#[derive(Debug, Error)]
pub enum StateError {
    #[error("API error: {0}")]
    Api(#[from] oasis_api::ApiError),

    #[error("Catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog data: {0}")]
    Catalog(String),
}

impl From<serde_json::Error> for StateError {
    fn from(error: serde_json::Error) -> Self {
        StateError::Catalog(error.to_string())
    }
}
