pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid hierarchy record at {path}: {message}")]
    InvalidRecord { path: String, message: String },

    #[error("hierarchy record JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
