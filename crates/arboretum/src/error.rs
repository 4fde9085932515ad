#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Hierarchy(#[from] arboretum_core::Error),
    #[error(transparent)]
    Layout(#[from] arboretum_layout::Error),
    #[error("no dataset loaded")]
    NoDataset,
    #[error("session config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
