use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Failed to fetch playlist: {0}")]
    Fetch(String),

    #[error("Cannot download video {0:?}: {1}")]
    InvalidVideoId(String, String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Config error: {0}")]
    Config(String),
}
