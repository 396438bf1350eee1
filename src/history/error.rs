use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History feed error: {0}")]
    Feed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Unsupported pending store version {0}")]
    UnsupportedVersion(u32),
}

impl HistoryError {
    pub fn code(&self) -> &'static str {
        match self {
            HistoryError::Feed(_) => "FEED_UNAVAILABLE",
            HistoryError::Io(_) => "STORE_IO",
            HistoryError::Serde(_) => "STORE_SERDE",
            HistoryError::UnsupportedVersion(_) => "STORE_VERSION",
        }
    }
}
