use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The sidecar link is gone (shut down, logged out, or never came up).
    #[error("sidecar link closed")]
    Closed,

    /// The sidecar acknowledged a send with a failure.
    #[error("sidecar rejected send: {reason}")]
    Rejected { reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
