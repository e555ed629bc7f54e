use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("responder returned status {status}")]
    Status { status: reqwest::StatusCode },
}

pub type Result<T> = std::result::Result<T, Error>;
