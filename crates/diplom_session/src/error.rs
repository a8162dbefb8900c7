use diplom_engine::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid service address {address}: {reason}")]
    InvalidBaseUrl { address: String, reason: String },
    #[error("could not create http client: {0}")]
    Client(ClientError),
    #[error("a session must be created inside a tokio runtime")]
    NoRuntime,
}
