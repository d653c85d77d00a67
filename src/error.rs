use thiserror::Error;

/// Errors raised while collecting wallet metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("rpc error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote API answered with an error payload
    #[error("api error: {0}")]
    Api(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type MetricsResult<T> = std::result::Result<T, MetricsError>;
