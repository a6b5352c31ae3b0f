/// Error types for the feed pipeline and the user store
use thiserror::Error;

/// Errors raised while subscribing to a feed or applying a payload to a table
#[derive(Debug, Error)]
pub enum FeedError {
    /// Payload was not JSON or not an array of `{email, password}` objects
    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// Transport-level failure while connecting or reading the stream
    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// Server answered the subscription request with a non-success status
    #[error("Unexpected status from feed: {0}")]
    UnexpectedStatus(u16),

    /// Server answered with something other than an event stream
    #[error("Unexpected content type from feed: {0}")]
    UnexpectedContentType(String),

    /// Render target has no header row to preserve
    #[error("Render target has no header row")]
    MissingHeader,

    /// Subscription was already opened once
    #[error("Subscription already started")]
    AlreadySubscribed,
}

/// Errors raised by the user store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read users file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Users file {path} is not a JSON array of records: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to persist users file: {0}")]
    Persist(#[from] std::io::Error),

    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}
