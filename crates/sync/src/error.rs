use assetroom_core::error::CoreError;

/// Errors from the room sync layer.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The room server returned a non-2xx status code.
    #[error("Room server error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// Failed to establish a stream connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A message on an established stream could not be understood.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The backing hub or stream has gone away.
    #[error("Room sync closed")]
    Closed,

    /// The in-process hub refused the write.
    #[error(transparent)]
    Rejected(#[from] CoreError),
}
