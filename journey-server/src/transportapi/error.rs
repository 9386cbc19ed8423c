//! TransportAPI client error types.

/// Errors from the TransportAPI HTTP client.
///
/// Variants carry rendered messages rather than source errors so they
/// stay cheap to construct in tests and comparable in assertions. The
/// HTTP status the server reports for each comes from
/// [`TransportApiError::status`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportApiError {
    /// The upstream request timed out.
    #[error("Timeout from TransportAPI")]
    Timeout,

    /// The request failed before an HTTP response arrived.
    #[error("Request error from TransportAPI: {0}")]
    Transport(String),

    /// TransportAPI answered with a non-success status.
    #[error("TransportAPI returned HTTP {status}: {detail}")]
    UpstreamStatus { status: u16, detail: String },

    /// The response body could not be interpreted as a timetable.
    #[error("Malformed response from TransportAPI: {0}")]
    Malformed(String),

    /// Anything that does not fit the cases above.
    #[error("Unexpected error from TransportAPI: {0}")]
    Unexpected(String),
}

impl TransportApiError {
    /// HTTP status the server reports for this error.
    ///
    /// Upstream statuses pass through verbatim; everything else maps
    /// onto the gateway codes.
    pub fn status(&self) -> u16 {
        match self {
            TransportApiError::Timeout => 504,
            TransportApiError::Transport(_) => 502,
            TransportApiError::UpstreamStatus { status, .. } => *status,
            TransportApiError::Malformed(_) => 502,
            TransportApiError::Unexpected(_) => 500,
        }
    }
}

impl From<reqwest::Error> for TransportApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportApiError::Timeout
        } else {
            TransportApiError::Transport(err.to_string())
        }
    }
}
