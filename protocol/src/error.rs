use thiserror::Error;

/// Failures turning received bytes into a helper response.
///
/// Transport-level failures (connect, read, write) are not represented here;
/// they stay `std::io::Error` in the client crate.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The stream ended before the 4-byte length prefix of a framed result
    /// had fully arrived.
    #[error("no result returned: stream closed before a length prefix arrived")]
    TruncatedHeader {
        /// Prefix bytes received so far, less than [`crate::LEN_PREFIX`].
        received: usize,
    },

    /// The stream ended while the frame body was still incomplete.
    #[error("no result returned: stream closed after {received} of {expected} body bytes")]
    TruncatedFrame { expected: usize, received: usize },

    /// The helper closed the connection without acknowledging a request that
    /// requires an acknowledgement.
    #[error("helper closed the connection before acknowledging the request")]
    MissingAck,

    /// The helper closed the connection without sending any response line.
    #[error("helper closed the connection without sending a response")]
    EmptyResponse,

    /// A textual payload was not valid UTF-8.
    #[error("helper response was not valid UTF-8: {0}")]
    NonUtf8Payload(#[from] std::string::FromUtf8Error),

    /// A response line did not parse as JSON-RPC.
    #[error("malformed JSON-RPC response: {0}")]
    Json(#[from] serde_json::Error),
}
