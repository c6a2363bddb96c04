//! Error types for remote persistence and credential handling.
//!
//! None of these reach the simulation core. The worker logs them and
//! reports a degraded outcome instead.

/// Errors from the persistence service or the token endpoint.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP request failed: {source}")]
    Http {
        /// The underlying transport error.
        #[from]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{operation} returned {status}: {body}")]
    Status {
        /// Which call failed.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// A response body did not have the expected shape.
    #[error("failed to decode {operation} response: {source}")]
    Decode {
        /// Which call failed.
        operation: &'static str,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// No credentials are available for the call.
    #[error("not signed in")]
    NotSignedIn,

    /// The credentials were rejected.
    #[error("credentials rejected: {reason}")]
    Unauthorized {
        /// Why the credentials were rejected.
        reason: String,
    },

    /// The request was refused as invalid.
    #[error("invalid request: {reason}")]
    Invalid {
        /// What was wrong with the request.
        reason: String,
    },

    /// The service could not be reached.
    #[error("service unavailable")]
    Unavailable,
}

/// Errors from the on-disk token store.
#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    /// Reading or writing the token file failed.
    #[error("token file I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The token file did not contain a valid token set.
    #[error("token file is malformed: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
