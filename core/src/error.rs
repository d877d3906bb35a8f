//! Error types for the GhostBin client.
//!
//! # Design
//! One variant per failure class so callers can match on the kind instead of
//! digging through a message. Submission failures carry the `PasteForm` that
//! was sent, since the server's rejection text usually refers to one of its
//! fields.

use thiserror::Error;

use crate::client::PasteForm;

/// Errors returned by `GhostbinClient` and `Transport` implementations.
#[derive(Debug, Error)]
pub enum GhostbinError {
    /// No response was obtained: DNS, refused connection, timeout, or a body
    /// that could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// The response body was longer than the configured limit.
    #[error("response body exceeds the {limit} byte limit")]
    BodyTooLarge { limit: u64 },

    /// A non-success status on paste retrieval or catalog fetch.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The server answered `400 Bad Request` to a paste submission.
    #[error("bad request: {body}")]
    Validation { body: String, fields: PasteForm },

    /// A paste submission got neither `303` nor `400`.
    #[error("unexpected response from server (HTTP {status}): {body}")]
    UnexpectedResponse {
        status: u16,
        body: String,
        fields: PasteForm,
    },

    /// The server's response did not have the expected shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("invalid {argument}: {value:?}")]
    InvalidArgument { argument: &'static str, value: String },

    /// An operation needs state that has not been established yet.
    #[error("{0}")]
    State(String),
}

pub type Result<T> = std::result::Result<T, GhostbinError>;
