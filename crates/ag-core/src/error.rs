//! # ForumError
//!
//! Centralized error handling for the Agora client.
//! Every port returns these abstract outcomes; HTTP status codes never leak past the adapters.

use thiserror::Error;

/// Message shown when the server rejects a reply without explaining why.
pub const GENERIC_SUBMISSION_FAILURE: &str = "Failed to post reply.";

/// The primary error type for all ag-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForumError {
    /// The thread slug (or another resource) does not resolve. Not retried.
    #[error("{0} not found")]
    NotFound(String),

    /// No identity is signed in, or the server rejected the credential.
    #[error("sign in required")]
    Unauthenticated,

    /// The server (or a client-side check) rejected malformed input.
    #[error("{0}")]
    Validation(String),

    /// A reply could not be posted; the draft and reply target are kept.
    #[error("{0}")]
    SubmissionFailed(String),

    /// Transport failure or an undecodable response.
    #[error("network error: {0}")]
    Network(String),

    /// The server failed (5xx), possibly explaining why in its error body.
    #[error("server answered {status}{}", detail(.message))]
    Server { status: u16, message: Option<String> },

    /// Local persistence failure (e.g., the session file).
    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ForumError {
    /// Translates a failed create-comment call into what the caller sees.
    ///
    /// Any message the server supplied is kept verbatim, whatever the status;
    /// anything else becomes the generic message. `Unauthenticated` passes
    /// through so the caller can route to sign-in.
    pub fn into_submission_failure(self) -> Self {
        match self {
            ForumError::Unauthenticated => ForumError::Unauthenticated,
            ForumError::Validation(message) | ForumError::SubmissionFailed(message)
                if !message.trim().is_empty() =>
            {
                ForumError::SubmissionFailed(message)
            }
            ForumError::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => ForumError::SubmissionFailed(message),
            _ => ForumError::SubmissionFailed(GENERIC_SUBMISSION_FAILURE.to_string()),
        }
    }
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

/// A specialized Result type for Agora logic.
pub type Result<T> = std::result::Result<T, ForumError>;
