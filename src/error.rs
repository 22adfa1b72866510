//! Centralized error types for formrelay.

use thiserror::Error;

/// All errors produced by the formrelay library.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The trigger event carried no body.
    #[error("No body received")]
    MissingBody,

    /// The request content type is missing, is not `multipart/form-data`,
    /// or lacks a boundary parameter.
    #[error("Invalid content-type")]
    InvalidContentType,

    /// The body could not be split on the declared boundary, or a part
    /// lacks required headers.
    #[error("Malformed multipart body: {0}")]
    MalformedMultipart(String),

    /// The sender or recipient address is empty at compose time.
    #[error("Empty sender or recipient address")]
    EmptyRecipient,

    /// The generated MIME boundary occurs inside the message content.
    #[error("Boundary token collides with message content")]
    BoundaryCollision,

    /// The email provider rejected the message or could not be reached.
    /// The provider's message is passed through unmodified.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Convenience alias for `Result<T, RelayError>`.
pub type Result<T> = std::result::Result<T, RelayError>;

impl RelayError {
    /// HTTP status code for the trigger response.
    ///
    /// Client-input faults map to 400. `EmptyRecipient` and
    /// `BoundaryCollision` indicate composer misuse rather than bad client
    /// input, so they map to 500 together with transport failures.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingBody | Self::InvalidContentType | Self::MalformedMultipart(_) => 400,
            Self::EmptyRecipient | Self::BoundaryCollision | Self::Transport(_) => 500,
        }
    }
}
