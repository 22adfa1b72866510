//! Email delivery: the transport seam and its SMTP implementation.

pub mod smtp;

use crate::error::Result;
use crate::model::message::OutgoingMessage;

/// Provider-assigned result of a successful send.
#[derive(Debug, Clone, Default)]
pub struct SendOutcome {
    /// Provider response detail (SMTP status line, message id, ...).
    pub detail: String,
}

/// Capability to deliver an [`OutgoingMessage`].
///
/// Instances are caller-owned: construct one up front and reuse it across
/// invocations. Failures carry the provider's message unmodified.
pub trait EmailTransport {
    /// Deliver the message, returning the provider's result.
    fn send(&self, message: &OutgoingMessage) -> Result<SendOutcome>;
}
