//! Outgoing message representations handed to the email transport.

/// A transport-templated message without attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleMessage {
    /// Recipient address.
    pub to: String,
    /// Sender address.
    pub from: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

/// A fully pre-encoded MIME document plus its envelope.
///
/// The transport hands `content` to the provider verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Envelope sender address.
    pub from: String,
    /// Envelope destination addresses.
    pub destinations: Vec<String>,
    /// The complete MIME document, CRLF line endings included.
    pub content: Vec<u8>,
}

/// What the composer produces for one submission.
///
/// The variant is determined solely by whether the submission carried
/// attachments: none → [`Simple`](OutgoingMessage::Simple), one or more →
/// [`Raw`](OutgoingMessage::Raw).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutgoingMessage {
    /// Plain to/from/subject/html send request.
    Simple(SimpleMessage),
    /// Pre-assembled `multipart/mixed` MIME document.
    Raw(RawMessage),
}

impl OutgoingMessage {
    /// `true` for the [`Raw`](OutgoingMessage::Raw) variant.
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}
