//! SMTP delivery via lettre's blocking client.

use lettre::address::Envelope;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use tracing::debug;

use super::{EmailTransport, SendOutcome};
use crate::config::SmtpConfig;
use crate::error::{RelayError, Result};
use crate::model::message::{OutgoingMessage, RawMessage, SimpleMessage};

/// SMTP-backed [`EmailTransport`].
///
/// Wraps a pooled lettre transport; cheap to reuse across invocations.
pub struct SmtpRelay {
    transport: SmtpTransport,
}

impl SmtpRelay {
    /// Connect settings from configuration. Credentials are optional to
    /// allow unauthenticated relays in local setups.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let mut builder = SmtpTransport::relay(&config.host)
            .map_err(|e| RelayError::Transport(e.to_string()))?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }

    fn send_simple(&self, simple: &SimpleMessage) -> Result<SendOutcome> {
        let from: Mailbox = parse_mailbox(&simple.from)?;
        let to: Mailbox = parse_mailbox(&simple.to)?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(simple.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(simple.html.clone())
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        let response = self
            .transport
            .send(&message)
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        Ok(outcome_from_response(&response))
    }

    fn send_raw(&self, raw: &RawMessage) -> Result<SendOutcome> {
        let from = parse_address(&raw.from)?;
        let mut destinations = Vec::with_capacity(raw.destinations.len());
        for destination in &raw.destinations {
            destinations.push(parse_address(destination)?);
        }

        let envelope = Envelope::new(Some(from), destinations)
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        debug!(bytes = raw.content.len(), "Sending raw MIME document");
        let response = self
            .transport
            .send_raw(&envelope, &raw.content)
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        Ok(outcome_from_response(&response))
    }
}

impl EmailTransport for SmtpRelay {
    fn send(&self, message: &OutgoingMessage) -> Result<SendOutcome> {
        match message {
            OutgoingMessage::Simple(simple) => self.send_simple(simple),
            OutgoingMessage::Raw(raw) => self.send_raw(raw),
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| RelayError::Transport(format!("invalid address '{address}': {e}")))
}

fn parse_address(address: &str) -> Result<Address> {
    address
        .parse()
        .map_err(|e| RelayError::Transport(format!("invalid address '{address}': {e}")))
}

fn outcome_from_response(response: &lettre::transport::smtp::response::Response) -> SendOutcome {
    SendOutcome {
        detail: response.message().collect::<Vec<_>>().join(" "),
    }
}
