//! Trigger boundary: request/response types, the HTML summary, and the
//! handler orchestrating decode → compose → send.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{RelayError, Result};
use crate::mime::compose;
use crate::model::submission::ParsedSubmission;
use crate::parser::content_type::boundary_from_content_type;
use crate::parser::multipart::{FormDataParser, MultipartParser};
use crate::transport::{EmailTransport, SendOutcome};

/// Summary rows in render order: `(label, field name)`.
///
/// Mirrors the fields of the public contact form; a missing field renders
/// with an empty value.
const SUMMARY_FIELDS: &[(&str, &str)] = &[
    ("Nombre", "name"),
    ("Email", "email"),
    ("Teléfono", "phone"),
    ("Asunto", "subject"),
    ("Mensaje", "message"),
    ("Promo", "promo"),
    ("Reminders", "reminders"),
];

/// Response message for a delivered notification.
const MSG_SENT: &str = "Correo enviado correctamente";

/// One HTTP-shaped trigger event, as delivered by the hosting platform.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerRequest {
    /// Raw request body; possibly base64-encoded (see `is_base64_encoded`).
    pub body: Option<String>,

    /// Whether `body` must be base64-decoded before parsing.
    pub is_base64_encoded: bool,

    /// Request headers. Header name casing varies by platform, so lookups
    /// are case-insensitive.
    pub headers: HashMap<String, String>,
}

impl TriggerRequest {
    /// Case-insensitive `Content-Type` header lookup.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
    }
}

/// The JSON response handed back to the trigger.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    /// HTTP status code: 200 on success, 400 on bad input, 500 otherwise.
    pub status_code: u16,
    /// Always `application/json` with a permissive CORS header.
    pub headers: HashMap<String, String>,
    /// JSON-encoded `{"message": ...}` payload.
    pub body: String,
}

impl TriggerResponse {
    /// Build a response with the standard header set and a JSON message
    /// body.
    pub fn with_message(status_code: u16, message: &str) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());

        Self {
            status_code,
            headers,
            body: serde_json::json!({ "message": message }).to_string(),
        }
    }
}

/// Relays one contact-form submission per [`handle`](Handler::handle)
/// call.
///
/// Owns its collaborators explicitly: construct once, reuse across
/// invocations. There is no process-wide state.
pub struct Handler {
    parser: Box<dyn MultipartParser>,
    transport: Box<dyn EmailTransport>,
    config: Config,
}

impl Handler {
    /// Build a handler with the built-in multipart parser.
    pub fn new(transport: Box<dyn EmailTransport>, config: Config) -> Self {
        Self {
            parser: Box::new(FormDataParser),
            transport,
            config,
        }
    }

    /// Build a handler with a substitute multipart parser implementation.
    pub fn with_parser(
        parser: Box<dyn MultipartParser>,
        transport: Box<dyn EmailTransport>,
        config: Config,
    ) -> Self {
        Self {
            parser,
            transport,
            config,
        }
    }

    /// Process one trigger event end to end.
    ///
    /// Never panics and never returns an error: every failure path maps to
    /// a status code via [`RelayError::status_code`] and is logged exactly
    /// once here.
    pub fn handle(&self, request: &TriggerRequest) -> TriggerResponse {
        match self.process(request) {
            Ok(outcome) => {
                info!(detail = %outcome.detail, "Notification email sent");
                TriggerResponse::with_message(200, MSG_SENT)
            }
            Err(err) => {
                let status = err.status_code();
                if status >= 500 {
                    error!(status, error = %err, "Relay failed");
                } else {
                    warn!(status, error = %err, "Rejected submission");
                }
                TriggerResponse::with_message(status, &err.to_string())
            }
        }
    }

    fn process(&self, request: &TriggerRequest) -> Result<SendOutcome> {
        let body = request
            .body
            .as_deref()
            .filter(|b| !b.is_empty())
            .ok_or(RelayError::MissingBody)?;

        let content_type = request
            .content_type()
            .ok_or(RelayError::InvalidContentType)?;
        let boundary = boundary_from_content_type(content_type)?;

        let bytes = if request.is_base64_encoded {
            BASE64
                .decode(body.trim())
                .map_err(|e| RelayError::MalformedMultipart(format!("invalid base64 body: {e}")))?
        } else {
            body.as_bytes().to_vec()
        };

        let submission = self.parser.parse(&bytes, &boundary)?;
        info!(
            fields = submission.fields.len(),
            attachments = submission.attachments.len(),
            "Decoded form submission"
        );

        let html = render_summary(&submission);
        let message = compose::compose(
            &self.config.to_email,
            &self.config.notification_email,
            &self.config.subject,
            &html,
            &submission.attachments,
        )?;

        self.transport.send(&message)
    }
}

/// Render the HTML notification summary from the submission fields.
pub fn render_summary(submission: &ParsedSubmission) -> String {
    let mut html = String::from("<h2>Nuevo formulario recibido</h2>\n<ul>\n");
    for (label, field) in SUMMARY_FIELDS {
        let value = submission.field(field).unwrap_or_default();
        html.push_str(&format!("  <li><b>{label}:</b> {value}</li>\n"));
    }
    html.push_str("</ul>");
    html
}
