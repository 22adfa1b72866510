//! Mail composition: simple send requests and raw `multipart/mixed`
//! documents.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::{RelayError, Result};
use crate::mime::boundary;
use crate::model::attachment::Attachment;
use crate::model::message::{OutgoingMessage, RawMessage, SimpleMessage};

/// Hard wrap width for base64 bodies, per RFC 2045 §6.8. Some transports
/// reject or mangle unwrapped base64, so this is a correctness requirement.
const BASE64_LINE_WIDTH: usize = 76;

/// Build the outgoing message for one submission.
///
/// With no attachments the result is a [`SimpleMessage`]; with one or more
/// it is a [`RawMessage`] holding a complete `multipart/mixed` MIME
/// document with a freshly generated boundary.
///
/// Fails with [`RelayError::EmptyRecipient`] when `to` or `from` is empty.
pub fn compose(
    to: &str,
    from: &str,
    subject: &str,
    html: &str,
    attachments: &[Attachment],
) -> Result<OutgoingMessage> {
    if to.trim().is_empty() || from.trim().is_empty() {
        return Err(RelayError::EmptyRecipient);
    }

    if attachments.is_empty() {
        return Ok(OutgoingMessage::Simple(SimpleMessage {
            to: to.to_string(),
            from: from.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        }));
    }

    let token = boundary::generate();
    let content = build_raw(to, from, subject, html, attachments, &token)?;
    Ok(OutgoingMessage::Raw(RawMessage {
        from: from.to_string(),
        destinations: vec![to.to_string()],
        content,
    }))
}

/// Assemble the raw MIME document with the given boundary token.
///
/// Every line is CRLF-terminated. The HTML body is carried 7bit; each
/// attachment is base64-encoded and wrapped at [`BASE64_LINE_WIDTH`].
fn build_raw(
    to: &str,
    from: &str,
    subject: &str,
    html: &str,
    attachments: &[Attachment],
    token: &str,
) -> Result<Vec<u8>> {
    // The HTML body is the only payload carried unencoded, so it is the
    // only place a token collision is possible at all.
    if html.contains(token) {
        return Err(RelayError::BoundaryCollision);
    }

    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("From: {from}"));
    lines.push(format!("To: {to}"));
    lines.push(format!("Subject: {subject}"));
    lines.push("MIME-Version: 1.0".to_string());
    lines.push(format!("Content-Type: multipart/mixed; boundary=\"{token}\""));
    lines.push(String::new());

    // HTML part
    lines.push(format!("--{token}"));
    lines.push("Content-Type: text/html; charset=\"UTF-8\"".to_string());
    lines.push("Content-Transfer-Encoding: 7bit".to_string());
    lines.push(String::new());
    lines.push(html.to_string());
    lines.push(String::new());

    // Attachments, in input order
    for att in attachments {
        lines.push(format!("--{token}"));
        lines.push(format!(
            "Content-Type: {}; name=\"{}\"",
            att.content_type, att.filename
        ));
        lines.push("Content-Transfer-Encoding: base64".to_string());
        lines.push(format!(
            "Content-Disposition: attachment; filename=\"{}\"",
            att.filename
        ));
        lines.push(String::new());
        let encoded = BASE64.encode(&att.content);
        let bytes = encoded.as_bytes();
        for chunk in bytes.chunks(BASE64_LINE_WIDTH) {
            lines.push(String::from_utf8_lossy(chunk).into_owned());
        }
        lines.push(String::new());
    }

    lines.push(format!("--{token}--"));

    Ok(lines.join("\r\n").into_bytes())
}
