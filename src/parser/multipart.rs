//! Streaming multipart/form-data decoder.
//!
//! Splits a request body on its boundary delimiters in a single sequential
//! pass. Tolerant of:
//!
//! - Mixed `\n` and `\r\n` line endings in part header blocks
//! - Transport padding (spaces, tabs) after a boundary delimiter
//! - Arbitrary preamble before the first delimiter and epilogue after the
//!   terminal one
//! - NUL bytes and other binary content in file part bodies

use std::collections::HashMap;

use crate::error::{RelayError, Result};
use crate::model::attachment::Attachment;
use crate::model::submission::ParsedSubmission;

/// Seam for substituting another multipart implementation.
///
/// The built-in [`FormDataParser`] satisfies it with the hand-rolled
/// decoder below; any concrete parser library can be adapted to it.
pub trait MultipartParser {
    /// Decode a complete body against the declared boundary.
    fn parse(&self, body: &[u8], boundary: &str) -> Result<ParsedSubmission>;
}

/// The built-in multipart/form-data parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormDataParser;

impl MultipartParser for FormDataParser {
    fn parse(&self, body: &[u8], boundary: &str) -> Result<ParsedSubmission> {
        decode(body, boundary)
    }
}

/// Accumulates body chunks in arrival order for one decode call.
///
/// The buffer lives exactly as long as the decode: it is consumed by
/// [`finish`](FormDataDecoder::finish) and dropped with it on failure.
#[derive(Debug)]
pub struct FormDataDecoder {
    boundary: String,
    buffer: Vec<u8>,
}

impl FormDataDecoder {
    /// Create a decoder for the given boundary token (without the leading
    /// `--`).
    pub fn new(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            buffer: Vec::new(),
        }
    }

    /// Append the next body chunk.
    pub fn push_chunk(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Run the decode pass over everything pushed so far.
    pub fn finish(self) -> Result<ParsedSubmission> {
        decode(&self.buffer, &self.boundary)
    }
}

/// Decode a complete `multipart/form-data` body.
///
/// Parts without a `filename` parameter become text fields (last write wins
/// on duplicate names); parts with one become [`Attachment`]s in body
/// order. Attachment bytes are copied verbatim, never interpreted.
pub fn decode(body: &[u8], boundary: &str) -> Result<ParsedSubmission> {
    let delimiter = format!("--{boundary}").into_bytes();

    // Skip any preamble before the first delimiter.
    let first = find_bytes(body, &delimiter).ok_or_else(|| {
        RelayError::MalformedMultipart(format!("boundary '{boundary}' not found in body"))
    })?;
    let mut cursor = first + delimiter.len();

    let mut fields: HashMap<String, String> = HashMap::new();
    let mut attachments: Vec<Attachment> = Vec::new();

    loop {
        // `--` right after a delimiter is the terminal marker; everything
        // after it is epilogue and is ignored.
        if body[cursor..].starts_with(b"--") {
            break;
        }
        cursor = skip_line_break(body, cursor)?;

        let (part, next) = next_part(body, cursor, &delimiter)?;
        cursor = next;

        let (headers, part_body) = split_part(part)?;
        let disposition = get_header(&headers, "content-disposition").ok_or_else(|| {
            RelayError::MalformedMultipart("part missing Content-Disposition header".into())
        })?;
        let name = header_param(&disposition, "name").ok_or_else(|| {
            RelayError::MalformedMultipart("Content-Disposition missing name parameter".into())
        })?;

        match header_param(&disposition, "filename") {
            None => {
                // Text field. Last write wins on duplicate names.
                fields.insert(name, decode_text(part_body));
            }
            Some(filename) => {
                let content_type = get_header(&headers, "content-type")
                    .map(|ct| ct.split(';').next().unwrap_or("").trim().to_string());

                // Explicit accumulator owned by this decode call; chunks
                // arrive in body order and are appended verbatim.
                let mut content = Vec::with_capacity(part_body.len());
                content.extend_from_slice(part_body);

                attachments.push(Attachment::new(
                    Some(filename).filter(|f| !f.is_empty()),
                    content_type,
                    content,
                ));
            }
        }
    }

    Ok(ParsedSubmission {
        fields,
        attachments,
    })
}

/// Position the cursor after the line break that closes a delimiter line.
///
/// Transport padding (spaces, tabs) between the delimiter and the line
/// break is allowed per RFC 2046 §5.1.1.
fn skip_line_break(body: &[u8], mut cursor: usize) -> Result<usize> {
    while body.get(cursor) == Some(&b' ') || body.get(cursor) == Some(&b'\t') {
        cursor += 1;
    }
    if body[cursor..].starts_with(b"\r\n") {
        Ok(cursor + 2)
    } else if body[cursor..].starts_with(b"\n") {
        Ok(cursor + 1)
    } else {
        Err(RelayError::MalformedMultipart(
            "expected line break after boundary delimiter".into(),
        ))
    }
}

/// Extract the part starting at `cursor` and the cursor position after the
/// delimiter that closes it.
///
/// The line break preceding the closing delimiter belongs to the delimiter
/// syntax, not to the part body.
fn next_part<'a>(body: &'a [u8], cursor: usize, delimiter: &[u8]) -> Result<(&'a [u8], usize)> {
    let mut crlf_delim = Vec::with_capacity(delimiter.len() + 2);
    crlf_delim.extend_from_slice(b"\r\n");
    crlf_delim.extend_from_slice(delimiter);

    let region = &body[cursor..];
    if let Some(pos) = find_bytes(region, &crlf_delim) {
        return Ok((&region[..pos], cursor + pos + crlf_delim.len()));
    }

    // LF-only fallback for non-conforming producers.
    let mut lf_delim = Vec::with_capacity(delimiter.len() + 1);
    lf_delim.extend_from_slice(b"\n");
    lf_delim.extend_from_slice(delimiter);
    if let Some(pos) = find_bytes(region, &lf_delim) {
        return Ok((&region[..pos], cursor + pos + lf_delim.len()));
    }

    Err(RelayError::MalformedMultipart(
        "missing terminal boundary marker".into(),
    ))
}

/// Split a part into its header block and body at the first blank line.
fn split_part(part: &[u8]) -> Result<(Vec<(String, String)>, &[u8])> {
    let (header_end, sep_len) = match (find_bytes(part, b"\r\n\r\n"), find_bytes(part, b"\n\n")) {
        (Some(crlf), Some(lf)) if lf < crlf => (lf, 2),
        (Some(crlf), _) => (crlf, 4),
        (None, Some(lf)) => (lf, 2),
        (None, None) => {
            return Err(RelayError::MalformedMultipart(
                "part has no header/body separator".into(),
            ))
        }
    };

    let headers = parse_part_headers(&part[..header_end]);
    Ok((headers, &part[header_end + sep_len..]))
}

/// Parse a part header block into `(lowercase_name, raw_value)` pairs.
///
/// Continuation lines (starting with space or tab) are joined with the
/// previous header.
fn parse_part_headers(block: &[u8]) -> Vec<(String, String)> {
    let text = String::from_utf8_lossy(block);
    let mut result: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = result.last_mut() {
                last.1.push(' ');
                last.1.push_str(line.trim());
            }
        } else if let Some(colon_pos) = line.find(':') {
            let name = line[..colon_pos].trim().to_lowercase();
            let value = line[colon_pos + 1..].trim().to_string();
            result.push((name, value));
        }
        // Lines without a colon and not a continuation are silently skipped
    }

    result
}

/// Get the first value for a header name (case-insensitive).
fn get_header(headers: &[(String, String)], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
}

/// Extract a parameter from a structured header value such as
/// `form-data; name="email"; filename="a.txt"`.
fn header_param(value: &str, key: &str) -> Option<String> {
    for segment in value.split(';') {
        let Some((k, v)) = segment.split_once('=') else {
            continue;
        };
        if k.trim().eq_ignore_ascii_case(key) {
            return Some(v.trim().trim_matches('"').to_string());
        }
    }
    None
}

/// Decode field body bytes to text.
///
/// Tries UTF-8 first, then falls back to WINDOWS-1252 (which accepts every
/// byte).
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Find the first occurrence of `needle` in `haystack`.
fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "----WebKitFormBoundaryX7Yq";

    fn field_part(name: &str, value: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
    }

    fn file_part(name: &str, filename: &str, content_type: &str, content: &[u8]) -> Vec<u8> {
        let mut part = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        part.extend_from_slice(content);
        part.extend_from_slice(b"\r\n");
        part
    }

    fn terminal() -> String {
        format!("--{BOUNDARY}--\r\n")
    }

    #[test]
    fn test_fields_and_files() {
        let mut body = Vec::new();
        body.extend_from_slice(field_part("name", "Juan Perez").as_bytes());
        body.extend_from_slice(field_part("email", "juan@example.com").as_bytes());
        body.extend_from_slice(&file_part(
            "files",
            "prueba.txt",
            "text/plain",
            b"Contenido de prueba\nLinea 2\n",
        ));
        body.extend_from_slice(&file_part(
            "files",
            "imagen.jpg",
            "image/jpeg",
            &[0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x43],
        ));
        body.extend_from_slice(terminal().as_bytes());

        let submission = decode(&body, BOUNDARY).unwrap();
        assert_eq!(submission.fields.len(), 2);
        assert_eq!(submission.field("name"), Some("Juan Perez"));
        assert_eq!(submission.field("email"), Some("juan@example.com"));

        assert_eq!(submission.attachments.len(), 2);
        assert_eq!(submission.attachments[0].filename, "prueba.txt");
        assert_eq!(submission.attachments[0].content_type, "text/plain");
        assert_eq!(
            submission.attachments[0].content,
            b"Contenido de prueba\nLinea 2\n"
        );
        assert_eq!(submission.attachments[1].filename, "imagen.jpg");
        assert_eq!(
            submission.attachments[1].content,
            vec![0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x43]
        );
    }

    #[test]
    fn test_duplicate_field_last_value_wins() {
        let mut body = String::new();
        body.push_str(&field_part("promo", "true"));
        body.push_str(&field_part("promo", "false"));
        body.push_str(&terminal());

        let submission = decode(body.as_bytes(), BOUNDARY).unwrap();
        assert_eq!(submission.fields.len(), 1);
        assert_eq!(submission.field("promo"), Some("false"));
    }

    #[test]
    fn test_file_without_content_type_defaults() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"f\"; filename=\"blob\"\r\n\r\nabc\r\n{}",
            terminal()
        );
        let submission = decode(body.as_bytes(), BOUNDARY).unwrap();
        assert_eq!(
            submission.attachments[0].content_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn test_chunked_input_preserves_bytes() {
        let mut body = Vec::new();
        body.extend_from_slice(field_part("name", "Ana").as_bytes());
        body.extend_from_slice(&file_part("f", "raw.bin", "application/octet-stream", &[0u8; 300]));
        body.extend_from_slice(terminal().as_bytes());

        // Feed the same body in uneven chunks; the result must be identical.
        let mut decoder = FormDataDecoder::new(BOUNDARY);
        for chunk in body.chunks(7) {
            decoder.push_chunk(chunk);
        }
        let chunked = decoder.finish().unwrap();
        let whole = decode(&body, BOUNDARY).unwrap();

        assert_eq!(chunked.fields, whole.fields);
        assert_eq!(chunked.attachments, whole.attachments);
        assert_eq!(chunked.attachments[0].content.len(), 300);
    }

    #[test]
    fn test_epilogue_after_terminal_is_ignored() {
        let mut body = String::new();
        body.push_str(&field_part("name", "Juan"));
        body.push_str(&terminal());
        body.push_str("this trailing garbage is not part of the form");

        let submission = decode(body.as_bytes(), BOUNDARY).unwrap();
        assert_eq!(submission.fields.len(), 1);
        assert!(submission.attachments.is_empty());
    }

    #[test]
    fn test_preamble_before_first_delimiter_is_ignored() {
        let mut body = String::from("preamble text\r\n");
        body.push_str(&field_part("name", "Juan"));
        body.push_str(&terminal());

        let submission = decode(body.as_bytes(), BOUNDARY).unwrap();
        assert_eq!(submission.field("name"), Some("Juan"));
    }

    #[test]
    fn test_lf_only_line_endings() {
        let body = format!(
            "--{BOUNDARY}\nContent-Disposition: form-data; name=\"a\"\n\n1\n--{BOUNDARY}--\n"
        );
        let submission = decode(body.as_bytes(), BOUNDARY).unwrap();
        assert_eq!(submission.field("a"), Some("1"));
    }

    #[test]
    fn test_missing_boundary_is_malformed() {
        let err = decode(b"no delimiters here", BOUNDARY).unwrap_err();
        assert!(matches!(err, RelayError::MalformedMultipart(_)));
    }

    #[test]
    fn test_missing_terminal_marker_is_malformed() {
        let body = field_part("name", "Juan");
        let err = decode(body.as_bytes(), BOUNDARY).unwrap_err();
        assert!(matches!(err, RelayError::MalformedMultipart(_)));
    }

    #[test]
    fn test_missing_name_parameter_is_malformed() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data\r\n\r\nvalue\r\n{}",
            terminal()
        );
        let err = decode(body.as_bytes(), BOUNDARY).unwrap_err();
        assert!(matches!(err, RelayError::MalformedMultipart(_)));
    }

    #[test]
    fn test_missing_disposition_is_malformed() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Type: text/plain\r\n\r\nvalue\r\n{}",
            terminal()
        );
        let err = decode(body.as_bytes(), BOUNDARY).unwrap_err();
        assert!(matches!(err, RelayError::MalformedMultipart(_)));
    }

    #[test]
    fn test_non_utf8_field_falls_back_to_windows_1252() {
        // 0xF1 is ñ in WINDOWS-1252 but invalid standalone UTF-8.
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(&[b'n', 0xF1, b'u']);
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(terminal().as_bytes());

        let submission = decode(&body, BOUNDARY).unwrap();
        assert_eq!(submission.field("name"), Some("nñu"));
    }

    #[test]
    fn test_folded_header_is_unfolded() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data;\r\n\tname=\"folded\"\r\n\r\nv\r\n{}",
            terminal()
        );
        let submission = decode(body.as_bytes(), BOUNDARY).unwrap();
        assert_eq!(submission.field("folded"), Some("v"));
    }
}
