//! The result of decoding one multipart form submission.

use std::collections::HashMap;

use super::attachment::Attachment;

/// Fields and files recovered from one `multipart/form-data` body.
///
/// Scoped to a single request: produced by one decode call, consumed by the
/// same invocation, never persisted or cached.
#[derive(Debug, Clone, Default)]
pub struct ParsedSubmission {
    /// Text fields by name. Keys are unique; a duplicated name keeps the
    /// last value seen in the body. Order is irrelevant.
    pub fields: HashMap<String, String>,

    /// File attachments in their original body order.
    pub attachments: Vec<Attachment>,
}

impl ParsedSubmission {
    /// Look up a field value by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}
