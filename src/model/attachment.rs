//! File attachments extracted from a form submission.

/// Fallback name for file parts that declare no filename.
pub const DEFAULT_FILENAME: &str = "attachment";

/// Fallback media type for file parts that declare no content type.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A single uploaded file, owned by the submission that produced it.
///
/// Immutable once constructed. The composer reads it but never mutates or
/// re-interprets the bytes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Attachment {
    /// Declared filename, or [`DEFAULT_FILENAME`] if the part omitted one.
    pub filename: String,

    /// Declared media type (e.g. `"image/jpeg"`), or
    /// [`DEFAULT_CONTENT_TYPE`] if the part omitted one.
    pub content_type: String,

    /// Raw bytes, exactly as read from the part body.
    pub content: Vec<u8>,
}

impl Attachment {
    /// Build an attachment, applying the fallback filename and media type.
    pub fn new(
        filename: Option<String>,
        content_type: Option<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
            content_type: content_type
                .filter(|ct| !ct.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            content,
        }
    }

    /// Size of the attachment content in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// `true` if the attachment carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
