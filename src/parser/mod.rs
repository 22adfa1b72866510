//! Request parsing: content-type validation and multipart/form-data decoding.

pub mod content_type;
pub mod multipart;
