//! `Content-Type` header validation and boundary extraction.

use crate::error::{RelayError, Result};

/// Extract the boundary parameter from a `multipart/form-data` content type.
///
/// Accepts quoted and unquoted boundary values:
///
/// - `multipart/form-data; boundary=----WebKitFormBoundaryX`
/// - `multipart/form-data; boundary="compound value"`
///
/// Any other media type, or a `multipart/form-data` without a boundary,
/// fails with [`RelayError::InvalidContentType`].
pub fn boundary_from_content_type(value: &str) -> Result<String> {
    let mut segments = value.split(';');

    let media_type = segments.next().unwrap_or("").trim().to_lowercase();
    if media_type != "multipart/form-data" {
        return Err(RelayError::InvalidContentType);
    }

    for segment in segments {
        let Some((key, val)) = segment.split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("boundary") {
            let boundary = val.trim().trim_matches('"');
            if boundary.is_empty() {
                return Err(RelayError::InvalidContentType);
            }
            return Ok(boundary.to_string());
        }
    }

    Err(RelayError::InvalidContentType)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_boundary() {
        let boundary =
            boundary_from_content_type("multipart/form-data; boundary=----WebKitFormBoundaryabc")
                .unwrap();
        assert_eq!(boundary, "----WebKitFormBoundaryabc");
    }

    #[test]
    fn test_quoted_boundary() {
        let boundary =
            boundary_from_content_type("multipart/form-data; boundary=\"compound value\"").unwrap();
        assert_eq!(boundary, "compound value");
    }

    #[test]
    fn test_case_insensitive_media_type() {
        let boundary =
            boundary_from_content_type("Multipart/Form-Data; charset=utf-8; Boundary=xyz").unwrap();
        assert_eq!(boundary, "xyz");
    }

    #[test]
    fn test_rejects_other_media_types() {
        assert!(matches!(
            boundary_from_content_type("application/json"),
            Err(RelayError::InvalidContentType)
        ));
        assert!(matches!(
            boundary_from_content_type("text/plain; boundary=x"),
            Err(RelayError::InvalidContentType)
        ));
    }

    #[test]
    fn test_rejects_missing_or_empty_boundary() {
        assert!(boundary_from_content_type("multipart/form-data").is_err());
        assert!(boundary_from_content_type("multipart/form-data; boundary=").is_err());
        assert!(boundary_from_content_type("multipart/form-data; boundary=\"\"").is_err());
    }
}
