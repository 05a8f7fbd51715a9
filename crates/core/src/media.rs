//! Source video validation.
//!
//! Uploads are checked before any transcode or network call: the declared
//! MIME type must be an accepted video container and the payload must
//! carry a matching container signature. Rejection is cheap and local.

use crate::error::CoreError;

/// The only accepted container MIME type.
pub const ACCEPTED_MIME: &str = "video/mp4";

/// File extension expected for accepted uploads.
pub const ACCEPTED_EXTENSION: &str = "mp4";

/// Minimum title length enforced at publish time.
pub const MIN_TITLE_LEN: usize = 3;

/// Maximum title length enforced at publish time.
pub const MAX_TITLE_LEN: usize = 255;

/// Check whether `content_type` is the accepted video container type.
///
/// MIME parameters (e.g. `video/mp4; codecs=...`) are tolerated.
pub fn is_accepted_mime(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|t| t.eq_ignore_ascii_case(ACCEPTED_MIME))
}

/// Check whether `data` begins with an ISO BMFF (`ftyp`) box header.
///
/// MP4 files start with a 4-byte box size followed by the literal
/// `ftyp`. This is a signature sniff, not a full container parse.
pub fn has_mp4_signature(data: &[u8]) -> bool {
    data.len() >= 12 && &data[4..8] == b"ftyp"
}

/// Validate an incoming source video's declared type and payload.
///
/// Returns `Validation` errors naming the rejected aspect; callers map
/// these to the `UnsupportedMedia` taxonomy.
pub fn validate_source(content_type: &str, data: &[u8]) -> Result<(), CoreError> {
    if !is_accepted_mime(content_type) {
        return Err(CoreError::Validation(format!(
            "Unsupported media type '{content_type}'. Expected {ACCEPTED_MIME}"
        )));
    }
    if !has_mp4_signature(data) {
        return Err(CoreError::Validation(
            "Payload is not a valid MP4 container".to_string(),
        ));
    }
    Ok(())
}

/// Validate a clip title.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.len() < MIN_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be at least {MIN_TITLE_LEN} characters"
        )));
    }
    if trimmed.len() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must not exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Derive a default title from an uploaded file name (name minus its
/// final extension).
pub fn default_title(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    /// A minimal buffer carrying the `ftyp` signature.
    fn mp4_bytes() -> Vec<u8> {
        let mut data = vec![0x00, 0x00, 0x00, 0x18];
        data.extend_from_slice(b"ftypisom");
        data.extend_from_slice(&[0u8; 16]);
        data
    }

    #[test]
    fn accepts_plain_mp4_mime() {
        assert!(is_accepted_mime("video/mp4"));
        assert!(is_accepted_mime("VIDEO/MP4"));
        assert!(is_accepted_mime("video/mp4; codecs=\"avc1\""));
    }

    #[test]
    fn rejects_other_mimes() {
        assert!(!is_accepted_mime("video/webm"));
        assert!(!is_accepted_mime("image/png"));
        assert!(!is_accepted_mime(""));
    }

    #[test]
    fn sniffs_ftyp_signature() {
        assert!(has_mp4_signature(&mp4_bytes()));
        assert!(!has_mp4_signature(b"RIFF....WEBP"));
        assert!(!has_mp4_signature(b"short"));
    }

    #[test]
    fn validate_source_accepts_matching_pair() {
        assert!(validate_source("video/mp4", &mp4_bytes()).is_ok());
    }

    #[test]
    fn validate_source_rejects_wrong_mime() {
        let err = validate_source("video/webm", &mp4_bytes()).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn validate_source_rejects_wrong_payload() {
        let err = validate_source("video/mp4", b"not a video").unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn title_length_bounds() {
        assert!(validate_title("My Clip").is_ok());
        assert_matches!(validate_title("ab"), Err(CoreError::Validation(_)));
        assert_matches!(
            validate_title(&"x".repeat(MAX_TITLE_LEN + 1)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn default_title_strips_extension() {
        assert_eq!(default_title("demo.mp4"), "demo");
        assert_eq!(default_title("archive.tar.mp4"), "archive.tar");
        assert_eq!(default_title("noextension"), "noextension");
        assert_eq!(default_title(".hidden"), ".hidden");
    }
}
