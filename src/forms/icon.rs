use base64::prelude::*;
use thiserror::Error;

use crate::api::IconType;

/// Uploads of this size or larger are refused.
pub const MAX_ICON_BYTES: usize = 2 * 1024 * 1024;

/// Icon attached to a category form: the stored URL of an existing icon or
/// the data URI of a fresh upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub source: String,
    pub icon_type: IconType,
}

impl Icon {
    pub fn new(source: impl Into<String>, icon_type: IconType) -> Self {
        Self {
            source: source.into(),
            icon_type,
        }
    }

    pub fn is_upload(&self) -> bool {
        self.source.starts_with("data:")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IconRejection {
    #[error("Please upload only SVG or PNG files")]
    UnsupportedType(String),
    #[error("File size must be less than 2MB")]
    TooLarge(usize),
}

/// Icon type of an upload with the given content type.
pub fn upload_type(content_type: &str) -> Result<IconType, IconRejection> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    IconType::from_mime(&essence).ok_or(IconRejection::UnsupportedType(essence))
}

/// Checks an uploaded file and encodes it for transmission.
///
/// Only `image/svg+xml` and `image/png` are accepted; the type is checked
/// before the size.
pub fn accept_icon(content_type: &str, bytes: &[u8]) -> Result<Icon, IconRejection> {
    let icon_type = upload_type(content_type)?;
    if bytes.len() >= MAX_ICON_BYTES {
        return Err(IconRejection::TooLarge(bytes.len()));
    }
    let source = format!(
        "data:{};base64,{}",
        icon_type.mime(),
        BASE64_STANDARD.encode(bytes)
    );
    Ok(Icon { source, icon_type })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn png_becomes_data_uri() {
        let icon = accept_icon("image/png", PNG_MAGIC).unwrap();
        assert_eq!(icon.icon_type, IconType::Png);
        assert_eq!(icon.source, "data:image/png;base64,iVBORw0KGgo=");
        assert!(icon.is_upload());
    }

    #[test]
    fn svg_with_parameters_is_accepted() {
        let icon = accept_icon("image/svg+xml; charset=utf-8", b"<svg/>").unwrap();
        assert_eq!(icon.icon_type, IconType::Svg);
        assert!(icon.source.starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn other_types_are_rejected() {
        for mime in ["image/jpeg", "image/gif", "application/octet-stream", "text/plain", ""] {
            let err = accept_icon(mime, b"data").unwrap_err();
            assert!(matches!(err, IconRejection::UnsupportedType(_)), "{mime}");
            assert_eq!(err.to_string(), "Please upload only SVG or PNG files");
        }
    }

    #[test]
    fn two_megabytes_is_too_large() {
        let exactly = vec![0u8; MAX_ICON_BYTES];
        assert_eq!(
            accept_icon("image/png", &exactly),
            Err(IconRejection::TooLarge(MAX_ICON_BYTES))
        );
        let just_under = vec![0u8; MAX_ICON_BYTES - 1];
        assert!(accept_icon("image/png", &just_under).is_ok());

        // oversized files of the wrong type are refused too
        let huge = vec![0u8; MAX_ICON_BYTES + 10];
        assert!(accept_icon("image/jpeg", &huge).is_err());
    }
}
