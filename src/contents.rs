//! Content records returned by the contents, blob and readme endpoints

use base64::Engine;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{ApiError, Result};

/// One file or directory entry fetched from the repository.
///
/// Immutable once constructed. `content` is only present for single-file
/// fetches; directory-listing entries always carry `None`. Records resolved
/// through the blob path have no `name`, because the blob endpoint addresses
/// content by hash and returns no path information.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ContentFile {
    #[serde(default)]
    pub name: Option<String>,

    /// Content-addressed identifier; present on every entry
    pub sha: String,

    /// Base64-encoded payload, line-wrapped by the API
    #[serde(default)]
    pub content: Option<String>,

    /// Date of the most recent commit touching this path; populated for
    /// single-file fetches only
    #[serde(skip)]
    pub last_updated: Option<NaiveDate>,
}

impl ContentFile {
    /// Decode the base64 payload to UTF-8 text.
    ///
    /// Returns `Ok(None)` when there is no payload, which is the normal
    /// state for directory-listing entries.
    pub fn decoded_content(&self) -> Result<Option<String>> {
        let Some(content) = &self.content else {
            return Ok(None);
        };

        // The API wraps base64 at 60 columns; strip the newlines first.
        let stripped: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(stripped)
            .map_err(|e| ApiError::Decode {
                message: format!("Invalid base64 content: {}", e),
            })?;

        let text = String::from_utf8(bytes).map_err(|e| ApiError::Decode {
            message: format!("Content is not valid UTF-8: {}", e),
        })?;

        Ok(Some(text))
    }
}

/// The dual-shape result of a contents fetch: a single file or a directory
/// listing, never mixed.
#[derive(Debug, Clone, PartialEq)]
pub enum Contents {
    File(ContentFile),
    Dir(Vec<ContentFile>),
}

impl Contents {
    /// The single file, if this is a file result
    pub fn as_file(&self) -> Option<&ContentFile> {
        match self {
            Contents::File(file) => Some(file),
            Contents::Dir(_) => None,
        }
    }

    /// The directory entries, if this is a directory result
    pub fn as_dir(&self) -> Option<&[ContentFile]> {
        match self {
            Contents::File(_) => None,
            Contents::Dir(entries) => Some(entries),
        }
    }
}

/// Which endpoint ultimately produced the content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Path-addressed contents endpoint (subject to the size ceiling)
    Direct,
    /// Hash-addressed git blob endpoint
    Blob,
}

impl FetchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchKind::Direct => "contents",
            FetchKind::Blob => "blob",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with_content(content: Option<&str>) -> ContentFile {
        ContentFile {
            name: Some("readme.md".to_string()),
            sha: "abc123".to_string(),
            content: content.map(String::from),
            last_updated: None,
        }
    }

    #[test]
    fn test_decoded_content_round_trip() {
        // "hello world\n"
        let file = file_with_content(Some("aGVsbG8gd29ybGQK"));
        assert_eq!(
            file.decoded_content().unwrap(),
            Some("hello world\n".to_string())
        );
    }

    #[test]
    fn test_decoded_content_handles_line_wrapped_base64() {
        let file = file_with_content(Some("aGVsbG8g\nd29ybGQK\n"));
        assert_eq!(
            file.decoded_content().unwrap(),
            Some("hello world\n".to_string())
        );
    }

    #[test]
    fn test_decoded_content_none_for_listing_entries() {
        let file = file_with_content(None);
        assert_eq!(file.decoded_content().unwrap(), None);
    }

    #[test]
    fn test_decoded_content_rejects_invalid_base64() {
        let file = file_with_content(Some("not base64!!"));
        assert!(matches!(
            file.decoded_content(),
            Err(ApiError::Decode { .. })
        ));
    }

    #[test]
    fn test_deserialize_listing_entry_without_content() {
        let json = r#"{"name": "docs", "sha": "def456", "type": "dir"}"#;
        let file: ContentFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.name.as_deref(), Some("docs"));
        assert_eq!(file.sha, "def456");
        assert!(file.content.is_none());
        assert!(file.last_updated.is_none());
    }

    #[test]
    fn test_deserialize_blob_without_name() {
        let json = r#"{"sha": "def456", "content": "aGk=", "encoding": "base64"}"#;
        let file: ContentFile = serde_json::from_str(json).unwrap();
        assert!(file.name.is_none());
        assert_eq!(file.decoded_content().unwrap(), Some("hi".to_string()));
    }

    #[test]
    fn test_contents_shape_accessors() {
        let file = file_with_content(None);
        let single = Contents::File(file.clone());
        assert!(single.as_file().is_some());
        assert!(single.as_dir().is_none());

        let listing = Contents::Dir(vec![file]);
        assert!(listing.as_file().is_none());
        assert_eq!(listing.as_dir().unwrap().len(), 1);
    }

    #[test]
    fn test_fetch_kind_names() {
        assert_eq!(FetchKind::Direct.as_str(), "contents");
        assert_eq!(FetchKind::Blob.as_str(), "blob");
    }
}
