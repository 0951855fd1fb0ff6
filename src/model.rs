//! Generated-file record model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Days a generated file stays retrievable before the external reaper may
/// delete it.
pub const FILE_TTL_DAYS: i64 = 7;

/// How the `content` field is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentEncoding {
    /// Raw UTF-8 text.
    Text,
    /// Base64-encoded binary.
    Base64,
}

/// A generated file persisted for later download.
///
/// Created exactly once per successful build; never mutated afterwards. The
/// store may substitute its own stable id on create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Opaque unique identifier.
    pub id: Uuid,
    /// Chat the file belongs to.
    pub chat_id: String,
    /// Owning user; the caller checks ownership before serving downloads.
    pub user_id: String,
    /// File name including extension.
    pub file_name: String,
    /// MIME type resolved from the extension.
    pub content_type: String,
    /// Payload, raw text or base64 depending on `content_encoding`.
    pub content: String,
    /// Encoding of `content`.
    pub content_encoding: ContentEncoding,
    /// Decoded payload length in bytes.
    pub size: u64,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Expiry timestamp, always `created_on` + 7 days.
    pub expires_on: DateTime<Utc>,
}

impl GeneratedFile {
    /// Create a record with a fresh id and the standard expiry.
    pub fn new(
        chat_id: impl Into<String>,
        user_id: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        content: String,
        content_encoding: ContentEncoding,
        size: u64,
    ) -> Self {
        let created_on = Utc::now();
        Self {
            id: Uuid::new_v4(),
            chat_id: chat_id.into(),
            user_id: user_id.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            content,
            content_encoding,
            size,
            created_on,
            expires_on: created_on + Duration::days(FILE_TTL_DAYS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_is_exactly_seven_days() {
        let file = GeneratedFile::new(
            "chat-1",
            "user-1",
            "rapport.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "QUJD".to_string(),
            ContentEncoding::Base64,
            3,
        );
        assert_eq!(file.expires_on - file.created_on, Duration::days(7));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = GeneratedFile::new("c", "u", "a.txt", "text/plain", String::new(), ContentEncoding::Text, 0);
        let b = GeneratedFile::new("c", "u", "b.txt", "text/plain", String::new(), ContentEncoding::Text, 0);
        assert_ne!(a.id, b.id);
    }
}
