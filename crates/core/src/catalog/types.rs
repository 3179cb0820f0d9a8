//! Types for the file catalog (stored payloads and media records).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored file in the categorized storage tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Row id.
    pub id: i64,
    /// Name on disk (timestamp-prefixed).
    pub stored_name: String,
    /// Name the payload arrived with.
    pub original_name: String,
    /// Storage category bucket (e.g. "videos").
    pub category: String,
    /// When the file was filed.
    pub uploaded_at: DateTime<Utc>,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Owner.
    pub user_id: String,
}

/// A new file row, before it has an id.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub stored_name: String,
    pub original_name: String,
    pub category: String,
    pub size_bytes: u64,
    pub user_id: String,
}

/// A media record a search or download is anchored to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Original-language title, when distinct from the display title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    /// Release year, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Owner.
    pub user_id: String,
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_record_serialization() {
        let record = FileRecord {
            id: 7,
            stored_name: "20250101120000_movie.mkv".to_string(),
            original_name: "movie.mkv".to_string(),
            category: "videos".to_string(),
            uploaded_at: Utc::now(),
            size_bytes: 1024,
            user_id: "anonymous".to_string(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: FileRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, 7);
        assert_eq!(parsed.category, "videos");
    }

    #[test]
    fn test_media_record_skips_absent_fields() {
        let record = MediaRecord {
            id: 1,
            title: "Three Seconds".to_string(),
            original_title: None,
            year: None,
            user_id: "anonymous".to_string(),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("original_title"));
        assert!(!json.contains("year"));
    }
}
