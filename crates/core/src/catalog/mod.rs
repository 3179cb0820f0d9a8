//! File catalog - stored payload rows and the media records that
//! downloads are anchored to.

mod sqlite;
mod types;

pub use sqlite::SqliteCatalog;
pub use types::*;

/// Trait for catalog storage.
pub trait FileCatalog: Send + Sync {
    /// Insert a stored file row and return the full record.
    fn insert_file(&self, file: &NewFileRecord) -> Result<FileRecord, CatalogError>;

    /// Get a file row by id.
    fn file(&self, id: i64) -> Result<FileRecord, CatalogError>;

    /// Get a media row by id.
    fn media(&self, id: i64) -> Result<MediaRecord, CatalogError>;

    /// Insert a media row and return the full record.
    fn insert_media(
        &self,
        title: &str,
        original_title: Option<&str>,
        year: Option<i32>,
        user_id: &str,
    ) -> Result<MediaRecord, CatalogError>;
}
