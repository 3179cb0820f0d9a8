//! SQLite-backed file catalog implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{CatalogError, FileCatalog, FileRecord, MediaRecord, NewFileRecord};

/// SQLite-backed catalog.
///
/// A single connection behind a mutex; all operations are short
/// single-statement transactions.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Open the catalog, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path).map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            -- Stored payload files, one row per file on disk
            CREATE TABLE IF NOT EXISTS files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                stored_name TEXT NOT NULL,
                original_name TEXT NOT NULL,
                category TEXT NOT NULL,
                uploaded_at TEXT NOT NULL,
                size_bytes INTEGER NOT NULL,
                user_id TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_files_user ON files(user_id);
            CREATE INDEX IF NOT EXISTS idx_files_category ON files(category);

            -- Media records that searches and downloads hang off
            CREATE TABLE IF NOT EXISTS media (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                original_title TEXT,
                year INTEGER,
                user_id TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_media_user ON media(user_id);
            "#,
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_file(row: &rusqlite::Row) -> rusqlite::Result<FileRecord> {
        let uploaded_at_str: String = row.get(4)?;
        let uploaded_at = DateTime::parse_from_rfc3339(&uploaded_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(FileRecord {
            id: row.get(0)?,
            stored_name: row.get(1)?,
            original_name: row.get(2)?,
            category: row.get(3)?,
            uploaded_at,
            size_bytes: row.get::<_, i64>(5)? as u64,
            user_id: row.get(6)?,
        })
    }
}

impl FileCatalog for SqliteCatalog {
    fn insert_file(&self, file: &NewFileRecord) -> Result<FileRecord, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO files (stored_name, original_name, category, uploaded_at, size_bytes, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                file.stored_name,
                file.original_name,
                file.category,
                now.to_rfc3339(),
                file.size_bytes as i64,
                file.user_id,
            ],
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        let id = conn.last_insert_rowid();
        Ok(FileRecord {
            id,
            stored_name: file.stored_name.clone(),
            original_name: file.original_name.clone(),
            category: file.category.clone(),
            uploaded_at: now,
            size_bytes: file.size_bytes,
            user_id: file.user_id.clone(),
        })
    }

    fn file(&self, id: i64) -> Result<FileRecord, CatalogError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, stored_name, original_name, category, uploaded_at, size_bytes, user_id
             FROM files WHERE id = ?",
            params![id],
            Self::row_to_file,
        )
        .optional()
        .map_err(|e| CatalogError::Database(e.to_string()))?
        .ok_or_else(|| CatalogError::NotFound(format!("file {id}")))
    }

    fn media(&self, id: i64) -> Result<MediaRecord, CatalogError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, title, original_title, year, user_id FROM media WHERE id = ?",
            params![id],
            |row| {
                Ok(MediaRecord {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    original_title: row.get(2)?,
                    year: row.get(3)?,
                    user_id: row.get(4)?,
                })
            },
        )
        .optional()
        .map_err(|e| CatalogError::Database(e.to_string()))?
        .ok_or_else(|| CatalogError::NotFound(format!("media {id}")))
    }

    fn insert_media(
        &self,
        title: &str,
        original_title: Option<&str>,
        year: Option<i32>,
        user_id: &str,
    ) -> Result<MediaRecord, CatalogError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO media (title, original_title, year, user_id) VALUES (?1, ?2, ?3, ?4)",
            params![title, original_title, year, user_id],
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(MediaRecord {
            id: conn.last_insert_rowid(),
            title: title.to_string(),
            original_title: original_title.map(|s| s.to_string()),
            year,
            user_id: user_id.to_string(),
        })
    }
}
