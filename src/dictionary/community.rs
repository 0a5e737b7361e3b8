/*!
 * Community dictionary.
 *
 * A read-only SQLite store with one table of `key`, `origin_name`,
 * `trans_name` and `version` columns. The whole table is loaded into a
 * `DictionaryIndex` once per run.
 */

use std::path::Path;

use log::{debug, info};
use rusqlite::{Connection, OpenFlags};

use super::DictionaryIndex;
use crate::errors::DictionaryError;

/// Default table name of the community store
pub const DEFAULT_TABLE: &str = "dict";

/// Loaded community dictionary
#[derive(Debug, Clone, Default)]
pub struct CommunityDictionary {
    index: DictionaryIndex,
    rows: usize,
}

impl CommunityDictionary {
    /// Open the store strictly read-only and load `table`
    pub fn open<P: AsRef<Path>>(path: P, table: &str) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        info!("Opening community dictionary at: {:?}", path);

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch("PRAGMA query_only = ON;")?;

        Self::from_connection(&conn, table)
    }

    /// Load from an already opened connection
    pub fn from_connection(conn: &Connection, table: &str) -> Result<Self, DictionaryError> {
        // table names cannot be bound as parameters
        let table = table.replace('"', "\"\"");
        let sql = format!(
            "SELECT key, origin_name, trans_name, version FROM \"{}\" ORDER BY rowid",
            table
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, Option<String>>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut index = DictionaryIndex::new();
        let mut count = 0usize;
        for row in rows {
            let (key, origin, translation, version) = row?;
            let Some(translation) = translation.filter(|t| !t.trim().is_empty()) else {
                continue;
            };
            count += 1;

            if let Some(key) = key.filter(|k| !k.is_empty()) {
                index.insert_key(&key, &translation);
            }
            if let Some(origin) = origin.filter(|o| !o.is_empty()) {
                index.insert_origin(&origin, &translation, version.as_deref());
            }
        }

        debug!(
            "Community dictionary: {} rows, {} keys, {} original texts",
            count,
            index.key_count(),
            index.origin_count()
        );

        Ok(Self { index, rows: count })
    }

    /// An empty dictionary, used when no store is configured
    pub fn empty() -> Self {
        Self::default()
    }

    /// Dual-indexed view of the store
    pub fn index(&self) -> &DictionaryIndex {
        &self.index
    }

    /// Consume the dictionary, keeping only its index
    pub fn into_index(self) -> DictionaryIndex {
        self.index
    }

    /// Number of usable rows loaded
    pub fn row_count(&self) -> usize {
        self.rows
    }
}
