//! Per-player SQLite store.
//!
//! One table per [`GachaCategory`], primary-keyed on the draw `id`, with the
//! schema version kept in SQLite's `user_version` pragma. Stale stores are
//! migrated on open; stores written by a newer build are left untouched.

mod migrate;
mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, Row, params};
use tracing::{debug, warn};

use crate::config::WarpsyncConfig;
use crate::error::{Error, Result};
use crate::gacha::{DrawRecord, GachaCategory};
use schema::table_sql;

pub use migrate::{CURRENT_SCHEMA_VERSION, MIGRATIONS, Migration, V1_REGION, V1_REGION_TIME_ZONE};

/// Open store for one player.
///
/// Owns its connection, which is closed when the store is dropped. Not
/// shared between threads.
#[derive(Debug)]
pub struct RecordStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl RecordStore {
    /// Open or create the store at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("Opening store {}", path.display());

        let conn = Connection::open(path)?;
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Open the store of `uid` under the configured data directory.
    pub fn open_player(config: &WarpsyncConfig, uid: &str) -> Result<Self> {
        validate_uid(uid)?;
        Self::open(config.store_path(uid))
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(mut conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        let version = read_version(&conn)?;

        if version == 0 {
            let tx = conn.transaction()?;
            create_tables(&tx)?;
            tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;
            tx.commit()?;
        } else if version < CURRENT_SCHEMA_VERSION {
            warn!(
                "Store is at schema v{}, migrating to v{}. Do not shut down.",
                version, CURRENT_SCHEMA_VERSION
            );
            migrate::migrate(&mut conn, version)?;
        } else if version > CURRENT_SCHEMA_VERSION {
            warn!(
                "Store schema v{} is newer than this program (v{}); leaving the schema untouched. \
                 Update the program to avoid data loss.",
                version, CURRENT_SCHEMA_VERSION
            );
        } else {
            create_tables(&conn)?;
        }

        Ok(Self { conn, path })
    }

    /// Location on disk, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Persisted schema version
    pub fn version(&self) -> Result<u32> {
        read_version(&self.conn)
    }

    /// Raise the persisted schema version. Lowering it is rejected.
    pub fn set_version(&self, version: u32) -> Result<()> {
        let current = self.version()?;
        if version < current {
            return Err(Error::SchemaDowngrade {
                from: current,
                to: version,
            });
        }
        self.conn.pragma_update(None, "user_version", version)?;
        Ok(())
    }

    /// All rows of `category` in storage order.
    pub fn read_all(&self, category: GachaCategory) -> Result<Vec<DrawRecord>> {
        let mut stmt = self.conn.prepare(table_sql(category).select_all)?;
        let records = stmt
            .query_map([], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Append `records` to `category` in one transaction.
    ///
    /// An id already present aborts the whole batch; nothing is overwritten.
    pub fn append(&mut self, category: GachaCategory, records: &[DrawRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(table_sql(category).insert)?;
            for r in records {
                stmt.execute(params![
                    r.id,
                    r.uid,
                    r.gacha_id,
                    r.gacha_type,
                    r.item_id,
                    r.count,
                    r.time,
                    r.name,
                    r.lang,
                    r.item_type,
                    r.rank_type,
                    r.region,
                    r.region_time_zone,
                ])?;
            }
        }
        tx.commit()?;

        debug!("Stored {} {} records", records.len(), category);
        Ok(records.len())
    }

    pub fn count(&self, category: GachaCategory) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(table_sql(category).count, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Reject uids that are not safe to use as a file name.
pub fn validate_uid(uid: &str) -> Result<()> {
    if uid.is_empty() || !uid.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(Error::InvalidUid(uid.to_string()));
    }
    Ok(())
}

fn read_version(conn: &Connection) -> Result<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

fn create_tables(conn: &Connection) -> Result<()> {
    for category in GachaCategory::ALL {
        conn.execute(table_sql(category).create, [])?;
    }
    Ok(())
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<DrawRecord> {
    Ok(DrawRecord {
        id: row.get(0)?,
        uid: row.get(1)?,
        gacha_id: row.get(2)?,
        gacha_type: row.get(3)?,
        item_id: row.get(4)?,
        count: row.get(5)?,
        time: row.get(6)?,
        name: row.get(7)?,
        lang: row.get(8)?,
        item_type: row.get(9)?,
        rank_type: row.get(10)?,
        region: row.get::<_, Option<String>>(11)?.unwrap_or_default(),
        region_time_zone: row.get::<_, Option<String>>(12)?.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::draw;
    use tempfile::tempdir;

    /// Build a schema v1 store: the 11 v1 columns, `rows` draws per table.
    fn create_v1_store(path: &Path, rows: usize) {
        let conn = Connection::open(path).unwrap();
        for category in GachaCategory::ALL {
            let table = category.table_name();
            conn.execute(
                &format!(
                    "CREATE TABLE {} (uid TEXT, gacha_id TEXT, gacha_type TEXT, item_id TEXT, \
                     count TEXT, time TEXT, name TEXT, lang TEXT, item_type TEXT, \
                     rank_type TEXT, id TEXT PRIMARY KEY)",
                    table
                ),
                [],
            )
            .unwrap();
            for i in 0..rows {
                conn.execute(
                    &format!(
                        "INSERT INTO {} VALUES ('100000001', '2003', ?1, '20000', '1', \
                         '2023-04-26 12:00:00', 'Arrows', 'zh-cn', 'Light Cone', '3', ?2)",
                        table
                    ),
                    params![category.code().to_string(), format!("{}", 1000 + i)],
                )
                .unwrap();
            }
        }
        conn.pragma_update(None, "user_version", 1u32).unwrap();
    }

    #[test]
    fn test_validate_uid() {
        assert!(validate_uid("100000001").is_ok());
        for uid in ["", "../etc", "1000 0001", "１２３"] {
            assert!(matches!(validate_uid(uid), Err(Error::InvalidUid(_))));
        }
    }

    #[test]
    fn test_open_player_uses_data_dir() {
        let dir = tempdir().unwrap();
        let config = WarpsyncConfig::builder().data_dir(dir.path().join("stores")).build();

        let store = RecordStore::open_player(&config, "100000001").unwrap();

        assert_eq!(store.path(), Some(config.store_path("100000001").as_path()));
        assert!(dir.path().join("stores").join("100000001.sqlite3").exists());
        assert!(RecordStore::open_player(&config, "../x").is_err());
    }

    #[test]
    fn test_fresh_store_is_current() {
        let store = RecordStore::open_in_memory().unwrap();
        assert_eq!(store.version().unwrap(), CURRENT_SCHEMA_VERSION);
        for category in GachaCategory::ALL {
            assert_eq!(store.count(category).unwrap(), 0);
        }
    }

    #[test]
    fn test_append_and_read_back() {
        let mut store = RecordStore::open_in_memory().unwrap();
        let mut first = draw("1002", "5", "Himeko");
        first.region = "prod_official_asia".to_string();
        first.region_time_zone = "8".to_string();
        let records = vec![draw("1001", "3", "Arrows"), first];

        let written = store.append(GachaCategory::Stellar, &records).unwrap();

        assert_eq!(written, 2);
        assert_eq!(store.read_all(GachaCategory::Stellar).unwrap(), records);
        assert_eq!(store.count(GachaCategory::Departure).unwrap(), 0);
    }

    #[test]
    fn test_duplicate_id_aborts_batch() {
        let mut store = RecordStore::open_in_memory().unwrap();
        store
            .append(GachaCategory::Character, &[draw("1001", "3", "Arrows")])
            .unwrap();

        let err = store
            .append(
                GachaCategory::Character,
                &[draw("1002", "4", "Natasha"), draw("1001", "3", "Arrows")],
            )
            .unwrap_err();

        assert!(matches!(err, Error::Database(_)));
        assert_eq!(store.count(GachaCategory::Character).unwrap(), 1);
    }

    #[test]
    fn test_v1_store_is_migrated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("100000001.sqlite3");
        create_v1_store(&path, 3);

        let store = RecordStore::open(&path).unwrap();

        assert_eq!(store.version().unwrap(), CURRENT_SCHEMA_VERSION);
        for category in GachaCategory::ALL {
            let records = store.read_all(category).unwrap();
            assert_eq!(records.len(), 3);
            assert!(records.iter().all(|r| r.region == V1_REGION));
            assert!(records.iter().all(|r| r.region_time_zone == V1_REGION_TIME_ZONE));
            assert_eq!(records[0].gacha_type, category.code().to_string());
        }
    }

    #[test]
    fn test_migrated_store_accepts_new_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("100000001.sqlite3");
        create_v1_store(&path, 1);

        let mut store = RecordStore::open(&path).unwrap();
        store
            .append(GachaCategory::LightCone, &[draw("2000", "4", "Dance")])
            .unwrap();
        drop(store);

        let store = RecordStore::open(&path).unwrap();
        assert_eq!(store.count(GachaCategory::LightCone).unwrap(), 2);
    }

    #[test]
    fn test_newer_store_is_left_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("100000001.sqlite3");

        let mut store = RecordStore::open(&path).unwrap();
        store
            .append(GachaCategory::Stellar, &[draw("1001", "3", "Arrows")])
            .unwrap();
        store.set_version(CURRENT_SCHEMA_VERSION + 1).unwrap();
        drop(store);

        let store = RecordStore::open(&path).unwrap();
        assert_eq!(store.version().unwrap(), CURRENT_SCHEMA_VERSION + 1);
        assert_eq!(store.count(GachaCategory::Stellar).unwrap(), 1);
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn test_set_version_rejects_downgrade() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("100000001.sqlite3");

        let mut store = RecordStore::open(&path).unwrap();
        store
            .append(GachaCategory::Stellar, &[draw("1001", "3", "Arrows")])
            .unwrap();

        let err = store.set_version(1).unwrap_err();
        assert!(matches!(
            err,
            Error::SchemaDowngrade { from: CURRENT_SCHEMA_VERSION, to: 1 }
        ));
        assert_eq!(store.version().unwrap(), CURRENT_SCHEMA_VERSION);
        store.set_version(CURRENT_SCHEMA_VERSION).unwrap();
        drop(store);

        let store = RecordStore::open(&path).unwrap();
        assert_eq!(store.version().unwrap(), CURRENT_SCHEMA_VERSION);
        assert_eq!(store.count(GachaCategory::Stellar).unwrap(), 1);
    }
}
