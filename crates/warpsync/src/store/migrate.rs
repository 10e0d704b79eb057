//! Schema migrations.
//!
//! Each step upgrades the store from exactly one version to the next and is
//! applied in its own transaction together with the version bump. Adding a
//! version means appending a step to [`MIGRATIONS`]; existing steps never
//! change.

use rusqlite::{Connection, params};
use tracing::info;

use super::schema::table_sql;
use crate::error::{Error, Result};
use crate::gacha::GachaCategory;

/// Schema version written by this build
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Region of every draw stored before schema v2 (only the CN server existed)
pub const V1_REGION: &str = "prod_gf_cn";
/// Time zone of every draw stored before schema v2
pub const V1_REGION_TIME_ZONE: &str = "8";

/// One upgrade step, keyed by the version it upgrades from.
pub struct Migration {
    pub from: u32,
    pub name: &'static str,
    apply: fn(&Connection) -> rusqlite::Result<()>,
}

/// Registered steps, in version order
pub const MIGRATIONS: &[Migration] = &[Migration {
    from: 1,
    name: "add_region_columns",
    apply: add_region_columns,
}];

/// v1 -> v2: add `region`/`region_time_zone` and backfill the v1 defaults.
fn add_region_columns(conn: &Connection) -> rusqlite::Result<()> {
    for category in GachaCategory::ALL {
        let sql = table_sql(category);
        conn.execute(sql.add_region, [])?;
        conn.execute(sql.add_region_time_zone, [])?;
        conn.execute(sql.backfill_region, params![V1_REGION, V1_REGION_TIME_ZONE])?;
    }
    Ok(())
}

/// Bring a store at `version` up to [`CURRENT_SCHEMA_VERSION`].
pub(crate) fn migrate(conn: &mut Connection, version: u32) -> Result<u32> {
    migrate_with(conn, version, CURRENT_SCHEMA_VERSION, MIGRATIONS)
}

fn migrate_with(
    conn: &mut Connection,
    mut version: u32,
    target: u32,
    steps: &[Migration],
) -> Result<u32> {
    while version < target {
        let step = steps
            .iter()
            .find(|m| m.from == version)
            .ok_or(Error::MigrationMissing(version))?;

        info!(
            "Applying migration v{} -> v{}: {}",
            version,
            version + 1,
            step.name
        );
        let tx = conn.transaction()?;
        (step.apply)(&tx)?;
        tx.pragma_update(None, "user_version", version + 1)?;
        tx.commit()?;
        version += 1;
    }
    Ok(version)
}
