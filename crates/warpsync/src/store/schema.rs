//! SQL for the per-category tables.
//!
//! Statements are assembled at compile time from the table name, so no
//! runtime string ever reaches SQLite as an identifier.

use crate::gacha::GachaCategory;

/// Statements bound to one category table.
pub(crate) struct TableSql {
    pub create: &'static str,
    pub select_all: &'static str,
    pub insert: &'static str,
    pub count: &'static str,
    pub add_region: &'static str,
    pub add_region_time_zone: &'static str,
    pub backfill_region: &'static str,
}

macro_rules! table_sql {
    ($table:literal) => {
        TableSql {
            create: concat!(
                "CREATE TABLE IF NOT EXISTS ",
                $table,
                " (uid TEXT, gacha_id TEXT, gacha_type TEXT, item_id TEXT, count TEXT, \
                 time TEXT, name TEXT, lang TEXT, item_type TEXT, rank_type TEXT, \
                 id TEXT PRIMARY KEY, region TEXT, region_time_zone TEXT)"
            ),
            select_all: concat!(
                "SELECT id, uid, gacha_id, gacha_type, item_id, count, time, name, lang, \
                 item_type, rank_type, region, region_time_zone FROM ",
                $table,
                " ORDER BY rowid"
            ),
            insert: concat!(
                "INSERT INTO ",
                $table,
                " (id, uid, gacha_id, gacha_type, item_id, count, time, name, lang, \
                 item_type, rank_type, region, region_time_zone) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
            ),
            count: concat!("SELECT COUNT(*) FROM ", $table),
            add_region: concat!("ALTER TABLE ", $table, " ADD COLUMN region TEXT"),
            add_region_time_zone: concat!(
                "ALTER TABLE ",
                $table,
                " ADD COLUMN region_time_zone TEXT"
            ),
            backfill_region: concat!(
                "UPDATE ",
                $table,
                " SET region = ?1, region_time_zone = ?2"
            ),
        }
    };
}

static STELLAR: TableSql = table_sql!("STELLAR");
static DEPARTURE: TableSql = table_sql!("DEPARTURE");
static CHARACTER: TableSql = table_sql!("CHARACTER");
static LIGHT_CONE: TableSql = table_sql!("LIGHT_CONE");

pub(crate) fn table_sql(category: GachaCategory) -> &'static TableSql {
    match category {
        GachaCategory::Stellar => &STELLAR,
        GachaCategory::Departure => &DEPARTURE,
        GachaCategory::Character => &CHARACTER,
        GachaCategory::LightCone => &LIGHT_CONE,
    }
}
