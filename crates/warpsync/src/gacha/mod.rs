//! Gacha domain types.
//!
//! - **Categories**: the fixed set of warp pools and their API codes
//! - **Records**: one draw as returned by the API and stored on disk
//! - **Ledger**: per-category deduplicating working set
//! - **History**: the four ledgers of one player

mod category;
mod history;
mod ledger;
mod record;

pub use category::GachaCategory;
pub use history::{GachaHistory, MergeOutcome};
pub use ledger::CategoryLedger;
pub use record::{DrawRecord, Rarity, compare_ids};

pub(crate) use record::json_text;
