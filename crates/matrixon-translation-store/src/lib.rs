//! Append-only, corruption-tolerant translation log store.
//!
//! One [`Store`] per managed application, backed by one on-disk log
//! file in either the compact binary encoding or the textual CSV
//! encoding (`state::WireFormat`). The store interns phrases, users,
//! and (binary only) languages into dense ids, keeps the full edit
//! history in append order, tracks which phrases are currently active,
//! and derives every read view — language progress, recent edits,
//! per-translator counts, the active/unused partition — from that one
//! log on demand.
//!
//! ```no_run
//! use matrixon_translation_store::{Store, WireFormat};
//!
//! let store = Store::open("app.csvlog", WireFormat::Csv)?;
//! store.write_new_translation("File", "Plik", "pl", "alice")?;
//! for info in store.lang_infos() {
//!     println!("{}: {} untranslated", info.display_name, info.untranslated_count);
//! }
//! # Ok::<(), matrixon_translation_store::StoreError>(())
//! ```

mod codec;
mod error;
mod interner;
mod languages;
mod log;
mod query;
mod record;
mod state;
mod store;

pub use error::{Result, StoreError};
pub use languages::{lang_by_code, lang_by_id, lang_id, lang_name_by_code, is_known_code, LanguageInfo, LANGUAGES};
pub use query::{EditView, LangInfo, Translation};
pub use state::WireFormat;
pub use store::{ActiveSetDelta, SnapshotStats, Store};
