//! Record kinds shared by both wire formats
//!
//! A decoded record is the unit the log reader hands to `state.rs`, and
//! the unit the writer builds before handing it to a codec to serialize.
//! Keeping one representation per format (rather than forcing binary and
//! CSV into a single shared enum) mirrors spec.md §4.3: the two formats
//! really do carry different information on the wire — binary intern
//! records have no timestamp of their own, CSV rows each carry one, and
//! CSV declares phrases by explicit id while binary assigns them
//! sequentially.

/// A binary-format record, framed and timestamped at the frame level
/// (see `codec::binary`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryRecord {
    InternLanguage(String),
    InternUser(String),
    InternPhrase(String),
    Retire(u32),
    Restore(u32),
    Edit {
        lang_id: u32,
        user_id: u32,
        phrase_id: u32,
        text: String,
    },
}

/// A CSV-format record. Each row carries its own timestamp (`as` and
/// `t` rows) except `s`, which declares a phrase and has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvRecord {
    DeclarePhrase {
        id: u32,
        text: String,
    },
    Edit {
        timestamp: i64,
        user: String,
        lang_code: String,
        phrase_id: u32,
        text: String,
    },
    ActiveSet {
        timestamp: i64,
        ids: Vec<u32>,
    },
}
