//! Error types for the translation log store
//!
//! Mirrors the shape of `matrixon_common::MatrixonError` (one variant per
//! failure class, `#[from]` conversions for the I/O and CSV layers) but
//! stays local to this crate: the store's failure modes (unknown phrase,
//! invalid language code, corrupt binary frame) don't belong on a
//! workspace-wide error type.

use thiserror::Error;

/// Errors surfaced by [`crate::store::Store`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `write_new_translation`/`duplicate_translation` given a language
    /// code that isn't in the closed registry.
    #[error("unknown language code: {0}")]
    InvalidLanguageCode(String),

    /// `duplicate_translation` given a source phrase that was never
    /// interned at all (distinct from "interned but never translated",
    /// which is a no-op — see DESIGN.md).
    #[error("unknown source phrase: {0}")]
    UnknownPhrase(String),

    /// Underlying file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV row failed to parse or didn't match a known record shape.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A binary frame's payload didn't decode to a known record kind,
    /// or an edit referenced an id that was never interned. Mid-stream
    /// this is corruption; spec.md §4.5/§7 says it's tolerated only when
    /// it is the final record in the file (a short read, not a bad one).
    #[error("corrupt log record: {0}")]
    Decode(String),

    /// Wraps any of the above when it occurs during `Store::open`,
    /// since §7 distinguishes "fails open" from "surfaced mid-operation".
    #[error("failed to open translation log: {0}")]
    Open(Box<StoreError>),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
