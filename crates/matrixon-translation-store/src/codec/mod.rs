//! Wire format codecs
//!
//! One module per encoding (spec.md §4.3). `log.rs` is the only caller —
//! it picks a codec based on the store's [`crate::state::WireFormat`] and
//! otherwise treats the two uniformly.

pub mod binary;
pub mod csv;
