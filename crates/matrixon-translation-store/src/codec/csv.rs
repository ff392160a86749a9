//! CSV wire format
//!
//! ## Purpose
//! Encodes/decodes the textual log described in spec.md §4.3: RFC 4180,
//! comma-delimited, no header row, three record kinds keyed by the first
//! field (`s` declare-phrase, `t` edit, `as` active-set). Unlike the
//! binary format, every row carries its own timestamp except `s`, and
//! phrase ids are declared explicitly rather than assigned implicitly.
//!
//! ## Invariants
//! - A row that fails to parse anywhere in the file fails the whole
//!   read — spec.md §4.5: "CSV: a parse error on any record terminates
//!   replay; prior records remain authoritative." There is no
//!   truncation tolerance for this format.
//!   - Tested by: `codec::csv::tests::malformed_row_is_an_error`.
//! - `as` rows carry their active set as inclusive range literals
//!   (`lo-hi`) joined by commas inside one quoted field, e.g. `"0-1,5"`.
//!   - Tested by: `codec::csv::tests::active_set_roundtrip_with_gaps`.

use crate::error::{Result, StoreError};
use crate::record::CsvRecord;
use std::io::{Read, Write};

fn encode_active_set(ids: &[u32]) -> String {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let mut parts = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let start = sorted[i];
        let mut end = start;
        while i + 1 < sorted.len() && sorted[i + 1] == end + 1 {
            end = sorted[i + 1];
            i += 1;
        }
        parts.push(if start == end {
            start.to_string()
        } else {
            format!("{start}-{end}")
        });
        i += 1;
    }
    parts.join(",")
}

fn decode_active_set(spec: &str) -> Result<Vec<u32>> {
    if spec.is_empty() {
        return Ok(Vec::new());
    }
    let mut ids = Vec::new();
    for part in spec.split(',') {
        match part.split_once('-') {
            Some((lo, hi)) => {
                let lo: u32 = lo
                    .parse()
                    .map_err(|_| StoreError::Decode(format!("bad range start: {part}")))?;
                let hi: u32 = hi
                    .parse()
                    .map_err(|_| StoreError::Decode(format!("bad range end: {part}")))?;
                if hi < lo {
                    return Err(StoreError::Decode(format!("inverted range: {part}")));
                }
                ids.extend(lo..=hi);
            }
            None => {
                let id: u32 = part
                    .parse()
                    .map_err(|_| StoreError::Decode(format!("bad id: {part}")))?;
                ids.push(id);
            }
        }
    }
    Ok(ids)
}

fn parse_field<T: std::str::FromStr>(field: &str, what: &str) -> Result<T> {
    field
        .parse()
        .map_err(|_| StoreError::Decode(format!("bad {what}: {field}")))
}

/// Writes one record as a CSV row.
pub fn write_record<W: Write>(writer: &mut csv::Writer<W>, record: &CsvRecord) -> Result<()> {
    match record {
        CsvRecord::DeclarePhrase { id, text } => {
            writer.write_record(["s", &id.to_string(), text])?;
        }
        CsvRecord::Edit {
            timestamp,
            user,
            lang_code,
            phrase_id,
            text,
        } => {
            writer.write_record([
                "t",
                &timestamp.to_string(),
                user,
                lang_code,
                &phrase_id.to_string(),
                text,
            ])?;
        }
        CsvRecord::ActiveSet { timestamp, ids } => {
            writer.write_record(["as", &timestamp.to_string(), &encode_active_set(ids)])?;
        }
    }
    Ok(())
}

/// Decodes one already-split CSV row.
pub fn decode_row(row: &csv::StringRecord) -> Result<CsvRecord> {
    let kind = row
        .get(0)
        .ok_or_else(|| StoreError::Decode("empty CSV row".into()))?;
    match kind {
        "s" => {
            let id: u32 = parse_field(
                row.get(1)
                    .ok_or_else(|| StoreError::Decode("s row missing id".into()))?,
                "phrase id",
            )?;
            let text = row
                .get(2)
                .ok_or_else(|| StoreError::Decode("s row missing text".into()))?
                .to_string();
            Ok(CsvRecord::DeclarePhrase { id, text })
        }
        "t" => {
            let timestamp: i64 = parse_field(
                row.get(1)
                    .ok_or_else(|| StoreError::Decode("t row missing timestamp".into()))?,
                "timestamp",
            )?;
            let user = row
                .get(2)
                .ok_or_else(|| StoreError::Decode("t row missing user".into()))?
                .to_string();
            let lang_code = row
                .get(3)
                .ok_or_else(|| StoreError::Decode("t row missing lang code".into()))?
                .to_string();
            let phrase_id: u32 = parse_field(
                row.get(4)
                    .ok_or_else(|| StoreError::Decode("t row missing phrase id".into()))?,
                "phrase id",
            )?;
            let text = row
                .get(5)
                .ok_or_else(|| StoreError::Decode("t row missing text".into()))?
                .to_string();
            Ok(CsvRecord::Edit {
                timestamp,
                user,
                lang_code,
                phrase_id,
                text,
            })
        }
        "as" => {
            let timestamp: i64 = parse_field(
                row.get(1)
                    .ok_or_else(|| StoreError::Decode("as row missing timestamp".into()))?,
                "timestamp",
            )?;
            let ids = decode_active_set(row.get(2).unwrap_or(""))?;
            Ok(CsvRecord::ActiveSet { timestamp, ids })
        }
        other => Err(StoreError::Decode(format!("unknown CSV row kind: {other}"))),
    }
}

/// Reads every record from a CSV log. Any parse failure — malformed
/// field, unknown row kind, ragged quoting — aborts the whole read.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<CsvRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        records.push(decode_row(&row)?);
    }
    Ok(records)
}
