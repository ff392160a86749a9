//! Binary wire format
//!
//! ## Purpose
//! Encodes/decodes the framed binary log described in spec.md §4.3: each
//! frame is `varuint(payload_len + 8) | i64_LE(timestamp) | payload`, and
//! payload is either an admin record (first varuint == 0) or an edit
//! record (first varuint is the 1-based language id, which is never 0).
//!
//! ## Invariants
//! - A frame whose length prefix or body is short-read (not a logical
//!   corruption, just "ran out of bytes") is reported as [`FrameRead::Truncated`],
//!   never as an error — spec.md §4.3/§4.5 requires the reader to stop
//!   cleanly at the last fully-decoded record.
//!   - Tested by: `codec::binary::tests::truncated_length_prefix_is_tolerated`,
//!     `codec::binary::tests::truncated_payload_is_tolerated`.
//! - All entity ids (language, user, phrase) are 1-based on the wire and
//!   0-based in memory; `encode_record`/`decode_record` are the only
//!   places that convert between the two.
//!   - Tested by: `codec::binary::tests::edit_roundtrip`.

use crate::error::{Result, StoreError};
use crate::record::BinaryRecord;
use std::io::Read;

fn write_varuint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

enum VarintRead {
    Eof,
    Truncated,
    Value(u64),
}

fn read_varuint<R: Read>(r: &mut R) -> std::io::Result<VarintRead> {
    let mut result: u64 = 0;
    let mut shift = 0u32;
    let mut consumed = 0usize;
    let mut byte_buf = [0u8; 1];
    loop {
        let n = r.read(&mut byte_buf)?;
        if n == 0 {
            return Ok(if consumed == 0 {
                VarintRead::Eof
            } else {
                VarintRead::Truncated
            });
        }
        consumed += 1;
        let byte = byte_buf[0];
        result |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            return Ok(VarintRead::Value(result));
        }
        shift += 7;
        if shift >= 64 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "varuint exceeds 64 bits",
            ));
        }
    }
}

/// Reads a varuint from an in-memory payload slice. Any short read here
/// is real corruption (the payload was already length-delimited by the
/// frame), not a tail truncation — it surfaces as a decode error.
fn read_varuint_value(cursor: &mut &[u8]) -> Result<u64> {
    match read_varuint(cursor).map_err(|e| StoreError::Decode(e.to_string()))? {
        VarintRead::Value(v) => Ok(v),
        _ => Err(StoreError::Decode("truncated varuint in payload".into())),
    }
}

fn read_id(cursor: &mut &[u8]) -> Result<u32> {
    let wire = read_varuint_value(cursor)?;
    wire.checked_sub(1)
        .map(|v| v as u32)
        .ok_or_else(|| StoreError::Decode("id 0 is reserved, ids are 1-based".into()))
}

fn utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Encodes a record's payload (tag + content, no frame envelope).
pub fn encode_record(record: &BinaryRecord) -> Vec<u8> {
    let mut buf = Vec::new();
    match record {
        BinaryRecord::InternLanguage(s) => {
            write_varuint(&mut buf, 0);
            buf.push(1);
            buf.extend_from_slice(s.as_bytes());
        }
        BinaryRecord::InternUser(s) => {
            write_varuint(&mut buf, 0);
            buf.push(2);
            buf.extend_from_slice(s.as_bytes());
        }
        BinaryRecord::InternPhrase(s) => {
            write_varuint(&mut buf, 0);
            buf.push(3);
            buf.extend_from_slice(s.as_bytes());
        }
        BinaryRecord::Retire(id) => {
            write_varuint(&mut buf, 0);
            buf.push(4);
            write_varuint(&mut buf, *id as u64 + 1);
        }
        BinaryRecord::Restore(id) => {
            write_varuint(&mut buf, 0);
            buf.push(5);
            write_varuint(&mut buf, *id as u64 + 1);
        }
        BinaryRecord::Edit {
            lang_id,
            user_id,
            phrase_id,
            text,
        } => {
            write_varuint(&mut buf, *lang_id as u64 + 1);
            write_varuint(&mut buf, *user_id as u64 + 1);
            write_varuint(&mut buf, *phrase_id as u64 + 1);
            buf.extend_from_slice(text.as_bytes());
        }
    }
    buf
}

/// Decodes a record from a fully-buffered payload (post-framing).
pub fn decode_record(payload: &[u8]) -> Result<BinaryRecord> {
    let mut cursor: &[u8] = payload;
    let first = read_varuint_value(&mut cursor)?;
    if first == 0 {
        if cursor.is_empty() {
            return Err(StoreError::Decode("admin record missing tag byte".into()));
        }
        let tag = cursor[0];
        cursor = &cursor[1..];
        match tag {
            1 => Ok(BinaryRecord::InternLanguage(utf8(cursor)?)),
            2 => Ok(BinaryRecord::InternUser(utf8(cursor)?)),
            3 => Ok(BinaryRecord::InternPhrase(utf8(cursor)?)),
            4 => Ok(BinaryRecord::Retire(read_id(&mut cursor)?)),
            5 => Ok(BinaryRecord::Restore(read_id(&mut cursor)?)),
            other => Err(StoreError::Decode(format!("unknown admin tag {other}"))),
        }
    } else {
        let lang_id = (first - 1) as u32;
        let user_id = read_id(&mut cursor)?;
        let phrase_id = read_id(&mut cursor)?;
        let text = utf8(cursor)?;
        Ok(BinaryRecord::Edit {
            lang_id,
            user_id,
            phrase_id,
            text,
        })
    }
}

/// Frames `payload` with its timestamp, ready to append to the log.
pub fn encode_frame(timestamp: i64, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + 16);
    write_varuint(&mut frame, payload.len() as u64 + 8);
    frame.extend_from_slice(&timestamp.to_le_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// The outcome of attempting to read one frame.
pub enum FrameRead {
    /// Nothing left to read; the file ended exactly on a frame boundary.
    Eof,
    /// The frame started but didn't finish — a short read on the length
    /// prefix or the frame body. Tolerated per spec.md §4.3.
    Truncated,
    Frame { timestamp: i64, payload: Vec<u8> },
}

fn read_fully<R: Read>(r: &mut R, buf: &mut [u8]) -> std::io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = r.read(&mut buf[filled..])?;
        if n == 0 {
            return Ok(false);
        }
        filled += n;
    }
    Ok(true)
}

/// Reads one frame from `r`. Returns `Ok(FrameRead::Eof)` if `r` is
/// exhausted before any byte of a new frame is read, and
/// `Ok(FrameRead::Truncated)` if the frame starts but can't be finished.
pub fn read_frame<R: Read>(r: &mut R) -> std::io::Result<FrameRead> {
    let len_plus_8 = match read_varuint(r)? {
        VarintRead::Eof => return Ok(FrameRead::Eof),
        VarintRead::Truncated => return Ok(FrameRead::Truncated),
        VarintRead::Value(v) => v,
    };
    if len_plus_8 < 8 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "frame length shorter than the timestamp field",
        ));
    }
    let mut body = vec![0u8; len_plus_8 as usize];
    if !read_fully(r, &mut body)? {
        return Ok(FrameRead::Truncated);
    }
    let timestamp = i64::from_le_bytes(body[0..8].try_into().unwrap());
    let payload = body[8..].to_vec();
    Ok(FrameRead::Frame { timestamp, payload })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_roundtrip() {
        let record = BinaryRecord::Edit {
            lang_id: 3,
            user_id: 7,
            phrase_id: 12,
            text: "hola".to_string(),
        };
        let payload = encode_record(&record);
        assert_eq!(decode_record(&payload).unwrap(), record);
    }

    #[test]
    fn admin_records_roundtrip() {
        for record in [
            BinaryRecord::InternLanguage("pl".to_string()),
            BinaryRecord::InternUser("alice".to_string()),
            BinaryRecord::InternPhrase("foo".to_string()),
            BinaryRecord::Retire(0),
            BinaryRecord::Restore(41),
        ] {
            let payload = encode_record(&record);
            assert_eq!(decode_record(&payload).unwrap(), record);
        }
    }

    #[test]
    fn frame_roundtrip() {
        let payload = encode_record(&BinaryRecord::InternPhrase("foo".to_string()));
        let frame = encode_frame(1_700_000_000, &payload);
        let mut cursor = &frame[..];
        match read_frame(&mut cursor).unwrap() {
            FrameRead::Frame { timestamp, payload: got } => {
                assert_eq!(timestamp, 1_700_000_000);
                assert_eq!(decode_record(&got).unwrap(), BinaryRecord::InternPhrase("foo".to_string()));
            }
            _ => panic!("expected a frame"),
        }
    }

    #[test]
    fn empty_reader_is_clean_eof() {
        let mut cursor: &[u8] = &[];
        assert!(matches!(read_frame(&mut cursor).unwrap(), FrameRead::Eof));
    }

    #[test]
    fn truncated_length_prefix_is_tolerated() {
        // A continuation byte (MSB set) with nothing after it.
        let mut cursor: &[u8] = &[0x80];
        assert!(matches!(read_frame(&mut cursor).unwrap(), FrameRead::Truncated));
    }

    #[test]
    fn truncated_payload_is_tolerated() {
        let payload = encode_record(&BinaryRecord::InternPhrase("foo".to_string()));
        let mut frame = encode_frame(1_700_000_000, &payload);
        frame.truncate(frame.len() - 2);
        let mut cursor = &frame[..];
        assert!(matches!(read_frame(&mut cursor).unwrap(), FrameRead::Truncated));
    }

    #[test]
    fn lang_id_zero_is_never_produced_by_edit_encoding() {
        let record = BinaryRecord::Edit {
            lang_id: 0,
            user_id: 0,
            phrase_id: 0,
            text: "x".to_string(),
        };
        let payload = encode_record(&record);
        // First varuint byte must be 1 (lang_id 0 -> wire value 1), never 0,
        // which is what disambiguates edit records from admin records.
        assert_eq!(payload[0], 1);
    }
}
