//! Decoding raw record blocks into [`Record`]s.
//!
//! [`decode_record`] runs the whole pipeline on one fully buffered block:
//! leader, directory, then one [`decode_field`] call per directory entry in
//! directory order. Any failure aborts the record; a partially decoded record
//! is never returned.
//!
//! # Examples
//!
//! ```
//! use lexmarc::decode_record;
//!
//! let mut block = b"00045nam a2200037 a 4500001000700000\x1e".to_vec();
//! block.extend_from_slice(b"123456\x1e\x1d");
//!
//! let record = decode_record(&block)?;
//! assert_eq!(record.first("001").and_then(|f| f.data()), Some("123456"));
//! # Ok::<(), lexmarc::MarcError>(())
//! ```

use crate::directory::{parse_directory, DirectoryEntry};
use crate::error::{MarcError, Result};
use crate::field::{is_control_tag, ControlField, DataField, Field};
use crate::leader::Leader;
use crate::record::Record;
use crate::SUBFIELD_DELIMITER;

/// Decode one raw record block.
///
/// # Errors
///
/// Returns the error of the first validation point that fails:
/// [`MarcError::Leader`], [`MarcError::BaseAddress`],
/// [`MarcError::BaseAddressLength`], [`MarcError::Directory`],
/// [`MarcError::FieldOutOfBounds`], [`MarcError::Encoding`] or, when the
/// directory lists no entries, [`MarcError::Fields`].
pub fn decode_record(block: &[u8]) -> Result<Record> {
    let leader = Leader::from_bytes(block)?;
    let directory = parse_directory(block, &leader)?;

    let fields = directory
        .entries
        .iter()
        .map(|entry| decode_field(block, directory.base_address, entry))
        .collect::<Result<Vec<_>>>()?;

    if fields.is_empty() {
        return Err(MarcError::Fields);
    }

    Ok(Record::from_parts(leader, fields))
}

/// Decode the field described by one directory entry.
///
/// The content is `block[base + offset .. base + offset + length - 1]`; the
/// last declared byte is the field terminator and is not part of the content.
///
/// # Errors
///
/// - [`MarcError::FieldOutOfBounds`] if the content range is not inside the block
/// - [`MarcError::Encoding`] if text does not decode strictly
pub fn decode_field(block: &[u8], base_address: usize, entry: &DirectoryEntry) -> Result<Field> {
    let out_of_bounds = |start: usize, end: usize| MarcError::FieldOutOfBounds {
        tag: entry.tag.clone(),
        start,
        end,
        record_length: block.len(),
    };
    let start = base_address
        .checked_add(entry.offset)
        .ok_or_else(|| out_of_bounds(base_address, usize::MAX))?;
    let end = start
        .checked_add(entry.length.saturating_sub(1))
        .ok_or_else(|| out_of_bounds(start, usize::MAX))?;
    if end > block.len() {
        return Err(out_of_bounds(start, end));
    }
    let body = &block[start..end];

    if is_control_tag(&entry.tag) {
        let data = utf8(&entry.tag, body)?;
        return Ok(Field::Control(ControlField {
            tag: entry.tag.clone(),
            data: data.to_string(),
        }));
    }

    decode_data_field(&entry.tag, body).map(Field::Data)
}

fn decode_data_field(tag: &str, body: &[u8]) -> Result<DataField> {
    let mut chunks = split_subfields(body);

    // Missing indicators are blanks; anything past two is ignored.
    let indicator_chunk = chunks.next().unwrap_or_default();
    if !indicator_chunk.is_ascii() {
        return Err(ascii_error(tag));
    }
    let mut indicators = indicator_chunk.iter().map(|&b| char::from(b));
    let indicator1 = indicators.next().unwrap_or(' ');
    let indicator2 = indicators.next().unwrap_or(' ');

    let mut field = DataField {
        tag: tag.to_string(),
        indicator1,
        indicator2,
        subfields: smallvec::SmallVec::new(),
    };

    for chunk in chunks {
        let Some((&code, value)) = chunk.split_first() else {
            continue;
        };
        if !code.is_ascii() {
            return Err(ascii_error(tag));
        }
        field.add_subfield(char::from(code), utf8(tag, value)?);
    }

    Ok(field)
}

/// Split a data field body on the subfield delimiter.
///
/// The first chunk is the indicator chunk and is always present, possibly
/// empty.
fn split_subfields(body: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut start = 0;
    memchr::memchr_iter(SUBFIELD_DELIMITER, body)
        .chain(std::iter::once(body.len()))
        .map(move |end| {
            let chunk = &body[start..end];
            start = end + 1;
            chunk
        })
}

fn utf8<'a>(tag: &str, bytes: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(bytes).map_err(|source| MarcError::Encoding {
        tag: tag.to_string(),
        expected: "UTF-8",
        source: Some(source),
    })
}

fn ascii_error(tag: &str) -> MarcError {
    MarcError::Encoding {
        tag: tag.to_string(),
        expected: "ASCII",
        source: None,
    }
}
