//! Writing records back to the binary format.
//!
//! [`encode_record`] is the inverse of [`decode_record`](crate::decode_record):
//! fields are laid out in record order, the directory is rebuilt from them and
//! the leader's record length and base address are recomputed. Every other
//! leader position is written as stored.
//!
//! # Examples
//!
//! ```
//! use lexmarc::{decode_record, encode_record, DataField, Field, Leader, Record};
//!
//! let record = Record::builder(Leader::default())
//!     .field(Field::control("001", "12345"))
//!     .field(DataField::builder("245", '1', '0').subfield('a', "Title").build())
//!     .build();
//!
//! let bytes = encode_record(&record)?;
//! let decoded = decode_record(&bytes)?;
//! assert!(decoded.fields().eq(record.fields()));
//! assert_eq!(decoded.leader().base_address()?, 24 + 2 * 12 + 1);
//! # Ok::<(), lexmarc::MarcError>(())
//! ```

use crate::directory::DIRECTORY_ENTRY_LENGTH;
use crate::error::{MarcError, Result};
use crate::field::{DataField, Field};
use crate::leader::LEADER_LENGTH;
use crate::record::Record;
use crate::{FIELD_TERMINATOR, RECORD_TERMINATOR, SUBFIELD_DELIMITER};
use std::io::Write;

const MAX_FIELD_LENGTH: usize = 9_999;
const MAX_OFFSET: usize = 99_999;
const MAX_RECORD_LENGTH: usize = 99_999;

/// Encode one record as a framed binary block.
///
/// # Errors
///
/// Returns [`MarcError::InvalidRecord`] if a tag is not three ASCII
/// characters, an indicator or subfield code is not ASCII, text contains a
/// delimiter or terminator byte, or a length or offset does not fit its
/// fixed-width column.
pub fn encode_record(record: &Record) -> Result<Vec<u8>> {
    let mut directory = Vec::with_capacity(record.len() * DIRECTORY_ENTRY_LENGTH + 1);
    let mut data_area = Vec::new();

    for field in record {
        let start = data_area.len();
        match field {
            Field::Control(control) => {
                check_text(&control.tag, &control.data)?;
                data_area.extend_from_slice(control.data.as_bytes());
            },
            Field::Data(data) => encode_data_field(data, &mut data_area)?,
        }
        data_area.push(FIELD_TERMINATOR);

        let field_length = data_area.len() - start;
        let tag = field.tag();
        if tag.len() != 3 || !tag.is_ascii() {
            return Err(MarcError::InvalidRecord(format!(
                "tag '{tag}' is not three ASCII characters"
            )));
        }
        if field_length > MAX_FIELD_LENGTH {
            return Err(MarcError::InvalidRecord(format!(
                "field {tag} is {field_length} bytes, limit is {MAX_FIELD_LENGTH}"
            )));
        }
        if start > MAX_OFFSET {
            return Err(MarcError::InvalidRecord(format!(
                "field {tag} starts at offset {start}, limit is {MAX_OFFSET}"
            )));
        }

        directory.extend_from_slice(tag.as_bytes());
        directory.extend_from_slice(format!("{field_length:04}{start:05}").as_bytes());
    }
    directory.push(FIELD_TERMINATOR);

    let base_address = LEADER_LENGTH + directory.len();
    let record_length = base_address + data_area.len() + 1;
    if record_length > MAX_RECORD_LENGTH {
        return Err(MarcError::InvalidRecord(format!(
            "record is {record_length} bytes, limit is {MAX_RECORD_LENGTH}"
        )));
    }

    let mut block = Vec::with_capacity(record_length);
    block.extend_from_slice(record.leader().as_bytes());
    block[0..5].copy_from_slice(format!("{record_length:05}").as_bytes());
    block[12..17].copy_from_slice(format!("{base_address:05}").as_bytes());
    block.extend_from_slice(&directory);
    block.extend_from_slice(&data_area);
    block.push(RECORD_TERMINATOR);

    Ok(block)
}

fn encode_data_field(field: &DataField, out: &mut Vec<u8>) -> Result<()> {
    out.push(ascii_byte(&field.tag, field.indicator1)?);
    out.push(ascii_byte(&field.tag, field.indicator2)?);

    for subfield in &field.subfields {
        check_text(&field.tag, &subfield.value)?;
        out.push(SUBFIELD_DELIMITER);
        out.push(ascii_byte(&field.tag, subfield.code)?);
        out.extend_from_slice(subfield.value.as_bytes());
    }
    Ok(())
}

const RESERVED: [u8; 3] = [SUBFIELD_DELIMITER, FIELD_TERMINATOR, RECORD_TERMINATOR];

fn ascii_byte(tag: &str, c: char) -> Result<u8> {
    let byte = u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| MarcError::InvalidRecord(format!("field {tag}: '{c}' is not ASCII")))?;
    if RESERVED.contains(&byte) {
        return Err(MarcError::InvalidRecord(format!(
            "field {tag}: indicator or code {byte:#04x} is a delimiter or terminator byte"
        )));
    }
    Ok(byte)
}

fn check_text(tag: &str, text: &str) -> Result<()> {
    if text.bytes().any(|b| RESERVED.contains(&b)) {
        return Err(MarcError::InvalidRecord(format!(
            "field {tag} contains a delimiter or terminator byte"
        )));
    }
    Ok(())
}

/// Writer for the framed binary record format.
///
/// ```
/// use lexmarc::{Field, Leader, MarcWriter, Record};
///
/// let record = Record::builder(Leader::default())
///     .field(Field::control("001", "1"))
///     .build();
///
/// let mut writer = MarcWriter::new(Vec::new());
/// writer.write_record(&record)?;
/// writer.finish()?;
/// assert_eq!(writer.records_written(), 1);
/// # Ok::<(), lexmarc::MarcError>(())
/// ```
#[derive(Debug)]
pub struct MarcWriter<W: Write> {
    writer: W,
    records_written: usize,
    finished: bool,
}

impl<W: Write> MarcWriter<W> {
    /// Create a new writer.
    pub fn new(writer: W) -> Self {
        MarcWriter {
            writer,
            records_written: 0,
            finished: false,
        }
    }

    /// Encode and write a single record.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidRecord`] if the record cannot be encoded or
    /// the writer is already finished, and [`MarcError::Io`] if writing fails.
    /// Nothing is written for a record that fails to encode.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.finished {
            return Err(MarcError::InvalidRecord(
                "cannot write to a finished writer".to_string(),
            ));
        }

        let block = encode_record(record)?;
        self.writer.write_all(&block)?;
        self.records_written += 1;
        tracing::trace!(record = self.records_written, length = block.len(), "record written");
        Ok(())
    }

    /// Flush the writer and mark it as finished.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the underlying writer fails.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Recover the underlying destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
