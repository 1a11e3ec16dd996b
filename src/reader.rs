//! Reading records from binary streams.
//!
//! This module provides [`MarcReader`], which frames records with a
//! [`RecordSplitter`] and decodes each block with [`decode_record`].
//!
//! A block that fails to decode is reported and then left behind: the reader
//! has already consumed exactly that block, so the next call starts at the
//! following record. Only [`crate::MarcError::is_fatal_to_stream`] errors lose the
//! framing.
//!
//! # Examples
//!
//! ```no_run
//! use lexmarc::MarcReader;
//! use std::fs::File;
//!
//! let file = File::open("full01.lex")?;
//! let mut reader = MarcReader::new(file);
//!
//! for result in reader.records() {
//!     match result {
//!         Ok(record) => println!("{}", record.control_value("001").unwrap_or("")),
//!         Err(e) if e.is_fatal_to_stream() => return Err(e.into()),
//!         Err(e) => eprintln!("skipping record: {e}"),
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::decoder::decode_record;
use crate::error::Result;
use crate::record::Record;
use crate::splitter::RecordSplitter;
use std::io::Read;

/// Reader for length-framed binary records.
#[derive(Debug)]
pub struct MarcReader<R: Read> {
    splitter: RecordSplitter<R>,
    records_read: usize,
    failed: bool,
}

impl<R: Read> MarcReader<R> {
    /// Create a new reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use lexmarc::MarcReader;
    /// use std::io::Cursor;
    ///
    /// let reader = MarcReader::new(Cursor::new(Vec::new()));
    /// assert_eq!(reader.records_read(), 0);
    /// ```
    pub fn new(reader: R) -> Self {
        MarcReader {
            splitter: RecordSplitter::new(reader),
            records_read: 0,
            failed: false,
        }
    }

    /// Read and decode the next record.
    ///
    /// Returns `Ok(Some(record))` for a decoded record and `Ok(None)` at the
    /// end of the source. After an error that loses the stream framing every
    /// later call returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the decoder's error for a malformed block, or a framing or I/O
    /// error from the splitter.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        if self.failed {
            return Ok(None);
        }

        let ordinal = self.splitter.blocks_read();
        let block = match self.splitter.next_block() {
            Ok(Some(block)) => block,
            Ok(None) => return Ok(None),
            Err(e) => {
                self.failed = true;
                tracing::warn!(block = ordinal, error = %e, "record framing lost");
                return Err(e);
            },
        };

        match decode_record(&block) {
            Ok(record) => {
                self.records_read += 1;
                tracing::debug!(block = ordinal, fields = record.len(), "record decoded");
                Ok(Some(record))
            },
            Err(e) => {
                tracing::warn!(block = ordinal, length = block.len(), error = %e, "record rejected");
                Err(e)
            },
        }
    }

    /// Iterate over the remaining records.
    ///
    /// Each item is the result of one [`read_record`](Self::read_record) call,
    /// so a malformed record shows up as an `Err` item and iteration carries
    /// on with the next one.
    pub fn records(&mut self) -> Records<'_, R> {
        Records { reader: self }
    }

    /// Number of records decoded successfully.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Number of framed blocks consumed, including rejected ones.
    ///
    /// Before a call to [`read_record`](Self::read_record) this is also the
    /// zero-based position of the block that call will read.
    #[must_use]
    pub fn blocks_read(&self) -> usize {
        self.splitter.blocks_read()
    }

    /// Number of bytes consumed from the source.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.splitter.bytes_read()
    }

    /// Recover the underlying source.
    pub fn into_inner(self) -> R {
        self.splitter.into_inner()
    }
}

/// Iterator over the records of a [`MarcReader`].
///
/// Created by [`MarcReader::records`].
#[derive(Debug)]
pub struct Records<'a, R: Read> {
    reader: &'a mut MarcReader<R>,
}

impl<R: Read> Iterator for Records<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}

/// Decode every record in a source, keeping failures in place.
///
/// Returns one entry per framed block in stream order. Reading stops early if
/// the framing is lost; that error is the last entry.
pub fn read_all<R: Read>(reader: R) -> Vec<Result<Record>> {
    MarcReader::new(reader).records().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarcError;
    use crate::field::Field;
    use std::io::Cursor;

    const FIELD_TERMINATOR: u8 = 0x1E;
    const SUBFIELD_DELIMITER: u8 = 0x1F;
    const RECORD_TERMINATOR: u8 = 0x1D;

    fn build_record(id: &str, title: &str) -> Vec<u8> {
        let mut field_001 = id.as_bytes().to_vec();
        field_001.push(FIELD_TERMINATOR);

        let mut field_245 = Vec::new();
        field_245.extend_from_slice(b"10"); // Indicators
        field_245.push(SUBFIELD_DELIMITER);
        field_245.push(b'a');
        field_245.extend_from_slice(title.as_bytes());
        field_245.push(FIELD_TERMINATOR);

        let mut directory = Vec::new();
        directory.extend_from_slice(format!("001{:04}00000", field_001.len()).as_bytes());
        directory.extend_from_slice(
            format!("245{:04}{:05}", field_245.len(), field_001.len()).as_bytes(),
        );
        directory.push(FIELD_TERMINATOR);

        let base_address = 24 + directory.len();
        let record_length = base_address + field_001.len() + field_245.len() + 1;

        let mut record = Vec::new();
        record.extend_from_slice(format!("{record_length:05}").as_bytes()); // 0-4
        record.extend_from_slice(b"nam a22"); // 5-11
        record.extend_from_slice(format!("{base_address:05}").as_bytes()); // 12-16
        record.extend_from_slice(b" a 4500"); // 17-23
        record.extend_from_slice(&directory);
        record.extend_from_slice(&field_001);
        record.extend_from_slice(&field_245);
        record.push(RECORD_TERMINATOR);
        record
    }

    #[test]
    fn test_read_simple_record() {
        let mut reader = MarcReader::new(Cursor::new(build_record("0001", "Test title")));

        let record = reader.read_record().unwrap().unwrap();
        assert_eq!(record.leader().record_type(), 'a');
        assert_eq!(record.control_value("001"), Some("0001"));
        assert_eq!(
            record.first("245").and_then(|f| f.get_subfield('a')),
            Some("Test title")
        );
        assert_eq!(record.first("245").and_then(Field::indicators), Some(('1', '0')));
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_eof_returns_none() {
        let mut reader = MarcReader::new(Cursor::new(Vec::new()));
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_read_multiple_records() {
        let mut bytes = build_record("0001", "First");
        bytes.extend(build_record("0002", "Second"));
        bytes.extend(build_record("0003", "Third"));

        let mut reader = MarcReader::new(Cursor::new(bytes));
        let ids: Vec<String> = reader
            .records()
            .map(|r| r.unwrap().control_value("001").unwrap().to_string())
            .collect();

        assert_eq!(ids, vec!["0001", "0002", "0003"]);
        assert_eq!(reader.records_read(), 3);
        assert_eq!(reader.blocks_read(), 3);
    }

    #[test]
    fn test_bad_record_does_not_disturb_next() {
        let mut bad = build_record("0002", "Broken");
        // Break the base address of the middle record.
        bad[12..17].copy_from_slice(b"00000");

        let mut bytes = build_record("0001", "First");
        bytes.extend(bad);
        bytes.extend(build_record("0003", "Third"));

        let results = read_all(Cursor::new(bytes));
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(MarcError::BaseAddress(_))));
        assert_eq!(
            results[2].as_ref().unwrap().control_value("001"),
            Some("0003")
        );
    }

    #[test]
    fn test_framing_error_stops_reader() {
        let mut bytes = build_record("0001", "First");
        bytes.extend_from_slice(b"00");

        let mut reader = MarcReader::new(Cursor::new(bytes));
        assert!(reader.read_record().unwrap().is_some());
        let err = reader.read_record().unwrap_err();
        assert!(matches!(err, MarcError::RecordLength(_)));
        assert!(err.is_fatal_to_stream());
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_five_byte_block_is_rejected() {
        let mut reader = MarcReader::new(Cursor::new(b"00005".to_vec()));
        assert!(matches!(reader.read_record(), Err(MarcError::Leader(_))));
        assert_eq!(reader.records_read(), 0);
        assert_eq!(reader.blocks_read(), 1);
    }

    #[test]
    fn test_truncated_record_is_rejected() {
        let mut bytes = build_record("0001", "Title");
        bytes.truncate(bytes.len() - 8);
        let mut reader = MarcReader::new(Cursor::new(bytes));
        assert!(matches!(
            reader.read_record(),
            Err(MarcError::FieldOutOfBounds { .. })
        ));
    }
}
