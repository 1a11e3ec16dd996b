//! Splitting a byte stream into framed record blocks.
//!
//! Every record starts with its own total length as five ASCII digits. The
//! splitter reads those five bytes, then the rest of the declared length, and
//! hands the whole block to the decoder. The stream cursor only ever moves
//! forward; there is no seeking.
//!
//! [`scan_boundaries`] does the same walk over an in-memory buffer and
//! returns `(offset, length)` pairs, which is what parallel decoding needs.
//!
//! # Example
//!
//! ```
//! use lexmarc::splitter::RecordSplitter;
//! use std::io::Cursor;
//!
//! let mut splitter = RecordSplitter::new(Cursor::new(b"00007ab00006c".to_vec()));
//! assert_eq!(splitter.next_block()?, Some(b"00007ab".to_vec()));
//! assert_eq!(splitter.next_block()?, Some(b"00006c".to_vec()));
//! assert_eq!(splitter.next_block()?, None);
//! # Ok::<(), lexmarc::MarcError>(())
//! ```

use crate::error::{MarcError, Result};
use crate::leader::parse_number;
use std::io::{ErrorKind, Read};

/// Number of ASCII digits framing each record.
pub const LENGTH_PREFIX: usize = 5;

/// Reads framed record blocks from any [`Read`] source.
#[derive(Debug)]
pub struct RecordSplitter<R: Read> {
    reader: R,
    blocks_read: usize,
    bytes_read: u64,
}

impl<R: Read> RecordSplitter<R> {
    /// Create a splitter over a byte source.
    pub fn new(reader: R) -> Self {
        RecordSplitter {
            reader,
            blocks_read: 0,
            bytes_read: 0,
        }
    }

    /// Read the next framed block.
    ///
    /// Returns `Ok(None)` when the source is exhausted exactly at a record
    /// boundary. If the source ends inside the payload the block is returned
    /// shorter than declared; the decoder rejects it.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::RecordLength`] if one to four prefix bytes are
    /// available, or the prefix is not a decimal length of at least five.
    /// After this error the stream position is undefined. I/O failures are
    /// returned as [`MarcError::Io`].
    pub fn next_block(&mut self) -> Result<Option<Vec<u8>>> {
        let mut prefix = [0u8; LENGTH_PREFIX];
        let filled = read_up_to(&mut self.reader, &mut prefix)?;
        if filled == 0 {
            return Ok(None);
        }
        self.bytes_read += filled as u64;
        if filled < LENGTH_PREFIX {
            return Err(MarcError::RecordLength(format!(
                "expected {LENGTH_PREFIX} bytes, got {filled}"
            )));
        }

        let declared = declared_length(&prefix)?;
        let mut block = Vec::with_capacity(declared);
        block.extend_from_slice(&prefix);
        let payload = (declared - LENGTH_PREFIX) as u64;
        let read = self.reader.by_ref().take(payload).read_to_end(&mut block)?;
        self.bytes_read += read as u64;

        if block.len() < declared {
            tracing::debug!(
                block = self.blocks_read,
                declared,
                actual = block.len(),
                "source ended inside record"
            );
        }
        tracing::trace!(block = self.blocks_read, length = block.len(), "record block read");

        self.blocks_read += 1;
        Ok(Some(block))
    }

    /// Number of blocks returned so far.
    #[must_use]
    pub fn blocks_read(&self) -> usize {
        self.blocks_read
    }

    /// Number of bytes consumed from the source so far.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Recover the underlying source.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for RecordSplitter<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block().transpose()
    }
}

/// Split an in-memory buffer into `(offset, length)` record blocks.
///
/// A final block that is shorter than its declared length is returned with
/// the bytes actually present, as the stream splitter would.
///
/// # Errors
///
/// Returns [`MarcError::RecordLength`] if a prefix is truncated or not a
/// usable length. Blocks before the bad prefix are not returned, since the
/// framing after it cannot be trusted.
///
/// # Examples
///
/// ```
/// use lexmarc::splitter::scan_boundaries;
///
/// let boundaries = scan_boundaries(b"00007ab00006c")?;
/// assert_eq!(boundaries, vec![(0, 7), (7, 6)]);
/// # Ok::<(), lexmarc::MarcError>(())
/// ```
pub fn scan_boundaries(buffer: &[u8]) -> Result<Vec<(usize, usize)>> {
    let mut boundaries = Vec::new();
    let mut offset = 0;

    while offset < buffer.len() {
        let remaining = &buffer[offset..];
        if remaining.len() < LENGTH_PREFIX {
            return Err(MarcError::RecordLength(format!(
                "expected {LENGTH_PREFIX} bytes at offset {offset}, got {}",
                remaining.len()
            )));
        }
        let declared = declared_length(&remaining[..LENGTH_PREFIX])?;
        let length = declared.min(remaining.len());
        boundaries.push((offset, length));
        offset += length;
    }

    Ok(boundaries)
}

fn declared_length(prefix: &[u8]) -> Result<usize> {
    match parse_number(prefix) {
        Some(length) if length >= LENGTH_PREFIX => Ok(length),
        Some(length) => Err(MarcError::RecordLength(format!(
            "declared length {length} is shorter than its own prefix"
        ))),
        None => Err(MarcError::RecordLength(format!(
            "'{}' is not a number",
            String::from_utf8_lossy(prefix)
        ))),
    }
}

/// Fill as much of `buf` as the source provides, stopping only at EOF.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {},
            Err(e) => return Err(MarcError::Io(e)),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A source that returns one byte per read call.
    struct Trickle(Cursor<Vec<u8>>);

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let end = buf.len().min(1);
            self.0.read(&mut buf[..end])
        }
    }

    #[test]
    fn test_empty_source_is_end_of_stream() {
        let mut splitter = RecordSplitter::new(Cursor::new(Vec::new()));
        assert!(splitter.next_block().unwrap().is_none());
        assert_eq!(splitter.blocks_read(), 0);
    }

    #[test]
    fn test_short_prefix_is_record_length_error() {
        let mut splitter = RecordSplitter::new(Cursor::new(b"001".to_vec()));
        assert!(matches!(
            splitter.next_block(),
            Err(MarcError::RecordLength(_))
        ));
    }

    #[test]
    fn test_non_numeric_prefix() {
        let mut splitter = RecordSplitter::new(Cursor::new(b"0a123xxxx".to_vec()));
        assert!(matches!(
            splitter.next_block(),
            Err(MarcError::RecordLength(_))
        ));
    }

    #[test]
    fn test_declared_length_below_prefix() {
        let mut splitter = RecordSplitter::new(Cursor::new(b"00003".to_vec()));
        assert!(matches!(
            splitter.next_block(),
            Err(MarcError::RecordLength(_))
        ));
    }

    #[test]
    fn test_exactly_five_byte_block() {
        let mut splitter = RecordSplitter::new(Cursor::new(b"00005".to_vec()));
        assert_eq!(splitter.next_block().unwrap(), Some(b"00005".to_vec()));
        assert!(splitter.next_block().unwrap().is_none());
    }

    #[test]
    fn test_truncated_payload_returns_short_block() {
        let mut splitter = RecordSplitter::new(Cursor::new(b"00010abc".to_vec()));
        assert_eq!(splitter.next_block().unwrap(), Some(b"00010abc".to_vec()));
        assert!(splitter.next_block().unwrap().is_none());
    }

    #[test]
    fn test_counters_advance() {
        let mut splitter = RecordSplitter::new(Cursor::new(b"00007ab00006c".to_vec()));
        splitter.next_block().unwrap();
        assert_eq!(splitter.blocks_read(), 1);
        assert_eq!(splitter.bytes_read(), 7);
        splitter.next_block().unwrap();
        assert_eq!(splitter.blocks_read(), 2);
        assert_eq!(splitter.bytes_read(), 13);
    }

    #[test]
    fn test_partial_reads_are_reassembled() {
        let source = Trickle(Cursor::new(b"00008xyz00005".to_vec()));
        let blocks: Vec<Vec<u8>> = RecordSplitter::new(source)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(blocks, vec![b"00008xyz".to_vec(), b"00005".to_vec()]);
    }

    #[test]
    fn test_scan_boundaries() {
        let boundaries = scan_boundaries(b"00007ab00005").unwrap();
        assert_eq!(boundaries, vec![(0, 7), (7, 5)]);
    }

    #[test]
    fn test_scan_boundaries_empty() {
        assert!(scan_boundaries(b"").unwrap().is_empty());
    }

    #[test]
    fn test_scan_boundaries_truncated_tail() {
        let boundaries = scan_boundaries(b"00007ab00010abc").unwrap();
        assert_eq!(boundaries, vec![(0, 7), (7, 8)]);
    }

    #[test]
    fn test_scan_boundaries_bad_prefix() {
        assert!(matches!(
            scan_boundaries(b"00007ab00"),
            Err(MarcError::RecordLength(_))
        ));
        assert!(matches!(
            scan_boundaries(b"00007abxxxxx"),
            Err(MarcError::RecordLength(_))
        ));
    }
}
