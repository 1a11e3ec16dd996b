//! Error types for MARC decoding.
//!
//! This module provides the [`MarcError`] type returned by every decoding
//! stage and the [`Result`] convenience type. Each variant corresponds to one
//! validation point in the decoder; none of them is ever coerced into another.

use thiserror::Error;

/// Error type for all decoding operations.
///
/// A decoding error always aborts the current record only. Whether the
/// underlying stream can still be read afterwards is reported by
/// [`MarcError::is_fatal_to_stream`].
#[derive(Error, Debug)]
pub enum MarcError {
    /// Fewer than five framing bytes were available, or they are not a usable
    /// ASCII decimal record length.
    #[error("Invalid record length in first 5 bytes of record: {0}")]
    RecordLength(String),

    /// The leader region is not 24 characters of single-byte text.
    #[error("Error reading record leader: {0}")]
    Leader(String),

    /// The declared base address is zero or not a number.
    #[error("Error locating base address of record: {0}")]
    BaseAddress(String),

    /// The declared base address is not inside the record.
    #[error("Base address exceeds size of record: base address {base_address}, record length {record_length}")]
    BaseAddressLength {
        /// Base address read from leader positions 12-16.
        base_address: usize,
        /// Actual length of the raw block.
        record_length: usize,
    },

    /// The directory region is malformed.
    #[error("Record directory is invalid: {0}")]
    Directory(String),

    /// The directory was parsed but no field could be located.
    #[error("Error locating fields in record")]
    Fields,

    /// A directory entry points outside the record body.
    #[error("Field {tag} range {start}..{end} exceeds record length {record_length}")]
    FieldOutOfBounds {
        /// Tag of the offending directory entry.
        tag: String,
        /// First content byte, relative to the record start.
        start: usize,
        /// End of the content (exclusive), relative to the record start.
        end: usize,
        /// Actual length of the raw block.
        record_length: usize,
    },

    /// Field content is not valid text under strict decoding.
    #[error("Field {tag} is not valid {expected}")]
    Encoding {
        /// Tag of the field being decoded.
        tag: String,
        /// Which text encoding was required at this position.
        expected: &'static str,
        /// Underlying UTF-8 failure, when the value was decoded as UTF-8.
        #[source]
        source: Option<std::str::Utf8Error>,
    },

    /// A record cannot be written in the binary format.
    #[error("Record cannot be encoded: {0}")]
    InvalidRecord(String),

    /// I/O error from the underlying source or destination.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MarcError {
    /// Whether the record framing of the source stream is lost.
    ///
    /// After a fatal error the stream position is undefined and the caller
    /// must stop reading that source. Any other error has consumed exactly
    /// one framed block, so the next read starts at the following record.
    #[must_use]
    pub fn is_fatal_to_stream(&self) -> bool {
        matches!(self, MarcError::RecordLength(_) | MarcError::Io(_))
    }
}

impl From<MarcError> for std::io::Error {
    fn from(error: MarcError) -> Self {
        match error {
            MarcError::Io(e) => e,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}

/// Convenience type alias for [`std::result::Result`] with [`MarcError`].
pub type Result<T> = std::result::Result<T, MarcError>;
