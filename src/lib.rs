//! # lexmarc: length-framed bibliographic record decoding
//!
//! Decodes a stream of variable-length, self-describing binary bibliographic
//! records (the ISO 2709 / MARC exchange layout) into validated, queryable
//! [`Record`]s.
//!
//! Every record is framed by its own five-digit length, followed by a
//! 24-byte leader, a directory of 12-byte entries and the field bodies. A
//! malformed record fails with the [`MarcError`] variant for the check that
//! rejected it, and only that record is lost: the reader carries on with the
//! next framed block.
//!
//! ## Quick Start
//!
//! ### Reading records
//!
//! ```no_run
//! use lexmarc::MarcReader;
//! use std::fs::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = File::open("full01.lex")?;
//! let mut reader = MarcReader::new(file);
//!
//! loop {
//!     let ordinal = reader.blocks_read();
//!     match reader.read_record() {
//!         Ok(Some(record)) => {
//!             for title in record.subfield_values(&["245"], &['a']) {
//!                 println!("{title}");
//!             }
//!         },
//!         Ok(None) => break,
//!         Err(e) if e.is_fatal_to_stream() => return Err(e.into()),
//!         Err(e) => eprintln!("record {ordinal}: {e}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Building and writing records
//!
//! ```
//! use lexmarc::{DataField, Field, Leader, MarcWriter, Record};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let record = Record::builder(Leader::default())
//!     .field(Field::control("001", "12345"))
//!     .field(DataField::builder("245", '1', '0').subfield('a', "Test Title").build())
//!     .build();
//!
//! let mut writer = MarcWriter::new(Vec::new());
//! writer.write_record(&record)?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Querying
//!
//! ```
//! use lexmarc::{DataField, Field, Leader, Record};
//!
//! let record = Record::builder(Leader::default())
//!     .field(DataField::builder("650", ' ', '0').subfield('a', "Railroads").build())
//!     .field(DataField::builder("650", ' ', '0').subfield('a', "Canals").build())
//!     .build();
//!
//! assert!(record.has_tag("650"));
//! assert!(record.first("001").is_none());
//! assert_eq!(record.subfield_values(&["650"], &['a']), vec!["Railroads", "Canals"]);
//! ```
//!
//! ## Modules
//!
//! - [`splitter`]: Framing a byte stream into raw record blocks
//! - [`leader`]: The 24-byte leader and its code tables
//! - [`directory`]: Directory entries and base-address checks
//! - [`decoder`]: Turning one raw block into a [`Record`]
//! - [`field`]: Control fields, data fields and subfields
//! - [`record`]: The record aggregate and its query API
//! - [`reader`]: Reading records from any [`std::io::Read`]
//! - [`writer`]: Encoding records back to the binary format
//! - [`parallel`]: Split-then-decode batch processing with rayon
//! - [`error`]: Error types

pub mod decoder;
pub mod directory;
pub mod error;
pub mod field;
pub mod leader;
pub mod parallel;
pub mod reader;
pub mod record;
pub mod splitter;
pub mod writer;

/// Separates the indicator chunk and subfields of a data field.
pub const SUBFIELD_DELIMITER: u8 = 0x1F;
/// Ends every field body and the directory.
pub const FIELD_TERMINATOR: u8 = 0x1E;
/// Ends every record.
pub const RECORD_TERMINATOR: u8 = 0x1D;

pub use decoder::{decode_field, decode_record};
pub use directory::DirectoryEntry;
pub use error::{MarcError, Result};
pub use field::{ControlField, DataField, Field, Subfield};
pub use leader::Leader;
pub use parallel::{decode_batch_parallel, BatchConfig, BatchReader};
pub use reader::MarcReader;
pub use record::{Record, RecordBuilder};
pub use writer::{encode_record, MarcWriter};
