//! Parallel record decoding using Rayon.
//!
//! Framing is inherently sequential: each record declares its own length at
//! its start, so boundaries are always found single-threaded first, either by
//! [`scan_boundaries`](crate::splitter::scan_boundaries) over a buffer or by a
//! [`RecordSplitter`] over a stream. Only the already-extracted blocks are
//! decoded in parallel, each one independently.
//!
//! Results come back in input order with one entry per block, so a malformed
//! record is reported in place and never hides its neighbours.
//!
//! # Examples
//!
//! ```no_run
//! use lexmarc::parallel::decode_batch_parallel;
//! use lexmarc::splitter::scan_boundaries;
//!
//! let buffer = std::fs::read("full01.lex")?;
//! let boundaries = scan_boundaries(&buffer)?;
//!
//! let results = decode_batch_parallel(&boundaries, &buffer)?;
//! let decoded = results.iter().filter(|r| r.is_ok()).count();
//! println!("decoded {decoded} of {} records", results.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::decoder::decode_record;
use crate::error::{MarcError, Result};
use crate::record::Record;
use crate::splitter::RecordSplitter;
use rayon::prelude::*;
use std::io::Read;

/// Configuration for batched parallel decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Maximum number of blocks read from the source before a batch is decoded.
    pub batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig { batch_size: 100 }
    }
}

impl BatchConfig {
    /// Config with a specific batch size. A size of zero is treated as one.
    #[must_use]
    pub fn with_batch_size(batch_size: usize) -> Self {
        BatchConfig {
            batch_size: batch_size.max(1),
        }
    }
}

/// Decode a set of record blocks in parallel.
///
/// `record_boundaries` holds `(offset, length)` pairs into `buffer`. Returns
/// one result per boundary, in the same order.
///
/// # Errors
///
/// Returns [`MarcError::RecordLength`] if any boundary lies outside the
/// buffer; in that case nothing is decoded. Per-record failures are returned
/// inside the vector instead.
pub fn decode_batch_parallel(
    record_boundaries: &[(usize, usize)],
    buffer: &[u8],
) -> Result<Vec<Result<Record>>> {
    for &(offset, length) in record_boundaries {
        if offset.checked_add(length).map_or(true, |end| end > buffer.len()) {
            return Err(MarcError::RecordLength(format!(
                "record boundary ({offset}, {length}) exceeds buffer size {}",
                buffer.len()
            )));
        }
    }

    Ok(record_boundaries
        .par_iter()
        .enumerate()
        .map(|(idx, &(offset, length))| {
            let result = decode_record(&buffer[offset..offset + length]);
            if let Err(e) = &result {
                tracing::warn!(block = idx, offset, error = %e, "record rejected");
            }
            result
        })
        .collect())
}

/// Reads a stream in batches and decodes each batch in parallel.
///
/// ```
/// use lexmarc::parallel::{BatchConfig, BatchReader};
/// use std::io::Cursor;
///
/// let mut reader = BatchReader::new(Cursor::new(Vec::new()), BatchConfig::default());
/// assert!(reader.next_batch()?.is_none());
/// # Ok::<(), lexmarc::MarcError>(())
/// ```
#[derive(Debug)]
pub struct BatchReader<R: Read> {
    splitter: RecordSplitter<R>,
    config: BatchConfig,
    failed: bool,
}

impl<R: Read> BatchReader<R> {
    /// Create a batch reader over a byte source.
    pub fn new(reader: R, config: BatchConfig) -> Self {
        BatchReader {
            splitter: RecordSplitter::new(reader),
            config: BatchConfig::with_batch_size(config.batch_size),
            failed: false,
        }
    }

    /// Read up to `batch_size` blocks and decode them in parallel.
    ///
    /// Returns `Ok(None)` once the source is exhausted. If the framing is lost
    /// partway through a batch, the blocks read before it are still decoded
    /// and the framing error is the last entry of that batch; later calls
    /// return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the framing or I/O error directly when it happens before any
    /// block of the batch was read.
    pub fn next_batch(&mut self) -> Result<Option<Vec<Result<Record>>>> {
        if self.failed {
            return Ok(None);
        }

        let mut blocks = Vec::with_capacity(self.config.batch_size);
        let mut framing_error = None;
        while blocks.len() < self.config.batch_size {
            match self.splitter.next_block() {
                Ok(Some(block)) => blocks.push(block),
                Ok(None) => break,
                Err(e) => {
                    self.failed = true;
                    framing_error = Some(e);
                    break;
                },
            }
        }

        if blocks.is_empty() {
            return framing_error.map_or(Ok(None), Err);
        }

        let first_block = self.splitter.blocks_read() - blocks.len();
        let mut results: Vec<Result<Record>> = blocks
            .par_iter()
            .enumerate()
            .map(|(idx, block)| {
                let result = decode_record(block);
                if let Err(e) = &result {
                    tracing::warn!(block = first_block + idx, error = %e, "record rejected");
                }
                result
            })
            .collect();
        tracing::debug!(first_block, blocks = results.len(), "batch decoded");

        results.extend(framing_error.map(Err));
        Ok(Some(results))
    }

    /// Number of framed blocks consumed so far.
    #[must_use]
    pub fn blocks_read(&self) -> usize {
        self.splitter.blocks_read()
    }

    /// The effective configuration.
    #[must_use]
    pub fn config(&self) -> BatchConfig {
        self.config
    }

    /// Recover the underlying source.
    pub fn into_inner(self) -> R {
        self.splitter.into_inner()
    }
}

impl<R: Read> Iterator for BatchReader<R> {
    type Item = Result<Vec<Result<Record>>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}
