//! Directory parsing.
//!
//! The directory sits between the leader and the base address. It is a run of
//! 12-byte entries (3-byte tag, 4-digit length, 5-digit offset) followed by a
//! single field terminator byte at `base_address - 1`.

use crate::error::{MarcError, Result};
use crate::leader::{parse_number, Leader, LEADER_LENGTH};
use serde::{Deserialize, Serialize};

/// Length of one directory entry in bytes.
pub const DIRECTORY_ENTRY_LENGTH: usize = 12;

/// One directory entry describing where a field lives in the record body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Field tag (3 characters)
    pub tag: String,
    /// Declared field length, including the field terminator
    pub length: usize,
    /// Offset of the field from the base address
    pub offset: usize,
}

/// The parsed directory together with the validated base address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    /// Byte offset of the record body, relative to the record start
    pub base_address: usize,
    /// Entries in directory order
    pub entries: Vec<DirectoryEntry>,
}

/// Parse the directory of a raw record block.
///
/// # Errors
///
/// - [`MarcError::BaseAddress`] if the leader's base address is zero or not a number
/// - [`MarcError::BaseAddressLength`] if the base address is not inside the block
/// - [`MarcError::Directory`] if the directory region is not a whole number of
///   entries, is not ASCII, or an entry's length or offset is not a number
pub fn parse_directory(block: &[u8], leader: &Leader) -> Result<Directory> {
    let base_address = leader.base_address()?;
    if base_address >= block.len() {
        return Err(MarcError::BaseAddressLength {
            base_address,
            record_length: block.len(),
        });
    }

    // A base address inside the leader leaves no room for a directory.
    let directory_end = base_address - 1;
    let region = if directory_end > LEADER_LENGTH {
        &block[LEADER_LENGTH..directory_end]
    } else {
        &[]
    };

    if region.len() % DIRECTORY_ENTRY_LENGTH != 0 {
        return Err(MarcError::Directory(format!(
            "length {} is not a multiple of {DIRECTORY_ENTRY_LENGTH}",
            region.len()
        )));
    }
    if !region.is_ascii() {
        return Err(MarcError::Directory(
            "directory contains non-ASCII bytes".to_string(),
        ));
    }

    let entries = region
        .chunks_exact(DIRECTORY_ENTRY_LENGTH)
        .map(parse_entry)
        .collect::<Result<Vec<_>>>()?;

    Ok(Directory {
        base_address,
        entries,
    })
}

fn parse_entry(chunk: &[u8]) -> Result<DirectoryEntry> {
    let tag: String = chunk[0..3].iter().map(|&b| char::from(b)).collect();
    let length = parse_number(&chunk[3..7]).ok_or_else(|| {
        MarcError::Directory(format!("invalid length for tag {tag}"))
    })?;
    let offset = parse_number(&chunk[7..12]).ok_or_else(|| {
        MarcError::Directory(format!("invalid offset for tag {tag}"))
    })?;
    Ok(DirectoryEntry {
        tag,
        length,
        offset,
    })
}
